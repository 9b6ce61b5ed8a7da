//! Trestle SDK - Lightweight SDK for writing native modules
//!
//! This crate provides the minimal types and traits needed to write Trestle
//! native modules without depending on the full trestle-bridge runtime.
//!
//! A native module is a named capability exposed to JS code. It implements
//! [`NativeModule`], gets registered in a [`ModuleRegistry`], and receives
//! method calls routed from the JS side as positional JSON arguments.
//!
//! # Example
//!
//! ```ignore
//! use trestle_sdk::{MethodResult, NativeModule};
//!
//! struct Toast;
//!
//! impl NativeModule for Toast {
//!     fn name(&self) -> &str {
//!         "Toast"
//!     }
//!
//!     fn invoke(&self, method: &str, args: &[serde_json::Value]) -> MethodResult {
//!         match method {
//!             "show" => {
//!                 println!("{}", args.first().and_then(|v| v.as_str()).unwrap_or(""));
//!                 MethodResult::Void
//!             }
//!             _ => MethodResult::Unhandled,
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs)]

mod module;
mod registry;

pub use module::{
    Args, MemoryPressure, MethodResult, ModuleContext, ModuleError, NativeModule, NoopContext,
};
pub use registry::{ModuleRegistry, RegistryError};
