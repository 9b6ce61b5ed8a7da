//! UI-root collaborator contract
//!
//! The bridge drives a host-owned root surface through this interface
//! boundary only: it reads the root's JS entry module, its view tag, and
//! its launch properties, and forwards stage changes. View hierarchy,
//! sizing, and rendering stay on the host's side of the line. Measure
//! specs are opaque integers passed through uninterpreted.

/// Lifecycle stage of a root surface, forwarded to JS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The surface was created and attached
    Started,
    /// The surface is in the foreground
    Resumed,
    /// The surface left the foreground
    Paused,
    /// The surface was torn down
    Stopped,
}

impl Stage {
    /// Wire encoding passed across the boundary.
    pub fn as_i32(self) -> i32 {
        match self {
            Stage::Started => 0,
            Stage::Resumed => 1,
            Stage::Paused => 2,
            Stage::Stopped => 3,
        }
    }
}

/// A host-owned root surface the bridge can start a JS application on.
///
/// The root view tag scopes calls to one UI surface. It is assigned once —
/// by the host or by the bridge on first `run_application` — and never
/// reassigned.
pub trait UiRoot: Send + Sync {
    /// Name the JS application was registered under.
    fn js_module_name(&self) -> &str;

    /// Cached launch properties for the application, if any.
    fn app_properties(&self) -> Option<serde_json::Value> {
        None
    }

    /// Initial UI template, if the host pre-renders one.
    fn initial_ui_template(&self) -> Option<String> {
        None
    }

    /// The assigned root view tag, or `None` before assignment.
    fn root_view_tag(&self) -> Option<i32>;

    /// Assign the root view tag. Called at most once.
    fn set_root_view_tag(&self, tag: i32);

    /// Cached width measure spec (opaque to the bridge).
    fn width_measure_spec(&self) -> i32 {
        0
    }

    /// Cached height measure spec (opaque to the bridge).
    fn height_measure_spec(&self) -> i32 {
        0
    }
}
