// Collaborator traits - UI, history, behaviors and time
use crate::domain::region::RegionId;

/// Page chrome the loader asks to update but does not own.
pub trait Ui: Send + Sync {
    fn window_id(&self) -> Option<String>;
    fn set_window_id(&self, id: &str);
    fn set_title(&self, title: &str);
    fn reload_css(&self);
    /// Re-layout fixed controls after the page changed.
    fn fix_controls(&self);
    fn initialize_controls(&self, region: &RegionId);
    fn refresh_debug(&self);
    fn fix_debug_visibility(&self);
    fn trigger_window_resize(&self);
    fn scroll_to_anchor(&self, region: &RegionId, anchor: &str);
    /// Let non-persistent notices fade out.
    fn fade_notifications_away(&self);
}

pub trait History: Send + Sync {
    fn push_current_state(&self);
}

/// Binds interactive behavior to freshly rendered content.
pub trait Events: Send + Sync {
    fn apply_handlers(&self, region: &RegionId);
}

pub trait Clock: Send + Sync {
    /// Milliseconds since the epoch.
    fn now_ms(&self) -> i64;
    /// Wall clock time for notices, e.g. `14:05`.
    fn time_short(&self) -> String;
}
