// Headless collaborators - UI, history and events reduced to logging, plus the system clock
use crate::application::collaborators::{Clock, Events, History, Ui};
use crate::domain::region::RegionId;
use chrono::{Local, Utc};
use parking_lot::Mutex;

/// Ui for a page nobody looks at: keeps window id and title, logs the rest.
#[derive(Debug, Default)]
pub struct TracingUi {
    window_id: Mutex<Option<String>>,
    title: Mutex<Option<String>>,
}

impl TracingUi {
    pub fn title(&self) -> Option<String> {
        self.title.lock().clone()
    }
}

impl Ui for TracingUi {
    fn window_id(&self) -> Option<String> {
        self.window_id.lock().clone()
    }

    fn set_window_id(&self, id: &str) {
        tracing::info!("Window id is now {}", id);
        *self.window_id.lock() = Some(id.to_string());
    }

    fn set_title(&self, title: &str) {
        tracing::info!("Title: {}", title);
        *self.title.lock() = Some(title.to_string());
    }

    fn reload_css(&self) {
        tracing::info!("Stylesheets reload requested");
    }

    fn fix_controls(&self) {
        tracing::trace!("fix controls");
    }

    fn initialize_controls(&self, region: &RegionId) {
        tracing::trace!("initialize controls in {}", region);
    }

    fn refresh_debug(&self) {
        tracing::trace!("refresh debug");
    }

    fn fix_debug_visibility(&self) {
        tracing::trace!("fix debug visibility");
    }

    fn trigger_window_resize(&self) {
        tracing::trace!("window resize");
    }

    fn scroll_to_anchor(&self, region: &RegionId, anchor: &str) {
        tracing::debug!("Scrolling {} to #{}", region, anchor);
    }

    fn fade_notifications_away(&self) {
        tracing::trace!("fade notifications");
    }
}

#[derive(Debug, Default)]
pub struct TracingHistory;

impl History for TracingHistory {
    fn push_current_state(&self) {
        tracing::debug!("History state pushed");
    }
}

#[derive(Debug, Default)]
pub struct TracingEvents;

impl Events for TracingEvents {
    fn apply_handlers(&self, region: &RegionId) {
        tracing::trace!("Handlers applied to {}", region);
    }
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn time_short(&self) -> String {
        Local::now().format("%H:%M").to_string()
    }
}
