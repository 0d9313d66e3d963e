// Test doubles for the loader's collaborators
use crate::application::collaborators::{Clock, Events, History, Ui};
use crate::application::transport::{Transport, TransportError, TransportRequest, TransportResponse};
use crate::domain::region::RegionId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

/// Ui that records every call by name.
#[derive(Default)]
pub struct RecordingUi {
    calls: Mutex<Vec<String>>,
    titles: Mutex<Vec<String>>,
    window_id: Mutex<Option<String>>,
}

impl RecordingUi {
    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().push(call.to_string());
    }
}

impl Ui for RecordingUi {
    fn window_id(&self) -> Option<String> {
        self.window_id.lock().clone()
    }

    fn set_window_id(&self, id: &str) {
        self.record("set_window_id");
        *self.window_id.lock() = Some(id.to_string());
    }

    fn set_title(&self, title: &str) {
        self.record("set_title");
        self.titles.lock().push(title.to_string());
    }

    fn reload_css(&self) {
        self.record("reload_css");
    }

    fn fix_controls(&self) {
        self.record("fix_controls");
    }

    fn initialize_controls(&self, _region: &RegionId) {
        self.record("initialize_controls");
    }

    fn refresh_debug(&self) {
        self.record("refresh_debug");
    }

    fn fix_debug_visibility(&self) {
        self.record("fix_debug_visibility");
    }

    fn trigger_window_resize(&self) {
        self.record("trigger_window_resize");
    }

    fn scroll_to_anchor(&self, _region: &RegionId, anchor: &str) {
        self.record(&format!("scroll_to_anchor:{}", anchor));
    }

    fn fade_notifications_away(&self) {
        self.record("fade_notifications_away");
    }
}

#[derive(Default)]
pub struct RecordingHistory {
    pushes: AtomicUsize,
}

impl RecordingHistory {
    pub fn count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }
}

impl History for RecordingHistory {
    fn push_current_state(&self) {
        self.pushes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    applied: Mutex<Vec<RegionId>>,
}

impl RecordingEvents {
    pub fn applied(&self) -> Vec<RegionId> {
        self.applied.lock().clone()
    }
}

impl Events for RecordingEvents {
    fn apply_handlers(&self, region: &RegionId) {
        self.applied.lock().push(region.clone());
    }
}

/// Clock under test control.
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn time_short(&self) -> String {
        "12:00".to_string()
    }
}

#[derive(Clone)]
pub enum Scripted {
    Respond(TransportResponse),
    Fail(TransportError),
}

/// Transport answering from a script keyed by URL. Unscripted URLs never
/// answer, which keeps their requests pending until aborted.
#[derive(Default)]
pub struct FakeTransport {
    script: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<TransportRequest>>,
}

impl FakeTransport {
    pub fn respond(&self, url: &str, response: TransportResponse) {
        self.script
            .lock()
            .insert(url.to_string(), Scripted::Respond(response));
    }

    pub fn fail(&self, url: &str, reason: &str) {
        self.fail_with(url, TransportError::Connection(reason.to_string()));
    }

    pub fn fail_with(&self, url: &str, error: TransportError) {
        self.script.lock().insert(url.to_string(), Scripted::Fail(error));
    }

    pub fn calls(&self) -> Vec<TransportRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.url == url).count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let scripted = self.script.lock().get(&request.url).cloned();
        self.calls.lock().push(request);
        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(error)) => Err(error),
            None => futures::future::pending().await,
        }
    }
}
