// Request domain model - pending requests, handles and dispatch outcomes
use super::region::RegionId;
use std::fmt;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form fields sent along with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    fields: Vec<(String, String)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Optional arguments of a load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub payload: Option<Payload>,
    pub method: Method,
    /// Issued by the scheduler; rejected instead of replacing a pending request.
    pub autorefresh: bool,
    /// Issued while replaying navigation history; never pushes a history entry.
    pub history_triggered: bool,
}

impl LoadOptions {
    pub fn autorefresh() -> Self {
        Self {
            autorefresh: true,
            ..Self::default()
        }
    }

    pub fn history() -> Self {
        Self {
            history_triggered: true,
            ..Self::default()
        }
    }

    pub fn post(payload: Payload) -> Self {
        Self {
            payload: Some(payload),
            method: Method::Post,
            ..Self::default()
        }
    }
}

/// A request that has been handed to the transport and not yet completed.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: RequestId,
    pub region: Option<RegionId>,
    pub url: String,
    pub method: Method,
    pub payload: Option<Payload>,
    pub autorefresh: bool,
    pub history_triggered: bool,
    pub cancellation: CancellationToken,
}

impl PendingRequest {
    pub fn new(id: RequestId, url: &str, region: Option<RegionId>, options: LoadOptions) -> Self {
        Self {
            id,
            region,
            url: url.to_string(),
            method: options.method,
            payload: options.payload,
            autorefresh: options.autorefresh,
            history_triggered: options.history_triggered,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn abort(&self) {
        self.cancellation.cancel();
    }

    pub fn handle(&self) -> RequestHandle {
        RequestHandle {
            id: self.id,
            url: self.url.clone(),
            region: self.region.clone(),
            cancellation: self.cancellation.clone(),
        }
    }
}

/// Caller-side view of an in-flight request.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    pub id: RequestId,
    pub url: String,
    pub region: Option<RegionId>,
    cancellation: CancellationToken,
}

impl RequestHandle {
    pub fn abort(&self) {
        self.cancellation.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// What `Loader::load` did with a request.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// A new request went out.
    Issued(RequestHandle),
    /// The same URL was already in flight for the region; this is that request.
    Coalesced(RequestHandle),
    /// Not issued: an autorefresh found the region busy, or the loader is shut down.
    Rejected,
}

impl LoadOutcome {
    pub fn handle(&self) -> Option<&RequestHandle> {
        match self {
            LoadOutcome::Issued(handle) | LoadOutcome::Coalesced(handle) => Some(handle),
            LoadOutcome::Rejected => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, LoadOutcome::Rejected)
    }
}
