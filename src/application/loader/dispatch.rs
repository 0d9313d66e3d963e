// Dispatcher - dedupe, abort-replace and request issuing
use super::failure::classify;
use super::{Completion, Loader};
use crate::application::transport::TransportRequest;
use crate::domain::directives::{HEADER_ACCEPT, HEADER_WINDOW_ID};
use crate::domain::region::RegionId;
use crate::domain::request::{LoadOptions, LoadOutcome, PendingRequest, RequestId};
use std::sync::Arc;

impl Loader {
    /// Load `url` into `region`.
    ///
    /// At most one request per region is in flight: an autorefresh finding
    /// the region busy is rejected, a request for the URL already pending is
    /// coalesced into the pending one, anything else aborts and replaces it.
    /// Requests without a known region are never tracked.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load(&mut self, url: &str, region: Option<&RegionId>, options: LoadOptions) -> LoadOutcome {
        if self.destroyed {
            tracing::warn!("Loader destroyed, not loading {}", url);
            return LoadOutcome::Rejected;
        }

        tracing::debug!("Loading {} to {:?}", url, region.map(RegionId::as_str));

        let region = region.and_then(|region| {
            if self.document.contains(region) {
                Some(region.clone())
            } else {
                tracing::debug!("Container {} is not in the document, request stays untracked", region);
                None
            }
        });

        if let Some(pending) = region.as_ref().and_then(|r| self.registry.get(r)) {
            if options.autorefresh {
                return LoadOutcome::Rejected;
            }
            if pending.url == url {
                tracing::debug!("Request to {} is already running for {}", url, pending.id);
                return LoadOutcome::Coalesced(pending.handle());
            }
            tracing::debug!("Aborting pending request {} to load {}", pending.id, url);
            pending.abort();
        }

        self.next_request_id += 1;
        let request = PendingRequest::new(RequestId::new(self.next_request_id), url, region, options);
        let handle = request.handle();

        self.spawn(request.clone());
        self.registry.register(request);
        self.ui.refresh_debug();

        LoadOutcome::Issued(handle)
    }

    /// Abort whatever is pending for `region`.
    pub fn stop_pending_requests_for(&mut self, region: &RegionId) {
        if self.registry.abort(region) {
            tracing::debug!("Stopped pending request for {}", region);
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        let window_id = self
            .ui
            .window_id()
            .unwrap_or_else(|| self.settings.window_id_sentinel.clone());
        vec![
            (HEADER_ACCEPT.to_string(), self.settings.accept.clone()),
            (HEADER_WINDOW_ID.to_string(), window_id),
        ]
    }

    fn spawn(&self, request: PendingRequest) {
        let outbound = TransportRequest {
            url: request.url.clone(),
            method: request.method,
            payload: request.payload.clone(),
            headers: self.headers(),
        };
        let transport = Arc::clone(&self.transport);
        let completions = self.completions_tx.clone();
        let cancellation = request.cancellation.clone();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = cancellation.cancelled() => Err(super::RequestError::Aborted),
                result = transport.send(outbound) => classify(result),
            };
            // The receiver only goes away together with the loader.
            let _ = completions.send(Completion { request, outcome });
        });
    }
}
