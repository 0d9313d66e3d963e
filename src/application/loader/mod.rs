// Loader - owns the request registry and drives requests, refreshes and responses
mod dispatch;
mod failure;
mod interpreter;

pub use failure::RequestError;

use crate::application::collaborators::{Clock, Events, History, Ui};
use crate::application::directives::DirectiveChain;
use crate::application::document::Document;
use crate::application::notifications::NotificationManager;
use crate::application::registry::RequestRegistry;
use crate::application::renderer::ContentRenderer;
use crate::application::scheduler::AutorefreshScheduler;
use crate::application::transport::{Transport, TransportResponse};
use crate::domain::region::RegionId;
use crate::domain::request::{LoadOptions, PendingRequest};
use crate::domain::urls;
use crate::infrastructure::config::LoaderSettings;
use regex::Regex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

/// Everything the loader talks to but does not own.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub document: Arc<dyn Document>,
    pub ui: Arc<dyn Ui>,
    pub history: Arc<dyn History>,
    pub events: Arc<dyn Events>,
    pub clock: Arc<dyn Clock>,
}

/// A request that finished, one way or another.
#[derive(Debug)]
pub struct Completion {
    pub request: PendingRequest,
    pub outcome: Result<TransportResponse, RequestError>,
}

enum Wake {
    Shutdown,
    Tick,
    Completed(Completion),
}

pub struct Loader {
    settings: LoaderSettings,
    search_pattern: Regex,
    transport: Arc<dyn Transport>,
    document: Arc<dyn Document>,
    ui: Arc<dyn Ui>,
    history: Arc<dyn History>,
    clock: Arc<dyn Clock>,
    registry: RequestRegistry,
    scheduler: AutorefreshScheduler,
    notices: NotificationManager,
    renderer: ContentRenderer,
    directives: DirectiveChain,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    ticker: Option<Interval>,
    next_request_id: u64,
    destroyed: bool,
}

impl Loader {
    pub fn new(settings: LoaderSettings, collaborators: Collaborators) -> anyhow::Result<Self> {
        let search_pattern = Regex::new(&settings.search_pattern)?;
        let Collaborators {
            transport,
            document,
            ui,
            history,
            events,
            clock,
        } = collaborators;
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Ok(Self {
            scheduler: AutorefreshScheduler::new(settings.autorefresh, settings.default_refresh_secs),
            notices: NotificationManager::new(document.clone(), ui.clone()),
            renderer: ContentRenderer::new(document.clone(), events, ui.clone()),
            directives: DirectiveChain::default(),
            registry: RequestRegistry::new(),
            settings,
            search_pattern,
            transport,
            document,
            ui,
            history,
            clock,
            completions_tx,
            completions_rx,
            ticker: None,
            next_request_id: 0,
            destroyed: false,
        })
    }

    /// Register the periodic autorefresh tick. Calling it again is a no-op.
    pub fn initialize(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let period = Duration::from_millis(self.settings.tick_interval_ms.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
        tracing::debug!("Autorefresh tick registered every {:?}", period);
    }

    /// Drive ticks and completions until `shutdown` resolves, then destroy.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        self.initialize();
        tokio::pin!(shutdown);

        loop {
            let Some(ticker) = self.ticker.as_mut() else {
                break;
            };
            let wake = tokio::select! {
                _ = &mut shutdown => Wake::Shutdown,
                _ = ticker.tick() => Wake::Tick,
                Some(completion) = self.completions_rx.recv() => Wake::Completed(completion),
            };
            match wake {
                Wake::Shutdown => break,
                Wake::Tick => self.autorefresh(),
                Wake::Completed(completion) => self.handle_completion(completion),
            }
        }

        self.destroy();
    }

    /// Wait for the next finished request.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    /// Wait for the next finished request and apply it. Returns false once
    /// nothing can complete anymore.
    pub async fn process_next(&mut self) -> bool {
        match self.completions_rx.recv().await {
            Some(completion) => {
                self.handle_completion(completion);
                true
            }
            None => false,
        }
    }

    pub fn handle_completion(&mut self, completion: Completion) {
        if self.destroyed {
            tracing::debug!("Loader destroyed, dropping completion of {}", completion.request.url);
            return;
        }

        // Transient notices of earlier responses have faded by now.
        self.notices.fade_transient();

        let Completion { request, outcome } = completion;
        let target = match outcome {
            Ok(response) => self.on_response(&request, response),
            Err(error) => {
                self.on_failure(&request, error);
                request.region.clone()
            }
        };
        self.on_complete(&request, target.as_ref());
    }

    /// Bookkeeping that runs for every completion, successful or not.
    fn on_complete(&mut self, request: &PendingRequest, target: Option<&RegionId>) {
        if let Some(region) = target {
            self.document.set_last_update(region, Some(self.clock.now_ms()));
            self.registry.release(region, request.id);
        }
        self.ui.fade_notifications_away();
        self.ui.refresh_debug();
    }

    /// One scheduler tick: reload every region whose interval has elapsed.
    pub fn autorefresh(&mut self) {
        let now = self.clock.now_ms();
        let due = self.scheduler.due_regions(&*self.document, &self.registry, now);

        for entry in due {
            let outcome = self.load(&entry.url, Some(&entry.region), LoadOptions::autorefresh());
            if outcome.is_rejected() {
                tracing::debug!(
                    "NOT autorefreshing {}, even if {} ms passed. Request pending?",
                    entry.region,
                    entry.interval_ms
                );
            } else {
                tracing::debug!("Autorefreshing {} {} ms passed", entry.region, entry.interval_ms);
            }
        }
    }

    pub fn enable_autorefresh(&mut self) {
        self.scheduler.enable();
    }

    pub fn disable_autorefresh(&mut self) {
        self.scheduler.disable();
    }

    pub fn autorefresh_enabled(&self) -> bool {
        self.scheduler.is_enabled()
    }

    /// Resolve a URL relative to the configured base URL.
    pub fn url(&self, relative: Option<&str>) -> String {
        match relative {
            Some(relative) => urls::join(&self.settings.base_url, relative),
            None => self.settings.base_url.clone(),
        }
    }

    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    pub fn notices(&self) -> &NotificationManager {
        &self.notices
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Abort every pending request and stop accepting new ones.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        let aborted = self.registry.abort_all();
        self.ticker = None;
        self.destroyed = true;
        tracing::info!("Loader destroyed, aborted {} pending requests", aborted);
    }
}
