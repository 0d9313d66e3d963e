// Autorefresh scheduler - decides which regions are due for a background reload
use crate::application::document::ContainerDirectory;
use crate::application::registry::RequestRegistry;
use crate::domain::region::RegionId;

/// A region whose refresh interval has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueRegion {
    pub region: RegionId,
    pub url: String,
    pub interval_ms: i64,
}

#[derive(Debug, Clone)]
pub struct AutorefreshScheduler {
    enabled: bool,
    default_interval_secs: u64,
}

impl AutorefreshScheduler {
    pub fn new(enabled: bool, default_interval_secs: u64) -> Self {
        Self {
            enabled,
            default_interval_secs,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Scan refreshable regions. Regions seen for the first time get their
    /// last-update stamped with `now` and wait for a later tick.
    pub fn due_regions<D>(
        &self,
        directory: &D,
        registry: &RequestRegistry,
        now: i64,
    ) -> Vec<DueRegion>
    where
        D: ContainerDirectory + ?Sized,
    {
        if !self.enabled {
            return Vec::new();
        }

        let mut due = Vec::new();
        for region in directory.refreshable_regions() {
            if registry.contains(&region) {
                tracing::debug!("No refresh, request pending for {}", region);
                continue;
            }

            let interval_secs = match directory.refresh_interval(&region) {
                Some(0) => {
                    tracing::debug!("Refresh of {} is switched off", region);
                    continue;
                }
                Some(secs) => secs,
                None => {
                    tracing::info!("No interval for {}, using {}s", region, self.default_interval_secs);
                    self.default_interval_secs
                }
            };

            let Some(last_update) = directory.last_update(&region) else {
                tracing::info!("No last update for {}, setting one", region);
                directory.set_last_update(&region, Some(now));
                continue;
            };

            let interval_ms = i64::try_from(interval_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
            if now - last_update < interval_ms {
                continue;
            }

            match directory.source_url(&region) {
                Some(url) => due.push(DueRegion {
                    region,
                    url,
                    interval_ms,
                }),
                None => tracing::debug!("Not refreshing {}, it has no source url", region),
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::{LoadOptions, PendingRequest, RequestId};
    use crate::infrastructure::memory_document::MemoryDocument;

    const NOW: i64 = 1_700_000_000_000;

    fn document() -> MemoryDocument {
        MemoryDocument::new(concat!(
            r#"<div id="col1" class="container" data-icinga-refresh="10" data-icinga-url="/hosts"></div>"#,
            r#"<div id="col2" class="container" data-icinga-url="/static"></div>"#,
        ))
    }

    #[test]
    fn test_too_soon_is_skipped() {
        let document = document();
        let col1 = RegionId::from("col1");
        document.set_last_update(&col1, Some(NOW - 5_000));

        let scheduler = AutorefreshScheduler::new(true, 10);
        assert!(scheduler.due_regions(&document, &RequestRegistry::new(), NOW).is_empty());
    }

    #[test]
    fn test_elapsed_interval_is_due() {
        let document = document();
        let col1 = RegionId::from("col1");
        document.set_last_update(&col1, Some(NOW - 11_000));

        let scheduler = AutorefreshScheduler::new(true, 10);
        let due = scheduler.due_regions(&document, &RequestRegistry::new(), NOW);

        assert_eq!(
            due,
            vec![DueRegion {
                region: col1,
                url: "/hosts".to_string(),
                interval_ms: 10_000,
            }]
        );
    }

    #[test]
    fn test_first_sighting_stamps_last_update() {
        let document = document();
        let col1 = RegionId::from("col1");

        let scheduler = AutorefreshScheduler::new(true, 10);
        assert!(scheduler.due_regions(&document, &RequestRegistry::new(), NOW).is_empty());
        assert_eq!(document.last_update(&col1), Some(NOW));
    }

    #[test]
    fn test_pending_request_blocks_refresh() {
        let document = document();
        let col1 = RegionId::from("col1");
        document.set_last_update(&col1, Some(NOW - 60_000));

        let mut registry = RequestRegistry::new();
        registry.register(PendingRequest::new(
            RequestId::new(1),
            "/hosts",
            Some(col1),
            LoadOptions::default(),
        ));

        let scheduler = AutorefreshScheduler::new(true, 10);
        assert!(scheduler.due_regions(&document, &registry, NOW).is_empty());
    }

    #[test]
    fn test_zero_interval_is_never_due() {
        let document = MemoryDocument::new(
            r#"<div id="col1" class="container" data-icinga-refresh="0" data-icinga-url="/hosts"></div>"#,
        );
        let col1 = RegionId::from("col1");
        document.set_last_update(&col1, Some(NOW - 60_000));

        let scheduler = AutorefreshScheduler::new(true, 10);
        assert!(scheduler.due_regions(&document, &RequestRegistry::new(), NOW).is_empty());
        assert_eq!(document.last_update(&col1), Some(NOW - 60_000));
    }

    #[test]
    fn test_disabled_scheduler_does_nothing() {
        let document = document();
        let mut scheduler = AutorefreshScheduler::new(true, 10);
        scheduler.disable();

        assert!(scheduler.due_regions(&document, &RequestRegistry::new(), NOW).is_empty());
        assert_eq!(document.last_update(&RegionId::from("col1")), None);

        scheduler.enable();
        assert!(scheduler.is_enabled());
    }
}
