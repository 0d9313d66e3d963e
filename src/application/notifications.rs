// Notification manager - singleton exception/connectivity notices plus transient ones
use crate::application::collaborators::Ui;
use crate::application::document::Document;
use crate::domain::notice::{Notice, NoticeId, Severity};
use std::sync::Arc;

pub struct NotificationManager {
    document: Arc<dyn Document>,
    ui: Arc<dyn Ui>,
    exception: Option<NoticeId>,
    connection_lost: Option<NoticeId>,
}

impl NotificationManager {
    pub fn new(document: Arc<dyn Document>, ui: Arc<dyn Ui>) -> Self {
        Self {
            document,
            ui,
            exception: None,
            connection_lost: None,
        }
    }

    pub fn create_notice(&self, severity: Severity, message: &str, persist: bool) -> NoticeId {
        let id = self
            .document
            .append_notice(&Notice::new(severity, message, persist));
        self.ui.fix_controls();
        id
    }

    pub fn has_exception(&self) -> bool {
        self.exception.is_some()
    }

    pub fn has_connection_lost(&self) -> bool {
        self.connection_lost.is_some()
    }

    /// Show the exception notice unless one is already visible.
    pub fn raise_exception(&mut self, message: &str) -> Option<NoticeId> {
        if self.exception.is_some() {
            return None;
        }
        let id = self.create_notice(Severity::Error, message, true);
        self.exception = Some(id);
        Some(id)
    }

    /// Show the connectivity notice unless one is already visible.
    pub fn raise_connection_lost(&mut self, message: &str) -> Option<NoticeId> {
        if self.connection_lost.is_some() {
            return None;
        }
        let id = self.create_notice(Severity::Error, message, true);
        self.connection_lost = Some(id);
        Some(id)
    }

    /// Drop transient notices that have been shown already.
    pub fn fade_transient(&self) -> usize {
        let faded = self.document.fade_transient();
        if faded > 0 {
            tracing::debug!("{} notices faded away", faded);
        }
        faded
    }

    pub fn clear_exception(&mut self) -> bool {
        match self.exception.take() {
            Some(id) => {
                self.document.remove_notice(id);
                true
            }
            None => false,
        }
    }

    pub fn clear_connection_lost(&mut self) -> bool {
        match self.connection_lost.take() {
            Some(id) => {
                self.document.remove_notice(id);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::RecordingUi;
    use crate::infrastructure::memory_document::MemoryDocument;

    fn manager() -> (NotificationManager, Arc<MemoryDocument>, Arc<RecordingUi>) {
        let document = Arc::new(MemoryDocument::new(""));
        let ui = Arc::new(RecordingUi::default());
        (NotificationManager::new(document.clone(), ui.clone()), document, ui)
    }

    #[test]
    fn test_create_notice_fixes_controls() {
        let (manager, document, ui) = manager();
        manager.create_notice(Severity::Info, "Saved", false);

        assert_eq!(document.notices(), vec![Notice::new(Severity::Info, "Saved", false)]);
        assert_eq!(ui.count("fix_controls"), 1);
    }

    #[test]
    fn test_exception_is_singleton() {
        let (mut manager, document, _) = manager();
        assert!(manager.raise_exception("Boom").is_some());
        assert!(manager.raise_exception("Boom again").is_none());
        assert_eq!(document.notices().len(), 1);

        assert!(manager.clear_exception());
        assert!(!manager.clear_exception());
        assert!(document.notices().is_empty());
        assert!(manager.raise_exception("Boom later").is_some());
    }

    #[test]
    fn test_categories_are_independent() {
        let (mut manager, document, _) = manager();
        manager.raise_exception("Boom");
        manager.raise_connection_lost("Lost");
        assert_eq!(document.notices().len(), 2);

        manager.clear_connection_lost();
        assert!(manager.has_exception());
        assert!(!manager.has_connection_lost());
        assert_eq!(document.notices()[0].message, "Boom");
    }

    #[test]
    fn test_fade_spares_singletons() {
        let (mut manager, document, _) = manager();
        manager.create_notice(Severity::Info, "Saved", false);
        manager.raise_exception("Boom");
        manager.raise_connection_lost("Lost");

        assert_eq!(manager.fade_transient(), 1);
        assert_eq!(document.notices().len(), 2);
        assert!(manager.clear_exception());
        assert!(manager.clear_connection_lost());
        assert!(document.notices().is_empty());
    }
}
