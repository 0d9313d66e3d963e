// Content renderer - swaps region content while keeping scroll and focus
use crate::application::collaborators::{Events, Ui};
use crate::application::document::Document;
use crate::domain::markup::Fragment;
use crate::domain::region::RegionId;
use std::sync::Arc;

/// Blocks clicks for as long as it lives, so handlers bound to elements
/// about to be replaced never fire mid-swap.
struct ClickShield<'a> {
    document: &'a dyn Document,
}

impl<'a> ClickShield<'a> {
    fn raise(document: &'a dyn Document) -> Self {
        document.block_clicks();
        Self { document }
    }
}

impl Drop for ClickShield<'_> {
    fn drop(&mut self) {
        self.document.unblock_clicks();
    }
}

pub struct ContentRenderer {
    document: Arc<dyn Document>,
    events: Arc<dyn Events>,
    ui: Arc<dyn Ui>,
}

impl ContentRenderer {
    pub fn new(document: Arc<dyn Document>, events: Arc<dyn Events>, ui: Arc<dyn Ui>) -> Self {
        Self { document, events, ui }
    }

    pub fn render(&self, mut content: Fragment, region: &RegionId) {
        let document = &*self.document;
        let _shield = ClickShield::raise(document);

        let scroll = document.scroll_top(region);
        let focused = document.focused_element();

        // Dashboard panes keep their heading when the new content brings none.
        if document.in_dashboard(region) && content.first_heading().is_none() {
            if let Some(heading) = document.first_heading(region) {
                content.prepend(heading);
            }
        }
        document.replace_content(region, &content);

        document.set_scroll_top(region, scroll);
        if let Some(element) = focused {
            document.focus(&element);
        }

        self.events.apply_handlers(region);
        self.ui.initialize_controls(region);
        self.ui.fix_controls();
        tracing::debug!("Rendered new content into {}", region);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::document::{ContainerDirectory, Surface};
    use crate::application::testing::{RecordingEvents, RecordingUi};
    use crate::domain::region::ElementKey;
    use crate::infrastructure::memory_document::MemoryDocument;

    const PAGE: &str = concat!(
        r#"<div id="col1" class="container"><p>old</p></div>"#,
        r#"<div id="dash" class="container dashboard">"#,
        r#"<div id="pane1" class="container"><h1>Pane title</h1><p>old</p></div>"#,
        r#"</div>"#,
    );

    fn renderer() -> (ContentRenderer, Arc<MemoryDocument>, Arc<RecordingEvents>, Arc<RecordingUi>) {
        let document = Arc::new(MemoryDocument::new(PAGE));
        let events = Arc::new(RecordingEvents::default());
        let ui = Arc::new(RecordingUi::default());
        let renderer = ContentRenderer::new(document.clone(), events.clone(), ui.clone());
        (renderer, document, events, ui)
    }

    #[test]
    fn test_render_replaces_and_restores_state() {
        let (renderer, document, events, ui) = renderer();
        let col1 = RegionId::from("col1");
        document.set_scroll_top(&col1, 120.0);
        document.focus(&ElementKey::new("search"));

        renderer.render(Fragment::parse("<h1>Hosts</h1><p>new</p>"), &col1);

        assert_eq!(document.region_html(&col1).as_deref(), Some("<h1>Hosts</h1><p>new</p>"));
        assert_eq!(document.scroll_top(&col1), 120.0);
        assert_eq!(document.focused_element(), Some(ElementKey::new("search")));
        assert!(!document.clicks_blocked());
        assert_eq!(document.click_block_count(), 1);
        assert_eq!(events.applied(), vec![col1.clone()]);
        assert_eq!(ui.count("initialize_controls"), 1);
        assert_eq!(ui.count("fix_controls"), 1);
    }

    #[test]
    fn test_dashboard_pane_keeps_heading() {
        let (renderer, document, _, _) = renderer();
        let pane = RegionId::from("pane1");

        renderer.render(Fragment::parse("<p>new</p>"), &pane);

        assert_eq!(
            document.region_html(&pane).as_deref(),
            Some("<h1>Pane title</h1><p>new</p>")
        );
        assert_eq!(document.first_heading(&pane).map(|h| h.text()), Some("Pane title".to_string()));
    }

    #[test]
    fn test_dashboard_pane_takes_new_heading() {
        let (renderer, document, _, _) = renderer();
        let pane = RegionId::from("pane1");

        renderer.render(Fragment::parse("<h1>Fresh</h1><p>new</p>"), &pane);

        assert_eq!(document.region_html(&pane).as_deref(), Some("<h1>Fresh</h1><p>new</p>"));
    }
}
