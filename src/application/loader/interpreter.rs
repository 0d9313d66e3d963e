// Response interpreter - applies directives and hands content to the renderer
use super::Loader;
use crate::application::directives::{DirectiveContext, Flow};
use crate::application::transport::TransportResponse;
use crate::domain::directives::ResponseDirectives;
use crate::domain::markup::Fragment;
use crate::domain::region::{NavScope, RegionId};
use crate::domain::request::{LoadOptions, PendingRequest};
use crate::domain::urls;

impl Loader {
    /// Handle a successful response. Returns the region the completion
    /// bookkeeping applies to, which differs from the requested one after a
    /// retarget.
    pub(super) fn on_response(
        &mut self,
        request: &PendingRequest,
        response: TransportResponse,
    ) -> Option<RegionId> {
        let url = request.url.as_str();
        tracing::debug!("Got response for {:?}, URL was {}", request.region, url);

        self.notices.clear_connection_lost();
        if self.notices.clear_exception() {
            if let Some(region) = &request.region {
                self.document.set_impacted(region, false);
            }
        }

        let active_link = if request.autorefresh {
            request
                .region
                .as_ref()
                .and_then(|region| self.document.active_link(region))
        } else {
            self.highlight_navigation(url);
            None
        };

        let directives = ResponseDirectives::from_headers(|name| response.header(name));
        let mut ctx = DirectiveContext {
            request,
            target: request.region.clone(),
            retargeted: false,
            document: &*self.document,
            ui: &*self.ui,
            notices: &mut self.notices,
            registry: &mut self.registry,
        };
        if self.directives.apply(&directives, &mut ctx) == Flow::Discard {
            return request.region.clone();
        }
        let DirectiveContext {
            target, retargeted, ..
        } = ctx;

        let Some(target) = target else {
            tracing::debug!("No container for {}, nothing to render", url);
            return None;
        };

        if self.document.is_impacted(&target) {
            self.document.set_impacted(&target, false);
        }

        let mut body = Fragment::parse(&response.body);
        body.rewrite_inline_pies();

        let spliced = self.splice_search_results(url, &target, &body);
        self.document.set_source_url(&target, url);

        if !request.history_triggered && !request.autorefresh && self.document.is_top_level(&target) {
            self.history.push_current_state();
        }

        if spliced {
            return Some(target);
        }

        self.renderer.render(body, &target);
        if let Some(anchor) = urls::fragment(url) {
            self.ui.scroll_to_anchor(&target, anchor);
        }
        if retargeted {
            self.ui.fix_debug_visibility();
            self.ui.trigger_window_resize();
        }
        if let Some(href) = active_link {
            self.document.mark_link_active(&target, &href);
        }

        Some(target)
    }

    /// Mark navigation pointing at `url` active. Menu entries are exclusive,
    /// the first one wins and ends marking; action table rows all get marked.
    fn highlight_navigation(&self, url: &str) {
        let path = urls::path(url);
        let matches = self.document.navigation_matches(url, &path);

        for nav in &matches {
            if nav.scope != NavScope::Other {
                self.document.clear_active(&nav.scope);
            }
        }

        for nav in &matches {
            match nav.scope {
                NavScope::Menu => {
                    self.document.mark_active(nav);
                    break;
                }
                NavScope::ActionTable(_) => self.document.mark_active(nav),
                NavScope::Other => {}
            }
        }
    }

    /// Search results rendered into a dashboard keep their panes: each old
    /// pane takes over URL and heading of the pane at the same position in
    /// the response and reloads itself. Returns true if that happened, which
    /// needs sub-regions on both sides.
    fn splice_search_results(&mut self, url: &str, target: &RegionId, body: &Fragment) -> bool {
        if !self.search_pattern.is_match(url) {
            return false;
        }
        let prior_is_search = self
            .document
            .source_url(target)
            .is_some_and(|prior| self.search_pattern.is_match(&prior));
        if !prior_is_search || !body.contains_class(crate::domain::markup::CLASS_DASHBOARD) {
            return false;
        }

        let panes = self.document.dashboard_subregions(target);
        if panes.is_empty() {
            return false;
        }

        let entries = body.dashboard_entries();
        if entries.is_empty() {
            tracing::debug!("Search dashboard for {} has no panes, rendering it as is", target);
            return false;
        }
        if entries.len() != panes.len() {
            tracing::debug!(
                "Splicing {} search panes into {} existing ones for {}",
                entries.len(),
                panes.len(),
                target
            );
        }

        for (pane, entry) in panes.iter().zip(entries) {
            self.document.replace_heading(pane, entry.heading.as_ref());
            match entry.url {
                Some(pane_url) => {
                    self.document.set_source_url(pane, &pane_url);
                    self.load(&pane_url, Some(pane), LoadOptions::default());
                }
                None => tracing::debug!("Search pane for {} carries no url", pane),
            }
        }
        true
    }
}
