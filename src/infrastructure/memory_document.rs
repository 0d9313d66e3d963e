// In-memory document - headless page backing the document traits
use crate::application::document::{ContainerDirectory, Navigation, NotificationArea, Surface};
use crate::domain::markup::{
    self, ATTR_REFRESH, ATTR_URL, CLASS_CONTAINER, CLASS_DASHBOARD, Element, Fragment, HEADING,
    Snapshot,
};
use crate::domain::notice::{Notice, NoticeId};
use crate::domain::region::{ElementKey, NavKind, NavMatch, NavScope, RegionId};
use parking_lot::Mutex;
use scraper::ElementRef;
use std::collections::HashMap;

const CLASS_ACTIVE: &str = "active";
const CLASS_IMPACT: &str = "impact";
const CLASS_MODULE: &str = "icinga-module";
const MODULE_PREFIX: &str = "module-";
const MENU_ID: &str = "menu";
const SUBREGIONS: &str = concat!(
    ":scope.dashboard .container[id]:not(.dashboard), ",
    ":scope .dashboard .container[id]:not(.dashboard)",
);

struct Page {
    body: Element,
    last_update: HashMap<RegionId, i64>,
    scroll: HashMap<RegionId, f64>,
    focus: Option<ElementKey>,
    notices: Vec<(NoticeId, Notice)>,
    next_notice: u64,
    clicks_blocked: bool,
    click_blocks: usize,
}

impl Page {
    fn region_path(&self, region: &RegionId) -> Option<Vec<usize>> {
        let snapshot = Snapshot::of(&self.body);
        region_ref(&snapshot, region).map(|element| snapshot.path_of(element))
    }

    /// Owned-tree paths of the elements `find` picks from a snapshot.
    fn paths<F>(&self, find: F) -> Vec<Vec<usize>>
    where
        F: for<'a> FnOnce(&'a Snapshot) -> Vec<ElementRef<'a>>,
    {
        let snapshot = Snapshot::of(&self.body);
        find(&snapshot)
            .into_iter()
            .map(|element| snapshot.path_of(element))
            .collect()
    }
}

/// A page held as an owned element tree.
///
/// Regions are elements with the `container` class and an `id`. Refresh
/// interval and source URL live in their `data-icinga-*` attributes, so
/// content rendered by the server carries its own metadata along. Lookups
/// run as selectors against a parsed snapshot, edits go to the owned tree.
pub struct MemoryDocument {
    page: Mutex<Page>,
}

impl MemoryDocument {
    pub fn new(html: &str) -> Self {
        let mut body = Element::new("body");
        body.children = Fragment::parse(html).to_nodes();
        Self {
            page: Mutex::new(Page {
                body,
                last_update: HashMap::new(),
                scroll: HashMap::new(),
                focus: None,
                notices: Vec::new(),
                next_notice: 0,
                clicks_blocked: false,
                click_blocks: 0,
            }),
        }
    }

    /// Serialized page body.
    pub fn html(&self) -> String {
        self.page.lock().body.inner_html()
    }

    pub fn region_html(&self, region: &RegionId) -> Option<String> {
        self.with_region(region, Element::inner_html)
    }

    /// Module the region is tagged with.
    pub fn module(&self, region: &RegionId) -> Option<String> {
        self.with_region(region, |element| {
            element
                .classes()
                .find_map(|class| class.strip_prefix(MODULE_PREFIX))
                .map(str::to_string)
        })
        .flatten()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.page
            .lock()
            .notices
            .iter()
            .map(|(_, notice)| notice.clone())
            .collect()
    }

    pub fn clicks_blocked(&self) -> bool {
        self.page.lock().clicks_blocked
    }

    /// How often clicks were blocked so far.
    pub fn click_block_count(&self) -> usize {
        self.page.lock().click_blocks
    }

    /// Resolve a key handed out by `navigation_matches`.
    pub fn element(&self, key: &ElementKey) -> Option<Element> {
        let path = key_path(key)?;
        self.page.lock().body.get(&path).cloned()
    }

    fn with_region<T>(&self, region: &RegionId, read: impl FnOnce(&Element) -> T) -> Option<T> {
        let page = self.page.lock();
        let path = page.region_path(region)?;
        page.body.get(&path).map(read)
    }

    fn with_region_mut<T>(&self, region: &RegionId, write: impl FnOnce(&mut Element) -> T) -> Option<T> {
        let mut page = self.page.lock();
        let path = page.region_path(region)?;
        page.body.get_mut(&path).map(write)
    }

    /// Run a selector-side query against the region's element.
    fn query_region<T>(&self, region: &RegionId, query: impl FnOnce(ElementRef<'_>) -> T) -> Option<T> {
        let page = self.page.lock();
        let snapshot = Snapshot::of(&page.body);
        region_ref(&snapshot, region).map(query)
    }

    /// Apply `edit` to every element `find` picks.
    fn edit_matches<F>(&self, find: F, edit: impl Fn(&mut Element))
    where
        F: for<'a> FnOnce(&'a Snapshot) -> Vec<ElementRef<'a>>,
    {
        let mut page = self.page.lock();
        for path in page.paths(find) {
            if let Some(element) = page.body.get_mut(&path) {
                edit(element);
            }
        }
    }
}

fn region_ref<'a>(snapshot: &'a Snapshot, region: &RegionId) -> Option<ElementRef<'a>> {
    if region.as_str().is_empty() {
        return None;
    }
    let css = format!(".{}[id=\"{}\"]", CLASS_CONTAINER, markup::quote(region.as_str()));
    snapshot.select(&css).into_iter().next()
}

fn region_id(element: ElementRef<'_>) -> Option<RegionId> {
    element
        .value()
        .attr("id")
        .filter(|id| !id.is_empty())
        .map(RegionId::from)
}

fn parse_interval(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn path_key(path: &[usize]) -> ElementKey {
    let joined: Vec<String> = path.iter().map(ToString::to_string).collect();
    ElementKey::new(joined.join("."))
}

fn key_path(key: &ElementKey) -> Option<Vec<usize>> {
    if key.as_str().is_empty() {
        return Some(Vec::new());
    }
    key.as_str()
        .split('.')
        .map(|step| step.parse().ok())
        .collect()
}

/// The element and its ancestors, nearest first.
fn lineage(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    std::iter::once(element).chain(markup::ancestors(element))
}

fn scope_of(snapshot: &Snapshot, element: ElementRef<'_>) -> NavScope {
    if lineage(element).any(|e| e.value().attr("id") == Some(MENU_ID)) {
        return NavScope::Menu;
    }
    lineage(element)
        .find(|e| e.value().name() == "table" && markup::has_class(*e, "action"))
        .map(|table| NavScope::ActionTable(path_key(&snapshot.path_of(table))))
        .unwrap_or(NavScope::Other)
}

impl ContainerDirectory for MemoryDocument {
    fn contains(&self, region: &RegionId) -> bool {
        self.page.lock().region_path(region).is_some()
    }

    fn refreshable_regions(&self) -> Vec<RegionId> {
        let page = self.page.lock();
        let snapshot = Snapshot::of(&page.body);
        snapshot
            .select(&format!(".{}[id][{}]", CLASS_CONTAINER, ATTR_REFRESH))
            .into_iter()
            .filter(|element| {
                element
                    .value()
                    .attr(ATTR_REFRESH)
                    .and_then(parse_interval)
                    .is_some_and(|secs| secs > 0)
            })
            .filter_map(region_id)
            .collect()
    }

    fn refresh_interval(&self, region: &RegionId) -> Option<u64> {
        self.with_region(region, |element| element.attr(ATTR_REFRESH).and_then(parse_interval))
            .flatten()
    }

    fn set_refresh_interval(&self, region: &RegionId, secs: u64) {
        self.with_region_mut(region, |element| element.set_attr(ATTR_REFRESH, secs.to_string()));
    }

    fn last_update(&self, region: &RegionId) -> Option<i64> {
        self.page.lock().last_update.get(region).copied()
    }

    fn set_last_update(&self, region: &RegionId, at: Option<i64>) {
        let mut page = self.page.lock();
        match at {
            Some(at) => {
                page.last_update.insert(region.clone(), at);
            }
            None => {
                page.last_update.remove(region);
            }
        }
    }

    fn source_url(&self, region: &RegionId) -> Option<String> {
        self.with_region(region, |element| element.attr(ATTR_URL).map(str::to_string))
            .flatten()
    }

    fn set_source_url(&self, region: &RegionId, url: &str) {
        self.with_region_mut(region, |element| element.set_attr(ATTR_URL, url));
    }

    fn set_module(&self, region: &RegionId, module: Option<&str>) {
        self.with_region_mut(region, |element| {
            element.retain_classes(|class| class != CLASS_MODULE && !class.starts_with(MODULE_PREFIX));
            if let Some(module) = module {
                element.add_class(CLASS_MODULE);
                element.add_class(&format!("{}{}", MODULE_PREFIX, module));
            }
        });
    }

    fn is_impacted(&self, region: &RegionId) -> bool {
        self.with_region(region, |element| element.has_class(CLASS_IMPACT))
            .unwrap_or(false)
    }

    fn set_impacted(&self, region: &RegionId, impacted: bool) {
        self.with_region_mut(region, |element| {
            if impacted {
                element.add_class(CLASS_IMPACT);
            } else {
                element.remove_class(CLASS_IMPACT);
            }
        });
    }

    fn in_dashboard(&self, region: &RegionId) -> bool {
        self.query_region(region, |element| {
            lineage(element).any(|e| markup::has_class(e, CLASS_DASHBOARD))
        })
        .unwrap_or(false)
    }

    fn is_top_level(&self, region: &RegionId) -> bool {
        self.query_region(region, |element| {
            !markup::ancestors(element).any(|e| markup::has_class(e, CLASS_CONTAINER))
        })
        .unwrap_or(false)
    }

    fn dashboard_subregions(&self, region: &RegionId) -> Vec<RegionId> {
        self.query_region(region, |element| {
            markup::select(element, SUBREGIONS)
                .into_iter()
                .filter_map(region_id)
                .collect()
        })
        .unwrap_or_default()
    }

    fn first_heading(&self, region: &RegionId) -> Option<Element> {
        self.query_region(region, |element| {
            markup::select(element, HEADING).into_iter().next().map(Element::from)
        })
        .flatten()
    }

    fn replace_heading(&self, region: &RegionId, heading: Option<&Element>) {
        let mut page = self.page.lock();
        let found = page.paths(|snapshot| {
            region_ref(snapshot, region)
                .and_then(|element| markup::select(element, HEADING).into_iter().next())
                .into_iter()
                .collect()
        });
        let Some(path) = found.into_iter().next() else {
            tracing::debug!("{} has no heading to replace", region);
            return;
        };
        match heading {
            Some(heading) => {
                page.body.replace_at(&path, heading.clone());
            }
            None => {
                page.body.remove_at(&path);
            }
        }
    }
}

impl Navigation for MemoryDocument {
    fn navigation_matches(&self, url: &str, path: &str) -> Vec<NavMatch> {
        let page = self.page.lock();
        let snapshot = Snapshot::of(&page.body);
        let links = snapshot.select(&format!("[href=\"{}\"]", markup::quote(url)));
        let forms = snapshot
            .select(&format!("[action=\"{}\"]", markup::quote(path)))
            .into_iter()
            .filter(|element| element.value().attr("href") != Some(url));

        links
            .into_iter()
            .map(|element| (element, NavKind::Link))
            .chain(forms.map(|element| (element, NavKind::Form)))
            .map(|(element, kind)| NavMatch {
                element: path_key(&snapshot.path_of(element)),
                scope: scope_of(&snapshot, element),
                kind,
            })
            .collect()
    }

    fn clear_active(&self, scope: &NavScope) {
        let root = match scope {
            NavScope::Menu => None,
            NavScope::ActionTable(table) => match key_path(table) {
                Some(path) => Some(path),
                None => return,
            },
            NavScope::Other => return,
        };
        let active = format!(".{}", CLASS_ACTIVE);
        self.edit_matches(
            |snapshot| {
                let scope_root = match &root {
                    Some(path) => snapshot.at(path),
                    None => snapshot.select(&format!("#{}", MENU_ID)).into_iter().next(),
                };
                scope_root
                    .map(|element| markup::select(element, &active))
                    .unwrap_or_default()
            },
            |element| element.remove_class(CLASS_ACTIVE),
        );
    }

    fn mark_active(&self, target: &NavMatch) {
        let Some(path) = key_path(&target.element) else {
            return;
        };
        let kind = target.kind;
        match &target.scope {
            NavScope::Menu => self.edit_matches(
                |snapshot| {
                    let Some(element) = snapshot.at(&path) else {
                        return Vec::new();
                    };
                    match kind {
                        NavKind::Form => markup::select(element, "input"),
                        NavKind::Link => lineage(element).filter(|e| e.value().name() == "li").collect(),
                    }
                },
                |element| element.add_class(CLASS_ACTIVE),
            ),
            NavScope::ActionTable(_) => {
                if let Some(element) = self.page.lock().body.get_mut(&path) {
                    element.add_class(CLASS_ACTIVE);
                }
            }
            NavScope::Other => {}
        }
    }

    fn active_link(&self, region: &RegionId) -> Option<String> {
        self.query_region(region, |element| {
            markup::select(element, &format!("[href].{}", CLASS_ACTIVE))
                .into_iter()
                .next()
                .and_then(|link| link.value().attr("href"))
                .map(str::to_string)
        })
        .flatten()
    }

    fn mark_link_active(&self, region: &RegionId, href: &str) {
        let css = format!("[href=\"{}\"]", markup::quote(href));
        self.edit_matches(
            |snapshot| {
                region_ref(snapshot, region)
                    .map(|element| markup::select(element, &css))
                    .unwrap_or_default()
            },
            |element| element.add_class(CLASS_ACTIVE),
        );
    }
}

impl Surface for MemoryDocument {
    fn scroll_top(&self, region: &RegionId) -> f64 {
        self.page.lock().scroll.get(region).copied().unwrap_or(0.0)
    }

    fn set_scroll_top(&self, region: &RegionId, offset: f64) {
        self.page.lock().scroll.insert(region.clone(), offset);
    }

    fn focused_element(&self) -> Option<ElementKey> {
        self.page.lock().focus.clone()
    }

    fn focus(&self, element: &ElementKey) {
        self.page.lock().focus = Some(element.clone());
    }

    fn block_clicks(&self) {
        let mut page = self.page.lock();
        page.clicks_blocked = true;
        page.click_blocks += 1;
    }

    fn unblock_clicks(&self) {
        self.page.lock().clicks_blocked = false;
    }

    fn replace_content(&self, region: &RegionId, content: &Fragment) {
        let replaced = self.with_region_mut(region, |element| {
            element.children = content.to_nodes();
        });
        if replaced.is_none() {
            tracing::warn!("Cannot render into missing container {}", region);
        }
    }
}

impl NotificationArea for MemoryDocument {
    fn append_notice(&self, notice: &Notice) -> NoticeId {
        let mut page = self.page.lock();
        page.next_notice += 1;
        let id = NoticeId::new(page.next_notice);
        page.notices.push((id, notice.clone()));
        id
    }

    fn remove_notice(&self, id: NoticeId) {
        self.page.lock().notices.retain(|(existing, _)| *existing != id);
    }

    fn fade_transient(&self) -> usize {
        let mut page = self.page.lock();
        let before = page.notices.len();
        page.notices.retain(|(_, notice)| notice.persist);
        before - page.notices.len()
    }
}
