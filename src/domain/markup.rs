// Markup model - scraper-parsed fragments for queries, owned trees where the page gets mutated
use scraper::{CaseSensitivity, ElementRef, Html, Node as HtmlNode, Selector};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub const HEADING: &str = "h1";
pub const CLASS_CONTAINER: &str = "container";
pub const CLASS_DASHBOARD: &str = "dashboard";
pub const CLASS_INLINE_PIE: &str = "inlinepie";
pub const ATTR_URL: &str = "data-icinga-url";
pub const ATTR_REFRESH: &str = "data-icinga-refresh";
pub const ATTR_VALUES: &str = "data-icinga-values";

const DASHBOARD_ENTRIES: &str = ".dashboard .container:not(.dashboard)";

/// Elements below `scope` matching `css`, in document order. An invalid
/// selector matches nothing.
pub fn select<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(e) => {
            tracing::warn!("Invalid selector {}: {}", css, e);
            Vec::new()
        }
    }
}

/// Ancestor elements of `element`, nearest first.
pub fn ancestors(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.ancestors().filter_map(ElementRef::wrap)
}

pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().has_class(class, CaseSensitivity::CaseSensitive)
}

/// `value` escaped for use inside a double-quoted attribute selector.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\a "),
            other => out.push(other),
        }
    }
    out
}

fn is_kept(node: &HtmlNode) -> bool {
    matches!(node, HtmlNode::Element(_) | HtmlNode::Text(_) | HtmlNode::Comment(_))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// Owned element, for trees that get edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| key != name);
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
    }

    pub fn remove_class(&mut self, class: &str) {
        self.retain_classes(|c| c != class);
    }

    pub fn retain_classes(&mut self, keep: impl Fn(&str) -> bool) {
        if self.attr("class").is_none() {
            return;
        }
        let kept: Vec<String> = self.classes().filter(|c| keep(c)).map(str::to_string).collect();
        if kept.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", kept.join(" "));
        }
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        let raw = RAW_TEXT_ELEMENTS.contains(&self.name.as_str());
        for child in &self.children {
            write_node(child, raw, &mut out);
        }
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }

    /// Descendant at `path`, each step indexing into `children`.
    pub fn get(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &index in path {
            match current.children.get(index) {
                Some(Node::Element(child)) => current = child,
                _ => return None,
            }
        }
        Some(current)
    }

    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &index in path {
            match current.children.get_mut(index) {
                Some(Node::Element(child)) => current = child,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Put `replacement` where the descendant at `path` is. Returns false
    /// when there is no element at `path`.
    pub fn replace_at(&mut self, path: &[usize], replacement: Element) -> bool {
        let Some((last, parent_path)) = path.split_last() else {
            return false;
        };
        match self.get_mut(parent_path).and_then(|parent| parent.children.get_mut(*last)) {
            Some(slot) if matches!(slot, Node::Element(_)) => {
                *slot = Node::Element(replacement);
                true
            }
            _ => false,
        }
    }

    /// Detach the descendant element at `path`. Text left on both sides is
    /// merged so the tree parses back to the same shape.
    pub fn remove_at(&mut self, path: &[usize]) -> Option<Element> {
        let (last, parent_path) = path.split_last()?;
        let parent = self.get_mut(parent_path)?;
        if !matches!(parent.children.get(*last), Some(Node::Element(_))) {
            return None;
        }
        let Node::Element(removed) = parent.children.remove(*last) else {
            return None;
        };
        let merge = *last > 0
            && *last < parent.children.len()
            && matches!(parent.children[*last - 1], Node::Text(_))
            && matches!(parent.children[*last], Node::Text(_));
        if merge {
            if let Node::Text(after) = parent.children.remove(*last) {
                if let Some(Node::Text(before)) = parent.children.get_mut(*last - 1) {
                    before.push_str(&after);
                }
            }
        }
        Some(removed)
    }
}

impl From<ElementRef<'_>> for Element {
    fn from(element: ElementRef<'_>) -> Self {
        convert_element(element, None, &mut 0)
    }
}

/// A dashboard sub-region found in a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardEntry {
    pub url: Option<String>,
    pub heading: Option<Element>,
}

/// Parsed body of a response (or any detached piece of markup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    html: Html,
}

impl Fragment {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_fragment(html),
        }
    }

    fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn to_html(&self) -> String {
        self.root().inner_html()
    }

    /// Owned copy of the top-level nodes, ready to be spliced into a page.
    pub fn to_nodes(&self) -> Vec<Node> {
        convert_children(self.root(), None, &mut 0)
    }

    pub fn first_heading(&self) -> Option<Element> {
        select(self.root(), HEADING).into_iter().next().map(Element::from)
    }

    pub fn contains_class(&self, class: &str) -> bool {
        !select(self.root(), &format!(".{}", class)).is_empty()
    }

    pub fn prepend(&mut self, element: Element) {
        let html = format!("{}{}", element.outer_html(), self.to_html());
        self.html = Html::parse_fragment(&html);
    }

    /// Containers nested in a dashboard, in document order, skipping those
    /// that are dashboards themselves.
    pub fn dashboard_entries(&self) -> Vec<DashboardEntry> {
        select(self.root(), DASHBOARD_ENTRIES)
            .into_iter()
            .map(|entry| DashboardEntry {
                url: entry.value().attr(ATTR_URL).map(str::to_string),
                heading: select(entry, HEADING).into_iter().next().map(Element::from),
            })
            .collect()
    }

    /// Swap raw inline pie charts for sparkline placeholders that keep the
    /// style, title and values. Returns how many were rewritten.
    pub fn rewrite_inline_pies(&mut self) -> usize {
        let Ok(pie) = Selector::parse(&format!(".{}", CLASS_INLINE_PIE)) else {
            return 0;
        };
        if self.html.select(&pie).next().is_none() {
            return 0;
        }
        let mut rewritten = 0;
        let mut wrapper = Element::new("div");
        wrapper.children = convert_children(self.root(), Some(&pie), &mut rewritten);
        self.html = Html::parse_fragment(&wrapper.inner_html());
        rewritten
    }
}

/// Read-only scraper view of an owned tree, so selector queries can run
/// against it. Paths returned by `path_of` index into the owned tree.
pub struct Snapshot {
    html: Html,
}

impl Snapshot {
    pub fn of(root: &Element) -> Self {
        Self {
            html: Html::parse_fragment(&root.inner_html()),
        }
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        select(self.root(), css)
    }

    /// Element at a path of the owned tree.
    pub fn at(&self, path: &[usize]) -> Option<ElementRef<'_>> {
        let mut current = self.root();
        for &index in path {
            let node = current.children().filter(|child| is_kept(child.value())).nth(index)?;
            current = ElementRef::wrap(node)?;
        }
        Some(current)
    }

    /// Path of `element` in the owned tree.
    pub fn path_of(&self, element: ElementRef<'_>) -> Vec<usize> {
        let root = self.root().id();
        let mut path = Vec::new();
        let mut node = *element;
        while node.id() != root {
            path.push(node.prev_siblings().filter(|sibling| is_kept(sibling.value())).count());
            match node.parent() {
                Some(parent) => node = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}

fn sparkline_placeholder(pie: ElementRef<'_>) -> Element {
    let mut placeholder = Element::new("div").with_attr("class", CLASS_INLINE_PIE);
    for name in ["style", "title"] {
        if let Some(value) = pie.value().attr(name) {
            placeholder.set_attr(name, value);
        }
    }
    placeholder.with_text(pie.value().attr(ATTR_VALUES).unwrap_or_default())
}

fn convert_children(element: ElementRef<'_>, pies: Option<&Selector>, rewritten: &mut usize) -> Vec<Node> {
    let mut nodes = Vec::new();
    for child in element.children() {
        match child.value() {
            HtmlNode::Text(text) => nodes.push(Node::Text(String::from(&**text))),
            HtmlNode::Comment(comment) => nodes.push(Node::Comment(String::from(&**comment))),
            HtmlNode::Element(_) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let converted = match pies {
                    Some(pie) if pie.matches(&child_element) => {
                        *rewritten += 1;
                        sparkline_placeholder(child_element)
                    }
                    _ => convert_element(child_element, pies, rewritten),
                };
                nodes.push(Node::Element(converted));
            }
            _ => {}
        }
    }
    nodes
}

fn convert_element(element: ElementRef<'_>, pies: Option<&Selector>, rewritten: &mut usize) -> Element {
    let value = element.value();
    Element {
        name: value.name().to_string(),
        attrs: value
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        children: convert_children(element, pies, rewritten),
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
            Node::Comment(_) => {}
        }
    }
}

fn write_node(node: &Node, raw_text: bool, out: &mut String) {
    match node {
        Node::Element(element) => write_element(element, out),
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => escape_into(text, false, out),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(value, true, out);
        out.push('"');
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&element.name.as_str()) {
        return;
    }
    out.push_str(&element.inner_html());
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let fragment = Fragment::parse(r#"<h1>Hosts</h1><p class="note">a &amp; b</p><br>"#);
        assert_eq!(
            fragment.to_html(),
            r#"<h1>Hosts</h1><p class="note">a &amp; b</p><br>"#
        );
        assert_eq!(fragment.first_heading().map(|h| h.text()), Some("Hosts".to_string()));
    }

    #[test]
    fn test_owned_copy_serializes_like_the_fragment() {
        let fragment = Fragment::parse(r#"<ul><li class="a">x &lt; y</li></ul><!--note-->"#);
        let mut wrapper = Element::new("div");
        wrapper.children = fragment.to_nodes();
        assert_eq!(wrapper.inner_html(), fragment.to_html());
    }

    #[test]
    fn test_class_helpers() {
        let mut element = Element::new("div").with_attr("class", "container");
        element.add_class("impact");
        element.add_class("impact");
        assert_eq!(element.attr("class"), Some("container impact"));

        element.remove_class("container");
        assert!(element.has_class("impact"));
        assert!(!element.has_class("container"));

        element.remove_class("impact");
        assert_eq!(element.attr("class"), None);
    }

    #[test]
    fn test_contains_class() {
        let fragment = Fragment::parse(r#"<div><p class="dashboard x">a</p></div>"#);
        assert!(fragment.contains_class(CLASS_DASHBOARD));
        assert!(!fragment.contains_class("container"));
        assert!(!fragment.contains_class("not a class"));
    }

    #[test]
    fn test_dashboard_entries_skip_nested_dashboards() {
        let fragment = Fragment::parse(concat!(
            r#"<div class="dashboard">"#,
            r#"<div class="container" data-icinga-url="/search/hosts?q=web"><h1>Hosts</h1></div>"#,
            r#"<div class="container dashboard"></div>"#,
            r#"<div class="container" data-icinga-url="/search/services?q=web"><h1>Services</h1></div>"#,
            r#"</div>"#,
            r#"<div class="container" data-icinga-url="/outside"></div>"#,
        ));

        let entries = fragment.dashboard_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url.as_deref(), Some("/search/hosts?q=web"));
        assert_eq!(entries[1].heading.as_ref().map(|h| h.text()), Some("Services".to_string()));
    }

    #[test]
    fn test_rewrite_inline_pies() {
        let mut fragment = Fragment::parse(concat!(
            r#"<table><tbody><tr><td>"#,
            r#"<svg class="inlinepie" title="Load" data-icinga-values="1,2,3"><circle></circle></svg>"#,
            r#"</td></tr></tbody></table>"#,
        ));

        assert_eq!(fragment.rewrite_inline_pies(), 1);
        let html = fragment.to_html();
        assert!(html.contains(r#"<div class="inlinepie" title="Load">1,2,3</div>"#));
        assert!(!html.contains("circle"));

        let mut plain = Fragment::parse("<p>no charts</p>");
        assert_eq!(plain.rewrite_inline_pies(), 0);
        assert_eq!(plain.to_html(), "<p>no charts</p>");
    }

    #[test]
    fn test_prepend() {
        let mut fragment = Fragment::parse("<p>body</p>");
        fragment.prepend(Element::new("h1").with_text("Title"));
        assert_eq!(fragment.to_html(), "<h1>Title</h1><p>body</p>");
        assert_eq!(fragment.first_heading().map(|h| h.text()), Some("Title".to_string()));
    }

    #[test]
    fn test_replace_and_remove_at() {
        let mut element = Element::new("div")
            .with_text("a")
            .with_child(Element::new("h1").with_text("Old"))
            .with_text("b")
            .with_child(Element::new("h1").with_text("Second"));

        assert!(element.replace_at(&[1], Element::new("h1").with_text("New")));
        assert_eq!(element.inner_html(), "a<h1>New</h1>b<h1>Second</h1>");
        assert!(!element.replace_at(&[0], Element::new("h1")));

        let removed = element.remove_at(&[1]);
        assert_eq!(removed.map(|h| h.text()), Some("New".to_string()));
        assert_eq!(element.children.len(), 2);
        assert_eq!(element.inner_html(), "ab<h1>Second</h1>");
        assert!(element.remove_at(&[0]).is_none());
    }

    #[test]
    fn test_snapshot_paths_match_owned_tree() {
        let mut body = Element::new("body");
        body.children = Fragment::parse(concat!(
            "\n<!--menu-->",
            r#"<ul id="menu"><li>x</li><li><a href="/hosts">Hosts</a></li></ul>"#,
        ))
        .to_nodes();

        let snapshot = Snapshot::of(&body);
        let link = snapshot.select(r#"[href="/hosts"]"#);
        assert_eq!(link.len(), 1);

        let path = snapshot.path_of(link[0]);
        assert_eq!(path, vec![2, 1, 0]);
        assert_eq!(body.get(&path).and_then(|a| a.attr("href")), Some("/hosts"));
        assert_eq!(snapshot.at(&path).map(|a| a.inner_html()), Some("Hosts".to_string()));

        let lineage: Vec<&str> = ancestors(link[0]).map(|a| a.value().name()).collect();
        assert_eq!(lineage, vec!["li", "ul", "html"]);
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(r#"/a?b="c"\d"#), r#"/a?b=\"c\"\\d"#);
        let fragment = Fragment::parse(r#"<a href="/a?b=&quot;c&quot;">x</a>"#);
        let link = select(fragment.root(), &format!(r#"[href="{}"]"#, quote(r#"/a?b="c""#)));
        assert_eq!(link.len(), 1);
    }
}
