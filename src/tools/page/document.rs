use super::NodeHandle;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements that start a new line when rendered as text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// A parsed page and the handle space for its elements.
pub struct HtmlDocument {
    url: String,
    html: Html,
    generation: u64,
}

impl HtmlDocument {
    pub fn parse(url: &str, body: &str, generation: u64) -> Self {
        Self {
            url: url.to_string(),
            html: Html::parse_document(body),
            generation,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn find(&self, selector: &str) -> Option<NodeHandle> {
        let sel = parse_selector(selector)?;
        let el = self.html.select(&sel).next()?;
        Some(self.handle_of(el))
    }

    pub fn find_within(&self, scope: NodeHandle, selector: &str) -> Option<NodeHandle> {
        let sel = parse_selector(selector)?;
        let el = self.element(scope)?.select(&sel).next()?;
        Some(self.handle_of(el))
    }

    pub fn find_all(&self, container: &str, item: &str) -> Vec<NodeHandle> {
        let (Some(container_sel), Some(item_sel)) = (parse_selector(container), parse_selector(item))
        else {
            return Vec::new();
        };
        let Some(root) = self.html.select(&container_sel).next() else {
            return Vec::new();
        };
        root.select(&item_sel).map(|el| self.handle_of(el)).collect()
    }

    /// Rendered text: whitespace collapsed inside lines, one line per block.
    pub fn text(&self, node: NodeHandle) -> Option<String> {
        let el = self.element(node)?;
        let mut raw = String::new();
        render_text(el, &mut raw);
        let lines: Vec<&str> = raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        Some(lines.join("\n"))
    }

    pub fn attribute(&self, node: NodeHandle, name: &str) -> Option<String> {
        self.element(node)?
            .value()
            .attr(name)
            .map(|v| v.trim().to_string())
    }

    /// A node is usable when neither it nor its parent is disabled or hidden
    /// and a link target can be reached from it.
    pub fn is_interactable(&self, node: NodeHandle) -> bool {
        let Some(el) = self.element(node) else {
            return false;
        };
        let parent = el.parent().and_then(ElementRef::wrap);
        if is_disabled(el) || parent.map(is_disabled).unwrap_or(false) {
            return false;
        }
        self.link_target(node).is_some()
    }

    /// Absolute URL the node navigates to: its own `href` or its first link's.
    pub fn link_target(&self, node: NodeHandle) -> Option<String> {
        let el = self.element(node)?;
        let href = match el.value().attr("href") {
            Some(h) => h.to_string(),
            None => {
                let sel = parse_selector("a[href]")?;
                el.select(&sel).next()?.value().attr("href")?.to_string()
            }
        };
        self.resolve_link(&href)
    }

    /// Resolve `href` against the document URL; only http(s) targets survive.
    pub fn resolve_link(&self, href: &str) -> Option<String> {
        let href = href.trim().trim_matches('"').trim_matches('\'').trim();
        if href.is_empty() {
            return None;
        }
        let url = match Url::parse(href) {
            Ok(u) => u,
            Err(_) => Url::parse(&self.url).ok()?.join(href).ok()?,
        };
        matches!(url.scheme(), "http" | "https").then(|| url.to_string())
    }

    fn element(&self, node: NodeHandle) -> Option<ElementRef<'_>> {
        if node.generation != self.generation {
            return None;
        }
        self.html.tree.get(node.id).and_then(ElementRef::wrap)
    }

    fn handle_of(&self, el: ElementRef<'_>) -> NodeHandle {
        NodeHandle {
            generation: self.generation,
            id: el.id(),
        }
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::debug!(%selector, error = %e, "unparsable selector");
            None
        }
    }
}

fn is_disabled(el: ElementRef<'_>) -> bool {
    let v = el.value();
    v.attr("disabled").is_some()
        || v.attr("hidden").is_some()
        || v.attr("aria-disabled") == Some("true")
        || v.classes().any(|c| c == "a-disabled")
}

fn render_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if SKIPPED_TAGS.contains(&name) {
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                out.push('\n');
            }
            render_text(child_el, out);
            if block {
                out.push('\n');
            }
        } else if let Some(text) = child.value().as_text() {
            push_collapsed(out, text);
        }
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    let mut pending_space = text.starts_with(char::is_whitespace);
    for word in text.split_whitespace() {
        if pending_space && !out.is_empty() && !out.ends_with([' ', '\n']) {
            out.push(' ');
        }
        out.push_str(word);
        pending_space = true;
    }
    if text.ends_with(char::is_whitespace) && !out.ends_with([' ', '\n']) {
        out.push(' ');
    }
}
