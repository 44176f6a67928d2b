#[cfg(test)]
mod tests {
    use crate::tools::page::*;
    use std::time::Duration;

    const LISTING: &str = r#"
        <html><body>
            <div class="grid">
                <div class="item"><a href="/dp/1">One</a></div>
                <div class="item"><a href="https://shop.example/dp/2">Two</a></div>
            </div>
            <ul class="pager">
                <li class="a-disabled a-last"><a href="/page/2">Next</a></li>
                <li class="a-normal"><a href="/page/3">3</a></li>
            </ul>
            <div id="price">
                <span>£</span><span>19</span>
                <div>99</div>
            </div>
            <script>var x = 1;</script>
        </body></html>
    "#;

    fn session() -> HtmlSession<StaticSite> {
        let site = StaticSite::new()
            .with_page("https://shop.example/list", LISTING)
            .with_page("https://shop.example/page/3", "<html><body><h1>Page 3</h1></body></html>");
        let mut s = HtmlSession::new(site);
        s.load("https://shop.example/list").unwrap();
        s
    }

    #[test]
    fn test_find_all_preserves_document_order() {
        let s = session();
        let items = s.find_all("div.grid", "div.item");
        assert_eq!(items.len(), 2);
        let hrefs: Vec<String> = items
            .iter()
            .map(|n| {
                let a = s.find_within(*n, "a").unwrap();
                s.attribute(a, "href").unwrap()
            })
            .collect();
        assert_eq!(hrefs, vec!["/dp/1", "https://shop.example/dp/2"]);
    }

    #[test]
    fn test_find_all_without_container_is_empty() {
        let s = session();
        assert!(s.find_all("div.missing", "div.item").is_empty());
    }

    #[test]
    fn test_text_renders_blocks_on_separate_lines() {
        let s = session();
        let price = s.find("#price").unwrap();
        assert_eq!(s.text(price).unwrap(), "£19\n99");
    }

    #[test]
    fn test_text_skips_scripts() {
        let s = session();
        let body = s.find("body").unwrap();
        assert!(!s.text(body).unwrap().contains("var x"));
    }

    #[test]
    fn test_disabled_control_is_not_interactable() {
        let mut s = session();
        let next = s.find("li.a-last").unwrap();
        assert!(s
            .wait_until_interactable(next, Duration::from_millis(10))
            .is_none());
    }

    #[test]
    fn test_activate_follows_relative_link() {
        let mut s = session();
        let page3 = s.find("li.a-normal").unwrap();
        let node = s
            .wait_until_interactable(page3, Duration::from_millis(10))
            .unwrap();
        s.activate(node).unwrap();
        assert_eq!(s.current_url(), Some("https://shop.example/page/3"));
        let h1 = s.find("h1").unwrap();
        assert_eq!(s.text(h1).as_deref(), Some("Page 3"));
    }

    #[test]
    fn test_handles_go_stale_after_navigation() {
        let mut s = session();
        let grid = s.find("div.grid").unwrap();
        s.load("https://shop.example/page/3").unwrap();
        assert!(s.text(grid).is_none());
    }

    #[test]
    fn test_unknown_page_fails_without_losing_the_current_one() {
        let mut s = session();
        let err = s.load("https://shop.example/nowhere").unwrap_err();
        assert!(matches!(err, crate::error::HarvestError::PageFailed { .. }));
        assert!(err.is_page_failure());
        assert_eq!(s.current_url(), Some("https://shop.example/list"));
        assert!(s.find("div.grid").is_some());
    }

    #[test]
    fn test_large_listing_handles_resolve_in_order() {
        let tiles: String = (0..3000)
            .map(|i| format!(r#"<div class="item"><a href="/dp/{i}">{i}</a></div>"#))
            .collect();
        let url = "https://shop.example/big";
        let site = StaticSite::new().with_page(url, &format!(r#"<div class="grid">{tiles}</div>"#));
        let mut s = HtmlSession::new(site);
        s.load(url).unwrap();

        let items = s.find_all("div.grid", "div.item");
        assert_eq!(items.len(), 3000);
        assert_eq!(s.text(items[0]).as_deref(), Some("0"));
        assert_eq!(s.text(items[2999]).as_deref(), Some("2999"));
        let link = s.find_within(items[1234], "a").unwrap();
        assert_eq!(s.attribute(link, "href").as_deref(), Some("/dp/1234"));
    }

    #[test]
    fn test_bad_selector_is_not_found() {
        let s = session();
        assert!(s.find("div[").is_none());
    }
}
