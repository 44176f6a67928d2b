use crate::error::{HarvestError, Result};
use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION,
    USER_AGENT,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use url::Url;

/// Source of raw page bodies behind an [`HtmlSession`](super::HtmlSession).
pub trait Fetcher {
    fn name(&self) -> &'static str;
    fn fetch_blocking(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    pub user_agents: Vec<String>,
    pub default_headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agents: vec![
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36".into(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".into(),
            ],
            default_headers: BTreeMap::from([
                ("Accept-Language".to_string(), "en-GB,en;q=0.9".to_string()),
            ]),
            timeout_ms: 20_000,
        }
    }
}

/* ===========================
HTTP FETCHER
=========================== */

pub struct ReqwestFetcher {
    client: Client,
    cfg: FetchConfig,
}

impl ReqwestFetcher {
    pub fn new(cfg: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .http1_only()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;
        Ok(Self { client, cfg })
    }

    fn try_once(&self, url: &str, ua: &str) -> Result<String> {
        let mut headers = to_headermap(&self.cfg.default_headers)?;
        headers.entry(ACCEPT).or_insert(HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ));
        headers
            .entry(ACCEPT_LANGUAGE)
            .or_insert(HeaderValue::from_static("en-GB,en;q=0.5"));
        headers
            .entry(ACCEPT_ENCODING)
            .or_insert(HeaderValue::from_static("gzip, deflate, br"));
        headers
            .entry(CONNECTION)
            .or_insert(HeaderValue::from_static("keep-alive"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(ua).unwrap_or(HeaderValue::from_static("Mozilla/5.0")),
        );

        let resp = self.client.get(url).headers(headers).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HarvestError::page_failed(url, format!("http status {status}")));
        }
        Ok(resp.text()?)
    }
}

impl Fetcher for ReqwestFetcher {
    fn name(&self) -> &'static str {
        "reqwest-blocking"
    }

    fn fetch_blocking(&self, url: &str) -> Result<String> {
        Url::parse(url).map_err(|_| HarvestError::InvalidUrl(url.into()))?;

        let uas: Vec<&str> = if self.cfg.user_agents.is_empty() {
            vec!["Mozilla/5.0"]
        } else {
            self.cfg.user_agents.iter().map(|s| s.as_str()).collect()
        };

        let mut last_err = None;
        for ua in uas {
            match self.try_once(url, ua) {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::debug!(%url, user_agent = ua, error = %e, "fetch attempt failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| HarvestError::page_unavailable(url, "no fetch attempts")))
    }
}

fn to_headermap(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (k, v) in headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|_| HarvestError::Config(format!("invalid header name: {k}")))?;
        let value = HeaderValue::from_str(v)
            .map_err(|_| HarvestError::Config(format!("invalid header value for {k}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/* ===========================
IN-MEMORY SITE
=========================== */

/// Serves captured pages from memory; unknown URLs are unavailable.
#[derive(Debug, Clone, Default)]
pub struct StaticSite {
    pages: HashMap<String, String>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.insert(url, html);
        self
    }

    pub fn insert(&mut self, url: &str, html: &str) {
        self.pages.insert(normalize_key(url), html.to_string());
    }
}

impl Fetcher for StaticSite {
    fn name(&self) -> &'static str {
        "static-site"
    }

    fn fetch_blocking(&self, url: &str) -> Result<String> {
        self.pages
            .get(&normalize_key(url))
            .cloned()
            .ok_or_else(|| HarvestError::page_failed(url, "no such page"))
    }
}

/// `Url` round-trip so `http://a.com` and `http://a.com/` share a key.
fn normalize_key(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}
