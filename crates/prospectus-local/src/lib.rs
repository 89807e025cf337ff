use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use prospectus_core::{Error, Page, PageFetcher, Result};
use tracing::debug;

pub mod extract;
pub mod links;
pub mod openai;

/// Timeout for one page GET (network + body).
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Hard cap on bytes read from a response body.
const MAX_BODY_BYTES: usize = 2_000_000;
/// Upper bound on links recorded per page.
const MAX_PAGE_LINKS: usize = 200;

const ALLOWED_HOST_SUFFIXES: &[&str] = &[".com", ".org", ".net"];

/// Host rules applied before any network I/O.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Suffixes a fetch target's host may end with. Coarse allowlist, not a
    /// precise domain match.
    pub allowed_suffixes: Vec<String>,
    /// Skip the host guard entirely. Test/debug escape hatch only.
    pub allow_unsafe_hosts: bool,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            allowed_suffixes: ALLOWED_HOST_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allow_unsafe_hosts: false,
        }
    }
}

/// Validate a fetch target against `policy` without touching the network.
///
/// Hostnames that are not IP literals are not resolved here; a public name
/// can still point at a private address at request time.
fn validate_url(policy: &FetchPolicy, raw: &str) -> Result<url::Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::InvalidUrl("empty url".to_string()));
    }
    let parsed = url::Url::parse(raw).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidUrl(format!("unsupported scheme: {other}")));
        }
    }
    let Some(host) = parsed.host() else {
        return Err(Error::InvalidUrl("missing host".to_string()));
    };
    if policy.allow_unsafe_hosts {
        return Ok(parsed);
    }
    match host {
        url::Host::Domain(domain) => {
            if domain.eq_ignore_ascii_case("localhost") {
                return Err(Error::InvalidUrl("loopback host".to_string()));
            }
            let domain = domain.to_ascii_lowercase();
            if !policy
                .allowed_suffixes
                .iter()
                .any(|s| domain.ends_with(s.as_str()))
            {
                return Err(Error::InvalidUrl(format!(
                    "host suffix not allowed: {domain}"
                )));
            }
        }
        url::Host::Ipv4(ip) => {
            if is_reserved_v4(ip) {
                return Err(Error::InvalidUrl(format!("reserved address: {ip}")));
            }
            // Public IP literals never match the suffix allowlist.
            return Err(Error::InvalidUrl(format!(
                "ip-literal host not allowed: {ip}"
            )));
        }
        url::Host::Ipv6(ip) => {
            if is_reserved_v6(ip) {
                return Err(Error::InvalidUrl(format!("reserved address: {ip}")));
            }
            return Err(Error::InvalidUrl(format!(
                "ip-literal host not allowed: {ip}"
            )));
        }
    }
    Ok(parsed)
}

fn is_reserved_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
}

fn is_reserved_v6(ip: Ipv6Addr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_reserved_v4(v4);
    }
    let seg = ip.segments();
    // fc00::/7 unique-local, fe80::/10 link-local.
    (seg[0] & 0xfe00) == 0xfc00 || (seg[0] & 0xffc0) == 0xfe80
}

/// Validating page fetcher: GET with a bounded timeout, title/text
/// extraction and link discovery on success, failure markers otherwise.
#[derive(Debug, Clone)]
pub struct WebFetcher {
    client: reqwest::Client,
    policy: FetchPolicy,
}

impl WebFetcher {
    pub fn new() -> Result<Self> {
        Self::with_policy(FetchPolicy::default())
    }

    pub fn with_policy(policy: FetchPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("prospectus/0.1")
            .redirect(reqwest::redirect::Policy::limited(10))
            .connect_timeout(FETCH_TIMEOUT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(Self { client, policy })
    }

    fn validate_url(&self, raw: &str) -> Result<url::Url> {
        validate_url(&self.policy, raw)
    }
}

async fn read_body_capped(
    resp: reqwest::Response,
    max_bytes: usize,
) -> std::result::Result<Vec<u8>, String> {
    use futures_util::StreamExt;
    let mut bytes = Vec::new();
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| e.to_string())?;
        if bytes.len().saturating_add(chunk.len()) > max_bytes {
            let can_take = max_bytes.saturating_sub(bytes.len());
            bytes.extend_from_slice(&chunk[..can_take]);
            break;
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[async_trait::async_trait]
impl PageFetcher for WebFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        let url = self.validate_url(url)?;
        debug!(%url, "fetching page");

        let resp = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(%url, error = %e, "transport failure");
                return Ok(Page::failed(url, e.to_string()));
            }
        };
        let status = resp.status();
        if !status.is_success() {
            debug!(%url, %status, "non-success response");
            return Ok(Page::failed(url, format!("HTTP {status}")));
        }
        let body = match read_body_capped(resp, MAX_BODY_BYTES).await {
            Ok(b) => b,
            Err(e) => return Ok(Page::failed(url, e)),
        };

        let html = String::from_utf8_lossy(&body);
        let title = extract::page_title(&html).unwrap_or_else(|| "No title".to_string());
        let text = extract::visible_text(&html).unwrap_or_else(|| "No content".to_string());
        let page_links = links::page_links(&html, url.as_str(), MAX_PAGE_LINKS);
        debug!(%url, links = page_links.len(), chars = text.len(), "page extracted");

        Ok(Page {
            url: url.into(),
            title,
            text,
            links: page_links,
            fetch_failed: false,
        })
    }
}
