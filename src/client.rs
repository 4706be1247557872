use anyhow::{Context, Result, anyhow};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, LINK};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.meraki.com/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const USER_AGENT: &str = concat!("merakifw/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: &str = "1000";

/// Non-2xx answer from the Dashboard API.
#[derive(Debug, Error)]
#[error("Meraki API returned HTTP {status}{}", render_errors(.errors))]
pub struct ApiError {
    pub status: u16,
    pub errors: Vec<String>,
}

fn render_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!(": {}", errors.join("; "))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).context("parsing base URL")?;
        if parsed.cannot_be_a_base() {
            return Err(anyhow!("base URL `{}` cannot carry a path", base_url));
        }
        let http = Client::builder()
            .user_agent(HeaderValue::from_static(USER_AGENT))
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            base_url: parsed,
            http,
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch a single JSON document from a non-paginated endpoint.
    pub fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        let response = self.send(url.clone(), &[])?;
        response
            .json()
            .with_context(|| format!("decoding response from {}", url))
    }

    /// Fetch every page of a list endpoint, following `Link: <...>; rel=next`.
    pub fn get_all_pages<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>> {
        let mut url = self.endpoint(segments)?;
        let mut query = vec![("perPage", PER_PAGE.to_string())];
        let mut items = Vec::new();
        let mut pages = 0usize;

        loop {
            let response = self.send(url.clone(), &query)?;
            let next = next_link(response.headers());
            let page: Vec<T> = response
                .json()
                .with_context(|| format!("decoding response from {}", url))?;
            pages += 1;
            items.extend(page);

            match next {
                Some(link) => {
                    url = Url::parse(&link)
                        .with_context(|| format!("parsing next page link `{}`", link))?;
                    // the link already carries the paging parameters
                    query.clear();
                }
                None => break,
            }
        }

        debug!(pages, items = items.len(), "fetched paginated list");
        Ok(items)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("base URL `{}` cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, url: Url, query: &[(&str, String)]) -> Result<Response> {
        debug!(%url, "GET");
        let mut request = self
            .http
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .with_context(|| format!("sending request to {}", url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let errors = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.errors)
            .unwrap_or_default();
        Err(ApiError {
            status: status.as_u16(),
            errors,
        })
        .with_context(|| format!("requesting {}", url))
    }
}

fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|entry| {
            let mut parts = entry.split(';');
            let target = parts.next()?.trim();
            let is_next = parts.any(|param| {
                let param = param.trim().replace(' ', "");
                param == "rel=next" || param == "rel=\"next\""
            });
            if !is_next {
                return None;
            }
            target
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .map(str::to_string)
        })
}
