// src/fetch/mod.rs

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::cli::AuthScheme;
use crate::config::{Credentials, Settings};
use crate::error::excerpt;
use crate::{Error, Result};

/// Shape of `GET /rest/api/content/{id}?expand=body.storage`, only the parts we read.
#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    title: Option<String>,
    body: Body,
}

#[derive(Debug, Deserialize)]
struct Body {
    storage: Storage,
}

#[derive(Debug, Deserialize)]
struct Storage {
    value: String,
}

/// Content API URLs to try, in order.
///
/// With a context path the instance is tried under it first and then at the
/// root; without one, the root first and then under `/wiki`.
pub fn candidate_urls(base: &str, context: &str, page_id: &str) -> Result<Vec<Url>> {
    let invalid = |reason: &str| Error::InvalidUrl {
        url: base.to_string(),
        reason: reason.to_string(),
    };

    let root = Url::parse(base.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(root.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if root.cannot_be_a_base() {
        return Err(invalid("not a base URL"));
    }

    let ctx: Vec<&str> = context.split('/').filter(|s| !s.trim().is_empty()).collect();
    let none: &[&str] = &[];
    let wiki: &[&str] = &["wiki"];
    let prefixes = if ctx.is_empty() {
        [none, wiki]
    } else {
        [ctx.as_slice(), none]
    };

    let mut urls = Vec::with_capacity(prefixes.len());
    for prefix in prefixes {
        let mut url = root.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segs = url
                .path_segments_mut()
                .map_err(|_| invalid("not a base URL"))?;
            segs.pop_if_empty();
            segs.extend(prefix.iter().map(|s| s.trim()));
            segs.extend(["rest", "api", "content", page_id]);
        }
        url.query_pairs_mut().append_pair("expand", "body.storage");
        urls.push(url);
    }
    Ok(urls)
}

fn authorize(req: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
    match credentials.scheme {
        AuthScheme::Basic => req.basic_auth(
            credentials.user.as_deref().unwrap_or_default(),
            Some(&credentials.token),
        ),
        AuthScheme::Bearer => req.bearer_auth(&credentials.token),
    }
}

/// One GET; returns status and body text.
async fn get_text_core(
    client: &Client,
    url: &Url,
    settings: &Settings,
) -> Result<(StatusCode, String)> {
    debug!(%url, "fetching page content");
    let network = |source| Error::Network {
        url: url.to_string(),
        source,
    };
    let req = client
        .get(url.clone())
        .header(reqwest::header::ACCEPT, "application/json")
        .timeout(settings.timeout);
    let resp = authorize(req, &settings.credentials)
        .send()
        .await
        .map_err(network)?;
    let status = resp.status();
    let text = resp.text().await.map_err(network)?;
    Ok((status, text))
}

fn parse_storage(url: &Url, body: &str) -> Result<String> {
    let content: Content = serde_json::from_str(body).map_err(|e| Error::Payload {
        url: url.to_string(),
        reason: e.to_string(),
        excerpt: excerpt(body),
    })?;
    info!(
        title = content.title.as_deref().unwrap_or("-"),
        bytes = content.body.storage.value.len(),
        "page content retrieved"
    );
    Ok(content.body.storage.value)
}

/// Fetch the page's storage-format body (`body.storage.value`).
///
/// A 404 moves on to the next candidate URL; rejected credentials and any
/// other status end the run straight away.
#[instrument(level = "info", skip_all, fields(page_id = %settings.page_id))]
pub async fn fetch_storage_html(client: &Client, settings: &Settings) -> Result<String> {
    let urls = candidate_urls(&settings.base, &settings.context, &settings.page_id)?;

    let mut last_excerpt = String::new();
    for url in &urls {
        let (status, body) = get_text_core(client, url, settings).await?;
        match status {
            s if s.is_success() => return parse_storage(url, &body),
            StatusCode::NOT_FOUND => {
                warn!(%url, "404, trying next location");
                last_excerpt = excerpt(&body);
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::Auth {
                    url: url.to_string(),
                    status: status.as_u16(),
                    excerpt: excerpt(&body),
                })
            }
            _ => {
                return Err(Error::Http {
                    url: url.to_string(),
                    status: status.as_u16(),
                    excerpt: excerpt(&body),
                })
            }
        }
    }

    Err(Error::NotFound {
        page_id: settings.page_id.clone(),
        tried: urls
            .iter()
            .map(Url::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        excerpt: last_excerpt,
    })
}
