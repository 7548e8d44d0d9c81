//! Blocking HTTP helpers over libcurl.
//!
//! Used for the upstream lookup and the Telegram Bot API. Each call runs in
//! the current thread; call from `spawn_blocking` when inside async code.

use std::time::Duration;

use anyhow::{Context, Result};

/// Status code and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub total: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            total: Duration::from_secs(30),
        }
    }
}

/// GET `url`, following redirects.
pub fn get(url: &str, timeouts: Timeouts) -> Result<HttpResponse> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.get(true)?;
    perform(easy, timeouts).with_context(|| format!("GET {}", redact(url)))
}

/// POST a JSON body to `url`.
pub fn post_json(url: &str, body: &[u8], timeouts: Timeouts) -> Result<HttpResponse> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.post(true)?;
    easy.post_fields_copy(body)?;
    let mut list = curl::easy::List::new();
    list.append("Content-Type: application/json")?;
    easy.http_headers(list)?;
    perform(easy, timeouts).with_context(|| format!("POST {}", redact(url)))
}

fn perform(mut easy: curl::easy::Easy, timeouts: Timeouts) -> Result<HttpResponse> {
    easy.follow_location(true)?;
    easy.connect_timeout(timeouts.connect)?;
    easy.timeout(timeouts.total)?;
    easy.useragent(concat!("rcinfo/", env!("CARGO_PKG_VERSION")))?;

    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("request failed")?;
    }

    let status = easy.response_code().context("no response code")?;
    Ok(HttpResponse { status, body })
}

/// Strip anything after `/bot` so tokens never reach the logs.
fn redact(url: &str) -> String {
    match url.find("/bot") {
        Some(i) => format!("{}/bot<redacted>", &url[..i]),
        None => url.to_string(),
    }
}
