//! Blocking document fetch over `file://`, `http://` and `https://`.
//!
//! The HTTP side is deliberately primitive: one `GET` with
//! `Connection: close`, the whole body read before returning, no redirects,
//! no retries, no timeouts. Responses that would need decoding
//! (`transfer-encoding` or `content-encoding`) are a hard error rather than
//! a silently mangled body.

mod http;

use std::collections::HashMap;
use std::thread;

use url::Url;

pub use crate::http::USER_AGENT;

/// A fetched document: response headers (keys lower-cased) and the body.
/// File fetches have an empty header map.
#[derive(Debug)]
pub struct Response {
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
    #[error("invalid url: {0}")]
    BadUrl(#[from] url::ParseError),
    #[error("not a fetchable url: {0}")]
    BadTarget(String),
    #[error("http error {status}: {reason}")]
    Http { status: u16, reason: String },
    #[error("unsupported response encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("malformed response: {0}")]
    MalformedResponse(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("tls: {0}")]
    Tls(#[from] rustls::Error),
}

/// Resolves a command line target into a URL: anything with a scheme parses
/// as-is, anything else is treated as a local file path.
pub fn location_from_arg(arg: &str) -> Result<Url, FetchError> {
    if arg.contains("://") {
        return Ok(Url::parse(arg)?);
    }
    let path = std::fs::canonicalize(arg)?;
    Url::from_file_path(&path).map_err(|_| FetchError::BadTarget(arg.to_string()))
}

/// Fetches `target` (a URL or a local file path) and returns headers + body.
pub fn fetch(target: &str) -> Result<Response, FetchError> {
    fetch_url(&location_from_arg(target)?)
}

pub fn fetch_url(url: &Url) -> Result<Response, FetchError> {
    match url.scheme() {
        "file" => fetch_file(url),
        "http" | "https" => http::fetch_remote(url),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

/// Runs a fetch on a worker thread and hands the outcome to `callback`
/// together with the target it was asked for. The callback runs on the
/// worker thread; it is on the caller to get the result back onto its own
/// thread (a channel plus a repaint request, typically).
pub fn fetch_background<F>(target: String, callback: F)
where
    F: FnOnce(String, Result<Response, FetchError>) + Send + 'static,
{
    thread::spawn(move || {
        let result = fetch(&target);
        if let Err(err) = &result {
            log::warn!("fetch of {target} failed: {err}");
        }
        callback(target, result);
    });
}

fn fetch_file(url: &Url) -> Result<Response, FetchError> {
    let path = url
        .to_file_path()
        .map_err(|_| FetchError::BadTarget(url.to_string()))?;
    let body = std::fs::read_to_string(path)?;
    Ok(Response {
        headers: HashMap::new(),
        body,
    })
}
