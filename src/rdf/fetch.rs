//! Retrieval of vocabulary sources and prefix lookup documents.

use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use tower_lsp::lsp_types::Url;

const ACCEPT: &str = "text/turtle, application/rdf+xml;q=0.9, application/n-triples;q=0.8, \
                      application/ld+json;q=0.5, text/html;q=0.3, */*;q=0.1";

/// Raw body of a retrieved document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub body: Vec<u8>,
    /// `Content-Type` as sent by the server; `None` for local files.
    pub content_type: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request for <{url}> failed: {message}")]
    Http { url: String, message: String },
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Plain request/response retrieval by URL or local path.
pub trait Fetch: Send + Sync {
    fn fetch(&self, location: &str) -> Result<Fetched, FetchError>;
}

/// Fetches `http(s):` URLs over the network and reads `file:` URLs and plain paths
/// from disk. Fragments are dropped before the request.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// A zero `timeout` leaves requests unbounded.
    pub fn new(timeout: Duration) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
        }
    }

    fn read_file(path: PathBuf) -> Result<Fetched, FetchError> {
        match std::fs::read(&path) {
            Ok(body) => Ok(Fetched {
                body,
                content_type: None,
            }),
            Err(source) => Err(FetchError::Io { path, source }),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, location: &str) -> Result<Fetched, FetchError> {
        let location = location.split('#').next().unwrap_or(location);

        if location.starts_with("file:") {
            let path = Url::parse(location)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| FetchError::Http {
                    url: location.to_string(),
                    message: "not a local file URL".to_string(),
                })?;
            return Self::read_file(path);
        }
        if !(location.starts_with("http://") || location.starts_with("https://")) {
            return Self::read_file(PathBuf::from(location));
        }

        tracing::debug!("GET <{location}>");
        let http_error = |message: String| FetchError::Http {
            url: location.to_string(),
            message,
        };

        let response = self
            .agent
            .get(location)
            .set("Accept", ACCEPT)
            .call()
            .map_err(|err| http_error(err.to_string()))?;

        let content_type = response.header("Content-Type").map(str::to_string);
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|err| http_error(err.to_string()))?;

        Ok(Fetched { body, content_type })
    }
}
