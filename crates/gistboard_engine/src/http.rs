//! HTTP transport for gist-style document stores.
//!
//! The actual HTTP client is abstracted via a trait so the JSON handling
//! can be exercised without a network. [`UreqClient`] is the real client.

use crate::config::BoardConfig;
use crate::error::{StoreError, StoreResult};
use crate::transport::DocumentTransport;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::debug;

/// HTTP client abstraction.
///
/// Implementations attach authentication, apply the request timeout and
/// map non-2xx answers to [`StoreError::Status`].
pub trait HttpClient: Send + Sync {
    /// Sends a GET request and returns the response body.
    fn get(&self, url: &str) -> StoreResult<String>;

    /// Sends a PATCH request with a JSON body and returns the response body.
    fn patch(&self, url: &str, body: &str) -> StoreResult<String>;
}

/// Blocking HTTP client backed by `ureq`.
pub struct UreqClient {
    agent: ureq::Agent,
    token: String,
}

impl UreqClient {
    /// Creates a client that sends `token` as a bearer token.
    pub fn new(token: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("gistboard/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            token: token.into(),
        }
    }

    /// Anonymous when the token is empty, which only works for reads of
    /// public gists.
    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        let request = request.set("Accept", "application/vnd.github+json");
        if self.token.is_empty() {
            request
        } else {
            request.set("Authorization", &format!("Bearer {}", self.token))
        }
    }
}

impl HttpClient for UreqClient {
    fn get(&self, url: &str) -> StoreResult<String> {
        let response = self
            .authorize(self.agent.get(url))
            .call()
            .map_err(map_ureq_error)?;
        read_body(response)
    }

    fn patch(&self, url: &str, body: &str) -> StoreResult<String> {
        let response = self
            .authorize(self.agent.request("PATCH", url))
            .set("Content-Type", "application/json")
            .send_string(body)
            .map_err(map_ureq_error)?;
        read_body(response)
    }
}

fn map_ureq_error(err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(status, _) => StoreError::Status { status },
        ureq::Error::Transport(transport) => match transport.kind() {
            ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
                StoreError::transport_fatal(transport.to_string())
            }
            _ => StoreError::transport_retryable(transport.to_string()),
        },
    }
}

fn read_body(response: ureq::Response) -> StoreResult<String> {
    response
        .into_string()
        .map_err(|e| StoreError::transport_retryable(format!("failed to read body: {}", e)))
}

/// A gist as returned by `GET /gists/{id}`. Only the file map is used.
#[derive(Debug, Deserialize)]
struct GistDocument {
    #[serde(default)]
    files: HashMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
}

/// Body of `PATCH /gists/{id}` overwriting a single file.
#[derive(Debug, Serialize)]
struct GistPatch<'a> {
    files: BTreeMap<&'a str, GistFileContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GistFileContent<'a> {
    content: &'a str,
}

/// Document transport over the gist JSON API.
///
/// The board is the `content` of one named file in the gist's `files`
/// mapping. A missing file reads as an empty board.
pub struct GistTransport<C: HttpClient> {
    url: String,
    filename: String,
    client: C,
}

impl GistTransport<UreqClient> {
    /// Creates a transport using `ureq` with the configured token and timeout.
    pub fn connect(config: &BoardConfig) -> Self {
        Self::new(config, UreqClient::new(config.token.clone(), config.timeout))
    }
}

impl<C: HttpClient> GistTransport<C> {
    /// Creates a transport using the given HTTP client.
    pub fn new(config: &BoardConfig, client: C) -> Self {
        Self {
            url: config.document_url(),
            filename: config.filename.clone(),
            client,
        }
    }

    /// Returns the document URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP client.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn decode(&self, body: &str) -> StoreResult<String> {
        let mut document: GistDocument = serde_json::from_str(body)
            .map_err(|e| StoreError::Protocol(format!("invalid gist response: {}", e)))?;

        match document.files.remove(&self.filename) {
            Some(file) => Ok(file.content.unwrap_or_default()),
            None => {
                debug!(filename = %self.filename, "file missing from gist, treating board as empty");
                Ok(String::new())
            }
        }
    }

    fn encode(&self, content: &str) -> StoreResult<String> {
        let mut files = BTreeMap::new();
        files.insert(self.filename.as_str(), GistFileContent { content });
        serde_json::to_string(&GistPatch { files })
            .map_err(|e| StoreError::Protocol(format!("failed to encode update: {}", e)))
    }
}

impl<C: HttpClient> DocumentTransport for GistTransport<C> {
    fn read(&self) -> StoreResult<String> {
        debug!(url = %self.url, "GET document");
        let body = self.client.get(&self.url)?;
        self.decode(&body)
    }

    fn write(&self, content: &str) -> StoreResult<()> {
        debug!(url = %self.url, bytes = content.len(), "PATCH document");
        let body = self.encode(content)?;
        self.client.patch(&self.url, &body)?;
        Ok(())
    }
}
