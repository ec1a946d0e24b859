use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One call to the chat service, before any outcome classification.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: &'static str,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// The raw reply: success bit plus the body as text. The feed endpoint's JSON
/// is decoded a layer up, in [`crate::api::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub ok: bool,
    pub body: String,
}

impl ApiResponse {
    pub fn success(body: impl Into<String>) -> Self {
        Self {
            ok: true,
            body: body.into(),
        }
    }

    pub fn failure(body: impl Into<String>) -> Self {
        Self {
            ok: false,
            body: body.into(),
        }
    }
}

/// Network-level failures. These are distinct from server-reported failures,
/// which arrive as a non-`ok` [`ApiResponse`] and are classified above this
/// layer.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("connection failed: {0}")]
    Connection(String),
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Production transport against the configured server base URL.
pub struct HttpTransport {
    base: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let endpoint = self.base.join(request.path)?;
        let mut builder = match request.method {
            Method::Get => self.http.get(endpoint),
            Method::Post => self.http.post(endpoint),
        };
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let ok = response.status().is_success();
        let body = response.text().await?;
        Ok(ApiResponse { ok, body })
    }
}

/// Transport double that replays a queue of canned results and records every
/// request it saw. An exhausted queue behaves like a dead network.
#[derive(Default)]
pub struct ScriptedTransport {
    queue: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_success(&self, body: impl Into<String>) {
        self.queue
            .lock()
            .push_back(Ok(ApiResponse::success(body)));
    }

    pub fn push_failure(&self, body: impl Into<String>) {
        self.queue
            .lock()
            .push_back(Ok(ApiResponse::failure(body)));
    }

    pub fn push_connection_error(&self) {
        self.queue
            .lock()
            .push_back(Err(TransportError::Connection("scripted outage".into())));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.seen.lock().push(request);
        self.queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("script exhausted".into())))
    }
}
