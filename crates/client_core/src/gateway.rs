use reqwest::{header::CONTENT_TYPE, multipart::Form, Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("remote error {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to encode request body: {0}")]
    Encode(String),
    #[error("failed to decode response body: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, GatewayError> {
        match self {
            ResponseBody::Json(value) => {
                serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
            }
            ResponseBody::Text(text) => {
                serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))
            }
        }
    }
}

pub struct GatewayRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl GatewayRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, GatewayError> {
        let value = serde_json::to_value(body).map_err(|e| GatewayError::Encode(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }
}

/// Joins path segments into an absolute API path, percent-encoding each
/// segment so opaque ids cannot escape their position.
pub fn api_path(segments: &[&str]) -> String {
    let mut scratch = match Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return format!("/{}", segments.join("/")),
    };
    if let Ok(mut parts) = scratch.path_segments_mut() {
        parts.clear().extend(segments);
    }
    scratch.path().to_string()
}

#[derive(Clone)]
pub struct RemoteGateway {
    http: Client,
    base_url: Url,
}

impl RemoteGateway {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, GatewayError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(&format!("{trimmed}/"))
            .map_err(|e| GatewayError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self { http, base_url })
    }

    pub fn endpoint_url(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::InvalidUrl(format!("{path}: {e}")))
    }

    pub async fn call(&self, request: GatewayRequest) -> Result<ResponseBody, GatewayError> {
        let url = self.endpoint_url(&request.path)?;
        debug!(method = %request.method, path = %request.path, "gateway: request");

        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                body
            };
            debug!(
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                "gateway: remote error"
            );
            return Err(GatewayError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase().contains("json"))
            .unwrap_or(false);
        let text = response.text().await?;
        if !is_json {
            return Ok(ResponseBody::Text(text));
        }
        if text.trim().is_empty() {
            return Ok(ResponseBody::Json(serde_json::Value::Null));
        }
        serde_json::from_str(&text)
            .map(ResponseBody::Json)
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    pub async fn call_json<T: DeserializeOwned>(
        &self,
        request: GatewayRequest,
    ) -> Result<T, GatewayError> {
        self.call(request).await?.into_json()
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
