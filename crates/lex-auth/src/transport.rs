//! HTTP transport seam.
//!
//! [`ApiRequest`] is a plain, cloneable description of a call so the executor
//! can replay it once after a refresh. [`Transport`] turns it into an
//! [`ApiResponse`]; [`ReqwestTransport`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use lex_config::ApiConfig;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
    Head,
}

impl Method {
    const fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

impl FormPart {
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    #[must_use]
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                mime,
                bytes,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            bearer: None,
            body: RequestBody::Empty,
        }
    }

    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }

    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `detail`, `message` or `error` string of a JSON object body.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        let Ok(Value::Object(map)) = self.json::<Value>() else {
            return None;
        };
        ["detail", "message", "error"]
            .into_iter()
            .find_map(|key| map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    /// Human-readable error message: [`ApiResponse::detail`], else the raw text.
    #[must_use]
    pub fn error_message(&self) -> String {
        if let Some(detail) = self.detail() {
            return detail;
        }
        let text = self.text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            format!("HTTP {}", self.status)
        } else {
            trimmed.to_string()
        }
    }
}

/// Sends [`ApiRequest`]s. Implementations must be cheap to share across tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;

    /// Reachability check. Any HTTP response, whatever its status, counts
    /// as reachable.
    async fn probe(&self, url: &str, timeout: Duration) -> Result<(), TransportError>;
}

/// [`Transport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl ReqwestTransport {
    /// Build a transport with the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidRequest` if the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("http client: {e}")))?;
        Ok(Self {
            client,
            request_timeout: config.request_timeout(),
        })
    }

    fn classify(error: &reqwest::Error, timeout: Duration) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(timeout)
        } else if error.is_builder() {
            TransportError::InvalidRequest(error.to_string())
        } else {
            TransportError::Unreachable(error.to_string())
        }
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            FormValue::Text(text) => form.text(part.name.clone(), text.clone()),
            FormValue::File {
                file_name,
                mime,
                bytes,
            } => {
                let mut file_part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file_part = file_part.mime_str(mime).map_err(|e| {
                        TransportError::InvalidRequest(format!("mime type {mime}: {e}"))
                    })?;
                }
                form.part(part.name.clone(), file_part)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Self::classify(&e, self.request_timeout))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::classify(&e, self.request_timeout))?;

        tracing::debug!(method = ?request.method, url = %request.url, status, "http response");
        Ok(ApiResponse::new(status, body.to_vec()))
    }

    async fn probe(&self, url: &str, timeout: Duration) -> Result<(), TransportError> {
        match self.client.head(url).timeout(timeout).send().await {
            Ok(response) => {
                tracing::debug!(url, status = response.status().as_u16(), "probe answered");
                Ok(())
            }
            Err(e) => Err(Self::classify(&e, timeout)),
        }
    }
}
