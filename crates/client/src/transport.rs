//! HTTP transport abstraction and the default `reqwest` implementation.
//!
//! Upload logic only ever talks to [`Transport`]. Retry and backoff for
//! transient network failures belong to the implementor; the uploaders see
//! nothing but the final response (or the final error).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::multipart::{Form, Part};

/// Errors raised by a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid bearer token")]
    InvalidToken,

    #[error("{0}")]
    Other(String),
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        data: Vec<u8>,
    },
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormField::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(name: impl Into<String>, file_name: impl Into<String>, data: Vec<u8>) -> Self {
        FormField::File {
            name: name.into(),
            file_name: file_name.into(),
            data,
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    /// Multipart form; fields are sent in order.
    Form(Vec<FormField>),
}

/// An authenticated POST to the drive API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub url: String,
    pub bearer: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn json(url: impl Into<String>, bearer: &str, body: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            bearer: bearer.to_string(),
            body: RequestBody::Json(body),
        }
    }

    pub fn form(url: impl Into<String>, bearer: &str, fields: Vec<FormField>) -> Self {
        Self {
            url: url.into(),
            bearer: bearer.to_string(),
            body: RequestBody::Form(fields),
        }
    }

    /// `Authorization` header value for this request.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.bearer)
    }

    /// Looks up a text field of a form body.
    pub fn form_text(&self, field: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(fields) => fields.iter().find_map(|f| match f {
                FormField::Text { name, value } if name == field => Some(value.as_str()),
                _ => None,
            }),
            RequestBody::Json(_) => None,
        }
    }

    /// Returns the file payload of a form body, if any.
    pub fn form_file(&self) -> Option<&[u8]> {
        match &self.body {
            RequestBody::Form(fields) => fields.iter().find_map(|f| match f {
                FormField::File { data, .. } => Some(data.as_slice()),
                _ => None,
            }),
            RequestBody::Json(_) => None,
        }
    }
}

/// Raw HTTP response: status and body, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retry-aware HTTP transport.
///
/// Implementations retry transient failures per their own policy and hand
/// back the final response. Application-level error codes inside the body
/// are not their concern.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the final HTTP response, whatever its
    /// status. Errors only when no response could be obtained.
    fn send(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>>;
}

/// [`Transport`] over a plain `reqwest` client.
///
/// Performs exactly one exchange per call. Wrap it (or replace it) to add
/// retries.
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    async fn execute(&self, request: ApiRequest) -> Result<HttpResponse, TransportError> {
        let auth = HeaderValue::from_str(&request.authorization())
            .map_err(|_| TransportError::InvalidToken)?;

        let builder = self.http.post(&request.url).header(AUTHORIZATION, auth);
        let builder = match request.body {
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(fields) => builder.multipart(build_form(fields)),
        };

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>> {
        Box::pin(self.execute(request))
    }
}

fn build_form(fields: Vec<FormField>) -> Form {
    fields.into_iter().fold(Form::new(), |form, field| match field {
        FormField::Text { name, value } => form.text(name, value),
        FormField::File {
            name,
            file_name,
            data,
        } => form.part(name, Part::bytes(data).file_name(file_name)),
    })
}
