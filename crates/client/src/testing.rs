//! Test helpers: a recording mock transport and file builders.

use std::fs::File;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Mutex;

use crate::config::{UPLOAD_ALL_PATH, UPLOAD_FINISH_PATH, UPLOAD_PART_PATH, UPLOAD_PREPARE_PATH};
use crate::transport::{ApiRequest, FormField, HttpResponse, RequestBody, Transport, TransportError};

type Responder = Box<dyn Fn(&ApiRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

/// What the mock saw for one request.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub url: String,
    pub authorization: String,
    pub json: Option<serde_json::Value>,
    /// Form fields in order; file fields carry no text value.
    pub fields: Vec<(String, Option<String>)>,
    pub file: Option<Vec<u8>>,
}

impl RecordedRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn file_len(&self) -> usize {
        self.file.as_ref().map_or(0, Vec::len)
    }
}

/// Transport double that records every request and answers via a closure.
pub(crate) struct MockTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    responder: Responder,
}

impl MockTransport {
    pub fn new(
        responder: impl Fn(&ApiRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// A well-behaved drive: prepare hands out `block_size`, every other
    /// call succeeds, and both upload_all and finish return `file_token`.
    pub fn drive(block_size: u64, file_token: &str) -> Self {
        let file_token = file_token.to_string();
        Self::new(move |req| Ok(drive_response(req, block_size, &file_token)))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests whose URL ends with `path`.
    pub fn calls_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.ends_with(path))
            .cloned()
            .collect()
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>> {
        self.requests.lock().unwrap().push(record(&request));
        let result = (self.responder)(&request);
        Box::pin(async move { result })
    }
}

fn record(request: &ApiRequest) -> RecordedRequest {
    let mut recorded = RecordedRequest {
        url: request.url.clone(),
        authorization: request.authorization(),
        json: None,
        fields: Vec::new(),
        file: None,
    };
    match &request.body {
        RequestBody::Json(value) => recorded.json = Some(value.clone()),
        RequestBody::Form(fields) => {
            for field in fields {
                match field {
                    FormField::Text { name, value } => {
                        recorded.fields.push((name.clone(), Some(value.clone())));
                    }
                    FormField::File { name, data, .. } => {
                        recorded.fields.push((name.clone(), None));
                        recorded.file = Some(data.clone());
                    }
                }
            }
        }
    }
    recorded
}

/// Builds an envelope response.
pub(crate) fn envelope(code: i64, msg: &str, data: serde_json::Value) -> HttpResponse {
    HttpResponse::ok(
        serde_json::json!({"code": code, "msg": msg, "data": data})
            .to_string()
            .into_bytes(),
    )
}

/// Successful drive answer for any endpoint.
pub(crate) fn drive_response(req: &ApiRequest, block_size: u64, file_token: &str) -> HttpResponse {
    if req.url.ends_with(UPLOAD_PREPARE_PATH) {
        envelope(
            0,
            "success",
            serde_json::json!({"upload_id": "up_1", "block_size": block_size}),
        )
    } else if req.url.ends_with(UPLOAD_PART_PATH) {
        envelope(0, "success", serde_json::json!({}))
    } else if req.url.ends_with(UPLOAD_FINISH_PATH) || req.url.ends_with(UPLOAD_ALL_PATH) {
        envelope(0, "success", serde_json::json!({"file_token": file_token}))
    } else {
        envelope(404, "unknown endpoint", serde_json::json!({}))
    }
}

/// Creates a sparse file of `size` bytes without writing its content.
pub(crate) fn sparse_file(dir: &Path, name: &str, size: u64) -> PathBuf {
    let path = dir.join(name);
    let f = File::create(&path).unwrap();
    f.set_len(size).unwrap();
    path
}

/// Creates a file of `size` bytes with a repeating non-zero pattern.
pub(crate) fn patterned_file(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8 + 1).collect();
    let mut f = File::create(&path).unwrap();
    f.write_all(&data).unwrap();
    path
}
