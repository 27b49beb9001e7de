//! Response envelope and request/response payloads of the drive API.
//!
//! Every response is `{code, msg, data}`. A non-zero `code` is an
//! application error regardless of the HTTP status.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use larkdrive_transfer::PartDescriptor;

use crate::error::{Phase, UploadError};
use crate::transport::HttpResponse;

/// `parent_type` value for regular drive folders.
pub const PARENT_TYPE_EXPLORER: &str = "explorer";

/// Response envelope with `data` left untyped until `code` is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(alias = "status_code")]
    pub code: i64,
    #[serde(default, alias = "message")]
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ApiEnvelope {
    /// Checks the application status code and types the `data` payload.
    pub fn into_data<T: DeserializeOwned>(self, phase: Phase) -> Result<T, UploadError> {
        if self.code != 0 {
            return Err(UploadError::Remote {
                phase,
                code: self.code,
                msg: self.msg,
            });
        }
        let data = self.data.ok_or_else(|| UploadError::InvalidResponse {
            phase,
            reason: "missing data".into(),
        })?;
        serde_json::from_value(data).map_err(|e| UploadError::InvalidResponse {
            phase,
            reason: e.to_string(),
        })
    }

    /// Checks the application status code, ignoring `data`.
    pub fn ensure_ok(self, phase: Phase) -> Result<(), UploadError> {
        if self.code != 0 {
            return Err(UploadError::Remote {
                phase,
                code: self.code,
                msg: self.msg,
            });
        }
        Ok(())
    }
}

/// Decodes the envelope of an HTTP response.
///
/// A body that is not an envelope is reported as [`UploadError::Http`] when
/// the HTTP status is not a success, and as a JSON error otherwise.
pub fn decode_envelope(resp: &HttpResponse) -> Result<ApiEnvelope, UploadError> {
    match serde_json::from_slice::<ApiEnvelope>(&resp.body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !resp.is_success() => Err(UploadError::Http {
            status: resp.status,
            body: String::from_utf8_lossy(&resp.body).into_owned(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// `data` of `upload_all` and `upload_finish`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTokenData {
    pub file_token: String,
}

/// Body of `upload_prepare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareRequest {
    pub parent_type: String,
    pub parent_node: String,
    pub file_name: String,
    pub file_size: u64,
}

/// `data` of `upload_prepare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareData {
    pub upload_id: String,
    pub block_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_num: Option<u64>,
}

/// Body of `upload_finish`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishRequest {
    pub upload_id: String,
    pub block_list: Vec<PartDescriptor>,
}
