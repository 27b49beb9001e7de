//! Single-request upload for files up to the single-shot limit.

use tracing::debug;

use crate::config::{DriveConfig, UPLOAD_ALL_PATH};
use crate::envelope::{FileTokenData, PARENT_TYPE_EXPLORER, decode_envelope};
use crate::error::{Phase, UploadError};
use crate::transport::{ApiRequest, FormField, Transport};
use crate::types::{ContentHandle, FileDescriptor};

/// Uploads `file` into `folder` with one `upload_all` request.
///
/// The whole file is read into memory first. Application error codes are
/// returned as-is; nothing is retried here.
pub(crate) async fn upload_all(
    transport: &dyn Transport,
    config: &DriveConfig,
    token: &str,
    folder: &str,
    file: &FileDescriptor,
) -> Result<ContentHandle, UploadError> {
    let data = tokio::fs::read(&file.path).await?;

    debug!(file = %file.name, bytes = data.len(), "sending upload_all");

    let req = ApiRequest::form(
        config.url(UPLOAD_ALL_PATH),
        token,
        vec![
            FormField::text("parent_type", PARENT_TYPE_EXPLORER),
            FormField::text("parent_node", folder),
            FormField::text("file_name", file.name.as_str()),
            FormField::file("file", file.name.as_str(), data),
        ],
    );
    let resp = transport.send(req).await?;

    let data: FileTokenData = decode_envelope(&resp)?.into_data(Phase::UploadAll)?;
    Ok(ContentHandle::new(data.file_token))
}
