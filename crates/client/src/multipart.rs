//! Three-phase chunked upload: prepare, upload parts, finish.
//!
//! Parts are read and sent one at a time in index order. The finish call
//! lists exactly the indices that were accepted, so any reordering or
//! parallelism here would break the protocol.

use std::io::ErrorKind;

use larkdrive_transfer::{ChunkReader, TransferError, UploadSession};
use tracing::{debug, warn};

use crate::config::{DriveConfig, UPLOAD_FINISH_PATH, UPLOAD_PART_PATH, UPLOAD_PREPARE_PATH};
use crate::envelope::{
    FileTokenData, FinishRequest, PARENT_TYPE_EXPLORER, PrepareData, PrepareRequest,
    decode_envelope,
};
use crate::error::{Phase, UploadError};
use crate::transport::{ApiRequest, FormField, Transport};
use crate::types::{ContentHandle, FileDescriptor, UploadEvent, UploadOptions};

/// Uploads `file` into `folder` through the multipart protocol.
///
/// The source file is opened before prepare and closed on every return
/// path. A failure after prepare leaves the server-side session orphaned;
/// the service exposes no abort call.
pub(crate) async fn upload_multipart(
    transport: &dyn Transport,
    config: &DriveConfig,
    token: &str,
    folder: &str,
    file: &FileDescriptor,
    options: &UploadOptions,
) -> Result<ContentHandle, UploadError> {
    let reader = tokio::task::spawn_blocking({
        let path = file.path.clone();
        move || ChunkReader::open(&path)
    })
    .await
    .map_err(join_error)?
    .map_err(|e| match e {
        TransferError::Io(io) if io.kind() == ErrorKind::NotFound => {
            UploadError::NotFound(file.path.clone())
        }
        other => other.into(),
    })?;

    // 1. Prepare
    let mut session = prepare(transport, config, token, folder, file).await?;

    debug!(
        file = %file.name,
        upload_id = %session.upload_id(),
        block_size = session.block_size(),
        parts = larkdrive_transfer::part_count(file.size, session.block_size()),
        "multipart session prepared"
    );

    // 2. Upload parts, 3. Finish
    match upload_parts_and_finish(transport, config, token, file, &mut session, reader, options)
        .await
    {
        Ok(handle) => Ok(handle),
        Err(e) => {
            session.fail();
            warn!(
                file = %file.name,
                upload_id = %session.upload_id(),
                parts_accepted = session.parts().len(),
                error = %e,
                "multipart upload abandoned"
            );
            Err(e)
        }
    }
}

async fn prepare(
    transport: &dyn Transport,
    config: &DriveConfig,
    token: &str,
    folder: &str,
    file: &FileDescriptor,
) -> Result<UploadSession, UploadError> {
    let body = PrepareRequest {
        parent_type: PARENT_TYPE_EXPLORER.into(),
        parent_node: folder.into(),
        file_name: file.name.clone(),
        file_size: file.size,
    };
    let req = ApiRequest::json(
        config.url(UPLOAD_PREPARE_PATH),
        token,
        serde_json::to_value(&body)?,
    );
    let resp = transport.send(req).await?;
    let data: PrepareData = decode_envelope(&resp)?.into_data(Phase::Prepare)?;

    Ok(UploadSession::new(data.upload_id, data.block_size, file.size)?)
}

async fn upload_parts_and_finish(
    transport: &dyn Transport,
    config: &DriveConfig,
    token: &str,
    file: &FileDescriptor,
    session: &mut UploadSession,
    mut reader: ChunkReader,
    options: &UploadOptions,
) -> Result<ContentHandle, UploadError> {
    let block_len = session.block_len();

    while let Some((part_index, offset)) = session.next_part() {
        // Never read past the size stat'd at the start.
        let remaining = usize::try_from(file.size - offset).unwrap_or(usize::MAX);
        let len = block_len.min(remaining);

        let (r, chunk) = tokio::task::spawn_blocking(move || {
            let chunk = reader.read_chunk(part_index, offset, len);
            (reader, chunk)
        })
        .await
        .map_err(join_error)?;
        reader = r;

        let Some(chunk) = chunk? else {
            break;
        };
        let bytes = chunk.size() as u64;

        let req = ApiRequest::form(
            config.url(UPLOAD_PART_PATH),
            token,
            vec![
                FormField::text("upload_id", session.upload_id()),
                FormField::text("part_index", part_index.to_string()),
                FormField::file("file", file.name.as_str(), chunk.data),
            ],
        );
        let resp = transport.send(req).await?;
        decode_envelope(&resp)?.ensure_ok(Phase::UploadPart(part_index))?;

        session.record_part(part_index, bytes)?;
        debug!(part_index, bytes, offset = session.offset(), "part uploaded");

        options
            .emit(UploadEvent::PartUploaded {
                part_index,
                bytes_sent: session.offset(),
                total_bytes: file.size,
            })
            .await;
    }
    drop(reader);

    let block_list = session.finish_parts()?.to_vec();
    let body = FinishRequest {
        upload_id: session.upload_id().to_string(),
        block_list,
    };
    let req = ApiRequest::json(
        config.url(UPLOAD_FINISH_PATH),
        token,
        serde_json::to_value(&body)?,
    );
    let resp = transport.send(req).await?;
    let data: FileTokenData = decode_envelope(&resp)?.into_data(Phase::Finish)?;

    session.complete()?;
    Ok(ContentHandle::new(data.file_token))
}

fn join_error(e: tokio::task::JoinError) -> UploadError {
    UploadError::Io(std::io::Error::other(format!("task join error: {e}")))
}
