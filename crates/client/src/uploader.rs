//! Upload orchestration: destination, size checks, path selection.

use std::path::Path;

use tracing::info;

use crate::config::DriveConfig;
use crate::error::UploadError;
use crate::multipart::upload_multipart;
use crate::single::upload_all;
use crate::token::TokenProvider;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{ContentHandle, FileDescriptor, UploadEvent, UploadOptions, UploadRoute};

/// Uploads local files to the drive and returns their file tokens.
///
/// Holds no per-upload state: concurrent calls run as independent
/// sequential state machines.
pub struct DriveUploader<T: Transport> {
    transport: T,
    config: DriveConfig,
}

impl DriveUploader<ReqwestTransport> {
    /// Creates an uploader over a `reqwest` transport using the configured
    /// timeout.
    pub fn from_config(config: DriveConfig) -> Result<Self, UploadError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> DriveUploader<T> {
    /// Creates an uploader over an injected transport.
    pub fn new(transport: T, config: DriveConfig) -> Self {
        Self { transport, config }
    }

    /// Configuration this uploader was built with.
    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Uploads `path` and returns its content handle.
    ///
    /// Checks run in order and stop before any network call: destination
    /// folder, file existence, 2 GiB ceiling. Files up to 20 MiB go through
    /// a single request, larger ones through the multipart protocol.
    pub async fn upload_file(
        &self,
        token: &str,
        path: &Path,
        options: &UploadOptions,
    ) -> Result<ContentHandle, UploadError> {
        let folder = self
            .config
            .resolve_folder(options.parent_folder.as_deref())?;
        let file = FileDescriptor::stat(path).await?;
        let route = UploadRoute::for_size(file.size)?;

        info!(file = %file.name, size = file.size, %route, "uploading to drive");
        options
            .emit(UploadEvent::Started {
                file_name: file.name.clone(),
                size: file.size,
                route,
            })
            .await;

        let handle = match route {
            UploadRoute::SingleShot => {
                upload_all(&self.transport, &self.config, token, &folder, &file).await?
            }
            UploadRoute::Chunked => {
                upload_multipart(
                    &self.transport,
                    &self.config,
                    token,
                    &folder,
                    &file,
                    options,
                )
                .await?
            }
        };

        info!(file = %file.name, file_token = %handle, "upload complete");
        options
            .emit(UploadEvent::Completed {
                handle: handle.clone(),
            })
            .await;

        Ok(handle)
    }

    /// Acquires a token from `tokens` and uploads `path` with it.
    pub async fn upload_with(
        &self,
        tokens: &dyn TokenProvider,
        path: &Path,
        options: &UploadOptions,
    ) -> Result<ContentHandle, UploadError> {
        let token = tokens.token().await?;
        self.upload_file(&token, path, options).await
    }
}
