//! Drive upload client.
//!
//! Uploads a local file to a cloud drive folder and returns the file token
//! the drive assigns to it. Two protocols are used depending on size:
//!
//! 1. **Single-shot**: files up to 20 MiB go in one `upload_all` form post.
//! 2. **Multipart**: larger files (up to 2 GiB) go through
//!    `upload_prepare`, one `upload_part` per server-sized block, then
//!    `upload_finish`.
//!
//! Token acquisition and transient-failure retries are left to the caller
//! through [`TokenProvider`] and [`Transport`].

pub mod config;
pub mod envelope;
pub mod error;
mod multipart;
mod single;
pub mod token;
pub mod transport;
pub mod types;
pub mod uploader;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, DriveConfig};
pub use error::{Phase, UploadError};
pub use token::{StaticToken, TokenProvider};
pub use transport::{
    ApiRequest, FormField, HttpResponse, ReqwestTransport, RequestBody, Transport, TransportError,
};
pub use types::{ContentHandle, FileDescriptor, UploadEvent, UploadOptions, UploadRoute};
pub use uploader::DriveUploader;
