//! Media uploads.
//!
//! # Data Flow
//! ```text
//! path or bytes → file.rs (UploadFile, MIME guess)
//!     → file.rs validate (size, MIME prefix) ── refused → InvalidFile, no request
//!     → client.rs (multipart field "image"/"video")
//!     → POST /api/upload/{image,video} via ApiClient
//!     → { success, imageUrl|videoUrl, message? } → URL
//! ```

pub mod client;
pub mod file;

pub use client::{UploadResponse, Uploader};
pub use file::{validate, UploadFile, UploadKind};
