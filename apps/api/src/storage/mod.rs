//! Object storage relay for uploaded CVs. Uploaded objects are never deleted.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::codegen::generate_code;

pub mod s3;

#[derive(Debug, Error)]
#[error("object storage upload failed: {0}")]
pub struct StorageError(pub String);

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `body` under `key` and returns a durable fetch URL.
    async fn put(&self, key: &str, body: Bytes, content_type: &str)
        -> Result<String, StorageError>;
}

/// Folder all CV uploads land in.
pub const CV_FOLDER: &str = "cv_uploads";

/// Random characters appended after the timestamp.
const KEY_NONCE_LENGTH: usize = 6;

/// Builds `cv_uploads/<stem>_<timestamp>_<nonce>.<ext>` from the client's file
/// name. Same-millisecond uploads of one file name get different keys.
pub fn cv_object_key(file_name: &str, now: DateTime<Utc>) -> String {
    let nonce = generate_code(KEY_NONCE_LENGTH).to_ascii_lowercase();
    object_key(file_name, now, &nonce)
}

/// The stem is reduced to a path-safe charset.
fn object_key(file_name: &str, now: DateTime<Utc>, nonce: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    };

    let mut safe_stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe_stem.is_empty() {
        safe_stem.push_str("cv");
    }

    let stamp = now.format("%Y%m%d_%H%M%S_%3f");
    let name = format!("{safe_stem}_{stamp}_{nonce}");
    match ext {
        Some(ext) => format!("{CV_FOLDER}/{name}.{}", ext.to_ascii_lowercase()),
        None => format!("{CV_FOLDER}/{name}"),
    }
}
