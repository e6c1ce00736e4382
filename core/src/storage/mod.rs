use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use eyre::Result;
use tokio::io::AsyncRead;
use uuid::Uuid;

mod blob;
mod local;

pub use blob::{blob_sas_query, sas_string_to_sign, BlobStorage, SAS_VERSION};
pub use local::LocalFileStorage;

pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Uploaded files. Every object is addressed by a flat `key` of the form
/// `{uuid}.{extension}`.
#[async_trait]
#[enum_dispatch(Storage)]
pub trait StorageProvider: Clone {
    async fn open_read_stream(
        &self,
        key: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, StorageReadError>;
    async fn write(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;
    /// Returns whether there was an object to delete.
    async fn delete(&self, key: &str) -> Result<bool>;
    async fn exists(&self, key: &str) -> Result<bool>;
}

#[derive(thiserror::Error, Debug)]
pub enum StorageReadError {
    #[error("File with key '{0}' does not exist")]
    FileNotFound(String),
    #[error(transparent)]
    IOError {
        #[from]
        source: tokio::io::Error,
    },
    #[error(transparent)]
    Unknown {
        #[from]
        source: eyre::Report,
    },
}

#[enum_dispatch]
pub enum Storage {
    LocalFileStorage,
    BlobStorage,
}

impl Clone for Storage {
    fn clone(&self) -> Self {
        match self {
            Self::LocalFileStorage(a) => Self::LocalFileStorage(a.clone()),
            Self::BlobStorage(a) => Self::BlobStorage(a.clone()),
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalFileStorage(a) => a.fmt(f),
            Self::BlobStorage(a) => a.fmt(f),
        }
    }
}

/// New random key keeping the (lowercased) extension of the uploaded file
pub fn new_file_key(file_name: &str) -> String {
    let id = Uuid::new_v4();
    match file_extension(file_name) {
        Some(ext) => format!("{}.{}", id.as_hyphenated(), ext),
        None => id.as_hyphenated().to_string(),
    }
}

pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Keys are generated by `new_file_key`, anything else can not exist.
pub fn is_valid_key(key: &str) -> bool {
    let (id, ext) = match key.split_once('.') {
        Some((id, ext)) => (id, Some(ext)),
        None => (key, None),
    };
    Uuid::parse_str(id).is_ok()
        && ext.map_or(true, |ext| {
            !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
}
