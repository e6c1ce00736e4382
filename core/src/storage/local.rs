use async_trait::async_trait;
use camino::Utf8PathBuf as PathBuf;
use eyre::{bail, Context, Result};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{instrument, Instrument};

use super::{is_valid_key, StorageProvider, StorageReadError};

/// Files in a local directory, for development without a storage account
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: PathBuf) -> LocalFileStorage {
        LocalFileStorage { root }
    }
}

#[async_trait]
impl StorageProvider for LocalFileStorage {
    #[instrument(skip(self), level = "debug")]
    async fn open_read_stream(
        &self,
        key: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, StorageReadError> {
        use tokio::io::ErrorKind;
        if !is_valid_key(key) {
            return Err(StorageReadError::FileNotFound(key.to_owned()));
        }
        let open = tokio::fs::OpenOptions::new()
            .read(true)
            .open(self.root.join(key))
            .in_current_span()
            .await;
        match open {
            Ok(f) => Ok(Box::new(f)),
            Err(err) => Err(match err.kind() {
                ErrorKind::NotFound => StorageReadError::FileNotFound(key.to_owned()),
                _ => StorageReadError::IOError { source: err },
            }),
        }
    }

    #[instrument(skip(self, data), fields(len = data.len()), level = "debug")]
    async fn write(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<()> {
        if !is_valid_key(key) {
            bail!("invalid storage key '{}'", key);
        }
        tokio::fs::create_dir_all(&self.root)
            .await
            .wrap_err("could not create storage directory")?;
        let mut file = tokio::fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(self.root.join(key))
            .await
            .wrap_err("error opening file for writing")?;
        file.write_all(&data)
            .await
            .wrap_err("error writing file")?;
        file.flush().await.wrap_err("error writing file")?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<bool> {
        if !is_valid_key(key) {
            return Ok(false);
        }
        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == tokio::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err).wrap_err("error deleting file"),
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn exists(&self, key: &str) -> Result<bool> {
        if !is_valid_key(key) {
            return Ok(false);
        }
        tokio::fs::try_exists(self.root.join(key))
            .await
            .wrap_err("error checking if path exists")
    }
}

#[cfg(test)]
mod test {
    use claims::{assert_err, assert_matches, assert_ok};
    use pretty_assertions::assert_eq;
    use tokio::io::AsyncReadExt;

    use super::*;
    use crate::storage::new_file_key;

    #[tokio::test]
    async fn write_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let root = PathBuf::from_path_buf(dir.path().join("files")).unwrap();
        let storage = LocalFileStorage::new(root);
        let key = new_file_key("worksheet.pdf");
        assert!(!assert_ok!(storage.exists(&key).await));
        assert_ok!(
            storage
                .write(&key, b"%PDF-1.7".to_vec(), "application/pdf")
                .await
        );
        assert!(assert_ok!(storage.exists(&key).await));
        // keys are never overwritten
        assert_err!(storage.write(&key, Vec::new(), "application/pdf").await);

        let mut read = assert_ok!(storage.open_read_stream(&key).await);
        let mut contents = Vec::new();
        assert_ok!(read.read_to_end(&mut contents).await);
        assert_eq!(contents, b"%PDF-1.7");

        assert!(assert_ok!(storage.delete(&key).await));
        assert!(!assert_ok!(storage.delete(&key).await));
        assert_matches!(
            storage.open_read_stream(&key).await.err(),
            Some(StorageReadError::FileNotFound(_))
        );
    }

    #[tokio::test]
    async fn invalid_keys_do_not_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = PathBuf::from_path_buf(dir.path().to_owned()).unwrap();
        let storage = LocalFileStorage::new(root);
        assert_matches!(
            storage.open_read_stream("../etc/passwd").await.err(),
            Some(StorageReadError::FileNotFound(_))
        );
        assert_err!(storage.write("../evil", Vec::new(), "text/plain").await);
    }
}
