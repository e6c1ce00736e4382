use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use eyre::{bail, eyre, Context, Result};
use futures::TryStreamExt;
use hmac::{Hmac, Mac};
use reqwest::{StatusCode, Url};
use sha2::Sha256;
use tokio::io::AsyncRead;
use tracing::instrument;

use super::{is_valid_key, StorageProvider, StorageReadError};
use crate::config::BlobStorageConfig;

type HmacSha256 = Hmac<Sha256>;

pub const SAS_VERSION: &str = "2020-12-06";
const SAS_LIFETIME: Duration = Duration::from_secs(15 * 60);

/// Azure Blob Storage container, authorized with short lived service SAS
/// tokens signed with the account key.
#[derive(Clone)]
pub struct BlobStorage {
    http: reqwest::Client,
    config: BlobStorageConfig,
}

impl std::fmt::Debug for BlobStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStorage")
            .field("account_name", &self.config.account_name)
            .field("container_name", &self.config.container_name)
            .finish_non_exhaustive()
    }
}

impl BlobStorage {
    pub fn new(config: BlobStorageConfig) -> Result<BlobStorage> {
        STANDARD
            .decode(&config.account_key)
            .wrap_err("BlobStorage account key is not valid base64")?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .wrap_err("error building http client")?;
        Ok(BlobStorage { http, config })
    }

    /// Blob URL with a SAS granting `permissions` for the next 15 minutes
    fn signed_url(&self, key: &str, permissions: &str) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "https://{}.blob.core.windows.net/{}/{}",
            self.config.account_name, self.config.container_name, key
        ))
        .wrap_err("invalid blob url")?;
        let expiry = Utc::now()
            + chrono::Duration::from_std(SAS_LIFETIME).wrap_err("invalid SAS lifetime")?;
        let query = blob_sas_query(
            &self.config.account_name,
            &self.config.account_key,
            &self.config.container_name,
            key,
            permissions,
            expiry,
        )?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }
}

/// The string-to-sign of a blob service SAS for version 2020-12-06.
/// Unused optional fields (start, identifier, ip, snapshot, encryption scope,
/// response headers) are left empty.
pub fn sas_string_to_sign(
    account_name: &str,
    container_name: &str,
    blob_name: &str,
    permissions: &str,
    expiry: DateTime<Utc>,
) -> String {
    let canonicalized_resource = format!("/blob/{}/{}/{}", account_name, container_name, blob_name);
    [
        permissions,
        "",
        &format_sas_time(expiry),
        &canonicalized_resource,
        "",
        "",
        "https",
        SAS_VERSION,
        "b",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
    ]
    .join("\n")
}

/// Query parameters of a blob service SAS, signature not yet url encoded
pub fn blob_sas_query(
    account_name: &str,
    account_key: &str,
    container_name: &str,
    blob_name: &str,
    permissions: &str,
    expiry: DateTime<Utc>,
) -> Result<Vec<(&'static str, String)>> {
    let key = STANDARD
        .decode(account_key)
        .wrap_err("account key is not valid base64")?;
    let mut mac = HmacSha256::new_from_slice(&key).map_err(|err| eyre!("{}", err))?;
    let string_to_sign =
        sas_string_to_sign(account_name, container_name, blob_name, permissions, expiry);
    mac.update(string_to_sign.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());
    Ok(vec![
        ("sv", SAS_VERSION.to_owned()),
        ("sr", "b".to_owned()),
        ("sp", permissions.to_owned()),
        ("se", format_sas_time(expiry)),
        ("spr", "https".to_owned()),
        ("sig", signature),
    ])
}

fn format_sas_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl StorageProvider for BlobStorage {
    #[instrument(skip(self), level = "debug")]
    async fn open_read_stream(
        &self,
        key: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, StorageReadError> {
        if !is_valid_key(key) {
            return Err(StorageReadError::FileNotFound(key.to_owned()));
        }
        let url = self.signed_url(key, "r")?;
        let response = self
            .http
            .get(url)
            .header("x-ms-version", SAS_VERSION)
            .send()
            .await
            .wrap_err("error requesting blob")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageReadError::FileNotFound(key.to_owned()));
        }
        let response = response
            .error_for_status()
            .wrap_err("blob storage returned an error")?;
        let stream = response.bytes_stream().map_err(|e| {
            let kind = if e.is_timeout() {
                std::io::ErrorKind::TimedOut
            } else {
                std::io::ErrorKind::Other
            };
            tokio::io::Error::new(kind, e)
        });
        Ok(Box::new(tokio_util::io::StreamReader::new(stream)))
    }

    #[instrument(skip(self, data), fields(len = data.len()), level = "debug")]
    async fn write(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        if !is_valid_key(key) {
            bail!("invalid storage key '{}'", key);
        }
        let url = self.signed_url(key, "cw")?;
        self.http
            .put(url)
            .header("x-ms-version", SAS_VERSION)
            .header("x-ms-blob-type", "BlockBlob")
            // fail instead of overwriting an existing blob
            .header("If-None-Match", "*")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .wrap_err("error uploading blob")?
            .error_for_status()
            .wrap_err("blob storage returned an error for upload")?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<bool> {
        if !is_valid_key(key) {
            return Ok(false);
        }
        let url = self.signed_url(key, "d")?;
        let response = self
            .http
            .delete(url)
            .header("x-ms-version", SAS_VERSION)
            .send()
            .await
            .wrap_err("error deleting blob")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        response
            .error_for_status()
            .wrap_err("blob storage returned an error for delete")?;
        Ok(true)
    }

    #[instrument(skip(self), level = "debug")]
    async fn exists(&self, key: &str) -> Result<bool> {
        if !is_valid_key(key) {
            return Ok(false);
        }
        let url = self.signed_url(key, "r")?;
        let response = self
            .http
            .head(url)
            .header("x-ms-version", SAS_VERSION)
            .send()
            .await
            .wrap_err("error requesting blob properties")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        response
            .error_for_status()
            .wrap_err("blob storage returned an error for blob properties")?;
        Ok(true)
    }
}
