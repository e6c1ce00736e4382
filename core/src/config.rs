use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use color_eyre::eyre::{bail, Context, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::model::GroupId;

pub const CLIENT_SECRET_ENV: &str = "LEARNNOW_CLIENT_SECRET";
pub const BING_KEY_ENV: &str = "LEARNNOW_BING_KEY";
pub const BLOB_ACCOUNT_KEY_ENV: &str = "LEARNNOW_BLOB_ACCOUNT_KEY";

const DEFAULT_MEMBERSHIP_TTL_MINUTES: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlServer {
    address: Option<String>,
    port: Option<u16>,
    app_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlDataDir {
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlAzureAd {
    tenant_id: String,
    client_id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlSecurityGroups {
    teacher_group_id: String,
    admin_group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlBing {
    subscription_key: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlBlobStorage {
    account_name: String,
    account_key: Option<String>,
    container_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlCache {
    membership_ttl_minutes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlConfig {
    #[serde(rename = "Server")]
    pub server: TomlServer,
    #[serde(rename = "DataDir")]
    pub data_dir: TomlDataDir,
    #[serde(rename = "AzureAd")]
    pub azure_ad: TomlAzureAd,
    #[serde(rename = "SecurityGroups")]
    pub security_groups: TomlSecurityGroups,
    #[serde(rename = "Bing")]
    pub bing: Option<TomlBing>,
    #[serde(rename = "BlobStorage")]
    pub blob_storage: Option<TomlBlobStorage>,
    #[serde(rename = "Cache")]
    pub cache: Option<TomlCache>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Where the Teams tab frontend is served, used in task module URLs
    pub app_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureAdConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroups {
    pub teacher_group_id: GroupId,
    pub admin_group_id: GroupId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingConfig {
    pub subscription_key: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobStorageConfig {
    pub account_name: String,
    pub account_key: String,
    pub container_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub membership_ttl_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub data_dir: DataDir,
    pub azure_ad: AzureAdConfig,
    pub security_groups: SecurityGroups,
    pub bing: Option<BingConfig>,
    pub blob_storage: Option<BlobStorageConfig>,
    pub cache: CacheConfig,
}

pub async fn read_config(path: &Path) -> Result<Config> {
    let toml_str = tokio::fs::read_to_string(path)
        .await
        .context(format!("Error reading config file {}", path))?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    parse_config(&toml_str, base_dir, |key| std::env::var(key).ok())
}

/// `env` looks up secrets that override values from the file.
pub fn parse_config(
    toml_str: &str,
    base_dir: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let toml_config: TomlConfig = toml::from_str(toml_str).context("Error parsing config file")?;
    let server = ServerConfig {
        address: toml_config
            .server
            .address
            .unwrap_or_else(|| "127.0.0.1".to_owned()),
        port: toml_config.server.port.unwrap_or(3000),
        app_base_url: toml_config
            .server
            .app_base_url
            .trim_end_matches('/')
            .to_owned(),
    };
    let data_dir = {
        let path = PathBuf::from(toml_config.data_dir.path);
        let path = if path.is_relative() {
            base_dir.join(path)
        } else {
            path
        };
        DataDir { path }
    };
    let client_secret = match env(CLIENT_SECRET_ENV).or(toml_config.azure_ad.client_secret) {
        Some(secret) => secret,
        None => bail!(
            "AzureAd.client_secret is not set in config file or {}",
            CLIENT_SECRET_ENV
        ),
    };
    let azure_ad = AzureAdConfig {
        tenant_id: toml_config.azure_ad.tenant_id,
        client_id: toml_config.azure_ad.client_id,
        client_secret,
    };
    let security_groups = SecurityGroups {
        teacher_group_id: parse_group_id(
            &toml_config.security_groups.teacher_group_id,
            "teacher_group_id",
        )?,
        admin_group_id: parse_group_id(
            &toml_config.security_groups.admin_group_id,
            "admin_group_id",
        )?,
    };
    let bing = match toml_config.bing {
        Some(toml_bing) => {
            let subscription_key = match env(BING_KEY_ENV).or(toml_bing.subscription_key) {
                Some(key) => key,
                None => bail!(
                    "Bing.subscription_key is not set in config file or {}",
                    BING_KEY_ENV
                ),
            };
            Some(BingConfig {
                subscription_key,
                endpoint: toml_bing
                    .endpoint
                    .unwrap_or_else(|| "https://api.bing.microsoft.com".to_owned())
                    .trim_end_matches('/')
                    .to_owned(),
            })
        }
        None => None,
    };
    let blob_storage = match toml_config.blob_storage {
        Some(toml_blob) => {
            let account_key = match env(BLOB_ACCOUNT_KEY_ENV).or(toml_blob.account_key) {
                Some(key) => key,
                None => bail!(
                    "BlobStorage.account_key is not set in config file or {}",
                    BLOB_ACCOUNT_KEY_ENV
                ),
            };
            Some(BlobStorageConfig {
                account_name: toml_blob.account_name,
                account_key,
                container_name: toml_blob.container_name,
            })
        }
        None => None,
    };
    let cache = CacheConfig {
        membership_ttl_minutes: toml_config
            .cache
            .and_then(|cache| cache.membership_ttl_minutes)
            .unwrap_or(DEFAULT_MEMBERSHIP_TTL_MINUTES),
    };
    Ok(Config {
        server,
        data_dir,
        azure_ad,
        security_groups,
        bing,
        blob_storage,
        cache,
    })
}

fn parse_group_id(value: &str, field: &str) -> Result<GroupId> {
    let uuid = Uuid::parse_str(value)
        .wrap_err_with(|| format!("SecurityGroups.{} is not a valid GUID", field))?;
    if uuid.is_nil() {
        bail!("SecurityGroups.{} must not be the empty GUID", field);
    }
    Ok(GroupId(uuid))
}
