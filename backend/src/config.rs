//! Runtime configuration loaded via OrthoConfig.
//!
//! Values come from `FITCOACH_*` environment variables and configuration
//! files, in OrthoConfig's usual precedence; the binary keeps its arguments
//! for subcommands. Every field is optional at load time; the accessors
//! below turn the raw values into adapter settings and report what is
//! missing.

use std::fmt;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{DEFAULT_URL_TTL, UploadSettings};
use crate::outbound::persistence::PoolConfig;
use crate::outbound::storage::{Addressing, Credentials, S3Settings};

const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while turning loaded settings into adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required setting `{field}`")]
    Missing { field: &'static str },
    #[error("setting `{field}` is not a valid URL: {message}")]
    InvalidUrl { field: &'static str, message: String },
    #[error("setting `{field}` must be greater than zero")]
    Zero { field: &'static str },
}

/// Settings for the backend binary.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FITCOACH")]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Maximum number of pooled connections.
    pub database_pool_size: Option<u32>,
    /// Object storage endpoint used by the backend itself.
    pub storage_endpoint: Option<String>,
    /// Endpoint clients reach; presigned URLs are issued against it.
    pub storage_public_endpoint: Option<String>,
    pub storage_region: Option<String>,
    pub storage_bucket: Option<String>,
    pub storage_access_key_id: Option<String>,
    pub storage_secret_access_key: Option<String>,
    /// Address objects as `bucket.host/key` instead of `host/bucket/key`.
    #[ortho_config(default = false)]
    pub storage_virtual_hosted: bool,
    pub storage_request_timeout_secs: Option<u64>,
    pub upload_url_ttl_secs: Option<u64>,
    pub download_url_ttl_secs: Option<u64>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("database_pool_size", &self.database_pool_size)
            .field("storage_endpoint", &self.storage_endpoint)
            .field("storage_public_endpoint", &self.storage_public_endpoint)
            .field("storage_region", &self.storage_region)
            .field("storage_bucket", &self.storage_bucket)
            .field("storage_access_key_id", &self.storage_access_key_id)
            .field(
                "storage_secret_access_key",
                &self.storage_secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("storage_virtual_hosted", &self.storage_virtual_hosted)
            .field("storage_request_timeout_secs", &self.storage_request_timeout_secs)
            .field("upload_url_ttl_secs", &self.upload_url_ttl_secs)
            .field("download_url_ttl_secs", &self.download_url_ttl_secs)
            .finish()
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ConfigError> {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or(ConfigError::Missing { field })
}

fn parse_url(raw: &str, field: &'static str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|err| ConfigError::InvalidUrl {
        field,
        message: err.to_string(),
    })
}

fn seconds(
    value: Option<u64>,
    field: &'static str,
    fallback: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(fallback),
        Some(0) => Err(ConfigError::Zero { field }),
        Some(secs) => Ok(Duration::from_secs(secs)),
    }
}

impl AppSettings {
    /// Pool configuration for the entity store.
    pub fn database(&self) -> Result<PoolConfig, ConfigError> {
        let url = required(self.database_url.as_deref(), "database_url")?;
        let size = match self.database_pool_size {
            Some(0) => return Err(ConfigError::Zero { field: "database_pool_size" }),
            Some(size) => size,
            None => DEFAULT_POOL_SIZE,
        };
        Ok(PoolConfig::new(url).with_max_size(size))
    }

    /// Connection settings for the object storage bucket.
    pub fn storage(&self) -> Result<S3Settings, ConfigError> {
        let endpoint = parse_url(
            required(self.storage_endpoint.as_deref(), "storage_endpoint")?,
            "storage_endpoint",
        )?;
        let public_endpoint = self
            .storage_public_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_url(raw, "storage_public_endpoint"))
            .transpose()?;
        let bucket = required(self.storage_bucket.as_deref(), "storage_bucket")?;
        let access_key_id =
            required(self.storage_access_key_id.as_deref(), "storage_access_key_id")?;
        let secret_access_key = required(
            self.storage_secret_access_key.as_deref(),
            "storage_secret_access_key",
        )?;

        Ok(S3Settings {
            endpoint,
            public_endpoint,
            region: self
                .storage_region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_owned()),
            bucket: bucket.to_owned(),
            addressing: if self.storage_virtual_hosted {
                Addressing::VirtualHosted
            } else {
                Addressing::Path
            },
            credentials: Credentials::new(access_key_id, secret_access_key),
            request_timeout: seconds(
                self.storage_request_timeout_secs,
                "storage_request_timeout_secs",
                DEFAULT_STORAGE_TIMEOUT,
            )?,
        })
    }

    /// Lifetimes of the presigned URLs handed to clients.
    pub fn uploads(&self) -> Result<UploadSettings, ConfigError> {
        Ok(UploadSettings {
            upload_url_ttl: seconds(
                self.upload_url_ttl_secs,
                "upload_url_ttl_secs",
                DEFAULT_URL_TTL,
            )?,
            download_url_ttl: seconds(
                self.download_url_ttl_secs,
                "download_url_ttl_secs",
                DEFAULT_URL_TTL,
            )?,
        })
    }
}
