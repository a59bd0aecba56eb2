use crate::error::{ParseNumberSnafu, RosterError, RosterResult};
use snafu::ResultExt;
use std::{env::VarError, path::PathBuf, sync::Arc};

const DEFAULT_SERVER_IP: &str = "127.0.0.1:8080";
const DEFAULT_DB_PATH: &str = "db/school.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
const DEFAULT_IMAGE: &str = "static/images/account.jpg";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_ip: Arc<str>,
    max_upload_bytes: usize,
    db_config: Arc<DbConfig>,
    asset_config: Arc<AssetConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Self::from_lookup(dotenvy::var)
    }

    ///`lookup` is asked for each variable by name, anything reporting `NotPresent` falls back to a default
    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RosterResult<Self> {
        let server_ip = optional_var(&lookup, "ROSTER_SERVER_IP")?
            .unwrap_or_else(|| DEFAULT_SERVER_IP.to_string());
        let max_upload_bytes = match optional_var(&lookup, "ROSTER_MAX_UPLOAD_BYTES")? {
            Some(raw) => raw.trim().parse().context(ParseNumberSnafu {
                name: "ROSTER_MAX_UPLOAD_BYTES",
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            server_ip: server_ip.into(),
            max_upload_bytes,
            db_config: Arc::new(DbConfig::from_lookup(&lookup)?),
            asset_config: Arc::new(AssetConfig::from_lookup(&lookup)?),
        })
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    pub const fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub fn asset_config(&self) -> Arc<AssetConfig> {
        self.asset_config.clone()
    }
}

#[derive(Debug)]
pub struct DbConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl DbConfig {
    fn from_lookup(
        lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RosterResult<Self> {
        let path = optional_var(lookup, "ROSTER_DB_PATH")?
            .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from);
        let max_connections = match optional_var(lookup, "ROSTER_DB_MAX_CONNECTIONS")? {
            Some(raw) => raw.trim().parse().context(ParseNumberSnafu {
                name: "ROSTER_DB_MAX_CONNECTIONS",
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            path,
            max_connections,
        })
    }
}

#[derive(Debug)]
pub struct AssetConfig {
    ///served under `/static`
    pub static_dir: PathBuf,
    pub upload_dir: PathBuf,
    ///stored verbatim in the `image` column of students without an upload
    pub default_image: String,
}

impl AssetConfig {
    fn from_lookup(
        lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RosterResult<Self> {
        let get = |name, default: &str| -> RosterResult<String> {
            Ok(optional_var(lookup, name)?.unwrap_or_else(|| default.to_string()))
        };

        Ok(Self {
            static_dir: get("ROSTER_STATIC_DIR", DEFAULT_STATIC_DIR)?.into(),
            upload_dir: get("ROSTER_UPLOAD_DIR", DEFAULT_UPLOAD_DIR)?.into(),
            default_image: get("ROSTER_DEFAULT_IMAGE", DEFAULT_IMAGE)?,
        })
    }
}

fn optional_var(
    lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    name: &'static str,
) -> RosterResult<Option<String>> {
    match lookup(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(source) => Err(RosterError::BadEnvVar { source, name }),
    }
}
