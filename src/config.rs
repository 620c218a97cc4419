use std::{
    fs::{self},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use onvif::Credentials;
use serde::{Deserialize, Serialize};

pub const XADDR_ENV: &str = "ONVIF_XADDR";
pub const USER_ENV: &str = "ONVIF_USER";
pub const PASSWORD_ENV: &str = "ONVIF_PASSWORD";

const APP_NAME: &str = "onvif-probe";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigLogLevel {
    Trace,
    #[default]
    Warn,
    Debug,
    Error,
    Info,
}

impl FromStr for ConfigLogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "warn" => Ok(Self::Warn),
            "debug" => Ok(Self::Debug),
            "error" => Ok(Self::Error),
            "info" => Ok(Self::Info),
            _ => Err(anyhow::anyhow!("{} does not match any log level", s)),
        }
    }
}

impl From<tracing::Level> for ConfigLogLevel {
    fn from(value: tracing::Level) -> Self {
        match value {
            tracing::Level::TRACE => Self::Trace,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::ERROR => Self::Error,
            tracing::Level::INFO => Self::Info,
        }
    }
}

impl From<ConfigLogLevel> for tracing::Level {
    fn from(value: ConfigLogLevel) -> Self {
        match value {
            ConfigLogLevel::Trace => tracing::Level::TRACE,
            ConfigLogLevel::Warn => tracing::Level::WARN,
            ConfigLogLevel::Debug => tracing::Level::DEBUG,
            ConfigLogLevel::Error => tracing::Level::ERROR,
            ConfigLogLevel::Info => tracing::Level::INFO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub xaddr: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
    pub log_level: ConfigLogLevel,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            xaddr: None,
            user: None,
            password: None,
            timeout_secs: onvif::transport::DEFAULT_TIMEOUT.as_secs(),
            log_level: ConfigLogLevel::default(),
        }
    }
}

/// How the config file was obtained.
///
/// Reading happens before the tracer is installed, so the outcome is kept and reported later.
#[derive(Debug)]
pub enum ConfigStatus {
    /// File did not exist and was written with defaults
    Created,
    Valid,
    /// File failed to parse, valid fields were salvaged
    Repaired(toml::de::Error),
    /// File failed to parse and nothing could be salvaged
    Defaulted {
        error: toml::de::Error,
        repair_error: anyhow::Error,
    },
}

impl ConfigStatus {
    pub fn report(&self, path: &Path) {
        let path = path.display();
        match self {
            ConfigStatus::Created => {
                tracing::info!("Created configuration file with defaults: {path}")
            }
            ConfigStatus::Valid => tracing::debug!("Using config file: {path}"),
            ConfigStatus::Repaired(e) => {
                tracing::warn!("Failed to read config {path}, using salvaged fields: {e}")
            }
            ConfigStatus::Defaulted { error, repair_error } => tracing::error!(
                "Failed to read config {path}: {error}. Failed to repair it, using defaults: {repair_error}"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    created: bool,
}

impl ConfigFile {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join("config.toml")
    }

    /// Opens config file, creating it with defaults if it does not exist
    pub fn open(config_path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = config_path.as_ref().to_path_buf();
        match fs::OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|e| e.kind())
        {
            Err(ErrorKind::NotFound) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let default_config = TomlConfig::default();
                let mut file = fs::File::create_new(&path)?;
                file.write_all(toml::to_string_pretty(&default_config)?.as_bytes())?;
                Ok(Self {
                    path,
                    created: true,
                })
            }
            Err(e) => Err(anyhow::anyhow!(
                "Unknown fs error occured while opening config: {e}"
            )),
            Ok(_) => Ok(Self {
                path,
                created: false,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads contents of config, salvaging valid fields if it fails to parse
    pub fn read(&self) -> Result<(TomlConfig, ConfigStatus), anyhow::Error> {
        let buf = fs::read_to_string(&self.path)
            .with_context(|| format!("read config {}", self.path.display()))?;
        let read = match toml::from_str::<TomlConfig>(&buf) {
            Ok(config) if self.created => (config, ConfigStatus::Created),
            Ok(config) => (config, ConfigStatus::Valid),
            Err(error) => match repair_config(&buf) {
                Ok(config) => (config, ConfigStatus::Repaired(error)),
                Err(repair_error) => (
                    TomlConfig::default(),
                    ConfigStatus::Defaulted {
                        error,
                        repair_error,
                    },
                ),
            },
        };
        Ok(read)
    }
}

fn repair_config(raw: &str) -> Result<TomlConfig, anyhow::Error> {
    let default = TomlConfig::default();
    let parsed: toml::Table = toml::from_str(raw)?;
    let string_field = |name: &str| {
        parsed
            .get(name)
            .and_then(|v| v.as_str())
            .map(ToOwned::to_owned)
    };
    let timeout_secs = parsed
        .get("timeout_secs")
        .and_then(|v| v.as_integer())
        .and_then(|v| u64::try_from(v).ok())
        .unwrap_or(default.timeout_secs);
    let log_level = parsed
        .get("log_level")
        .and_then(|v| v.as_str())
        .and_then(|s| ConfigLogLevel::from_str(s).ok())
        .unwrap_or(default.log_level);
    Ok(TomlConfig {
        xaddr: string_field("xaddr"),
        user: string_field("user"),
        password: string_field("password"),
        timeout_secs,
        log_level,
    })
}

#[derive(Debug, Clone, Copy, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Manufacturer, model, firmware and serial number
    Info,
    /// Device clock
    DateTime,
    /// Network, events and streaming capabilities
    Capabilities,
    /// WS-Discovery mode
    DiscoveryMode,
    /// Configured scopes
    Scopes,
    /// Hostname and whether it comes from DHCP
    Hostname,
    /// DNS configuration
    Dns,
    /// Run every query
    All,
}

#[derive(Debug, Parser)]
#[command(version, about = "Query ONVIF camera device management service")]
pub struct Args {
    /// Device service address, e.g. http://192.168.1.64/onvif/device_service
    #[arg(short, long)]
    pub xaddr: Option<String>,
    #[arg(short, long)]
    pub user: Option<String>,
    #[arg(short, long)]
    pub password: Option<String>,
    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<tracing::Level>,
    /// Request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,
    /// Provide custom config location
    #[arg(short, long = "config")]
    pub config_path: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

/// Everything needed to talk to one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub xaddr: String,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
    pub log_level: ConfigLogLevel,
}

impl DeviceConfig {
    /// Merges cli arguments, environment and config file, in that order of priority
    pub fn resolve(
        args: &Args,
        file: TomlConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let xaddr = args
            .xaddr
            .clone()
            .or_else(|| env(XADDR_ENV))
            .or(file.xaddr)
            .with_context(|| {
                format!("Missing device address, pass it with --xaddr, {XADDR_ENV} environment variable or config file")
            })?;
        let user = args.user.clone().or_else(|| env(USER_ENV)).or(file.user);
        let password = args
            .password
            .clone()
            .or_else(|| env(PASSWORD_ENV))
            .or(file.password);
        let credentials = user.map(|user| Credentials::new(user, password.unwrap_or_default()));
        let timeout = Duration::from_secs(args.timeout.unwrap_or(file.timeout_secs));
        let log_level = args.log_level.map(Into::into).unwrap_or(file.log_level);

        Ok(Self {
            xaddr,
            credentials,
            timeout,
            log_level,
        })
    }
}
