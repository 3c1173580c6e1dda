//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::{CliArgs, Command, RenderArgs, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "praxis";
const ENV_PREFIX: &str = "PRAXIS";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SITE_TITLE: &str = "Praxis";
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ACCESS_REALM: &str = "Praxis";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub site: SiteSettings,
    pub content: ContentSettings,
    pub mail: MailSettings,
    pub access: AccessSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub tagline: String,
    pub base_url: String,
    pub footer_copy: String,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub enum MailTransportKind {
    /// Log messages instead of sending them.
    Log,
    /// JSON POST to a mail relay.
    Http(HttpMailSettings),
}

#[derive(Debug, Clone)]
pub struct HttpMailSettings {
    pub endpoint: Url,
    pub api_token: Option<String>,
    pub recipient: String,
    pub sender_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub transport: MailTransportKind,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AccessSettings {
    pub credentials: Option<AccessCredentials>,
    pub realm: String,
}

#[derive(Clone)]
pub struct AccessCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AccessCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    load_with_environment(cli, Environment::with_prefix(ENV_PREFIX).separator("__"))
}

fn load_with_environment(cli: &CliArgs, environment: Environment) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(environment);

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Render(_)) | None => {}
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    site: RawSiteSettings,
    content: RawContentSettings,
    mail: RawMailSettings,
    access: RawAccessSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(directory) = overrides.content_directory.as_ref() {
            self.content.directory = Some(directory.clone());
        }
        if let Some(enabled) = overrides.access_enabled {
            self.access.enabled = Some(enabled);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            site,
            content,
            mail,
            access,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            site: build_site_settings(site)?,
            content: build_content_settings(content)?,
            mail: build_mail_settings(mail)?,
            access: build_access_settings(access)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let title = non_empty(site.title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());

    let base_url = non_empty(site.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let parsed = Url::parse(&base_url)
        .map_err(|err| LoadError::invalid("site.base_url", format!("failed to parse: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "site.base_url",
            "scheme must be http or https",
        ));
    }

    let footer_copy = non_empty(site.footer_copy).unwrap_or_else(|| format!("© {title}"));

    Ok(SiteSettings {
        tagline: site.tagline.unwrap_or_default(),
        base_url: base_url.trim_end_matches('/').to_string(),
        footer_copy,
        title,
    })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let directory = content
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR));
    if directory.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "content.directory",
            "path must not be empty",
        ));
    }

    Ok(ContentSettings { directory })
}

fn build_mail_settings(mail: RawMailSettings) -> Result<MailSettings, LoadError> {
    let timeout_secs = mail.timeout_seconds.unwrap_or(DEFAULT_MAIL_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "mail.timeout_seconds",
            "must be greater than zero",
        ));
    }

    let transport = match mail.transport.as_deref().map(str::trim) {
        None | Some("") | Some("log") => MailTransportKind::Log,
        Some("http") => {
            let endpoint = non_empty(mail.endpoint).ok_or_else(|| {
                LoadError::invalid("mail.endpoint", "required when mail.transport = \"http\"")
            })?;
            let endpoint = Url::parse(&endpoint).map_err(|err| {
                LoadError::invalid("mail.endpoint", format!("failed to parse: {err}"))
            })?;
            let recipient = non_empty(mail.recipient).ok_or_else(|| {
                LoadError::invalid("mail.recipient", "required when mail.transport = \"http\"")
            })?;

            MailTransportKind::Http(HttpMailSettings {
                endpoint,
                api_token: non_empty(mail.api_token),
                recipient,
                sender_address: non_empty(mail.sender_address),
            })
        }
        Some(other) => {
            return Err(LoadError::invalid(
                "mail.transport",
                format!("unknown transport `{other}` (expected `log` or `http`)"),
            ));
        }
    };

    Ok(MailSettings {
        transport,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_access_settings(access: RawAccessSettings) -> Result<AccessSettings, LoadError> {
    let realm = non_empty(access.realm).unwrap_or_else(|| DEFAULT_ACCESS_REALM.to_string());
    if realm.contains('"') {
        return Err(LoadError::invalid(
            "access.realm",
            "must not contain double quotes",
        ));
    }

    if !access.enabled.unwrap_or(false) {
        return Ok(AccessSettings {
            credentials: None,
            realm,
        });
    }

    let username = non_empty(access.username)
        .ok_or_else(|| LoadError::invalid("access.username", "required when access is enabled"))?;
    if username.contains(':') {
        return Err(LoadError::invalid(
            "access.username",
            "must not contain `:`",
        ));
    }
    let password = access
        .password
        .filter(|password| !password.is_empty())
        .ok_or_else(|| LoadError::invalid("access.password", "required when access is enabled"))?;

    Ok(AccessSettings {
        credentials: Some(AccessCredentials { username, password }),
        realm,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    tagline: Option<String>,
    base_url: Option<String>,
    footer_copy: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMailSettings {
    transport: Option<String>,
    endpoint: Option<String>,
    api_token: Option<String>,
    recipient: Option<String>,
    sender_address: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAccessSettings {
    enabled: Option<bool>,
    username: Option<String>,
    password: Option<String>,
    realm: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
