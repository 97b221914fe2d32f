//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{net::SocketAddr, num::NonZeroUsize, path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub use cli::{
    ClipboardOverrides, CliArgs, Command, CommonOverrides, CopyArgs, ExportArgs, ListArgs,
    OutputFormat, RelatedArgs, RenderArgs, ServeArgs, ServeOverrides,
};

use crate::domain::posts::RELATED_POSTS_LIMIT;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const ENV_PREFIX: &str = "FOLIO";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
pub(crate) const DEFAULT_CLIPBOARD_COMMAND: &str = "wl-copy";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub clipboard: ClipboardSettings,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    /// `None` means the catalog bundled with the binary.
    pub catalog_path: Option<PathBuf>,
    pub related_limit: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct ClipboardSettings {
    pub command: String,
    pub args: Vec<String>,
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
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(" ")
            .with_list_parse_key("clipboard.args")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_command_overrides(cli.command.as_ref());

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
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
    content: RawContentSettings,
    clipboard: RawClipboardSettings,
}

impl RawSettings {
    fn apply_command_overrides(&mut self, command: Option<&Command>) {
        match command {
            Some(Command::Serve(args)) => self.apply_serve_overrides(&args.overrides),
            Some(Command::Render(args)) => self.apply_common_overrides(&args.overrides),
            Some(Command::Related(args)) => self.apply_common_overrides(&args.overrides),
            Some(Command::List(args)) => self.apply_common_overrides(&args.overrides),
            Some(Command::Copy(args)) => {
                self.apply_common_overrides(&args.overrides);
                self.apply_clipboard_overrides(&args.clipboard);
            }
            Some(Command::Export(args)) => self.apply_common_overrides(&args.overrides),
            None => self.apply_serve_overrides(&ServeOverrides::default()),
        }
    }

    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }

        self.apply_common_overrides(&overrides.common);
    }

    fn apply_common_overrides(&mut self, overrides: &CommonOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(path) = overrides.catalog_path.as_ref() {
            self.content.catalog_path = Some(path.clone());
        }
        if let Some(limit) = overrides.related_limit {
            self.content.related_limit = Some(limit);
        }
    }

    fn apply_clipboard_overrides(&mut self, overrides: &ClipboardOverrides) {
        if let Some(command) = overrides.command.as_ref() {
            self.clipboard.command = Some(command.clone());
            self.clipboard.args = Some(overrides.args.clone());
        } else if !overrides.args.is_empty() {
            self.clipboard.args = Some(overrides.args.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            clipboard,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            content: build_content_settings(content)?,
            clipboard: build_clipboard_settings(clipboard)?,
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

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let catalog_path = content
        .catalog_path
        .filter(|path| !path.as_os_str().is_empty());

    let related_limit = NonZeroUsize::new(content.related_limit.unwrap_or(RELATED_POSTS_LIMIT))
        .ok_or_else(|| LoadError::invalid("content.related_limit", "must be greater than zero"))?;

    Ok(ContentSettings {
        catalog_path,
        related_limit,
    })
}

fn build_clipboard_settings(
    clipboard: RawClipboardSettings,
) -> Result<ClipboardSettings, LoadError> {
    let command = clipboard
        .command
        .unwrap_or_else(|| DEFAULT_CLIPBOARD_COMMAND.to_string());
    if command.trim().is_empty() {
        return Err(LoadError::invalid(
            "clipboard.command",
            "command must not be empty",
        ));
    }

    Ok(ClipboardSettings {
        command,
        args: clipboard.args.unwrap_or_default(),
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
struct RawContentSettings {
    catalog_path: Option<PathBuf>,
    related_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawClipboardSettings {
    command: Option<String>,
    args: Option<Vec<String>>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}
