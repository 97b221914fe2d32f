use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

use crate::domain::posts::PostId;

/// Command-line arguments for the Folio binary.
#[derive(Debug, Parser)]
#[command(
    name = "folio",
    version,
    about = "Render structured blog content and preview it"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FOLIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve the read-only blog preview over HTTP.
    Serve(Box<ServeArgs>),
    /// Render one post to HTML or JSON.
    Render(RenderArgs),
    /// Show the posts related to a post.
    Related(RelatedArgs),
    /// List posts, optionally filtered.
    List(ListArgs),
    /// Copy a post's code block to the system clipboard.
    Copy(CopyArgs),
    /// Write the blog as static HTML files.
    Export(ExportArgs),
}

/// Overrides shared by every subcommand.
#[derive(Debug, Args, Default, Clone)]
pub struct CommonOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Load posts from this JSON file instead of the bundled catalog.
    #[arg(long = "catalog-path", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub catalog_path: Option<PathBuf>,

    /// Override how many related posts are shown.
    #[arg(long = "related-limit", value_name = "COUNT")]
    pub related_limit: Option<usize>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub common: CommonOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Post to render.
    #[arg(value_name = "ID")]
    pub id: PostId,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RelatedArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    #[arg(value_name = "ID")]
    pub id: PostId,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Case-insensitive match against title, excerpt and tags.
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Restrict to one category (`All` shows every category).
    #[arg(long, value_name = "NAME")]
    pub category: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ClipboardOverrides {
    /// Override the clipboard command (for example `xclip` or `pbcopy`).
    #[arg(long = "clipboard-command", value_name = "PROGRAM")]
    pub command: Option<String>,

    /// Arguments passed to the clipboard command; repeat for several.
    #[arg(long = "clipboard-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CopyArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    #[command(flatten)]
    pub clipboard: ClipboardOverrides,

    #[arg(value_name = "ID")]
    pub id: PostId,

    /// Code block number within the post, starting at 1.
    #[arg(value_name = "BLOCK")]
    pub block: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Directory to write the site into; created if missing.
    #[arg(value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub dir: PathBuf,
}
