mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mddb_core::index::LinkType;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "mddb",
    version,
    about = "Index markdown content folders and query files, tags and links"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Path to the config file (defaults to $XDG_CONFIG_HOME/mddb/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use from the config file
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Content root, overriding the profile
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Database file, overriding the profile
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved paths
    Doctor,

    /// Rebuild the index from the content root
    Index(IndexArgs),

    /// List indexed files
    List(ListArgs),

    /// List every tag in the index
    Tags(TagsArgs),

    /// Show links from or to a file
    Links(LinksArgs),
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Skip files whose logical path matches this regex (repeatable)
    #[arg(long = "ignore", value_name = "REGEX")]
    pub ignore: Vec<String>,

    /// Print every file as it is processed
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Quiet,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only files under this folder (logical path prefix)
    #[arg(long)]
    pub folder: Option<String>,

    /// Only files carrying this tag (repeatable, any match)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Only files with this extension (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Only the file with exactly this logical path
    #[arg(long)]
    pub url_path: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Shorthand for --output json
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,

    /// Shorthand for --output quiet (paths only)
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct TagsArgs {
    /// Print tags as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LinkKind {
    Normal,
    Embed,
}

impl From<LinkKind> for LinkType {
    fn from(kind: LinkKind) -> Self {
        match kind {
            LinkKind::Normal => LinkType::Normal,
            LinkKind::Embed => LinkType::Embed,
        }
    }
}

#[derive(Debug, Args)]
pub struct LinksArgs {
    /// Logical path of the file (e.g. "blog/post")
    pub url_path: String,

    /// Show incoming links instead of outgoing ones
    #[arg(long)]
    pub backlinks: bool,

    /// Only links of this type
    #[arg(long = "type", value_enum)]
    pub link_type: Option<LinkKind>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Shorthand for --output json
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,

    /// Shorthand for --output quiet (paths only)
    #[arg(long, short)]
    pub quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(&cli.global),
        Commands::Index(args) => cmd::index::run(&cli.global, args),
        Commands::List(args) => cmd::list::run(&cli.global, args),
        Commands::Tags(args) => cmd::tags::run(&cli.global, args),
        Commands::Links(args) => cmd::links::run(&cli.global, args),
    }
}
