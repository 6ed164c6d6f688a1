use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use labinv_infra::AppConfig;
use labinv_inventory::TaxonomyKind;
use labinv_observability::LogFormat;

#[derive(Parser)]
#[command(name = "labinv", about = "Lab inventory: storage units, items and QR deep links", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Inventory document (overrides LABINV_DATA_FILE)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Base URL used in deep links (overrides LABINV_APP_URL)
    #[arg(long, global = true)]
    pub app_url: Option<String>,

    /// Log output format (overrides LABINV_LOG_FORMAT)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormatArg>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the environment configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) -> anyhow::Result<()> {
        if let Some(path) = &self.data_file {
            config.data_file = path.clone();
        }
        if let Some(url) = &self.app_url {
            config.app_url = labinv_infra::config::parse_app_url("--app-url", url.clone())?;
        }
        if let Some(format) = self.log_format {
            config.log_format = format.into();
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the seed document if none exists
    Init,
    /// Show counts and every storage unit
    Dashboard,
    /// Manage storage units
    #[command(subcommand)]
    Storage(StorageCommand),
    /// Manage items inside a storage unit
    #[command(subcommand)]
    Item(ItemCommand),
    /// List items across all storage units
    Items(ItemsArgs),
    /// Manage categories, statuses and storage types
    #[command(subcommand)]
    Taxonomy(TaxonomyCommand),
    /// Print the deep link to a storage unit (or to the app)
    Link(LinkArgs),
    /// Write the QR code for a storage unit (or for the app)
    Qr(QrArgs),
}

#[derive(Subcommand)]
pub enum StorageCommand {
    /// List storage units
    List,
    /// Show a storage unit and its items
    Show(ShowStorageArgs),
    /// Create a storage unit
    Add(AddStorageArgs),
    /// Edit a storage unit's fields
    Edit(EditStorageArgs),
    /// Delete a storage unit and all of its items
    Rm(RemoveStorageArgs),
}

#[derive(Args)]
pub struct ShowStorageArgs {
    pub storage: String,
    /// Also write the storage's QR code to this file
    #[arg(long)]
    pub qr: Option<PathBuf>,
}

#[derive(Args)]
pub struct AddStorageArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub location: String,
    /// One of the configured storage types
    #[arg(long = "type")]
    pub storage_type: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Args)]
pub struct EditStorageArgs {
    pub storage: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long = "type")]
    pub storage_type: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct RemoveStorageArgs {
    pub storage: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum ItemCommand {
    /// Add an item to a storage unit
    Add(AddItemArgs),
    /// Edit an item
    Edit(EditItemArgs),
    /// Delete an item
    Rm(RemoveItemArgs),
}

/// Selects an item by id or by its 1-based position in `storage show`.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct ItemRefArgs {
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub position: Option<usize>,
}

#[derive(Args)]
pub struct AddItemArgs {
    pub storage: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub quantity: String,
    /// Defaults to "Other"
    #[arg(long)]
    pub category: Option<String>,
    /// Defaults to the first configured status
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub specs: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct EditItemArgs {
    pub storage: String,
    #[command(flatten)]
    pub item: ItemRefArgs,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub quantity: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// Empty string clears
    #[arg(long)]
    pub specs: Option<String>,
    /// Empty string clears
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct RemoveItemArgs {
    pub storage: String,
    #[command(flatten)]
    pub item: ItemRefArgs,
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ItemsArgs {
    #[arg(long)]
    pub storage: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// Case-insensitive match on name, specs and notes
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Subcommand)]
pub enum TaxonomyCommand {
    /// Show all three sets
    List,
    /// Add a value to a set
    Add(TaxonomyValueArgs),
    /// Remove a value from a set
    Rm(TaxonomyValueArgs),
}

#[derive(Args)]
pub struct TaxonomyValueArgs {
    pub kind: TaxonomyKindArg,
    pub value: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TaxonomyKindArg {
    Categories,
    Statuses,
    Types,
}

impl From<TaxonomyKindArg> for TaxonomyKind {
    fn from(value: TaxonomyKindArg) -> Self {
        match value {
            TaxonomyKindArg::Categories => TaxonomyKind::Categories,
            TaxonomyKindArg::Statuses => TaxonomyKind::StatusOptions,
            TaxonomyKindArg::Types => TaxonomyKind::StorageTypes,
        }
    }
}

#[derive(Args)]
pub struct LinkArgs {
    pub storage: Option<String>,
}

#[derive(Args)]
pub struct QrArgs {
    pub storage: Option<String>,
    #[arg(short, long)]
    pub output: PathBuf,
}
