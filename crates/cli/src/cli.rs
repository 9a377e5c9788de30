use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Default inventory file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "inventory_data.json";

#[derive(Debug, Parser)]
#[command(
    name = "supplies",
    about = "Simplified computer supplies inventory management",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Inventory JSON file
    #[arg(
        long,
        global = true,
        env = "SUPPLIES_DATA_FILE",
        default_value = DEFAULT_DATA_FILE
    )]
    pub data_file: PathBuf,

    /// Output format for view/list/total-value
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a new item to the inventory
    #[command(subcommand)]
    Add(AddCommand),
    /// Remove an item by ID
    Remove { item_id: String },
    /// Show one item's details
    View { item_id: String },
    /// Increase an item's stock
    Restock {
        item_id: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Sell units of an item
    Sell {
        item_id: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// List items
    #[command(subcommand)]
    List(ListCommand),
    /// Show the total value of the inventory
    TotalValue,
}

#[derive(Debug, Subcommand)]
pub enum AddCommand {
    /// Add a CPU
    Cpu(CpuArgs),
    /// Add a RAM module
    Ram(CapacityArgs),
    /// Add a monitor
    Monitor(MonitorArgs),
    /// Add a storage device
    Storage(CapacityArgs),
    /// Add a peripheral
    Peripheral(PeripheralArgs),
}

/// Fields shared by every item kind.
#[derive(Debug, Clone, Args)]
pub struct ItemArgs {
    /// Unique item ID
    #[arg(long)]
    pub id: String,
    /// Item name
    #[arg(long)]
    pub name: String,
    /// Initial quantity
    #[arg(long, allow_negative_numbers = true)]
    pub qty: i64,
    /// Unit price
    #[arg(long, allow_negative_numbers = true)]
    pub price: f64,
}

#[derive(Debug, Clone, Args)]
pub struct CpuArgs {
    #[command(flatten)]
    pub item: ItemArgs,
    /// CPU socket (e.g. AM5, LGA1700)
    #[arg(long)]
    pub socket_type: String,
}

#[derive(Debug, Clone, Args)]
pub struct CapacityArgs {
    #[command(flatten)]
    pub item: ItemArgs,
    /// Capacity in GB
    #[arg(long)]
    pub capacity_gb: u32,
}

#[derive(Debug, Clone, Args)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub item: ItemArgs,
    /// Diagonal in inches
    #[arg(long)]
    pub screen_size_inches: f64,
}

#[derive(Debug, Clone, Args)]
pub struct PeripheralArgs {
    #[command(flatten)]
    pub item: ItemArgs,
    /// Kind of device (e.g. Mouse, Keyboard)
    #[arg(long)]
    pub device_type: String,
}

#[derive(Debug, Subcommand)]
pub enum ListCommand {
    /// List every item
    All,
    /// List items of one type (CPU, RAM, Monitor, Storage, Peripheral)
    Type {
        #[arg(long)]
        item_type: String,
    },
}
