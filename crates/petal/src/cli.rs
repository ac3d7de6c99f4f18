//! Clap derive structures for the `petal` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// petal -- back-office CLI for the flower-shop backend
#[derive(Debug, Parser)]
#[command(
    name = "petal",
    version,
    about = "Query customers and products from the shop back office",
    long_about = "Reads customers and products through a resilient data layer.\n\n\
        Prefers the aggregated v2 endpoints and falls back to the legacy API\n\
        with batched per-customer lookups when they are unavailable.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend URL (overrides config)
    #[arg(long, short = 'u', env = "PETAL_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Static access token
    #[arg(long, env = "PETAL_ACCESS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Tenant (city) id for product queries
    #[arg(long, env = "PETAL_CITY_ID", global = true)]
    pub city: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PETAL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "PETAL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Customers with order statistics
    #[command(alias = "cu", alias = "c")]
    Customers(CustomersArgs),

    /// Product catalog
    #[command(alias = "pr", alias = "p")]
    Products(ProductsArgs),

    /// Shop orders and the status workflow
    #[command(alias = "or", alias = "o")]
    Orders(OrdersArgs),

    /// Stock positions and movements
    #[command(alias = "inv", alias = "i")]
    Inventory(InventoryArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Customers ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CustomersArgs {
    #[command(subcommand)]
    pub command: CustomersCommand,
}

#[derive(Debug, Subcommand)]
pub enum CustomersCommand {
    /// List customers with statistics
    #[command(alias = "ls")]
    List {
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Customers per page
        #[arg(long, short = 'l', default_value = "20")]
        limit: u32,

        /// Only customers that have placed an order
        #[arg(long)]
        only_with_orders: bool,
    },

    /// Show one customer with recent orders
    Get {
        /// Customer id
        id: u64,
    },

    /// List a customer's orders
    Orders {
        /// Customer id
        id: u64,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Orders per page
        #[arg(long, short = 'l', default_value = "20")]
        limit: u32,
    },

    /// Find customers by phone number
    Search {
        /// Phone number, e.g. +77011234567
        phone: String,
    },

    /// Count customers by tier
    Summary {
        /// How many customers to sample
        #[arg(long, default_value_t = petal_core::DEFAULT_SUMMARY_SAMPLE)]
        sample: u32,
    },
}

// ── Products ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProductKindArg {
    /// Ready bouquets on display
    Vitrina,
    /// Made to order
    Catalog,
}

#[derive(Debug, Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// List products
    #[command(alias = "ls")]
    List {
        /// Product type
        #[arg(long = "type", short = 't')]
        kind: Option<ProductKindArg>,

        /// Only available (true) or unavailable (false) products
        #[arg(long)]
        available: Option<bool>,

        /// Max results
        #[arg(long, short = 'l', default_value = "20")]
        limit: u32,

        /// Pagination offset
        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Show one product
    Get {
        /// Product id
        id: u64,
    },

    /// Change availability flags
    SetStatus {
        /// Product id
        id: u64,

        /// Listed in the shop
        #[arg(long)]
        active: Option<bool>,

        /// In stock
        #[arg(long)]
        in_stock: Option<bool>,

        /// Ready for pickup
        #[arg(long)]
        ready: Option<bool>,
    },

    /// Upload product images
    Upload {
        /// Image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Create a product
    Create {
        /// Product type
        #[arg(long = "type", short = 't', default_value = "vitrina")]
        kind: ProductKindArg,

        #[arg(long)]
        title: Option<String>,

        /// Price in tenge
        #[arg(long)]
        price: Option<f64>,

        /// Markup percent
        #[arg(long)]
        percent: Option<f64>,

        /// Image URL (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,

        /// Video URL
        #[arg(long)]
        video: Option<String>,

        #[arg(long)]
        width: Option<String>,

        #[arg(long)]
        height: Option<String>,

        /// Owner user id
        #[arg(long)]
        owner_id: Option<u64>,
    },

    /// Delete a product
    Delete {
        /// Product id
        id: u64,
    },

    /// Set a price or a markup percent
    SetPrice {
        /// Product id
        id: u64,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        percent: Option<f64>,
    },

    /// Set bouquet dimensions
    SetProps {
        /// Product id
        id: u64,

        #[arg(long)]
        width: Option<String>,

        #[arg(long)]
        height: Option<String>,
    },

    /// Upload a product video
    UploadVideo {
        /// Video file
        file: PathBuf,
    },
}

// ── Orders ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrderStatusArg {
    New,
    Paid,
    Accepted,
    Assembled,
    InTransit,
    Completed,
}

#[derive(Debug, Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: OrdersCommand,
}

#[derive(Debug, Subcommand)]
pub enum OrdersCommand {
    /// List orders
    #[command(alias = "ls")]
    List {
        /// Only orders in this status
        #[arg(long, short = 's')]
        status: Option<OrderStatusArg>,

        /// Max results
        #[arg(long, short = 'l', default_value = "30")]
        limit: u32,

        /// Pagination offset
        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Show one order
    Get {
        /// Order id
        id: u64,
    },

    /// Statuses an order may move to
    Statuses {
        /// Order id
        id: u64,
    },

    /// Move an order to another status
    SetStatus {
        /// Order id
        id: u64,

        /// Target status
        status: OrderStatusArg,

        /// Comment stored with the change
        #[arg(long, short = 'm')]
        comment: Option<String>,
    },

    /// Delete an order
    Delete {
        /// Order id
        id: u64,
    },
}

// ── Inventory ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InventoryArgs {
    #[command(subcommand)]
    pub command: InventoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum InventoryCommand {
    /// List stock positions
    #[command(alias = "ls")]
    List {
        /// Name filter
        #[arg(long)]
        search: Option<String>,

        /// Flower type filter, e.g. roses
        #[arg(long)]
        flower: Option<String>,

        /// Only services (true) or goods (false)
        #[arg(long)]
        service: Option<bool>,

        /// Only positions with at least this many units
        #[arg(long)]
        min_quantity: Option<u32>,

        /// Max results
        #[arg(long, short = 'l', default_value = "20")]
        limit: u32,

        /// Pagination offset
        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Show one stock position
    Get {
        /// Item id
        id: u64,
    },

    /// Search positions by name
    Search {
        text: String,

        /// Max results
        #[arg(long, short = 'l')]
        limit: Option<u32>,
    },

    /// Movements touching one position
    History {
        /// Item id
        id: u64,

        /// Max results
        #[arg(long, short = 'l', default_value = "20")]
        limit: u32,

        /// Pagination offset
        #[arg(long, default_value = "0")]
        offset: u32,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (token redacted)
    Show,

    /// Print the config file path
    Path,

    /// Write a config file
    Init {
        /// Backend URL
        #[arg(long)]
        base_url: String,

        /// Tenant (city) id
        #[arg(long)]
        city: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
