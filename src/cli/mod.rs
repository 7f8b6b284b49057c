pub mod categories;
pub mod categorize;
pub mod clean;
pub mod export;
pub mod import;
pub mod init;
pub mod report;
pub mod rules;
pub mod status;
pub mod transactions;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::models::TxnType;
use crate::store::TransactionFilter;

#[derive(Parser)]
#[command(
    name = "spendbook",
    about = "Import tab-separated bank statements, categorize them and see where the money goes."
)]
pub struct Cli {
    /// Log more (-v info, -vv debug). RUST_LOG is honoured when not given.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Selection flags shared by listing, reports and export.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Start date: YYYY-MM-DD (requires --to)
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date: YYYY-MM-DD (requires --from)
    #[arg(long = "to")]
    pub to_date: Option<String>,
    /// Month filter: YYYY-MM
    #[arg(long)]
    pub month: Option<String>,
    /// Category or subcategory name
    #[arg(long)]
    pub category: Option<String>,
    /// credit or debit
    #[arg(long = "type")]
    pub txn_type: Option<TxnType>,
    /// Text to look for in description, reference or notes
    #[arg(long)]
    pub search: Option<String>,
    /// Only transactions without a category
    #[arg(long)]
    pub uncategorized: bool,
    /// Minimum absolute amount
    #[arg(long = "min")]
    pub min_amount: Option<f64>,
    /// Maximum absolute amount
    #[arg(long = "max")]
    pub max_amount: Option<f64>,
}

impl From<FilterArgs> for TransactionFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            from: args.from_date,
            to: args.to_date,
            month: args.month,
            category: args.category,
            txn_type: args.txn_type,
            search: args.search,
            uncategorized: args.uncategorized,
            min_amount: args.min_amount,
            max_amount: args.max_amount,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for spendbook data (default: ~/Documents/spendbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a tab-separated statement export and auto-categorize it.
    Import {
        /// Path to the statement file
        file: String,
        /// Skip running categorization rules after the import
        #[arg(long = "no-categorize")]
        no_categorize: bool,
    },
    /// Run categorization rules over stored transactions.
    Categorize {
        /// Re-apply rules to already categorized transactions too
        #[arg(long)]
        all: bool,
    },
    /// Manage categories and subcategories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage categorization rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// List and edit transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Strip payment-rail noise from stored descriptions.
    Clean,
    /// Spending analytics.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export transactions to CSV.
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show the current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category, or a subcategory with --parent.
    Add {
        name: String,
        /// Parent category name
        #[arg(long)]
        parent: Option<String>,
    },
    /// List categories with their subcategories.
    List,
    /// Rename a category.
    Rename {
        name: String,
        new_name: String,
        /// Parent category name, when renaming a subcategory
        #[arg(long)]
        parent: Option<String>,
    },
    /// Delete (deactivate) a category; its transactions become uncategorized.
    Delete {
        name: String,
        /// Parent category name, when deleting a subcategory
        #[arg(long)]
        parent: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a categorization rule.
    Add {
        /// Pattern to match against transaction descriptions
        pattern: String,
        /// Category name to assign
        #[arg(long)]
        category: String,
        /// Subcategory name to assign
        #[arg(long)]
        subcategory: Option<String>,
        /// Match type: contains, starts_with, regex
        #[arg(long = "match-type", default_value = "contains")]
        match_type: String,
        /// Rule priority (higher wins)
        #[arg(long, default_value = "0")]
        priority: i64,
    },
    /// List all active rules.
    List,
    /// Update an existing rule.
    Update {
        /// Rule ID (shown in `spendbook rules list`)
        id: i64,
        #[arg(long)]
        pattern: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        subcategory: Option<String>,
        #[arg(long = "match-type")]
        match_type: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
    },
    /// Delete (deactivate) a rule by ID.
    Delete {
        /// Rule ID (shown in `spendbook rules list`)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// List transactions.
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Show only the most recent N
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Set or clear the category of a transaction.
    Categorize {
        /// Transaction ID or unique prefix
        id: String,
        #[arg(long, required_unless_present = "clear")]
        category: Option<String>,
        #[arg(long)]
        subcategory: Option<String>,
        /// Remove the category instead
        #[arg(long, conflicts_with_all = ["category", "subcategory"])]
        clear: bool,
    },
    /// Replace the notes on a transaction.
    Note {
        /// Transaction ID or unique prefix
        id: String,
        text: String,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Income, spending and net per month.
    Monthly {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Spending per category.
    Categories {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Overall totals.
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
    },
}
