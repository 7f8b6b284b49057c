mod categories;
mod categorizer;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod models;
mod reports;
mod rules;
mod settings;
mod statement;
mod store;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::{
    CategoriesCommands, Cli, Commands, ReportCommands, RulesCommands, TransactionsCommands,
};

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import {
            file,
            no_categorize,
        } => cli::import::run(&file, no_categorize),
        Commands::Categorize { all } => cli::categorize::run(all),
        Commands::Categories { command } => match command {
            CategoriesCommands::Add { name, parent } => cli::categories::add(&name, parent.as_deref()),
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Rename {
                name,
                new_name,
                parent,
            } => cli::categories::rename(&name, parent.as_deref(), &new_name),
            CategoriesCommands::Delete { name, parent } => {
                cli::categories::delete(&name, parent.as_deref())
            }
        },
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                pattern,
                category,
                subcategory,
                match_type,
                priority,
            } => cli::rules::add(&pattern, &category, subcategory.as_deref(), &match_type, priority),
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Update {
                id,
                pattern,
                category,
                subcategory,
                match_type,
                priority,
            } => cli::rules::update(
                id,
                rules::RuleUpdate {
                    pattern: pattern.as_deref(),
                    category: category.as_deref(),
                    subcategory: subcategory.as_deref(),
                    match_type: match_type.as_deref(),
                    priority,
                },
            ),
            RulesCommands::Delete { id } => cli::rules::delete(id),
        },
        Commands::Transactions { command } => match command {
            TransactionsCommands::List { filter, limit } => {
                cli::transactions::list(filter.into(), limit)
            }
            TransactionsCommands::Categorize {
                id,
                category,
                subcategory,
                clear,
            } => cli::transactions::categorize(&id, category.as_deref(), subcategory.as_deref(), clear),
            TransactionsCommands::Note { id, text } => cli::transactions::note(&id, &text),
        },
        Commands::Clean => cli::clean::run(),
        Commands::Report { command } => match command {
            ReportCommands::Monthly { filter } => cli::report::monthly(filter.into()),
            ReportCommands::Categories { filter } => cli::report::categories(filter.into()),
            ReportCommands::Summary { filter } => cli::report::summary(filter.into()),
        },
        Commands::Export { filter, output } => cli::export::run(filter.into(), output),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
