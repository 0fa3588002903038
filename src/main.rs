mod categorizer;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod models;
mod normalizer;
mod parser;
mod reports;
mod settings;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use cli::{BudgetCommands, CategoriesCommands, Cli, Commands, ExpensesCommands, ReportCommands};

const LOG_ENV: &str = "CENTAVO_LOG";

fn setup_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(settings::load_settings().log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the tables, diagnostics go to stderr
    let terminal_log = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(terminal_log).init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import { file, abort_on_error } => cli::import::run(&file, abort_on_error),
        Commands::Expenses { command } => match command {
            ExpensesCommands::List { month, fixed } => cli::expenses::list(month, fixed),
            ExpensesCommands::Add {
                date,
                description,
                amount,
                category,
                fixed,
            } => cli::expenses::add(&date, &description, &amount, category.as_deref(), fixed),
            ExpensesCommands::Show { id } => cli::expenses::show(id),
            ExpensesCommands::Search { term } => cli::expenses::search(&term),
            ExpensesCommands::Similar { term } => cli::expenses::similar(&term),
            ExpensesCommands::Recategorize { term, category, exact } => {
                cli::expenses::recategorize(&term, &category, exact)
            }
            ExpensesCommands::Edit {
                id,
                date,
                description,
                amount,
            } => cli::expenses::edit(id, date.as_deref(), description, amount.as_deref()),
            ExpensesCommands::SetCategory { id, category } => cli::expenses::set_category(id, &category),
            ExpensesCommands::SetFixed { id, off } => cli::expenses::set_fixed(id, off),
            ExpensesCommands::Delete { id } => cli::expenses::delete(id),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Add { name, color, limit } => {
                cli::categories::add(&name, color.as_deref(), limit)
            }
            CategoriesCommands::SetLimit { name, limit } => cli::categories::set_limit(&name, limit),
            CategoriesCommands::Delete { name } => cli::categories::delete(&name),
            CategoriesCommands::Dedupe => cli::categories::dedupe(),
        },
        Commands::Budget { command } => match command {
            BudgetCommands::Set { salary, month } => cli::budget::set(salary, month),
            BudgetCommands::Show { month } => cli::budget::show(month),
        },
        Commands::Report { command } => match command {
            ReportCommands::Month { month } => cli::report::month(month),
            ReportCommands::Trend { month, months } => cli::report::trend(month, months),
        },
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
