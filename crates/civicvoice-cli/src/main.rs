use clap::{Parser, Subcommand};
use civicvoice_core::CoreError;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "civicvoice-cli", version, about = "CivicVoice complaint tracker CLI")]
struct Cli {
    /// Username to act as
    #[arg(long = "as", global = true, value_name = "USERNAME")]
    actor: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Complaint categories
    Category {
        #[command(subcommand)]
        action: commands::category::CategoryAction,
    },
    /// Departments handling complaints
    Department {
        #[command(subcommand)]
        action: commands::department::DepartmentAction,
    },
    /// Submit, update and look up complaints
    Complaint {
        #[command(subcommand)]
        action: commands::complaint::ComplaintAction,
    },
    /// Feedback on resolved complaints
    Feedback {
        #[command(subcommand)]
        action: commands::feedback::FeedbackAction,
    },
    /// Overview of your complaints
    Dashboard,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let actor = cli.actor.as_deref();
    let result = match cli.command {
        Commands::User { action } => commands::user::run(action),
        Commands::Category { action } => commands::category::run(action),
        Commands::Department { action } => commands::department::run(action),
        Commands::Complaint { action } => commands::complaint::run(action, actor),
        Commands::Feedback { action } => commands::feedback::run(action, actor),
        Commands::Dashboard => commands::dashboard::run(actor),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        let message = match e.downcast_ref::<CoreError>() {
            Some(core) => core.user_message(),
            None => e.to_string(),
        };
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}
