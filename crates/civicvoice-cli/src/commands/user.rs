//! User management commands for CLI.

use civicvoice_core::NewUser;
use clap::Subcommand;

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a user
    Add {
        /// Unique username
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Grant staff rights (view all complaints, change status)
        #[arg(long)]
        staff: bool,
    },
    /// List all users
    List,
}

pub fn run(action: UserAction) -> CliResult {
    let engine = open_engine()?;

    match action {
        UserAction::Add {
            username,
            email,
            first_name,
            phone,
            staff,
        } => {
            let user = engine.register_user(&NewUser {
                username,
                email,
                first_name,
                phone,
                is_staff: staff,
            })?;
            println!("User created: {}", user.id);
            print_json(&user)?;
        }
        UserAction::List => {
            print_json(&engine.users()?)?;
        }
    }
    Ok(())
}
