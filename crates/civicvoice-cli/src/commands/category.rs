use civicvoice_core::NewCategory;
use clap::Subcommand;

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Add a complaint category
    Add {
        name: String,
        #[arg(long, default_value = "")]
        contact_info: String,
    },
    /// List categories
    List,
}

pub fn run(action: CategoryAction) -> CliResult {
    let engine = open_engine()?;

    match action {
        CategoryAction::Add { name, contact_info } => {
            let category = engine.add_category(&NewCategory { name, contact_info })?;
            println!("Category created: {}", category.id);
            print_json(&category)?;
        }
        CategoryAction::List => {
            print_json(&engine.categories()?)?;
        }
    }
    Ok(())
}
