use civicvoice_core::NewDepartment;
use clap::Subcommand;

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum DepartmentAction {
    /// Add a department
    Add {
        name: String,
        #[arg(long, default_value = "")]
        contact_info: String,
    },
    /// List departments
    List,
}

pub fn run(action: DepartmentAction) -> CliResult {
    let engine = open_engine()?;

    match action {
        DepartmentAction::Add { name, contact_info } => {
            let department = engine.add_department(&NewDepartment { name, contact_info })?;
            println!("Department created: {}", department.id);
            print_json(&department)?;
        }
        DepartmentAction::List => {
            print_json(&engine.departments()?)?;
        }
    }
    Ok(())
}
