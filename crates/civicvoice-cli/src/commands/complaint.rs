//! Complaint commands for CLI.

use civicvoice_core::{ComplaintFilter, ComplaintStatus, NewComplaint};
use clap::Subcommand;

use super::{acting_staff, acting_user, open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum ComplaintAction {
    /// File a new complaint
    Submit {
        #[arg(long)]
        title: String,
        /// Category ID
        #[arg(long)]
        category: String,
        /// Department ID
        #[arg(long)]
        department: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        location: String,
    },
    /// Change a complaint's status (staff only)
    Transition {
        /// Complaint ID
        id: String,
        /// New status, e.g. in-progress, resolved
        status: ComplaintStatus,
        /// Official remarks shown to the citizen
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Look up a complaint by ID
    Track {
        id: String,
    },
    /// Complaint details with history and feedback (owner or staff)
    Show {
        id: String,
    },
    /// Your complaints, newest first
    Mine,
    /// All complaints, optionally filtered (staff only)
    List {
        #[arg(long)]
        status: Option<ComplaintStatus>,
        /// Category ID
        #[arg(long)]
        category: Option<String>,
        /// Department ID
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Status history, oldest first (owner or staff)
    Timeline {
        id: String,
    },
}

pub fn run(action: ComplaintAction, actor: Option<&str>) -> CliResult {
    let engine = open_engine()?;

    match action {
        ComplaintAction::Submit {
            title,
            category,
            department,
            description,
            location,
        } => {
            let user = acting_user(&engine, actor)?;
            let complaint = engine.submit(
                &NewComplaint {
                    title,
                    category_id: category,
                    department_id: department,
                    description,
                    location,
                },
                &user,
            )?;
            eprintln!("Complaint submitted: {}", complaint.id);
            print_json(&complaint)?;
        }
        ComplaintAction::Transition {
            id,
            status,
            remarks,
        } => {
            let staff = acting_staff(&engine, actor)?;
            let complaint = engine.transition(&id, status, &staff, remarks.as_deref())?;
            eprintln!("Status: {}", complaint.status);
            print_json(&complaint)?;
        }
        ComplaintAction::Track { id } => {
            print_json(&engine.track(&id)?)?;
        }
        ComplaintAction::Show { id } => {
            let user = acting_user(&engine, actor)?;
            print_json(&engine.detail(&id, &user)?)?;
        }
        ComplaintAction::Mine => {
            let user = acting_user(&engine, actor)?;
            print_json(&engine.my_complaints(&user)?)?;
        }
        ComplaintAction::List {
            status,
            category,
            department,
            limit,
        } => {
            acting_staff(&engine, actor)?;
            let filter = ComplaintFilter {
                user_id: None,
                status,
                category_id: category,
                department_id: department,
                limit,
            };
            print_json(&engine.list_complaints(&filter)?)?;
        }
        ComplaintAction::Timeline { id } => {
            let user = acting_user(&engine, actor)?;
            print_json(&engine.detail(&id, &user)?.timeline)?;
        }
    }
    Ok(())
}
