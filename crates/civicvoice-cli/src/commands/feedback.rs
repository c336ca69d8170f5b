use civicvoice_core::NewFeedback;
use clap::Subcommand;

use super::{acting_user, open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum FeedbackAction {
    /// Rate a resolved complaint you submitted
    Give {
        /// Complaint ID
        complaint_id: String,
        /// 1 (poor) to 5 (excellent)
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comments: Option<String>,
    },
}

pub fn run(action: FeedbackAction, actor: Option<&str>) -> CliResult {
    let engine = open_engine()?;

    match action {
        FeedbackAction::Give {
            complaint_id,
            rating,
            comments,
        } => {
            let user = acting_user(&engine, actor)?;
            let feedback =
                engine.request_feedback(&complaint_id, &user, &NewFeedback { comments, rating })?;
            eprintln!("Thank you for your feedback!");
            print_json(&feedback)?;
        }
    }
    Ok(())
}
