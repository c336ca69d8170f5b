use super::{acting_user, open_engine, print_json, CliResult};

pub fn run(actor: Option<&str>) -> CliResult {
    let engine = open_engine()?;
    let user = acting_user(&engine, actor)?;
    print_json(&engine.dashboard(&user)?)
}
