pub mod category;
pub mod complaint;
pub mod config;
pub mod dashboard;
pub mod department;
pub mod feedback;
pub mod user;

use civicvoice_core::{
    ComplaintEngine, Config, LogNotifier, NotificationDispatcher, Notifier, SmtpNotifier,
    SqliteStore, User,
};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the store and notification transport described by the config file.
///
/// Mail goes through SMTP when `smtp.host` is set, otherwise to the log.
pub fn open_engine() -> Result<ComplaintEngine<SqliteStore>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db_path = config.database_path()?;
    tracing::debug!(path = %db_path.display(), "opening complaint store");
    let store = SqliteStore::open_at(&db_path)?;

    let transport: Box<dyn Notifier> = match config.smtp.host.as_deref() {
        Some(host) if !host.trim().is_empty() => Box::new(SmtpNotifier::from_config(
            &config.smtp,
            &config.notifications.from_address,
        )?),
        _ => Box::new(LogNotifier),
    };

    Ok(ComplaintEngine::new(
        store,
        NotificationDispatcher::new(config.notifications, transport),
    ))
}

/// Resolve `--as <username>` to a user.
pub fn acting_user(
    engine: &ComplaintEngine<SqliteStore>,
    actor: Option<&str>,
) -> Result<User, Box<dyn std::error::Error>> {
    let username = actor.ok_or("this command needs --as <username>")?;
    Ok(engine.find_user(username)?)
}

/// Like [`acting_user`], but the user must be staff.
pub fn acting_staff(
    engine: &ComplaintEngine<SqliteStore>,
    actor: Option<&str>,
) -> Result<User, Box<dyn std::error::Error>> {
    let user = acting_user(engine, actor)?;
    if !user.is_staff {
        return Err(format!("{} is not a staff member", user.username).into());
    }
    Ok(user)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
