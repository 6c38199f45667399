use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::audit;
use crate::errors::AppResult;
use crate::store::sqlite::SqliteStore;
use crate::ui::messages::{success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped in test mode)
///  - the SQLite database and all pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;

    println!("⚙️  Initializing SiteLedger…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", &cfg.database);

    let store = SqliteStore::open(&cfg.database)?;
    success(format!("Database initialized at {}", &cfg.database));

    if let Err(e) = audit::record(
        &store,
        cfg.audit_log_cap,
        "init",
        format!("Database initialized at {}", &cfg.database),
    ) {
        warning(format!("Failed to write audit entry 'init': {}", e));
    }

    println!("🎉 SiteLedger initialization completed!");
    Ok(())
}
