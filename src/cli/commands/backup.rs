use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::BackupLogic;
use crate::errors::AppResult;
use crate::store::sqlite::SqliteStore;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup {
        file,
        compress,
        force,
    } = cmd
    {
        let store = SqliteStore::open(&cfg.database)?;
        BackupLogic::backup(&store, cfg.audit_log_cap, file, *compress, *force)?;
    }

    Ok(())
}
