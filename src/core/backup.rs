use crate::core::audit;
use crate::errors::{AppError, AppResult};
use crate::store::sqlite::SqliteStore;
use crate::ui::messages::{info, success, warning};
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the live database to `dest_file` using SQLite's `VACUUM INTO`,
    /// which produces a consistent snapshot even with a WAL journal.
    ///
    /// An existing destination is only replaced when `force` is set.
    pub fn backup(
        store: &SqliteStore,
        audit_cap: usize,
        dest_file: &str,
        compress: bool,
        force: bool,
    ) -> AppResult<PathBuf> {
        let dest = Path::new(dest_file);

        if dest.exists() {
            if !force {
                return Err(AppError::Validation(format!(
                    "The file '{}' already exists (use --force to overwrite)",
                    dest.display()
                )));
            }
            fs::remove_file(dest)?;
        }

        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let target = dest.to_string_lossy().to_string();
        store.with_conn(|conn| {
            conn.execute("VACUUM INTO ?1", [&target])?;
            Ok(())
        })?;
        success(format!("Backup created: {}", dest.display()));

        let final_path = if compress {
            let compressed = compress_backup(dest)?;
            if let Err(e) = fs::remove_file(dest) {
                warning(format!("Failed to remove uncompressed backup: {}", e));
            } else {
                info(format!("Removed uncompressed backup: {}", dest.display()));
            }
            compressed
        } else {
            dest.to_path_buf()
        };

        if let Err(e) = audit::record(
            store,
            audit_cap,
            "backup",
            format!(
                "{} {}",
                if compress {
                    "Backup created and compressed:"
                } else {
                    "Backup created:"
                },
                final_path.display()
            ),
        ) {
            warning(format!("Failed to write audit entry 'backup': {}", e));
        }

        Ok(final_path)
    }
}

/// Compress a backup using .zip
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    let zip_path = path.with_extension("zip");
    let file = fs::File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::Other(format!("Invalid backup path: {}", path.display())))?;

    let mut f = fs::File::open(path)?;
    zip.start_file(name, options)
        .map_err(std::io::Error::other)?;

    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    info(format!("Compressed: {}", zip_path.display()));

    Ok(zip_path)
}
