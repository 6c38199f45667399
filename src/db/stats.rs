use crate::db::migrate::{applied_migrations, pending_migrations};
use crate::db::queries::count_by_collection;
use crate::errors::AppResult;
use crate::store::sqlite::SqliteStore;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use std::fs;

pub fn print_db_info(store: &SqliteStore) -> AppResult<()> {
    let db_path = store.path();
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) DOCUMENTS PER COLLECTION
    //
    let counts = store.with_conn(|conn| count_by_collection(conn))?;
    let total: i64 = counts.iter().map(|(_, n)| n).sum();

    println!(
        "{}• Total documents:{} {}{}{}",
        CYAN, RESET, GREEN, total, RESET
    );
    if counts.is_empty() {
        println!("    {GREY}--{RESET}");
    }
    for (collection, n) in &counts {
        println!("    {:<12} {}", collection, n);
    }

    //
    // 3) SCHEMA
    //
    let (applied, pending) =
        store.with_conn(|conn| Ok((applied_migrations(conn)?, pending_migrations(conn)?)))?;

    println!("{}• Schema:{}", CYAN, RESET);
    match applied.last() {
        Some((version, at)) => println!("    latest:  {} ({})", version, at),
        None => println!("    latest:  {GREY}--{RESET}"),
    }
    println!("    pending: {}", pending.len());

    println!();
    Ok(())
}
