use colored::*;
use futures::FutureExt;
use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::prelude::*;
use std::io::{self, Write};
use std::panic::AssertUnwindSafe;
use std::time::Instant;

const STATUS_COLUMN: usize = 72;

async fn connect(url: &str) -> DatabaseConnection {
    Database::connect(url).await.unwrap_or_else(|e| {
        eprintln!("{} {}", "Could not open database:".red(), e);
        std::process::exit(1);
    })
}

fn pad(label: &str) -> String {
    let dots = ".".repeat(STATUS_COLUMN.saturating_sub(label.len()));
    format!("{label}{dots}")
}

/// Applies pending migrations one at a time so each is recorded before the next starts.
pub async fn apply_pending(url: &str) {
    let db = connect(url).await;

    let pending = Migrator::get_pending_migrations(&db)
        .await
        .unwrap_or_else(|e| {
            eprintln!("{} {}", "Could not read migration table:".red(), e);
            std::process::exit(1);
        });

    if pending.is_empty() {
        println!("{}", "Schema is up to date".green());
        return;
    }

    println!("Applying {} migration(s)", pending.len());
    for migration in pending {
        print!("{} ", pad(migration.name()));
        io::stdout().flush().ok();

        let started = Instant::now();
        let outcome = AssertUnwindSafe(Migrator::up(&db, Some(1)))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => println!(
                "{} {}",
                "ok".green(),
                format!("({:.2?})", started.elapsed()).dimmed()
            ),
            Ok(Err(e)) => {
                println!("{} {}", "failed".red(), e);
                std::process::exit(1);
            }
            Err(_) => {
                println!("{}", "panicked".red().bold());
                std::process::exit(1);
            }
        }
    }
}

/// Lists every known migration and whether it has been applied.
pub async fn print_status(url: &str) {
    let db = connect(url).await;

    let applied: Vec<String> = Migrator::get_applied_migrations(&db)
        .await
        .map(|list| list.iter().map(|m| m.name().to_string()).collect())
        .unwrap_or_default();

    for migration in <Migrator as MigratorTrait>::migrations() {
        let name = migration.name();
        let state = if applied.iter().any(|a| a == name) {
            "applied".green()
        } else {
            "pending".yellow()
        };
        println!("{} {}", pad(name), state);
    }
}
