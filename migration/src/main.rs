use std::{fs, io, path::Path};
use util::config;

mod runner;

enum Command {
    Up,
    Status,
    Clean,
    Fresh,
}

impl Command {
    fn parse(arg: Option<&str>) -> Option<Self> {
        match arg {
            None | Some("up") => Some(Self::Up),
            Some("status") => Some(Self::Status),
            Some("clean") => Some(Self::Clean),
            Some("fresh") => Some(Self::Fresh),
            Some(_) => None,
        }
    }
}

#[tokio::main]
async fn main() {
    let arg = std::env::args().nth(1);
    let Some(command) = Command::parse(arg.as_deref()) else {
        eprintln!("usage: migration [up|status|clean|fresh]");
        std::process::exit(2);
    };

    let path = config::database_path();
    let url = format!("sqlite://{path}?mode=rwc");

    let prepared = match command {
        Command::Clean => return report(drop_database(&path), &path),
        Command::Fresh => drop_database(&path).and_then(|_| ensure_parent(&path)),
        Command::Up | Command::Status => ensure_parent(&path),
    };
    if let Err(e) = prepared {
        eprintln!("Could not prepare {path}: {e}");
        std::process::exit(1);
    }

    match command {
        Command::Status => runner::print_status(&url).await,
        _ => runner::apply_pending(&url).await,
    }
}

fn report(result: io::Result<bool>, path: &str) {
    match result {
        Ok(true) => println!("Removed database {path}"),
        Ok(false) => println!("No database at {path}"),
        Err(e) => {
            eprintln!("Could not remove {path}: {e}");
            std::process::exit(1);
        }
    }
}

/// Returns whether a file was actually removed.
fn drop_database(path: &str) -> io::Result<bool> {
    let file = Path::new(path);
    if !file.exists() {
        return Ok(false);
    }
    fs::remove_file(file)?;
    Ok(true)
}

fn ensure_parent(path: &str) -> io::Result<()> {
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
