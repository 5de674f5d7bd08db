//! Console host for the contacts book.
//!
//! # Responsibility
//! - Parse arguments and environment into one store/logging configuration.
//! - Map each subcommand onto one `ContactManager` call.
//! - Print results as JSON on stdout and failures on stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use contacts_core::db::open_db;
use contacts_core::{
    default_log_level, flush_logging, init_logging, Contact, ContactManager,
    SqliteContactRepository,
};
use log::{error, info};

/// Manage contacts stored in a local SQLite file.
#[derive(Parser, Debug)]
#[command(name = "contacts", version, about, long_about = None)]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "CONTACTS_DB", default_value = "contacts.sqlite3", global = true)]
    db: PathBuf,

    /// trace|debug|info|warn|error; ignored unless --log-dir is set.
    #[arg(long, env = "CONTACTS_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "CONTACTS_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a new contact.
    Add(ContactArgs),
    /// Overwrite the oldest contact with the given ULID.
    Update(ContactArgs),
    /// Delete every contact with the given ULID.
    Delete { ulid: String },
    /// Show the oldest contact with the given ULID.
    Get { ulid: String },
    /// List all contacts.
    List,
    /// Find contacts by exact first name.
    SearchFirst { first_name: String },
    /// Find contacts by exact last name.
    SearchLast { last_name: String },
    /// Check core wiring.
    Ping,
}

#[derive(Args, Debug)]
struct ContactArgs {
    #[arg(long)]
    ulid: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    gender: String,
}

impl From<ContactArgs> for Contact {
    fn from(args: ContactArgs) -> Self {
        Contact::new(
            args.first_name,
            args.last_name,
            args.ulid,
            args.email,
            args.phone,
            args.address,
            args.gender,
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    };
    flush_logging();
    code
}

fn run(cli: Cli) -> Result<()> {
    if cli.log_dir.is_none() && cli.log_level.is_some() {
        eprintln!("warning: --log-level has no effect without --log-dir");
    }
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| anyhow!("log dir is not valid UTF-8"))?;
        init_logging(level, log_dir).map_err(|err| anyhow!(err))?;
    }

    if let Command::Ping = cli.command {
        println!(
            "contacts_core ping={} version={}",
            contacts_core::ping(),
            contacts_core::core_version()
        );
        return Ok(());
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let manager = ContactManager::new(SqliteContactRepository::try_new(&conn)?);
    info!("event=cli_command module=cli status=start");

    match cli.command {
        Command::Add(args) => {
            let id = manager.add(&Contact::from(args))?;
            print_json(&serde_json::json!({ "id": id }))?;
        }
        Command::Update(args) => {
            let contact = Contact::from(args);
            manager.update(&contact)?;
            print_json(&manager.get_specific(&contact.contact_ulid)?)?;
        }
        Command::Delete { ulid } => {
            manager.delete(&ulid)?;
            print_json(&serde_json::json!({ "deleted": ulid }))?;
        }
        Command::Get { ulid } => print_json(&manager.get_specific(&ulid)?)?,
        Command::List => print_json(&manager.get_all()?)?,
        Command::SearchFirst { first_name } => {
            print_json(&manager.search_by_first_name(&first_name)?)?
        }
        Command::SearchLast { last_name } => {
            print_json(&manager.search_by_last_name(&last_name)?)?
        }
        Command::Ping => {}
    }

    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command};
    use clap::{CommandFactory, Parser};
    use contacts_core::db::open_db;
    use contacts_core::{flush_logging, ContactManager, SqliteContactRepository};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_all_fields() {
        let cli = Cli::try_parse_from([
            "contacts",
            "--db",
            "/tmp/c.sqlite3",
            "add",
            "--ulid",
            "1ABC23456HH",
            "--first-name",
            "Ivan",
            "--last-name",
            "Petrov",
            "--email",
            "ivan@example.com",
            "--phone",
            "0889933779",
            "--address",
            "Sofia",
            "--gender",
            "Male",
        ])
        .unwrap();

        match cli.command {
            Command::Add(args) => assert_eq!(args.ulid, "1ABC23456HH"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn search_first_takes_positional_name() {
        let cli = Cli::try_parse_from(["contacts", "search-first", "Ivan"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::SearchFirst { first_name } if first_name == "Ivan"
        ));
    }

    #[test]
    fn run_add_persists_contact_and_writes_log_events() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("contacts.sqlite3");
        let log_dir = dir.path().join("logs");
        let db = db_path.to_str().unwrap();
        let logs = log_dir.to_str().unwrap();

        let add = Cli::try_parse_from([
            "contacts",
            "--db",
            db,
            "--log-dir",
            logs,
            "--log-level",
            "info",
            "add",
            "--ulid",
            "01HZX4K9QW",
            "--first-name",
            "Ana",
            "--last-name",
            "Ilieva",
            "--email",
            "ana@example.com",
            "--phone",
            "0887000111",
            "--address",
            "Sofia",
            "--gender",
            "Female",
        ])
        .unwrap();
        run(add).unwrap();

        let delete_missing =
            Cli::try_parse_from(["contacts", "--db", db, "delete", "ZZZZZZZZZZ"]).unwrap();
        assert!(run(delete_missing).is_err());

        let conn = open_db(&db_path).unwrap();
        let manager = ContactManager::new(SqliteContactRepository::try_new(&conn).unwrap());
        assert_eq!(manager.get_specific("01HZX4K9QW").unwrap().last_name, "Ilieva");

        flush_logging();
        let written: String = std::fs::read_dir(&log_dir)
            .unwrap()
            .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
            .collect();
        assert!(written.contains("event=db_open"), "log was: {written}");
        assert!(written.contains("event=contact_add"), "log was: {written}");
        assert!(!written.contains("ana@example.com"));
    }
}
