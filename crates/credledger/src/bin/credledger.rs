//! `credledger` command-line front end.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use credledger::{ArchiveError, CliConfig, FileStore, Ledger, LedgerStore, Metadata, Session};
use tracing::Level;

#[derive(Parser)]
#[command(name = "credledger")]
#[command(about = "Store files in a tamper-evident, signed and encrypted ledger")]
#[command(author, version, long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the ledgers (overrides the config file)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive a file into a new ledger
    Add {
        /// The file to archive
        file: PathBuf,

        /// Who the document was issued to
        #[arg(long)]
        subject: String,

        /// Title of the credential
        #[arg(long)]
        credential: String,

        /// Issue date
        #[arg(long)]
        issued_on: String,

        /// Extra metadata as KEY=VALUE, may be repeated
        #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Restore the archived file from a ledger
    Extract {
        /// Ledger name
        name: String,
        /// Output path
        out: PathBuf,
    },

    /// Print the records of one or all ledgers
    Show {
        /// Ledger name, all ledgers if omitted
        name: Option<String>,
    },

    /// Validate one or all ledgers
    Verify {
        /// Ledger name, all ledgers if omitted
        name: Option<String>,
    },

    /// List the metadata of every ledger
    List,
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, _)) if Metadata::is_reserved_field(k) => {
            Err(format!("{k:?} is already set by its own option"))
        }
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<ArchiveError>() {
                Some(ae) => match ae.offending_index() {
                    Some(index) => eprintln!("error [{}] at record {index}: {e:#}", ae.kind()),
                    None => eprintln!("error [{}]: {e:#}", ae.kind()),
                },
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CliConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let store = FileStore::open(&config.data_dir)
        .with_context(|| format!("opening data dir {}", config.data_dir.display()))?;

    match cli.command {
        Commands::Add {
            file,
            subject,
            credential,
            issued_on,
            fields,
        } => {
            let session = Session::load_or_create(&config.key_dir(), config.archive)?;
            let metadata = fields
                .into_iter()
                .fold(Metadata::new(subject, credential, issued_on), |m, (k, v)| {
                    m.with_field(k, v)
                });
            let name = session.archive_path(&store, &file, Some(&metadata))?;
            println!("{name}");
        }

        Commands::Extract { name, out } => {
            let session = Session::load_or_create(&config.key_dir(), config.archive)?;
            let bytes = session.extract_to_path(&store, &name, &out)?;
            println!("wrote {bytes} bytes to {}", out.display());
        }

        Commands::Show { name } => {
            for name in selected(&store, name)? {
                let ledger = store.load(&name)?;
                println!("{name}:");
                show(&ledger);
            }
        }

        Commands::Verify { name } => {
            let mut all_valid = true;
            for name in selected(&store, name)? {
                let ledger = store.load(&name)?;
                match ledger.validate() {
                    Ok(()) => println!("{name}: valid ({} records)", ledger.len()),
                    Err(e) => {
                        all_valid = false;
                        match e.index() {
                            Some(index) => println!("{name}: INVALID at record {index}: {e}"),
                            None => println!("{name}: INVALID: {e}"),
                        }
                    }
                }
            }
            if !all_valid {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::List => {
            for name in store.list()? {
                let ledger = store.load(&name)?;
                for (index, meta) in credledger::list_metadata(&ledger)? {
                    print!(
                        "{name} #{index}: {} | {} | {}",
                        meta.subject, meta.credential, meta.issued_on
                    );
                    for (k, v) in &meta.extra {
                        print!(" | {k}={v}");
                    }
                    println!();
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn selected(store: &FileStore, name: Option<String>) -> anyhow::Result<Vec<String>> {
    match name {
        Some(name) => {
            if !store.exists(&name)? {
                bail!("no ledger named {name}");
            }
            Ok(vec![name])
        }
        None => Ok(store.list()?),
    }
}

fn show(ledger: &Ledger) {
    for record in ledger.records() {
        let previous = record
            .previous_digest()
            .map(|d| d.short())
            .unwrap_or_else(|| credledger_core::GENESIS_LINK.to_string());
        let kind = record.kind().map(|k| k.name()).unwrap_or("unknown");
        println!(
            "  #{:<4} {} <- {:<8} {:<8} {}",
            record.index(),
            record.digest().short(),
            previous,
            kind,
            if record.is_signed() { "signed" } else { "unsigned" }
        );
    }
}
