use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use ufodb_formula::execute_command;
use ufodb_store::{
    render_records, render_table, Database, PersistError, RecordId, SaveMode, StoreOptions,
};

#[derive(Debug, Parser)]
#[command(name = "ufodb")]
#[command(about = "Inspect and edit ufodb database files.")]
struct Cli {
    /// Database file. A missing file is treated as an empty database.
    #[arg(long, env = "UFODB_FILE", default_value = "ufodb.txt", global = true)]
    file: PathBuf,

    /// How the file is rewritten after a mutation.
    #[arg(long, value_enum, default_value_t = SaveModeArg::Atomic, global = true)]
    save_mode: SaveModeArg,

    /// Raise log verbosity (`-v` info, `-vv` debug, `-vvv` trace). `RUST_LOG` wins if set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SaveModeArg {
    Atomic,
    InPlace,
}

impl From<SaveModeArg> for SaveMode {
    fn from(arg: SaveModeArg) -> Self {
        match arg {
            SaveModeArg::Atomic => SaveMode::Atomic,
            SaveModeArg::InPlace => SaveMode::InPlace,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List table names in creation order.
    Tables,
    /// Create a table with the given columns.
    Create {
        table: String,
        columns: Vec<String>,
    },
    /// Insert a record and print its id.
    Insert {
        table: String,
        #[arg(value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
    /// Overwrite fields of one record.
    Update {
        table: String,
        id: RecordId,
        #[arg(value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
    /// Delete one record by id.
    Delete { table: String, id: RecordId },
    /// Print records as a grid, or as JSON with `--json`.
    Select {
        table: String,
        /// Only records whose COLUMN equals VALUE exactly.
        #[arg(long = "where", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
        filter: Option<(String, String)>,
        #[arg(long)]
        json: bool,
    },
    AddColumn {
        table: String,
        column: String,
    },
    RemoveColumn {
        table: String,
        column: String,
    },
    RenameColumn {
        table: String,
        old: String,
        new: String,
    },
    /// Copy the value at FIRST_ROW down through LAST_ROW (zero-based, inclusive).
    FillDown {
        table: String,
        column: String,
        first_row: usize,
        last_row: usize,
    },
    /// Evaluate a formula such as `={0}price * {0}qty` against a table.
    Eval { table: String, formula: String },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.is_empty() => Ok((column.to_string(), value.to_string())),
        _ => Err(format!("expected COLUMN=VALUE, got {raw:?}")),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let options = StoreOptions {
        save_mode: cli.save_mode.into(),
    };
    let mut db = open(&cli.file, options)?;

    let mut out = String::new();
    let mut dirty = true;
    let mut code = ExitCode::SUCCESS;

    match cli.command {
        Command::Tables => {
            dirty = false;
            for name in db.table_names() {
                out.push_str(name);
                out.push('\n');
            }
        }
        Command::Create { table, columns } => {
            db.create_table(table, columns)?;
        }
        Command::Insert { table, values } => {
            let id = db.insert(&table, values)?;
            out = format!("{id}\n");
        }
        Command::Update { table, id, values } => {
            db.update(&table, id, values)?;
        }
        Command::Delete { table, id } => {
            if !db.delete_record(&table, id) {
                dirty = false;
                out.push_str("not found\n");
                code = ExitCode::from(1);
            }
        }
        Command::Select {
            table,
            filter,
            json,
        } => {
            dirty = false;
            let records = match &filter {
                Some((column, value)) => db.select_where(&table, column, value)?,
                None => db.select_all(&table)?.iter().collect(),
            };
            out = if json {
                let mut text = serde_json::to_string_pretty(&records)?;
                text.push('\n');
                text
            } else if filter.is_some() {
                let columns = db.table(&table).map(|t| t.columns()).unwrap_or_default();
                render_records(columns, records)
            } else {
                db.table(&table).map(render_table).unwrap_or_default()
            };
        }
        Command::AddColumn { table, column } => {
            db.add_column(&table, column)?;
        }
        Command::RemoveColumn { table, column } => {
            db.remove_column(&table, &column)?;
        }
        Command::RenameColumn { table, old, new } => {
            db.rename_column(&table, &old, new)?;
        }
        Command::FillDown {
            table,
            column,
            first_row,
            last_row,
        } => {
            db.fill_down(&table, &column, first_row..=last_row)?;
        }
        Command::Eval { table, formula } => {
            dirty = false;
            let Some(source) = db.table(&table) else {
                bail!("table '{table}' does not exist");
            };
            let value = execute_command(&formula, source)
                .with_context(|| format!("evaluating {formula:?} on table '{table}'"))?;
            out = format!("{value}\n");
        }
    }

    if dirty {
        db.save(&cli.file)?;
        tracing::debug!(path = %cli.file.display(), "saved database");
    }
    write_stdout(&out)?;
    Ok(code)
}

fn open(path: &Path, options: StoreOptions) -> anyhow::Result<Database> {
    let mut db = Database::with_options(options);
    match db.load(path) {
        Ok(()) => {}
        Err(PersistError::NotFound { .. }) => {
            tracing::info!(path = %path.display(), "no database file yet, starting empty");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(db)
}

/// Writes `text` to stdout. A closed pipe (e.g. `ufodb select t | head -1`) is not an error.
fn write_stdout(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
