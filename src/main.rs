use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};

use koidump_lib::config::DumpConfig;
use koidump_lib::db::{self, store::SqliteStore};
use koidump_lib::export::targets::EXPORT_TARGETS;
use koidump_lib::{dump, dump_to_file, render, Actor, AppError, DumpOptions};

const UNAUTHORIZED_EXIT_CODE: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "koidump", about = "Scoped SQL dumps of a Koillection database", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Dump the schema and the rows visible to one user, or to an administrator.
    Dump {
        /// Database path (defaults to KOIDUMP_DB or the data directory).
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,
        /// Restrict the dump to this user's rows.
        #[arg(long, value_name = "ID", conflicts_with = "admin", required_unless_present = "admin")]
        user: Option<String>,
        /// Dump every user's rows.
        #[arg(long)]
        admin: bool,
        /// Directory for the dump file (defaults to KOIDUMP_OUT_DIR).
        #[arg(long, value_name = "DIR", conflicts_with = "stdout")]
        out: Option<PathBuf>,
        /// Write the dump to stdout instead of a file.
        #[arg(long)]
        stdout: bool,
        /// Emit the written file, or the failure, as a JSON object.
        #[arg(long, conflicts_with = "stdout")]
        json: bool,
    },
    /// List the exported tables and how each is scoped.
    Targets,
}

#[tokio::main]
async fn main() {
    koidump_lib::init_logging();

    let cli = Cli::parse();
    let code = match run(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            1
        }
    };
    process::exit(code);
}

async fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Dump {
            db,
            user,
            admin,
            out,
            stdout,
            json,
        } => {
            let config = DumpConfig::load();
            let db_path = db.unwrap_or(config.db_path);
            let actor = if admin {
                Actor::admin()
            } else {
                Actor {
                    user_id: user,
                    administrator: false,
                }
            };

            let opts = (!stdout).then(|| DumpOptions {
                out_dir: out.unwrap_or(config.out_dir),
            });

            match dump_command(&db_path, &actor, opts, json).await {
                Ok(()) => Ok(0),
                Err(err) => {
                    if json {
                        eprintln!("{}", serde_json::to_string(&err)?);
                    } else {
                        eprintln!("Error: {err}");
                    }
                    if err.is_unauthorized() {
                        Ok(UNAUTHORIZED_EXIT_CODE)
                    } else {
                        Ok(1)
                    }
                }
            }
        }
        Commands::Targets => {
            for target in EXPORT_TARGETS {
                println!("{:<28}  {}", target.table, target.describe());
            }
            Ok(0)
        }
    }
}

async fn dump_command(
    db_path: &Path,
    actor: &Actor,
    opts: Option<DumpOptions>,
    json: bool,
) -> Result<(), AppError> {
    let pool = db::open_sqlite_pool(db_path).await?;
    let store = SqliteStore::new(pool);
    let result = match opts {
        Some(opts) => write_file(&store, actor, opts, json).await,
        None => write_stdout(&store, actor).await,
    };
    store.pool().close().await;
    result
}

async fn write_stdout(store: &SqliteStore, actor: &Actor) -> Result<(), AppError> {
    let fragments = dump(store, actor).await?;
    let mut out = std::io::stdout().lock();
    out.write_all(render(&fragments).as_bytes())?;
    out.flush()?;
    Ok(())
}

async fn write_file(
    store: &SqliteStore,
    actor: &Actor,
    opts: DumpOptions,
    json: bool,
) -> Result<(), AppError> {
    let entry = dump_to_file(store, actor, opts).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("{}", entry.path.display());
    }
    Ok(())
}
