use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::{info, warn};

use crate::{AppError, AppResult};

pub mod store;

const PARTIAL_SUFFIX: &str = ".partial";

/// Open the collection database read-only. A missing file is an error; the
/// database is never created or migrated here.
pub async fn open_sqlite_pool(db_path: &Path) -> AppResult<SqlitePool> {
    if !db_path.exists() {
        return Err(
            AppError::new("DB/NOT_FOUND", "Database file does not exist")
                .with_context("path", db_path.display().to_string()),
        );
    }

    let opts = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .foreign_keys(true)
        .log_statements(log::LevelFilter::Off);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .after_connect(|conn, _| {
            Box::pin(async move {
                sqlx::query("PRAGMA busy_timeout = 5000;")
                    .execute(&mut *conn)
                    .await?;
                Ok::<_, sqlx::Error>(())
            })
        })
        .connect_with(opts)
        .await
        .map_err(|err| {
            AppError::from(err)
                .with_context("operation", "open_db")
                .with_context("path", db_path.display().to_string())
        })?;

    log_sqlite_version(&pool, db_path).await;
    Ok(pool)
}

async fn log_sqlite_version(pool: &SqlitePool, db_path: &Path) {
    match sqlx::query_as::<_, (String,)>("select sqlite_version()")
        .fetch_one(pool)
        .await
    {
        Ok((version,)) => info!(
            target: "koidump",
            event = "db_open",
            path = %db_path.display(),
            sqlite_version = %version
        ),
        Err(err) => warn!(
            target: "koidump",
            event = "db_open_warning",
            path = %db_path.display(),
            error = %err
        ),
    }
}

fn tmp_path(final_path: &Path) -> PathBuf {
    let mut s = OsString::from(final_path.as_os_str());
    s.push(PARTIAL_SUFFIX);
    PathBuf::from(s)
}

/// Write `bytes` next to `path` and rename into place once synced.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let tmp = tmp_path(path);
    let result = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.flush()?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, path)
    })();
    if let Err(err) = result {
        let _ = fs::remove_file(&tmp);
        return Err(AppError::from(err));
    }
    Ok(())
}
