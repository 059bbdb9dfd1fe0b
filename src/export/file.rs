use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::db::store::DumpStore;
use crate::{db, AppError, AppResult};

use super::scope::Actor;
use super::{dump, render};

const FILE_PREFIX: &str = "koillection";
const FILE_EXTENSION: &str = "sql";

#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub out_dir: PathBuf,
}

/// A dump published on disk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpEntry {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
    pub created_at: String,
}

/// Write a dump to `<out_dir>/koillection-YYYYMMDD-HHMMSS[-NN].sql`.
///
/// The file only appears under its final name once fully written.
pub async fn dump_to_file<S: DumpStore>(
    store: &S,
    actor: &Actor,
    opts: DumpOptions,
) -> AppResult<DumpEntry> {
    let fragments = dump(store, actor).await?;
    let body = render(&fragments);

    fs::create_dir_all(&opts.out_dir).map_err(|err| {
        AppError::from(err)
            .with_context("operation", "create_dump_dir")
            .with_context("path", opts.out_dir.display().to_string())
    })?;

    let timestamp = Utc::now();
    let path = unique_dump_path(&opts.out_dir, &timestamp)?;
    db::write_atomic(&path, body.as_bytes()).map_err(|err| {
        err.with_context("operation", "write_dump")
            .with_context("path", path.display().to_string())
    })?;

    let sha256 = format!("{:x}", Sha256::digest(body.as_bytes()));
    let entry = DumpEntry {
        path,
        bytes: body.len() as u64,
        sha256,
        created_at: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    info!(
        target: "koidump",
        event = "dump_written",
        path = %entry.path.display(),
        bytes = entry.bytes,
        sha256 = entry.sha256.as_str()
    );
    Ok(entry)
}

fn unique_dump_path(root: &Path, timestamp: &DateTime<Utc>) -> AppResult<PathBuf> {
    let base = format!("{FILE_PREFIX}-{}", timestamp.format("%Y%m%d-%H%M%S"));
    for suffix in 0..100 {
        let candidate = if suffix == 0 {
            root.join(format!("{base}.{FILE_EXTENSION}"))
        } else {
            root.join(format!("{base}-{suffix:02}.{FILE_EXTENSION}"))
        };
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(
        AppError::new("DUMP/NAME_COLLISION", "Unable to allocate dump file name")
            .with_context("path", root.display().to_string()),
    )
}
