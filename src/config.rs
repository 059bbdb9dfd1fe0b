use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

const DB_ENV: &str = "KOIDUMP_DB";
const OUT_DIR_ENV: &str = "KOIDUMP_OUT_DIR";
const APP_DIR_NAME: &str = "koillection";
const DB_FILE_NAME: &str = "koillection.sqlite3";
const DUMP_DIR_NAME: &str = "dumps";

/// Where the database lives and where dumps go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpConfig {
    pub db_path: PathBuf,
    pub out_dir: PathBuf,
}

impl DumpConfig {
    /// Read `KOIDUMP_DB` and `KOIDUMP_OUT_DIR`, falling back to the user's
    /// data directory.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var_os(key))
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let base = default_base_dir();
        let db_path = non_empty(DB_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| base.join(DB_FILE_NAME));
        let out_dir = non_empty(OUT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| base.join(DUMP_DIR_NAME));
        DumpConfig { db_path, out_dir }
    }
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
