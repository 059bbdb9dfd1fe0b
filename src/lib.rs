pub mod config;
pub mod db;
mod error;
pub mod export;
mod logging;

pub use error::{AppError, AppResult};
pub use export::file::{dump_to_file, DumpEntry, DumpOptions};
pub use export::scope::Actor;
pub use export::{dump, render};
pub use logging::init_logging;
