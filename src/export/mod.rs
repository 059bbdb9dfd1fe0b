use std::time::Instant;

use tracing::{debug, info, warn};

use crate::db::store::DumpStore;
use crate::AppResult;

use self::format::TableFormat;
use self::scope::{resolve_scope, Actor};
use self::targets::EXPORT_TARGETS;

pub mod dialect;
pub mod file;
pub mod format;
pub mod scope;
pub mod targets;

/// Produce a replayable SQL dump of everything `actor` may see.
///
/// The result is an ordered list of newline-terminated fragments: an optional
/// foreign-key-disable directive, the schema DDL, one `INSERT` block per
/// non-empty export target, the trigger DDL and the matching
/// foreign-key-enable directive. Triggers come after the data so that
/// replaying the rows does not fire them.
/// Queries run one after another on the store; the first failure aborts the
/// whole dump.
pub async fn dump<S: DumpStore>(store: &S, actor: &Actor) -> AppResult<Vec<String>> {
    let start = Instant::now();
    let dialect = store.dialect();
    let profile = dialect.profile();
    info!(
        target: "koidump",
        event = "dump_start",
        dialect = %dialect,
        administrator = actor.administrator,
        app_version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("KOIDUMP_GIT_HASH")
    );

    let mut fragments = Vec::new();

    if profile.fk_suppression.is_none() {
        warn!(
            target: "koidump",
            event = "dump_fk_suppression_unavailable",
            dialect = %dialect
        );
    }
    if let Some(fk) = profile.fk_suppression {
        fragments.push(format!("{}\n\n", fk.disable));
    }

    let schema = store
        .schema_statements()
        .await
        .map_err(|err| err.with_context("operation", "dump_schema"))?;
    for statement in &schema {
        fragments.push(format!("{statement};\n"));
    }
    fragments.push("\n".to_string());

    let scope = resolve_scope(store, actor).await?;

    let mut tables = 0_usize;
    let mut total_rows = 0_usize;
    for target in EXPORT_TARGETS {
        if target.is_scoped() && scope.is_empty() {
            continue;
        }
        let table_start = Instant::now();
        let binds: &[String] = if target.is_scoped() {
            scope.user_ids()
        } else {
            &[]
        };
        let sql = target.select_sql(binds.len());
        let result = store.fetch_rows(&sql, binds).await.map_err(|err| {
            err.with_context("operation", "dump_table")
                .with_context("table", target.table)
        })?;
        if result.is_empty() {
            continue;
        }

        let types = store.column_types(target.table).await.map_err(|err| {
            err.with_context("operation", "column_types")
                .with_context("table", target.table)
        })?;
        if types.is_none() {
            debug!(
                target: "koidump",
                event = "dump_metadata_missing",
                table = target.table
            );
        }
        let format = TableFormat::resolve(&result.columns, types.as_ref());

        fragments.push(format!(
            "INSERT INTO {} ({}) VALUES \n",
            target.table,
            result.columns.join(",")
        ));
        let last = result.rows.len() - 1;
        for (idx, row) in result.rows.iter().enumerate() {
            let tuple = format.format_row(row, &profile);
            if idx == last {
                fragments.push(format!("{tuple}\n"));
            } else {
                fragments.push(format!("{tuple},\n"));
            }
        }
        fragments.push(";\n".to_string());
        fragments.push("\n".to_string());

        tables += 1;
        total_rows += result.len();
        info!(
            target: "koidump",
            event = "dump_table",
            table = target.table,
            rows = result.len(),
            ms = table_start.elapsed().as_millis() as u64
        );
    }

    let triggers = store
        .trigger_statements()
        .await
        .map_err(|err| err.with_context("operation", "dump_triggers"))?;
    if !triggers.is_empty() {
        for statement in &triggers {
            fragments.push(format!("{statement};\n"));
        }
        fragments.push("\n".to_string());
    }

    if let Some(fk) = profile.fk_suppression {
        fragments.push(format!("{}\n", fk.enable));
    }

    info!(
        target: "koidump",
        event = "dump_complete",
        tables = tables,
        rows = total_rows,
        scope_users = scope.len(),
        fragments = fragments.len(),
        ms = start.elapsed().as_millis() as u64
    );
    Ok(fragments)
}

/// Concatenate dump fragments into the final file body.
pub fn render(fragments: &[String]) -> String {
    fragments.concat()
}
