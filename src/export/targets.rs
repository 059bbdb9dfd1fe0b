/// How rows of an exported table are restricted to the scope's user ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetScope {
    /// Schema-level table, exported in full.
    Unscoped,
    /// The table carries its own owner column.
    Owner { column: &'static str },
    /// The table is owned through its parent row.
    Parent {
        foreign_key: &'static str,
        parent_table: &'static str,
        parent_owner_column: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportTarget {
    pub table: &'static str,
    pub scope: TargetScope,
}

const fn owned(table: &'static str) -> ExportTarget {
    ExportTarget {
        table,
        scope: TargetScope::Owner { column: "owner_id" },
    }
}

const fn via_parent(
    table: &'static str,
    foreign_key: &'static str,
    parent_table: &'static str,
) -> ExportTarget {
    ExportTarget {
        table,
        scope: TargetScope::Parent {
            foreign_key,
            parent_table,
            parent_owner_column: "owner_id",
        },
    }
}

/// Every table a dump carries, in emission order.
pub const EXPORT_TARGETS: &[ExportTarget] = &[
    ExportTarget {
        table: "doctrine_migration_version",
        scope: TargetScope::Unscoped,
    },
    owned("koi_album"),
    owned("koi_choice_list"),
    owned("koi_collection"),
    owned("koi_datum"),
    via_parent("koi_field", "template_id", "koi_template"),
    owned("koi_inventory"),
    owned("koi_item"),
    via_parent("koi_item_related_item", "item_id", "koi_item"),
    via_parent("koi_item_tag", "item_id", "koi_item"),
    owned("koi_loan"),
    owned("koi_log"),
    owned("koi_photo"),
    owned("koi_tag"),
    owned("koi_tag_category"),
    owned("koi_template"),
    ExportTarget {
        table: "koi_user",
        scope: TargetScope::Owner { column: "id" },
    },
    owned("koi_wish"),
    owned("koi_wishlist"),
];

impl ExportTarget {
    pub fn is_scoped(&self) -> bool {
        !matches!(self.scope, TargetScope::Unscoped)
    }

    /// Base query for this target with `scope_len` positional placeholders.
    pub fn select_sql(&self, scope_len: usize) -> String {
        let table = self.table;
        match self.scope {
            TargetScope::Unscoped => format!("SELECT * FROM {table}"),
            TargetScope::Owner { column } => format!(
                "SELECT * FROM {table} WHERE {column} IN ({})",
                placeholders(scope_len)
            ),
            TargetScope::Parent {
                foreign_key,
                parent_table,
                parent_owner_column,
            } => format!(
                "SELECT c.* FROM {table} c INNER JOIN {parent_table} p ON c.{foreign_key} = p.id \
                 WHERE p.{parent_owner_column} IN ({})",
                placeholders(scope_len)
            ),
        }
    }

    /// Short human description of the scoping rule.
    pub fn describe(&self) -> String {
        match self.scope {
            TargetScope::Unscoped => "all rows".to_string(),
            TargetScope::Owner { column } => format!("{column} in scope"),
            TargetScope::Parent {
                foreign_key,
                parent_table,
                parent_owner_column,
            } => format!("{foreign_key} -> {parent_table}.{parent_owner_column} in scope"),
        }
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
