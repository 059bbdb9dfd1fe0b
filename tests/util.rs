#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub const ALICE: &str = "0b8c5e1e-1111-4c3a-9d7e-a11ce0000001";
pub const BOB: &str = "0b8c5e1e-2222-4c3a-9d7e-b0b000000002";

pub const KOI_SCHEMA: &str = r#"
CREATE TABLE doctrine_migration_version (
    version VARCHAR(191) NOT NULL PRIMARY KEY,
    executed_at DATETIME DEFAULT NULL,
    execution_time INTEGER DEFAULT NULL
);
CREATE TABLE koi_user (
    id CHAR(36) NOT NULL PRIMARY KEY,
    username VARCHAR(32) NOT NULL,
    email VARCHAR(255) NOT NULL,
    enabled BOOLEAN NOT NULL,
    roles CLOB NOT NULL,
    currency VARCHAR(3) NOT NULL,
    created_at DATETIME NOT NULL
);
CREATE TABLE koi_collection (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    parent_id CHAR(36) REFERENCES koi_collection (id),
    title VARCHAR(255) NOT NULL,
    visibility VARCHAR(10) NOT NULL,
    created_at DATETIME NOT NULL
);
CREATE TABLE koi_item (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    collection_id CHAR(36) NOT NULL REFERENCES koi_collection (id),
    name VARCHAR(255) NOT NULL,
    quantity INTEGER NOT NULL,
    visibility VARCHAR(10) NOT NULL,
    created_at DATETIME NOT NULL
);
CREATE INDEX idx_item_owner ON koi_item (owner_id);
CREATE TABLE koi_datum (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    item_id CHAR(36) REFERENCES koi_item (id),
    type VARCHAR(15) NOT NULL,
    label VARCHAR(255) NOT NULL,
    value CLOB DEFAULT NULL,
    position INTEGER DEFAULT NULL
);
CREATE TABLE koi_template (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    name VARCHAR(255) NOT NULL
);
CREATE TABLE koi_field (
    id CHAR(36) NOT NULL PRIMARY KEY,
    template_id CHAR(36) NOT NULL REFERENCES koi_template (id),
    name VARCHAR(255) NOT NULL,
    type VARCHAR(15) NOT NULL,
    position INTEGER NOT NULL
);
CREATE TABLE koi_tag_category (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    label VARCHAR(255) NOT NULL,
    color VARCHAR(7) NOT NULL
);
CREATE TABLE koi_tag (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    category_id CHAR(36) REFERENCES koi_tag_category (id),
    label VARCHAR(255) NOT NULL,
    seen_counter INTEGER NOT NULL
);
CREATE TABLE koi_item_tag (
    item_id CHAR(36) NOT NULL REFERENCES koi_item (id),
    tag_id CHAR(36) NOT NULL REFERENCES koi_tag (id),
    PRIMARY KEY (item_id, tag_id)
);
CREATE TABLE koi_item_related_item (
    item_id CHAR(36) NOT NULL REFERENCES koi_item (id),
    related_item_id CHAR(36) NOT NULL REFERENCES koi_item (id),
    PRIMARY KEY (item_id, related_item_id)
);
CREATE TABLE koi_album (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    title VARCHAR(255) NOT NULL
);
CREATE TABLE koi_photo (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    album_id CHAR(36) NOT NULL REFERENCES koi_album (id),
    title VARCHAR(255) NOT NULL,
    taken_at DATE DEFAULT NULL
);
CREATE TABLE koi_wishlist (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    name VARCHAR(255) NOT NULL
);
CREATE TABLE koi_wish (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    wishlist_id CHAR(36) NOT NULL REFERENCES koi_wishlist (id),
    name VARCHAR(255) NOT NULL,
    price NUMERIC(10, 2) DEFAULT NULL
);
CREATE TABLE koi_loan (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    item_id CHAR(36) NOT NULL REFERENCES koi_item (id),
    lent_to VARCHAR(255) NOT NULL,
    lent_at DATE NOT NULL,
    returned_at DATE DEFAULT NULL
);
CREATE TABLE koi_log (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    type VARCHAR(10) NOT NULL,
    logged_at DATETIME NOT NULL,
    object_id CHAR(36) NOT NULL,
    object_label VARCHAR(255) NOT NULL,
    object_class VARCHAR(255) NOT NULL
);
CREATE TABLE koi_inventory (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    name VARCHAR(255) NOT NULL,
    content CLOB NOT NULL
);
CREATE TABLE koi_choice_list (
    id CHAR(36) NOT NULL PRIMARY KEY,
    owner_id CHAR(36) REFERENCES koi_user (id),
    name VARCHAR(255) NOT NULL,
    choices CLOB NOT NULL
);
"#;

/// Two users, each with a small collection graph. Alice's "Authors" datum
/// carries a quote; Bob's rows all mention "Bob".
pub const KOI_SEED: &str = r#"
INSERT INTO doctrine_migration_version VALUES ('DoctrineMigrations\Version20240101000000', '2024-01-01 00:00:00', 42);
INSERT INTO koi_user VALUES
    ('0b8c5e1e-1111-4c3a-9d7e-a11ce0000001', 'alice', 'alice@example.com', 1, '["ROLE_USER"]', 'EUR', '2024-01-01 00:00:00'),
    ('0b8c5e1e-2222-4c3a-9d7e-b0b000000002', 'Bob', 'bob@example.com', 0, '["ROLE_USER"]', 'USD', '2024-01-02 00:00:00');
INSERT INTO koi_collection VALUES
    ('col-a', '0b8c5e1e-1111-4c3a-9d7e-a11ce0000001', NULL, 'Frieren', 'public', '2024-01-03 00:00:00'),
    ('col-b', '0b8c5e1e-2222-4c3a-9d7e-b0b000000002', NULL, 'Bob collection', 'private', '2024-01-03 00:00:00');
INSERT INTO koi_item VALUES
    ('item-a', '0b8c5e1e-1111-4c3a-9d7e-a11ce0000001', 'col-a', 'Frieren #5', 2, 'private', '2024-01-04 00:00:00'),
    ('item-a2', '0b8c5e1e-1111-4c3a-9d7e-a11ce0000001', 'col-a', 'Frieren #6', 1, 'public', '2024-01-04 00:00:00'),
    ('item-b', '0b8c5e1e-2222-4c3a-9d7e-b0b000000002', 'col-b', 'Bob item', 1, 'public', '2024-01-04 00:00:00');
INSERT INTO koi_datum VALUES
    ('datum-a', '0b8c5e1e-1111-4c3a-9d7e-a11ce0000001', 'item-a', 'text', 'Authors', 'O''Brien', 1),
    ('datum-a2', '0b8c5e1e-1111-4c3a-9d7e-a11ce0000001', 'item-a', 'text', 'Path', 'C:\koi\scans', 2),
    ('datum-b', '0b8c5e1e-2222-4c3a-9d7e-b0b000000002', 'item-b', 'text', 'Authors', 'Bob secret', 1);
INSERT INTO koi_template VALUES
    ('tpl-a', '0b8c5e1e-1111-4c3a-9d7e-a11ce0000001', 'Manga'),
    ('tpl-b', '0b8c5e1e-2222-4c3a-9d7e-b0b000000002', 'Bob template');
INSERT INTO koi_field VALUES
    ('field-a', 'tpl-a', 'Volume', 'number', 1),
    ('field-b', 'tpl-b', 'Bob field', 'text', 1);
INSERT INTO koi_tag_category VALUES
    ('cat-a', '0b8c5e1e-1111-4c3a-9d7e-a11ce0000001', 'People', '#ff0000');
INSERT INTO koi_tag VALUES
    ('tag-a', '0b8c5e1e-1111-4c3a-9d7e-a11ce0000001', 'cat-a', 'Abe Tsukasa', 3),
    ('tag-b', '0b8c5e1e-2222-4c3a-9d7e-b0b000000002', NULL, 'Bob tag', 0);
INSERT INTO koi_item_tag VALUES
    ('item-a', 'tag-a'),
    ('item-b', 'tag-b');
INSERT INTO koi_item_related_item VALUES
    ('item-a', 'item-a2');
INSERT INTO koi_wishlist VALUES
    ('wl-b', '0b8c5e1e-2222-4c3a-9d7e-b0b000000002', 'Bob wishlist');
INSERT INTO koi_wish VALUES
    ('wish-b', '0b8c5e1e-2222-4c3a-9d7e-b0b000000002', 'wl-b', 'Bob wish', 19.90);
INSERT INTO koi_loan VALUES
    ('loan-a', '0b8c5e1e-1111-4c3a-9d7e-a11ce0000001', 'item-a2', 'Himmel', '2024-02-01', NULL);
INSERT INTO koi_choice_list VALUES
    ('cl-a', '0b8c5e1e-1111-4c3a-9d7e-a11ce0000001', 'Edition', '["Normal","Collector"]');
"#;

pub async fn temp_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect sqlite::memory:");
    sqlx::query("PRAGMA foreign_keys=ON;")
        .execute(&pool)
        .await
        .unwrap();
    pool
}

pub async fn seeded_pool() -> SqlitePool {
    let pool = temp_pool().await;
    sqlx::raw_sql(KOI_SCHEMA).execute(&pool).await.unwrap();
    sqlx::raw_sql(KOI_SEED).execute(&pool).await.unwrap();
    pool
}

/// Lines of the `INSERT` block for `table`, header excluded.
pub fn insert_block<'a>(body: &'a str, table: &str) -> Option<Vec<&'a str>> {
    let header = format!("INSERT INTO {table} (");
    let start = body.find(&header)?;
    let block = &body[start..];
    let end = block.find("\n;\n")?;
    Some(block[..end].lines().skip(1).collect())
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}
