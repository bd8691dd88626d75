//! Database schema for the recordings database.
//!
//! Table and column names are shared with the web front-end, which reads the
//! same file.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

// =============================================================================
// Version 0
// =============================================================================

/// Chat principals and their upload permission ('yes' / 'no')
const USERS_TABLE_V0: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "telegram_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!("username", &SqlType::Text),
        sqlite_column!("can_upload", &SqlType::Text, default_value = Some("'no'")),
        sqlite_column!("created_at", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_users_can_upload", "can_upload")],
};

const ZOOM_RECORDS_TABLE_V0: Table = Table {
    name: "zoom_records",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("date", &SqlType::Text, non_null = true),
        sqlite_column!("zoom_url", &SqlType::Text, non_null = true),
        sqlite_column!("passcode", &SqlType::Text, non_null = true),
        sqlite_column!("file_path", &SqlType::Text),
        sqlite_column!("file_id", &SqlType::Text),
        sqlite_column!(
            "uploaded_by",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "users",
                foreign_column: "telegram_id",
                on_delete: ForeignKeyOnChange::Restrict,
            })
        ),
        sqlite_column!(
            "status",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'pending'")
        ),
        sqlite_column!("created_at", &SqlType::Text, non_null = true),
    ],
    indices: &[
        ("idx_records_created_at", "created_at"),
        ("idx_records_title", "title"),
        ("idx_records_file_path", "file_path"),
    ],
};

pub const RECORDINGS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[USERS_TABLE_V0, ZOOM_RECORDS_TABLE_V0],
    migration: None,
}];
