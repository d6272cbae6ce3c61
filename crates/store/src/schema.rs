// SPDX-License-Identifier: MIT
//! Ordered schema files applied once at startup, tracked by a `schema_version`
//! table (§10.3). Each entry is applied in order the first time its index is
//! greater than or equal to the version currently on disk.

use sqlx::SqlitePool;

use crate::error::StoreError;

const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_jobs", include_str!("../migrations/0001_jobs.sql")),
    ("0002_machine_events", include_str!("../migrations/0002_machine_events.sql")),
    ("0003_machine_state", include_str!("../migrations/0003_machine_state.sql")),
    ("0004_realtime_events", include_str!("../migrations/0004_realtime_events.sql")),
];

pub async fn apply(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
    )
    .execute(pool)
    .await?;

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
        .fetch_one(pool)
        .await?;
    if applied == 0 {
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(pool)
            .await?;
    }

    let mut current: i64 = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_one(pool)
        .await?;

    for (index, (name, sql)) in MIGRATIONS.iter().enumerate() {
        let version = index as i64 + 1;
        if current >= version {
            continue;
        }
        tracing::debug!(migration = name, version, "applying schema migration");
        for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(pool).await?;
        }
        sqlx::query("UPDATE schema_version SET version = ?")
            .bind(version)
            .execute(pool)
            .await?;
        current = version;
    }

    Ok(())
}
