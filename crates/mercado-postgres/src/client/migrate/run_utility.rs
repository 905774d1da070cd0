use diesel::migration::{Migration, MigrationSource};
use diesel::pg::Pg;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::{debug, instrument};

use super::MigrationStatus;
use crate::{MIGRATIONS, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Normalizes a migration version for comparison.
///
/// Embedded migration versions keep the dashes from the directory name while
/// the versions recorded in the database may not, so both sides are reduced
/// to their alphanumeric characters before comparing.
fn common_format(version: &str) -> String {
    version.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Returns the versions of all migrations embedded into this binary.
pub(crate) fn embedded_migration_versions() -> PgResult<Vec<String>> {
    let migrations = MigrationSource::<Pg>::migrations(&MIGRATIONS).map_err(PgError::Migration)?;

    Ok(migrations
        .iter()
        .map(|migration| migration.name().version().to_string())
        .collect())
}

/// Creates the migration bookkeeping table if it does not exist yet.
///
/// This mirrors what the migration harness does on first run, so that status
/// checks work against freshly created databases.
async fn ensure_migrations_table(conn: &mut AsyncPgConnection) -> PgResult<()> {
    diesel::sql_query(
        "CREATE TABLE IF NOT EXISTS __diesel_schema_migrations (
            version VARCHAR(50) PRIMARY KEY NOT NULL,
            run_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(conn)
    .await
    .map_err(|e| PgError::Migration(format!("Failed to create migration table: {}", e).into()))?;

    Ok(())
}

/// Gets the current migration status of the database.
#[instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn get_migration_status(conn: &mut AsyncPgConnection) -> PgResult<MigrationStatus> {
    debug!(
        target: TRACING_TARGET_MIGRATION,
        "Checking database migration status",
    );

    let applied_versions = get_applied_migrations(conn).await?;
    let applied_normalized: Vec<String> = applied_versions.iter().map(|v| common_format(v)).collect();

    let pending_versions: Vec<String> = embedded_migration_versions()?
        .into_iter()
        .filter(|version| !applied_normalized.contains(&common_format(version)))
        .collect();

    let status = MigrationStatus::new(applied_versions, pending_versions);

    debug!(
        target: TRACING_TARGET_MIGRATION,
        applied_count = status.applied_migrations(),
        pending_count = status.pending_migrations(),
        is_up_to_date = status.is_up_to_date(),
        "Migration status retrieved"
    );

    Ok(status)
}

/// Gets list of applied migration versions from the database.
#[instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn get_applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    use diesel::sql_query;

    debug!(
        target: TRACING_TARGET_MIGRATION,
        "Retrieving applied migrations",
    );

    ensure_migrations_table(conn).await?;

    #[derive(diesel::QueryableByName)]
    struct MigrationVersion {
        #[diesel(sql_type = diesel::sql_types::Text)]
        version: String,
    }

    let versions = sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version")
        .get_results::<MigrationVersion>(conn)
        .await
        .map_err(|e| PgError::Migration(format!("Failed to get applied migrations: {}", e).into()))?
        .into_iter()
        .map(|row| row.version)
        .collect();

    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_format_strips_dashes() {
        assert_eq!(common_format("2025-08-20-000000"), "20250820000000");
        assert_eq!(common_format("20250820000000"), "20250820000000");
    }

    #[test]
    fn test_embedded_migrations_are_enumerable() {
        let versions = embedded_migration_versions().unwrap();
        assert!(!versions.is_empty());
    }
}
