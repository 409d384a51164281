use sqlx::PgPool;

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_course_progress",
        include_str!("../../sql/001_course_progress.sql"),
    ),
    (
        "002_courses",
        include_str!("../../sql/002_courses.sql"),
    ),
];

pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS "_migrations" (
            "id" SERIAL PRIMARY KEY,
            "name" TEXT NOT NULL UNIQUE,
            "applied_at" TIMESTAMP NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(MigrationError::Sqlx)?;

    let applied: Vec<String> =
        sqlx::query_scalar(r#"SELECT "name" FROM "_migrations" ORDER BY "id""#)
            .fetch_all(pool)
            .await
            .map_err(MigrationError::Sqlx)?;

    for (name, sql) in MIGRATIONS {
        if applied.iter().any(|a| a == name) {
            tracing::debug!(migration = %name, "already applied");
            continue;
        }

        tracing::info!(migration = %name, "applying migration");

        let mut tx = pool.begin().await.map_err(MigrationError::Sqlx)?;
        for statement in split_statements(sql) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|err| MigrationError::Statement {
                    migration: name.to_string(),
                    source: err,
                })?;
        }
        sqlx::query(r#"INSERT INTO "_migrations" ("name") VALUES ($1)"#)
            .bind(*name)
            .execute(&mut *tx)
            .await
            .map_err(MigrationError::Sqlx)?;
        tx.commit().await.map_err(MigrationError::Sqlx)?;
    }

    tracing::info!("Database migrations complete");
    Ok(())
}

/// Splits a migration file into statements. `--` comments are dropped
/// first so a `;` inside one never cuts a statement.
fn split_statements(sql: &str) -> Vec<String> {
    let code = sql
        .lines()
        .map(|line| line.find("--").map_or(line, |at| &line[..at]))
        .collect::<Vec<_>>()
        .join("\n");

    code.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("migration query failed: {0}")]
    Sqlx(sqlx::Error),
    #[error("migration {migration} failed: {source}")]
    Statement {
        migration: String,
        #[source]
        source: sqlx::Error,
    },
}
