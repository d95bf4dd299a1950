use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{Submission, SubmissionId, ValidSubmission};

const MEMORY_URL: &str = "sqlite::memory:";

/// Where accepted submissions go.
///
/// One insert per call, atomic on its own. Implementations assign the id and
/// the creation timestamp; callers never supply either.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn create_submission(&self, submission: &ValidSubmission) -> Result<Submission>;

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url '{database_url}'"))?
            .create_if_missing(true);

        // Every connection to `sqlite::memory:` is its own database, so the
        // pool must hold exactly one and keep it alive.
        let pool_options = if database_url.starts_with(MEMORY_URL) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .context("failed to open sqlite pool")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run contact_submissions migrations")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn insert_submission(&self, submission: &ValidSubmission) -> Result<Submission> {
        let record = Submission {
            id: SubmissionId::new_v4(),
            name: submission.name().to_string(),
            email: submission.email().to_string(),
            message: submission.message().to_string(),
            created_at: Utc::now().trunc_subsecs(6),
        };

        sqlx::query(
            "INSERT INTO contact_submissions (id, name, email, message, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.message)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .context("failed to insert contact submission")?;

        Ok(record)
    }

    pub async fn get_submission(&self, id: SubmissionId) -> Result<Option<Submission>> {
        let row = sqlx::query(
            "SELECT id, name, email, message, created_at
             FROM contact_submissions
             WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(submission_from_row).transpose()
    }

    /// Newest first.
    pub async fn list_submissions(&self, limit: u32) -> Result<Vec<Submission>> {
        let rows = sqlx::query(
            "SELECT id, name, email, message, created_at
             FROM contact_submissions
             ORDER BY rowid DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(submission_from_row).collect()
    }

    pub async fn count_submissions(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_submissions")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub async fn ping(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for Storage {
    async fn create_submission(&self, submission: &ValidSubmission) -> Result<Submission> {
        self.insert_submission(submission).await
    }

    async fn health_check(&self) -> Result<()> {
        self.ping().await
    }
}

fn submission_from_row(row: &SqliteRow) -> Result<Submission> {
    let raw_id: String = row.try_get("id")?;
    let id = SubmissionId::from_str(&raw_id)
        .with_context(|| format!("stored submission id '{raw_id}' is not a uuid"))?;
    Ok(Submission {
        id,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        message: row.try_get("message")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

/// Creates the directory holding a file-backed sqlite database. Memory and
/// non-sqlite urls are left alone.
pub fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with(MEMORY_URL) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
