use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use logo_types::{Generation, GenerationStatus, LogoStyle};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, user_id, prompt, style, status, image_url, error, created_at, updated_at";

#[derive(Debug, FromRow)]
struct GenerationRow {
    id: String,
    #[allow(dead_code)]
    user_id: String,
    prompt: String,
    style: String,
    status: String,
    image_url: Option<String>,
    error: Option<String>,
    created_at: i64,
    updated_at: Option<i64>,
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| anyhow!("Invalid timestamp: {}", micros))
}

impl TryFrom<GenerationRow> for Generation {
    type Error = anyhow::Error;

    fn try_from(row: GenerationRow) -> Result<Self> {
        Ok(Generation {
            status: row.status.parse()?,
            style: LogoStyle::from_tag(&row.style),
            created_at: from_micros(row.created_at)?,
            updated_at: row.updated_at.map(from_micros).transpose()?,
            id: row.id,
            prompt: row.prompt,
            image_url: row.image_url,
            error: row.error,
        })
    }
}

/// Creates a new record in the processing state.
pub async fn create(
    pool: &SqlitePool,
    user_id: &str,
    prompt: &str,
    style: LogoStyle,
) -> Result<Generation> {
    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().timestamp_micros();

    sqlx::query(
        r#"
        INSERT INTO generations (id, user_id, prompt, style, status, created_at)
        VALUES (?1, ?2, ?3, ?4, 'processing', ?5)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(prompt)
    .bind(style.as_str())
    .bind(created_at)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to create generation for {}", user_id))?;

    find(pool, user_id, &id)
        .await?
        .ok_or_else(|| anyhow!("Generation {} vanished after insert", id))
}

pub async fn find(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Generation>> {
    let row = sqlx::query_as::<_, GenerationRow>(&format!(
        "SELECT {} FROM generations WHERE user_id = ?1 AND id = ?2",
        SELECT_COLUMNS
    ))
    .bind(user_id)
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to load generation {}", id))?;

    row.map(Generation::try_from).transpose()
}

pub async fn mark_done(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    image_url: &str,
) -> Result<Generation> {
    finish(pool, user_id, id, GenerationStatus::Done, Some(image_url), None)
        .await
}

pub async fn mark_error(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    message: &str,
) -> Result<Generation> {
    finish(pool, user_id, id, GenerationStatus::Error, None, Some(message))
        .await
}

// The status guard in the WHERE clause is what keeps terminal records
// immutable, even with two writers racing on the same row.
async fn finish(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    status: GenerationStatus,
    image_url: Option<&str>,
    error: Option<&str>,
) -> Result<Generation> {
    let updated = sqlx::query(
        r#"
        UPDATE generations
        SET status = ?1, image_url = ?2, error = ?3, updated_at = ?4
        WHERE user_id = ?5 AND id = ?6 AND status = 'processing'
        "#,
    )
    .bind(status.as_str())
    .bind(image_url)
    .bind(error)
    .bind(Utc::now().timestamp_micros())
    .bind(user_id)
    .bind(id)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to mark generation {} {}", id, status))?
    .rows_affected();

    let current = find(pool, user_id, id)
        .await?
        .ok_or_else(|| anyhow!("Generation {} not found", id))?;

    if updated == 0 {
        return Err(anyhow!(
            "Generation {} is already {}, can't mark it {}",
            id,
            current.status,
            status
        ));
    }

    Ok(current)
}

/// Completed generations of one user, newest first.
pub async fn list_done(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<Generation>> {
    let rows = sqlx::query_as::<_, GenerationRow>(&format!(
        r#"
        SELECT {}
        FROM generations
        WHERE user_id = ?1 AND status = 'done'
        ORDER BY created_at DESC, seq DESC
        LIMIT ?2
        "#,
        SELECT_COLUMNS
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to list generations for {}", user_id))?;

    rows.into_iter().map(Generation::try_from).collect()
}

pub async fn count_for_user(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM generations WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .with_context(|| format!("Failed to count generations for {}", user_id))?;
    Ok(count)
}
