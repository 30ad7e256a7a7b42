// Repository layer for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::*;

const EVENT_COLUMNS: &str = "id, summary, description, location, start_time, end_time, all_day, \
     timezone, status, transparency, calendar_id, html_link, created, updated, etag, \
     attendees, reminders, recurrence, owner_id, deleted_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Create a pool that only connects on first use
    pub fn from_url_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEvent) -> Result<EventRow> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (id, summary, description, location, start_time, end_time, all_day,
                                timezone, status, transparency, calendar_id, html_link, created,
                                updated, etag, attendees, reminders, recurrence, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(&input.id)
        .bind(&input.summary)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.all_day)
        .bind(&input.timezone)
        .bind(&input.status)
        .bind(&input.transparency)
        .bind(&input.calendar_id)
        .bind(&input.html_link)
        .bind(input.created)
        .bind(input.updated)
        .bind(&input.etag)
        .bind(&input.attendees)
        .bind(&input.reminders)
        .bind(&input.recurrence)
        .bind(input.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Insert an event pulled from the provider during sync; existing rows
    /// (including soft-deleted ones) are left untouched.
    pub async fn insert_event_if_absent(&self, input: CreateEvent) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO events (id, summary, description, location, start_time, end_time, all_day,
                                timezone, status, transparency, calendar_id, html_link, created,
                                updated, etag, attendees, reminders, recurrence, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&input.id)
        .bind(&input.summary)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.all_day)
        .bind(&input.timezone)
        .bind(&input.status)
        .bind(&input.transparency)
        .bind(&input.calendar_id)
        .bind(&input.html_link)
        .bind(input.created)
        .bind(input.updated)
        .bind(&input.etag)
        .bind(&input.attendees)
        .bind(&input.reminders)
        .bind(&input.recurrence)
        .bind(input.owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch a single live event scoped to its owner
    pub async fn get_event(&self, id: &str, owner_id: Uuid) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// List an owner's live events ordered by start_time
    pub async fn list_events(&self, owner_id: Uuid, filter: &EventFilter) -> Result<Vec<EventRow>> {
        let offset = (filter.page.saturating_sub(1) as i64) * filter.page_size as i64;

        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE owner_id = $1
              AND deleted_at IS NULL
              AND ($2::timestamptz IS NULL OR start_time >= $2)
              AND ($3::timestamptz IS NULL OR end_time <= $3)
            ORDER BY start_time ASC
            LIMIT $4 OFFSET $5
            "#,
        ))
        .bind(owner_id)
        .bind(filter.starts_after)
        .bind(filter.ends_before)
        .bind(filter.page_size as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Count of rows the same filter would match without paging
    pub async fn count_events(
        &self,
        owner_id: Uuid,
        starts_after: Option<DateTime<Utc>>,
        ends_before: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM events
            WHERE owner_id = $1
              AND deleted_at IS NULL
              AND ($2::timestamptz IS NULL OR start_time >= $2)
              AND ($3::timestamptz IS NULL OR end_time <= $3)
            "#,
        )
        .bind(owner_id)
        .bind(starts_after)
        .bind(ends_before)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    pub async fn update_event(
        &self,
        id: &str,
        owner_id: Uuid,
        input: UpdateEvent,
    ) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET
                summary = COALESCE($3, summary),
                description = COALESCE($4, description),
                location = COALESCE($5, location),
                start_time = COALESCE($6, start_time),
                end_time = COALESCE($7, end_time),
                timezone = COALESCE($8, timezone),
                transparency = COALESCE($9, transparency),
                updated = COALESCE($10, updated),
                etag = COALESCE($11, etag)
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .bind(&input.summary)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.timezone)
        .bind(&input.transparency)
        .bind(input.updated)
        .bind(&input.etag)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Soft delete: rows are stamped, never removed
    pub async fn soft_delete_event(&self, id: &str, owner_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET deleted_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
