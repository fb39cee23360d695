//! Session and page-view repositories.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use storelens_core::{DeviceType, PageType, PageViewId, ProductId, SessionId, UserId};

use super::{Page, RepositoryError};
use crate::models::{PageView, UserSession};

const SESSION_COLUMNS: &str = "s.id, s.user_id, s.session_start, s.session_end, \
     s.session_duration_minutes, s.pages_viewed, s.device_type, s.browser";

const PAGE_VIEW_COLUMNS: &str =
    r#"v.id, v.session_id, v.product_id, v.page_type, v."timestamp", v.time_spent_seconds"#;

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: SessionId,
    user_id: UserId,
    session_start: DateTime<Utc>,
    session_end: Option<DateTime<Utc>>,
    session_duration_minutes: Option<f64>,
    pages_viewed: i32,
    device_type: String,
    browser: String,
}

impl TryFrom<SessionRow> for UserSession {
    type Error = RepositoryError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            session_start: row.session_start,
            session_end: row.session_end,
            session_duration_minutes: row.session_duration_minutes,
            pages_viewed: row.pages_viewed,
            device_type: row.device_type.parse::<DeviceType>()?,
            browser: row.browser,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PageViewRow {
    id: PageViewId,
    session_id: SessionId,
    product_id: Option<ProductId>,
    page_type: String,
    timestamp: DateTime<Utc>,
    time_spent_seconds: i32,
}

impl TryFrom<PageViewRow> for PageView {
    type Error = RepositoryError;

    fn try_from(row: PageViewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            session_id: row.session_id,
            product_id: row.product_id,
            page_type: row.page_type.parse::<PageType>()?,
            timestamp: row.timestamp,
            time_spent_seconds: row.time_spent_seconds,
        })
    }
}

fn into_sessions(rows: Vec<SessionRow>) -> Result<Vec<UserSession>, RepositoryError> {
    rows.into_iter().map(UserSession::try_from).collect()
}

fn into_page_views(rows: Vec<PageViewRow>) -> Result<Vec<PageView>, RepositoryError> {
    rows.into_iter().map(PageView::try_from).collect()
}

/// Repository for browsing sessions.
pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List sessions, optionally for one user, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored device type is unknown.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Option<UserId>,
        page: Page,
    ) -> Result<Vec<UserSession>, RepositoryError> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            r"
            SELECT {SESSION_COLUMNS}
            FROM analytics.user_sessions s
            WHERE ($1::int IS NULL OR s.user_id = $1)
            ORDER BY s.id
            OFFSET $2 LIMIT $3
            "
        ))
        .bind(user_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool)
        .await?;

        debug!(count = rows.len(), "Listed sessions");
        into_sessions(rows)
    }

    /// Get a session by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored device type is unknown.
    pub async fn get(&self, id: SessionId) -> Result<Option<UserSession>, RepositoryError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM analytics.user_sessions s WHERE s.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserSession::try_from).transpose()
    }

    /// Sessions that started at or after `since`, optionally limited to one
    /// user and one device class, ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored device type is unknown.
    #[instrument(skip(self))]
    pub async fn started_since(
        &self,
        since: DateTime<Utc>,
        user_id: Option<UserId>,
        device: Option<DeviceType>,
    ) -> Result<Vec<UserSession>, RepositoryError> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            r"
            SELECT {SESSION_COLUMNS}
            FROM analytics.user_sessions s
            WHERE s.session_start >= $1
              AND ($2::int IS NULL OR s.user_id = $2)
              AND ($3::text IS NULL OR s.device_type = $3)
            ORDER BY s.session_start, s.id
            "
        ))
        .bind(since)
        .bind(user_id)
        .bind(device.map(DeviceType::as_str))
        .fetch_all(self.pool)
        .await?;

        into_sessions(rows)
    }

    /// Most recent sessions, newest first, optionally for one user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored device type is unknown.
    pub async fn most_recent(
        &self,
        user_id: Option<UserId>,
        limit: i64,
    ) -> Result<Vec<UserSession>, RepositoryError> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            r"
            SELECT {SESSION_COLUMNS}
            FROM analytics.user_sessions s
            WHERE ($1::int IS NULL OR s.user_id = $1)
            ORDER BY s.session_start DESC, s.id DESC
            LIMIT $2
            "
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        into_sessions(rows)
    }

    /// Load every session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored device type is unknown.
    pub async fn all(&self) -> Result<Vec<UserSession>, RepositoryError> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM analytics.user_sessions s ORDER BY s.id"
        ))
        .fetch_all(self.pool)
        .await?;

        into_sessions(rows)
    }
}

/// Repository for page views.
pub struct PageViewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PageViewRepository<'a> {
    /// Create a new page-view repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List page views, optionally for one session, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored page type is unknown.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        session_id: Option<SessionId>,
        page: Page,
    ) -> Result<Vec<PageView>, RepositoryError> {
        let rows: Vec<PageViewRow> = sqlx::query_as(&format!(
            r"
            SELECT {PAGE_VIEW_COLUMNS}
            FROM analytics.page_views v
            WHERE ($1::int IS NULL OR v.session_id = $1)
            ORDER BY v.id
            OFFSET $2 LIMIT $3
            "
        ))
        .bind(session_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool)
        .await?;

        debug!(count = rows.len(), "Listed page views");
        into_page_views(rows)
    }

    /// Page views of the given sessions, in visit order within each session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored page type is unknown.
    pub async fn for_sessions(
        &self,
        session_ids: &[SessionId],
    ) -> Result<Vec<PageView>, RepositoryError> {
        let ids: Vec<i32> = session_ids.iter().map(SessionId::as_i32).collect();
        let rows: Vec<PageViewRow> = sqlx::query_as(&format!(
            r#"
            SELECT {PAGE_VIEW_COLUMNS}
            FROM analytics.page_views v
            WHERE v.session_id = ANY($1)
            ORDER BY v.session_id, v."timestamp", v.id
            "#
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        into_page_views(rows)
    }

    /// Page views recorded at or after `since`, optionally limited to one user
    /// (through their sessions) and one page type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored page type is unknown.
    #[instrument(skip(self))]
    pub async fn recorded_since(
        &self,
        since: DateTime<Utc>,
        user_id: Option<UserId>,
        page_type: Option<PageType>,
    ) -> Result<Vec<PageView>, RepositoryError> {
        let rows: Vec<PageViewRow> = sqlx::query_as(&format!(
            r#"
            SELECT {PAGE_VIEW_COLUMNS}
            FROM analytics.page_views v
            JOIN analytics.user_sessions s ON s.id = v.session_id
            WHERE v."timestamp" >= $1
              AND ($2::int IS NULL OR s.user_id = $2)
              AND ($3::text IS NULL OR v.page_type = $3)
            ORDER BY v."timestamp", v.id
            "#
        ))
        .bind(since)
        .bind(user_id)
        .bind(page_type.map(PageType::as_str))
        .fetch_all(self.pool)
        .await?;

        into_page_views(rows)
    }
}
