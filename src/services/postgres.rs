use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Where a recorded match came from
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_source", rename_all = "lowercase")]
pub enum MatchSource {
    /// A user-triggered or scheduled run of a saved search
    Run,
    /// A newly ingested listing fanned out against active searches
    Ingest,
}

/// Record of a listing matched against a saved search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    pub search_id: String,
    pub listing_id: String,
    pub source: MatchSource,
    pub matched_at: chrono::DateTime<chrono::Utc>,
}

/// PostgreSQL client for saved-search match bookkeeping
///
/// The marketplace backend owns saved searches and listings; this database
/// only tracks which listings each search has already matched, so a run can
/// report "new since last check" instead of repeating known results.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL with URL: {}", url);

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Record that a saved search matched a listing
    ///
    /// Idempotent per (search, listing) pair. The new-listings counter is
    /// bumped only when the pair is fresh, so re-running a search does not
    /// inflate it. Returns whether the match was new.
    pub async fn record_match(
        &self,
        search_id: &str,
        listing_id: &str,
        source: MatchSource,
    ) -> Result<bool, PostgresError> {
        let query = r#"
            INSERT INTO search_matches (search_id, listing_id, source, matched_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (search_id, listing_id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(search_id)
            .bind(listing_id)
            .bind(&source)
            .execute(&self.pool)
            .await?;

        let fresh = result.rows_affected() > 0;

        if fresh {
            let bump = r#"
                INSERT INTO search_state (search_id, new_listings_count)
                VALUES ($1, 1)
                ON CONFLICT (search_id)
                DO UPDATE SET new_listings_count = search_state.new_listings_count + 1
            "#;

            sqlx::query(bump).bind(search_id).execute(&self.pool).await?;
        }

        tracing::debug!(
            "Recorded match: {} -> {} ({:?}, fresh: {})",
            search_id,
            listing_id,
            source,
            fresh
        );

        Ok(fresh)
    }

    /// Get all listing ids a saved search has already matched
    ///
    /// Used to exclude known listings from a run, so only genuinely new
    /// matches are reported.
    pub async fn get_matched_listings(&self, search_id: &str) -> Result<Vec<String>, PostgresError> {
        let query = r#"
            SELECT listing_id
            FROM search_matches
            WHERE search_id = $1
        "#;

        let rows = sqlx::query(query).bind(search_id).fetch_all(&self.pool).await?;

        let listing_ids: Vec<String> = rows.iter().map(|row| row.get("listing_id")).collect();

        tracing::debug!("Search {} has {} matched listings", search_id, listing_ids.len());

        Ok(listing_ids)
    }

    /// Get match history with pagination, newest first
    pub async fn get_matches_paginated(
        &self,
        search_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SearchMatch>, PostgresError> {
        let query = r#"
            SELECT search_id, listing_id, source, matched_at
            FROM search_matches
            WHERE search_id = $1
            ORDER BY matched_at DESC
            LIMIT $2 OFFSET $3
        "#;

        let rows = sqlx::query(query)
            .bind(search_id)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

        let matches: Vec<SearchMatch> = rows
            .iter()
            .map(|row| SearchMatch {
                search_id: row.get("search_id"),
                listing_id: row.get("listing_id"),
                source: row.get("source"),
                matched_at: row.get("matched_at"),
            })
            .collect();

        Ok(matches)
    }

    /// Remove one match record (e.g. a delisted property)
    pub async fn remove_match(
        &self,
        search_id: &str,
        listing_id: &str,
    ) -> Result<bool, PostgresError> {
        let query = r#"
            DELETE FROM search_matches
            WHERE search_id = $1 AND listing_id = $2
        "#;

        let result = sqlx::query(query)
            .bind(search_id)
            .bind(listing_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear the entire match history of a saved search
    pub async fn clear_matches(&self, search_id: &str) -> Result<u64, PostgresError> {
        let query = r#"
            DELETE FROM search_matches
            WHERE search_id = $1
        "#;

        let result = sqlx::query(query).bind(search_id).execute(&self.pool).await?;

        tracing::info!(
            "Cleared {} matches for search {}",
            result.rows_affected(),
            search_id
        );

        Ok(result.rows_affected())
    }

    /// Stamp a saved search as checked and reset its new-listings counter
    pub async fn mark_checked(&self, search_id: &str) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO search_state (search_id, last_checked_at, new_listings_count)
            VALUES ($1, NOW(), 0)
            ON CONFLICT (search_id)
            DO UPDATE SET last_checked_at = NOW(), new_listings_count = 0
        "#;

        sqlx::query(query).bind(search_id).execute(&self.pool).await?;

        tracing::debug!("Marked search {} as checked", search_id);

        Ok(())
    }

    /// Get bookkeeping statistics for a saved search
    pub async fn get_search_stats(&self, search_id: &str) -> Result<SearchStats, PostgresError> {
        let query = r#"
            SELECT
                COUNT(*) as total_matches,
                COUNT(*) FILTER (WHERE source = 'run') as from_runs,
                COUNT(*) FILTER (WHERE source = 'ingest') as from_ingest,
                MAX(matched_at) as last_matched_at
            FROM search_matches
            WHERE search_id = $1
        "#;

        let row = sqlx::query(query).bind(search_id).fetch_one(&self.pool).await?;

        let state = sqlx::query(
            r#"
            SELECT last_checked_at, new_listings_count
            FROM search_state
            WHERE search_id = $1
        "#,
        )
        .bind(search_id)
        .fetch_optional(&self.pool)
        .await?;

        let (last_checked_at, new_listings_count) = match state {
            Some(s) => (s.get("last_checked_at"), s.get("new_listings_count")),
            None => (None, 0),
        };

        Ok(SearchStats {
            search_id: search_id.to_string(),
            total_matches: row.get("total_matches"),
            from_runs: row.get("from_runs"),
            from_ingest: row.get("from_ingest"),
            new_listings_count,
            last_matched_at: row.get("last_matched_at"),
            last_checked_at,
        })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Bookkeeping statistics for one saved search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStats {
    pub search_id: String,
    pub total_matches: i64,
    pub from_runs: i64,
    pub from_ingest: i64,
    pub new_listings_count: i64,
    pub last_matched_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_checked_at: Option<chrono::DateTime<chrono::Utc>>,
}
