use serde::{Deserialize, Serialize};

use crate::models::domain::MatchedListing;

/// Response for the run-search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSearchResponse {
    pub search_id: Option<String>,
    pub matches: Vec<MatchedListing>,
    pub total_candidates: usize,
}

/// Response for the check-listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckListingResponse {
    /// Trace id for this evaluation, for the notification dispatcher's logs
    pub check_id: String,
    pub listing_id: String,
    pub matched_search_ids: Vec<String>,
    pub count: usize,
}

/// Response for the reset-search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetSearchResponse {
    pub search_id: String,
    pub cleared: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
