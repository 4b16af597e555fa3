use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Listing, SearchCriteria};

/// Request to run a saved search against current listings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunSearchRequest {
    /// Saved search to run; when absent, `criteria` is used instead
    #[validate(length(min = 1))]
    #[serde(alias = "search_id", rename = "searchId", default)]
    pub search_id: Option<String>,
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    /// Inline criteria for ad-hoc runs; ignored when `searchId` is set
    #[serde(default)]
    pub criteria: Option<SearchCriteria>,
    #[serde(default = "default_limit")]
    pub limit: u16,
    /// Listing ids the client already knows about
    #[serde(default)]
    #[serde(alias = "excludeListingIds", rename = "excludeListingIds")]
    pub exclude_listing_ids: Vec<String>,
}

fn default_limit() -> u16 {
    20
}

/// Request to evaluate one listing against all active saved searches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckListingRequest {
    pub listing: Listing,
}

/// Request to clear the match history of a saved search
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetSearchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "search_id", rename = "searchId")]
    pub search_id: String,
}
