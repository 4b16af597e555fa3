use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Listing, SavedSearch, SearchCriteria};

/// Errors that can occur when talking to the marketplace backend
#[derive(Debug, Error)]
pub enum MarketplaceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Marketplace backend API client
///
/// Handles all communication with the listings backend including:
/// - Fetching candidate listings for a search run
/// - Fetching saved searches and their criteria
pub struct MarketplaceClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl MarketplaceClient {
    /// Create a new marketplace client
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Fetch a single listing by id
    pub async fn get_listing(&self, listing_id: &str) -> Result<Listing, MarketplaceError> {
        let url = self.url(&format!("/api/v1/listings/{}", listing_id));

        tracing::debug!("Fetching listing: {}", listing_id);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketplaceError::NotFound(format!(
                "Listing {} not found",
                listing_id
            )));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketplaceError::Unauthorized);
        }
        if !status.is_success() {
            return Err(MarketplaceError::ApiError(format!(
                "Failed to fetch listing: {}",
                status
            )));
        }

        let json: Value = response.json().await?;

        serde_json::from_value(json)
            .map_err(|e| MarketplaceError::InvalidResponse(format!("Failed to parse listing: {}", e)))
    }

    /// Query candidate listings for a criteria set
    ///
    /// Pushes the cheap pre-filters into query parameters (price bounds and
    /// a bounding box derived from the radius criteria); exact matching is
    /// the matcher's job on the returned batch.
    pub async fn query_listings(
        &self,
        criteria: &SearchCriteria,
        limit: usize,
    ) -> Result<Vec<Listing>, MarketplaceError> {
        let mut params = vec![
            ("status".to_string(), "active".to_string()),
            ("limit".to_string(), limit.to_string()),
        ];

        if let Some(range) = &criteria.price_range {
            if let Some(min) = range.min {
                params.push(("minPrice".to_string(), min.to_string()));
            }
            if let Some(max) = range.max {
                params.push(("maxPrice".to_string(), max.to_string()));
            }
        }

        if let Some((center, radius)) = criteria.radius_filter() {
            let bbox = crate::core::distance::calculate_bounding_box(center.lat, center.lng, radius);
            params.push(("minLat".to_string(), bbox.min_lat.to_string()));
            params.push(("maxLat".to_string(), bbox.max_lat.to_string()));
            params.push(("minLng".to_string(), bbox.min_lon.to_string()));
            params.push(("maxLng".to_string(), bbox.max_lon.to_string()));
        }

        if let Some(types) = &criteria.property_types {
            if !types.is_empty() {
                params.push(("propertyTypes".to_string(), types.join(",")));
            }
        }

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let url = format!("{}?{}", self.url("/api/v1/listings"), query);

        tracing::debug!("Querying listings: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketplaceError::ApiError(format!(
                "Failed to query listings: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = json
            .get("listings")
            .and_then(|l| l.as_array())
            .ok_or_else(|| MarketplaceError::InvalidResponse("Missing listings array".into()))?;

        // Tolerate individual malformed documents rather than failing the batch
        let listings: Vec<Listing> = documents
            .iter()
            .filter_map(|doc| serde_json::from_value(doc.clone()).ok())
            .collect();

        tracing::debug!("Queried {} listings (total: {})", listings.len(), total);

        Ok(listings)
    }

    /// Fetch a saved search by id
    pub async fn get_saved_search(&self, search_id: &str) -> Result<SavedSearch, MarketplaceError> {
        let url = self.url(&format!("/api/v1/saved-searches/{}", search_id));

        tracing::debug!("Fetching saved search: {}", search_id);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketplaceError::NotFound(format!(
                "Saved search {} not found",
                search_id
            )));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketplaceError::Unauthorized);
        }
        if !status.is_success() {
            return Err(MarketplaceError::ApiError(format!(
                "Failed to fetch saved search: {}",
                status
            )));
        }

        let json: Value = response.json().await?;

        serde_json::from_value(json).map_err(|e| {
            MarketplaceError::InvalidResponse(format!("Failed to parse saved search: {}", e))
        })
    }

    /// Fetch the saved searches belonging to one user
    pub async fn get_user_searches(
        &self,
        user_id: &str,
    ) -> Result<Vec<SavedSearch>, MarketplaceError> {
        let url = format!(
            "{}?userId={}",
            self.url("/api/v1/saved-searches"),
            urlencoding::encode(user_id)
        );

        self.fetch_searches(&url).await
    }

    /// Fetch every active saved search, for the listing-ingest fan-out
    pub async fn list_active_searches(&self) -> Result<Vec<SavedSearch>, MarketplaceError> {
        let url = format!("{}?status=active", self.url("/api/v1/saved-searches"));

        self.fetch_searches(&url).await
    }

    async fn fetch_searches(&self, url: &str) -> Result<Vec<SavedSearch>, MarketplaceError> {
        tracing::debug!("Fetching saved searches: {}", url);

        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketplaceError::ApiError(format!(
                "Failed to fetch saved searches: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("searches")
            .and_then(|s| s.as_array())
            .ok_or_else(|| MarketplaceError::InvalidResponse("Missing searches array".into()))?;

        let searches: Vec<SavedSearch> = documents
            .iter()
            .filter_map(|doc| serde_json::from_value(doc.clone()).ok())
            .collect();

        tracing::debug!("Fetched {} saved searches", searches.len());

        Ok(searches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, LocationCriteria, PriceRange};

    #[test]
    fn test_marketplace_client_creation() {
        let client = MarketplaceClient::new(
            "https://api.haven.test/".to_string(),
            "test_key".to_string(),
        );

        assert_eq!(client.base_url, "https://api.haven.test/");
        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.url("/api/v1/listings"), "https://api.haven.test/api/v1/listings");
    }

    #[test]
    fn test_criteria_pre_filters_cover_price_and_bbox() {
        // The query builder reads the same optional fields the matcher does;
        // a criteria with both present must surface both param groups
        let criteria = SearchCriteria {
            location: Some(LocationCriteria {
                address: None,
                coordinates: Some(Coordinates { lat: 5.6037, lng: -0.187 }),
                radius: Some(5.0),
            }),
            price_range: Some(PriceRange { min: Some(1000.0), max: Some(2000.0) }),
            ..Default::default()
        };

        assert!(criteria.radius_filter().is_some());
        assert!(criteria.price_range.is_some());
    }
}
