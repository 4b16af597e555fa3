use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::SearchMatcher;
use crate::models::{
    CheckListingRequest, ErrorResponse, HealthResponse, ResetSearchRequest, ResetSearchResponse,
    RunSearchRequest, RunSearchResponse, SavedSearch, SearchCriteria,
};
use crate::services::{CacheKey, CacheManager, MarketplaceClient, MatchSource, PostgresClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<MarketplaceClient>,
    pub cache: Arc<CacheManager>,
    pub store: Arc<PostgresClient>,
    pub matcher: SearchMatcher,
    pub limits: MatchingSettings,
}

/// Configure all search-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/searches/run", web::post().to(run_search))
        .route("/searches/matches", web::get().to(get_search_matches))
        .route("/searches/stats", web::get().to(get_search_stats))
        .route("/searches/reset", web::post().to(reset_search))
        .route("/listings/check", web::post().to(check_listing))
        .route("/debug/echo", web::post().to(debug_echo));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Debug endpoint to echo raw JSON for debugging
async fn debug_echo(body: web::Bytes, req: actix_web::HttpRequest) -> impl Responder {
    let body_str = String::from_utf8_lossy(&body);
    tracing::info!("DEBUG echo - path: {}, method: {}, body: {}", req.path(), req.method(), body_str);
    HttpResponse::Ok().json(serde_json::json!({
        "path": req.path(),
        "method": req.method().to_string(),
        "body": body_str,
    }))
}

/// Resolve the criteria for a run: a saved search by id (cache, then
/// backend), or the inline criteria from the request body.
async fn resolve_criteria(
    state: &AppState,
    req: &RunSearchRequest,
) -> Result<SearchCriteria, HttpResponse> {
    let search_id = match &req.search_id {
        Some(id) => id,
        None => {
            return req.criteria.clone().ok_or_else(|| {
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Missing criteria".to_string(),
                    message: "Either searchId or criteria must be provided".to_string(),
                    status_code: 400,
                })
            });
        }
    };

    let cache_key = CacheKey::saved_search(search_id);
    if let Ok(saved) = state.cache.get::<SavedSearch>(&cache_key).await {
        return Ok(saved.criteria);
    }

    match state.backend.get_saved_search(search_id).await {
        Ok(saved) => {
            if let Err(e) = state.cache.set(&cache_key, &saved).await {
                tracing::warn!("Failed to cache saved search {}: {}", search_id, e);
            }
            Ok(saved.criteria)
        }
        Err(e) => {
            tracing::error!("Failed to fetch saved search {}: {}", search_id, e);
            Err(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch saved search".to_string(),
                message: e.to_string(),
                status_code: 500,
            }))
        }
    }
}

/// Run a saved search against current listings
///
/// POST /api/v1/searches/run
///
/// Request body:
/// ```json
/// {
///   "searchId": "string",
///   "userId": "string",
///   "criteria": { ... },
///   "limit": 20,
///   "excludeListingIds": ["string"]
/// }
/// ```
async fn run_search(
    state: web::Data<AppState>,
    req: web::Json<RunSearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for run_search request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    // Cap the limit to keep candidate queries bounded
    let limit = if req.limit == 0 {
        state.limits.default_limit
    } else {
        req.limit.min(state.limits.max_limit)
    };
    let limit = limit as usize;

    tracing::info!(
        "Running search for user: {} (searchId: {:?}, limit: {})",
        req.user_id,
        req.search_id,
        limit
    );

    let criteria = match resolve_criteria(&state, &req).await {
        Ok(criteria) => criteria,
        Err(response) => return response,
    };

    // Listings this search has already matched are not "new"; exclude them
    let mut known_listing_ids = match &req.search_id {
        Some(id) => match state.store.get_matched_listings(id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch matched listings for {}, proceeding without exclusion: {}",
                    id,
                    e
                );
                vec![]
            }
        },
        None => vec![],
    };
    known_listing_ids.extend(req.exclude_listing_ids.clone());

    // Fetch a candidate batch from the marketplace backend
    let candidate_batch = limit * state.limits.candidate_multiplier;
    let candidates = match state.backend.query_listings(&criteria, candidate_batch).await {
        Ok(listings) => listings,
        Err(e) => {
            tracing::error!("Failed to query listings: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to query listings".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    tracing::debug!("Fetched {} candidate listings", candidates.len());

    let candidates: Vec<_> = candidates
        .into_iter()
        .filter(|listing| !known_listing_ids.contains(&listing.listing_id))
        .collect();

    let result = state.matcher.filter_listings(&criteria, candidates, limit);

    // Record the matches and stamp the check; failures here must not lose
    // the response
    if let Some(search_id) = &req.search_id {
        for matched in &result.matches {
            if let Err(e) = state
                .store
                .record_match(search_id, &matched.listing_id, MatchSource::Run)
                .await
            {
                tracing::warn!("Failed to record match {} -> {}: {}", search_id, matched.listing_id, e);
            }
        }

        if let Err(e) = state.store.mark_checked(search_id).await {
            tracing::warn!("Failed to mark search {} as checked: {}", search_id, e);
        }

        if let Err(e) = state.cache.delete(&CacheKey::matches(search_id)).await {
            tracing::warn!("Failed to invalidate match cache: {}", e);
        }
    }

    let response = RunSearchResponse {
        search_id: req.search_id.clone(),
        matches: result.matches,
        total_candidates: result.total_candidates,
    };

    tracing::info!(
        "Returning {} matches for user {} (from {} candidates)",
        response.matches.len(),
        req.user_id,
        response.total_candidates
    );

    HttpResponse::Ok().json(response)
}

/// Evaluate one listing against every active saved search
///
/// POST /api/v1/listings/check
///
/// The matched search ids are recorded (bumping each search's new-listings
/// counter) and returned for the caller's notification dispatcher.
async fn check_listing(
    state: web::Data<AppState>,
    req: web::Json<CheckListingRequest>,
) -> impl Responder {
    let listing = &req.listing;

    if listing.listing_id.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid listing".to_string(),
            message: "listing.listingId must not be empty".to_string(),
            status_code: 400,
        });
    }

    let searches = match state.backend.list_active_searches().await {
        Ok(searches) => searches,
        Err(e) => {
            tracing::error!("Failed to fetch active searches: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch active searches".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    tracing::debug!(
        "Checking listing {} against {} active searches",
        listing.listing_id,
        searches.len()
    );

    let matched_search_ids = state.matcher.matching_searches(listing, &searches);

    for search_id in &matched_search_ids {
        if let Err(e) = state
            .store
            .record_match(search_id, &listing.listing_id, MatchSource::Ingest)
            .await
        {
            tracing::warn!("Failed to record match {} -> {}: {}", search_id, listing.listing_id, e);
        }

        if let Err(e) = state.cache.delete(&CacheKey::matches(search_id)).await {
            tracing::warn!("Failed to invalidate match cache: {}", e);
        }
    }

    tracing::info!(
        "Listing {} matched {} of {} active searches",
        listing.listing_id,
        matched_search_ids.len(),
        searches.len()
    );

    let count = matched_search_ids.len();
    HttpResponse::Ok().json(crate::models::CheckListingResponse {
        check_id: uuid::Uuid::new_v4().to_string(),
        listing_id: listing.listing_id.clone(),
        matched_search_ids,
        count,
    })
}

/// Get the match history of a saved search
///
/// GET /api/v1/searches/matches?searchId={searchId}&limit={limit}&offset={offset}
async fn get_search_matches(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let search_id = match query.get("searchId") {
        Some(id) => id,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing searchId parameter".to_string(),
                message: "searchId query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    let limit = query
        .get("limit")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(100);
    let offset = query
        .get("offset")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    match state.store.get_matches_paginated(search_id, limit, offset).await {
        Ok(matches) => {
            let count = matches.len();
            HttpResponse::Ok().json(serde_json::json!({
                "searchId": search_id,
                "matches": matches,
                "count": count,
            }))
        }
        Err(e) => {
            tracing::error!("Failed to fetch matches for {}: {}", search_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch matches".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Get bookkeeping statistics for a saved search
///
/// GET /api/v1/searches/stats?searchId={searchId}
async fn get_search_stats(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let search_id = match query.get("searchId") {
        Some(id) => id,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing searchId parameter".to_string(),
                message: "searchId query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    match state.store.get_search_stats(search_id).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            tracing::error!("Failed to fetch stats for {}: {}", search_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch stats".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Clear a saved search's match history and reset its counters
///
/// POST /api/v1/searches/reset
///
/// Used when a user edits the criteria of an existing search: the old match
/// history no longer applies to the new criteria.
async fn reset_search(
    state: web::Data<AppState>,
    req: web::Json<ResetSearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let cleared = match state.store.clear_matches(&req.search_id).await {
        Ok(cleared) => cleared,
        Err(e) => {
            tracing::error!("Failed to clear matches for {}: {}", req.search_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to clear matches".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    if let Err(e) = state.store.mark_checked(&req.search_id).await {
        tracing::warn!("Failed to reset state for {}: {}", req.search_id, e);
    }

    // The stale cached search and its results both go
    if let Err(e) = state.cache.delete(&CacheKey::saved_search(&req.search_id)).await {
        tracing::warn!("Failed to invalidate search cache: {}", e);
    }
    if let Err(e) = state.cache.invalidate_pattern("matches:*").await {
        tracing::warn!("Failed to invalidate match caches: {}", e);
    }

    HttpResponse::Ok().json(ResetSearchResponse {
        search_id: req.search_id.clone(),
        cleared,
    })
}
