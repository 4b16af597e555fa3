use std::cmp::Ordering;

use crate::core::{
    criteria::matches_criteria,
    distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box},
};
use crate::models::{Listing, MatchedListing, SavedSearch, SearchCriteria};

/// Result of a batch criteria evaluation
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<MatchedListing>,
    pub total_candidates: usize,
}

/// Batch orchestrator over the criteria predicate
///
/// Drives `matches_criteria` across candidate batches in both directions:
/// one search against many listings, and one listing against many saved
/// searches. Stateless; safe to share across request handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchMatcher;

impl SearchMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Filter a candidate batch against one criteria set
    ///
    /// When the criteria carry a radius filter, a bounding-box pre-filter
    /// runs before the exact Haversine check and each match is annotated
    /// with its distance from the search center. Results are sorted nearest
    /// first, then cheapest.
    ///
    /// # Arguments
    /// * `criteria` - The search criteria to evaluate against
    /// * `listings` - All candidate listings from the marketplace backend
    /// * `limit` - Maximum number of matches to return
    pub fn filter_listings(
        &self,
        criteria: &SearchCriteria,
        listings: Vec<Listing>,
        limit: usize,
    ) -> MatchResult {
        let total_candidates = listings.len();

        let radius_filter = criteria.radius_filter();
        let bbox = radius_filter
            .map(|(center, radius)| calculate_bounding_box(center.lat, center.lng, radius));

        let mut matches: Vec<MatchedListing> = listings
            .into_iter()
            .filter(|listing| listing.is_active)
            // Cheap rectangular pre-filter before the exact radius check
            .filter(|listing| {
                bbox.map_or(true, |b| {
                    is_within_bounding_box(listing.latitude, listing.longitude, &b)
                })
            })
            .filter(|listing| matches_criteria(listing, criteria))
            .map(|listing| {
                let distance_miles = radius_filter.map(|(center, _)| {
                    haversine_distance(
                        center.lat,
                        center.lng,
                        listing.latitude,
                        listing.longitude,
                    )
                });
                MatchedListing::from_listing(listing, distance_miles)
            })
            .collect();

        // Sort by distance (ascending) and then by price (ascending);
        // matches without a distance annotation sort by price alone
        matches.sort_by(|a, b| {
            let by_distance = match (a.distance_miles, b.distance_miles) {
                (Some(da), Some(db)) => da.partial_cmp(&db).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            by_distance.then_with(|| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal))
        });

        matches.truncate(limit);

        MatchResult {
            matches,
            total_candidates,
        }
    }

    /// Find which saved searches a single listing satisfies
    ///
    /// The fan-out direction used when a new listing lands: the caller feeds
    /// the returned search ids to its notification dispatcher. Paused
    /// searches and inactive listings never match.
    pub fn matching_searches(&self, listing: &Listing, searches: &[SavedSearch]) -> Vec<String> {
        if !listing.is_active {
            return Vec::new();
        }

        searches
            .iter()
            .filter(|search| search.is_active)
            .filter(|search| matches_criteria(listing, &search.criteria))
            .map(|search| search.search_id.clone())
            .collect()
    }
}
