use std::collections::HashSet;

use crate::core::distance::haversine_distance;
use crate::models::{Listing, SearchCriteria};

/// Decide whether a single listing satisfies a search-criteria object.
///
/// Pure predicate: all present constraints combine with logical AND and the
/// evaluation short-circuits on the first failing check. An absent or empty
/// constraint field is a wildcard, never "reject all".
#[inline]
pub fn matches_criteria(listing: &Listing, criteria: &SearchCriteria) -> bool {
    // Radius check, only when the criteria carry both a center and a radius
    if let Some((center, radius)) = criteria.radius_filter() {
        let distance = haversine_distance(
            center.lat,
            center.lng,
            listing.latitude,
            listing.longitude,
        );
        if distance > radius {
            return false;
        }
    }

    // Price range; bounds are inclusive, a listing priced exactly at min or
    // max passes
    if let Some(range) = &criteria.price_range {
        if let Some(min) = range.min {
            if listing.price < min {
                return false;
            }
        }
        if let Some(max) = range.max {
            if listing.price > max {
                return false;
            }
        }
    }

    // Bedroom counts
    if let Some(bedrooms) = &criteria.bedrooms {
        if !bedrooms.is_empty() && !bedrooms.contains(&listing.beds) {
            return false;
        }
    }

    // Bathroom counts
    if let Some(bathrooms) = &criteria.bathrooms {
        if !bathrooms.is_empty() && !bathrooms.contains(&listing.baths) {
            return false;
        }
    }

    // Property types
    if let Some(types) = &criteria.property_types {
        if !types.is_empty() && !types.contains(&listing.property_type) {
            return false;
        }
    }

    // Amenities: the listing must carry every requested amenity, not just any
    if let Some(required) = &criteria.amenities {
        if !required.is_empty() {
            let available: HashSet<&str> =
                listing.amenities.iter().map(String::as_str).collect();
            if !required.iter().all(|a| available.contains(a.as_str())) {
                return false;
            }
        }
    }

    // Pet policy: Some(false) is a real constraint, absence is not
    if let Some(policy) = &criteria.pet_policy {
        if let Some(allowed) = policy.allowed {
            if listing.pet_friendly != allowed {
                return false;
            }
        }
    }

    true
}
