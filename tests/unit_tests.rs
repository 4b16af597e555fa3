// Unit tests for Haven Match

use haven_match::core::{
    criteria::matches_criteria,
    distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box},
};
use haven_match::models::{
    Coordinates, Listing, LocationCriteria, PetPolicy, PriceRange, SearchCriteria,
};

fn accra_listing() -> Listing {
    Listing {
        listing_id: "listing_accra".to_string(),
        title: "2BR apartment near Osu".to_string(),
        latitude: 5.6037,
        longitude: -0.187,
        price: 1500.0,
        beds: 2,
        baths: 1,
        property_type: "Apartment".to_string(),
        amenities: vec!["Parking".to_string(), "Gym".to_string()],
        pet_friendly: true,
        is_active: true,
        landlord_id: None,
        created_at: None,
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(40.7128, -74.0060, 40.7128, -74.0060);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_symmetric() {
    let pairs = [
        ((40.7128, -74.0060), (34.0522, -118.2437)),
        ((5.6037, -0.187), (51.5074, -0.1278)),
        ((-33.8688, 151.2093), (35.6762, 139.6503)),
    ];

    for ((lat1, lon1), (lat2, lon2)) in pairs {
        let forward = haversine_distance(lat1, lon1, lat2, lon2);
        let backward = haversine_distance(lat2, lon2, lat1, lon1);
        assert_eq!(forward, backward);
    }
}

#[test]
fn test_haversine_one_degree_longitude_at_equator() {
    // (0,0) to (0,1) is about 69.17 miles
    let distance = haversine_distance(0.0, 0.0, 0.0, 1.0);
    assert!(
        (distance - 69.17).abs() < 0.5,
        "Expected ~69.17 miles, got {}",
        distance
    );
}

#[test]
fn test_haversine_nyc_to_la() {
    // New York to Los Angeles is approximately 2445 miles
    let distance = haversine_distance(40.7128, -74.0060, 34.0522, -118.2437);
    assert!(
        (distance - 2445.0).abs() < 50.0,
        "Expected ~2445 miles, got {}",
        distance
    );
}

#[test]
fn test_bounding_box_creation() {
    let bbox = calculate_bounding_box(40.7128, -74.0060, 10.0);

    assert!(bbox.min_lat < 40.7128);
    assert!(bbox.max_lat > 40.7128);
    assert!(bbox.min_lon < -74.0060);
    assert!(bbox.max_lon > -74.0060);

    // Bounding box should be roughly 0.29 degrees in latitude (20 miles / 69 miles per degree)
    let lat_span = bbox.max_lat - bbox.min_lat;
    assert!((lat_span - 0.29).abs() < 0.02);
}

#[test]
fn test_bounding_box_contains_radius() {
    // Every point within the radius must fall inside the box, or the
    // pre-filter would drop true matches
    let center_lat = 40.7128;
    let center_lon = -74.0060;
    let radius = 10.0;
    let bbox = calculate_bounding_box(center_lat, center_lon, radius);

    for (lat, lon) in [(40.78, -74.0), (40.7128, -74.15), (40.65, -73.95)] {
        let distance = haversine_distance(center_lat, center_lon, lat, lon);
        if distance <= radius {
            assert!(
                is_within_bounding_box(lat, lon, &bbox),
                "Point ({}, {}) at {} miles escaped the bounding box",
                lat,
                lon,
                distance
            );
        }
    }
}

#[test]
fn test_wildcard_criteria_matches_everything() {
    let criteria = SearchCriteria::default();

    let listings = [
        accra_listing(),
        Listing {
            listing_id: "cheap_studio".to_string(),
            title: "Studio".to_string(),
            latitude: 51.5074,
            longitude: -0.1278,
            price: 400.0,
            beds: 0,
            baths: 1,
            property_type: "Studio".to_string(),
            amenities: vec![],
            pet_friendly: false,
            is_active: true,
            landlord_id: None,
            created_at: None,
        },
    ];

    for listing in &listings {
        assert!(matches_criteria(listing, &criteria));
    }
}

#[test]
fn test_matching_is_deterministic() {
    let listing = accra_listing();
    let criteria = SearchCriteria {
        price_range: Some(PriceRange { min: Some(1000.0), max: Some(2000.0) }),
        bedrooms: Some(vec![2, 3]),
        amenities: Some(vec!["Parking".to_string()]),
        ..Default::default()
    };

    let first = matches_criteria(&listing, &criteria);
    for _ in 0..10 {
        assert_eq!(matches_criteria(&listing, &criteria), first);
    }
}

#[test]
fn test_scenario_combined_criteria_pass() {
    let listing = accra_listing();
    let criteria = SearchCriteria {
        price_range: Some(PriceRange { min: Some(1000.0), max: Some(2000.0) }),
        bedrooms: Some(vec![2, 3]),
        amenities: Some(vec!["Parking".to_string()]),
        ..Default::default()
    };

    assert!(matches_criteria(&listing, &criteria));
}

#[test]
fn test_scenario_missing_amenity_fails() {
    let listing = accra_listing();
    let criteria = SearchCriteria {
        amenities: Some(vec!["Parking".to_string(), "Pool".to_string()]),
        ..Default::default()
    };

    assert!(!matches_criteria(&listing, &criteria));
}

#[test]
fn test_scenario_pet_policy_disallowed_fails() {
    let listing = accra_listing();
    let criteria = SearchCriteria {
        pet_policy: Some(PetPolicy { allowed: Some(false) }),
        ..Default::default()
    };

    assert!(!matches_criteria(&listing, &criteria));
}

#[test]
fn test_scenario_radius_one_mile_passes() {
    let listing = accra_listing();
    let criteria = SearchCriteria {
        location: Some(LocationCriteria {
            address: None,
            coordinates: Some(Coordinates { lat: 5.60, lng: -0.19 }),
            radius: Some(1.0),
        }),
        ..Default::default()
    };

    assert!(matches_criteria(&listing, &criteria));
}

#[test]
fn test_scenario_tiny_radius_fails() {
    let listing = accra_listing();
    let criteria = SearchCriteria {
        location: Some(LocationCriteria {
            address: None,
            coordinates: Some(Coordinates { lat: 5.60, lng: -0.19 }),
            radius: Some(0.001),
        }),
        ..Default::default()
    };

    assert!(!matches_criteria(&listing, &criteria));
}

#[test]
fn test_scenario_exact_price_boundary_passes() {
    let listing = accra_listing();
    let criteria = SearchCriteria {
        price_range: Some(PriceRange { min: Some(1500.0), max: None }),
        ..Default::default()
    };

    assert!(matches_criteria(&listing, &criteria));
}

#[test]
fn test_empty_constraint_arrays_are_wildcards() {
    let listing = accra_listing();
    let criteria = SearchCriteria {
        bedrooms: Some(vec![]),
        bathrooms: Some(vec![]),
        property_types: Some(vec![]),
        amenities: Some(vec![]),
        ..Default::default()
    };

    assert!(matches_criteria(&listing, &criteria));
}

#[test]
fn test_bathroom_membership() {
    let listing = accra_listing();

    let criteria = SearchCriteria {
        bathrooms: Some(vec![2, 3]),
        ..Default::default()
    };
    assert!(!matches_criteria(&listing, &criteria));

    let criteria = SearchCriteria {
        bathrooms: Some(vec![1, 2]),
        ..Default::default()
    };
    assert!(matches_criteria(&listing, &criteria));
}
