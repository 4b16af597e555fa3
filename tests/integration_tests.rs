// Integration tests for Haven Match

use haven_match::core::{
    distance::haversine_distance, matcher::SearchMatcher,
};
use haven_match::models::{
    Coordinates, Listing, LocationCriteria, PetPolicy, PriceRange, SavedSearch, SearchCriteria,
};

fn create_test_listing(id: &str, price: f64, beds: u8, lat: f64, lon: f64) -> Listing {
    Listing {
        listing_id: id.to_string(),
        title: format!("Listing {}", id),
        latitude: lat,
        longitude: lon,
        price,
        beds,
        baths: 1,
        property_type: "Apartment".to_string(),
        amenities: vec!["Parking".to_string(), "Laundry".to_string()],
        pet_friendly: true,
        is_active: true,
        landlord_id: None,
        created_at: None,
    }
}

fn create_saved_search(id: &str, criteria: SearchCriteria) -> SavedSearch {
    SavedSearch {
        search_id: id.to_string(),
        user_id: format!("user_{}", id),
        name: format!("Search {}", id),
        criteria,
        notify_on_match: true,
        is_active: true,
        created_at: None,
    }
}

#[test]
fn test_integration_end_to_end_filtering() {
    let matcher = SearchMatcher::new();

    // Downtown Manhattan search, 5-mile radius, 2 beds, up to 3000
    let criteria = SearchCriteria {
        location: Some(LocationCriteria {
            address: Some("Lower Manhattan, New York".to_string()),
            coordinates: Some(Coordinates { lat: 40.7128, lng: -74.0060 }),
            radius: Some(5.0),
        }),
        price_range: Some(PriceRange { min: None, max: Some(3000.0) }),
        bedrooms: Some(vec![2]),
        ..Default::default()
    };

    let listings = vec![
        create_test_listing("1", 2500.0, 2, 40.72, -74.01),  // Good match
        create_test_listing("2", 2800.0, 2, 40.73, -74.00),  // Good match
        create_test_listing("3", 3500.0, 2, 40.72, -74.01),  // Too expensive
        create_test_listing("4", 2500.0, 3, 40.72, -74.01),  // Wrong bed count
        create_test_listing("5", 2500.0, 2, 41.5, -74.0),    // Too far
    ];

    let result = matcher.filter_listings(&criteria, listings, 10);

    assert_eq!(result.total_candidates, 5);
    assert_eq!(result.matches.len(), 2);

    // All matches carry a distance annotation within the radius
    for m in &result.matches {
        let distance = m.distance_miles.expect("radius search must annotate distance");
        assert!(distance <= 5.0, "Match {} at {} miles exceeds radius", m.listing_id, distance);
        assert!(m.price <= 3000.0);
        assert_eq!(m.beds, 2);
    }

    // Sorted nearest first
    for pair in result.matches.windows(2) {
        assert!(pair[0].distance_miles.unwrap() <= pair[1].distance_miles.unwrap());
    }
}

#[test]
fn test_distance_accuracy() {
    let nyc_lat = 40.7128;
    let nyc_lon = -74.0060;

    // Distance to same point should be 0
    let distance = haversine_distance(nyc_lat, nyc_lon, nyc_lat, nyc_lon);
    assert!(distance.abs() < 0.01);

    // Distance to nearby point
    let distance = haversine_distance(nyc_lat, nyc_lon, 40.72, -74.01);
    assert!(distance > 0.0 && distance < 1.0, "Expected under a mile, got {}", distance);

    // Distance to LA (approximately 2445 miles)
    let la_lat = 34.0522;
    let la_lon = -118.2437;
    let distance = haversine_distance(nyc_lat, nyc_lon, la_lat, la_lon);
    assert!((distance - 2445.0).abs() < 50.0, "Expected ~2445 miles, got {}", distance);
}

#[test]
fn test_price_only_search_has_no_distance() {
    let matcher = SearchMatcher::new();
    let criteria = SearchCriteria {
        price_range: Some(PriceRange { min: Some(2000.0), max: None }),
        ..Default::default()
    };

    let listings = vec![
        create_test_listing("1", 2500.0, 2, 40.72, -74.01),
        create_test_listing("2", 1500.0, 2, 40.73, -74.00),
        create_test_listing("3", 2000.0, 2, 40.74, -74.02),  // Exactly at min, passes
    ];

    let result = matcher.filter_listings(&criteria, listings, 10);

    assert_eq!(result.matches.len(), 2);
    for m in &result.matches {
        assert!(m.distance_miles.is_none());
    }

    // Without distances, cheapest sorts first
    assert_eq!(result.matches[0].listing_id, "3");
    assert_eq!(result.matches[1].listing_id, "1");
}

#[test]
fn test_max_limit_enforcement() {
    let matcher = SearchMatcher::new();
    let criteria = SearchCriteria::default();

    let listings: Vec<Listing> = (0..50)
        .map(|i| {
            create_test_listing(
                &i.to_string(),
                1000.0 + i as f64 * 10.0,
                2,
                40.72 + (i as f64 * 0.0001),
                -74.01,
            )
        })
        .collect();

    let result = matcher.filter_listings(&criteria, listings, 10);

    assert_eq!(result.matches.len(), 10, "Should not exceed limit of 10");
    assert_eq!(result.total_candidates, 50);
}

#[test]
fn test_listing_fan_out_across_saved_searches() {
    let matcher = SearchMatcher::new();

    // A pet-friendly 2BR in Accra for 1500
    let listing = create_test_listing("new_listing", 1500.0, 2, 5.6037, -0.187);

    let searches = vec![
        create_saved_search(
            "within_budget",
            SearchCriteria {
                price_range: Some(PriceRange { min: Some(1000.0), max: Some(2000.0) }),
                ..Default::default()
            },
        ),
        create_saved_search(
            "nearby",
            SearchCriteria {
                location: Some(LocationCriteria {
                    address: None,
                    coordinates: Some(Coordinates { lat: 5.60, lng: -0.19 }),
                    radius: Some(2.0),
                }),
                ..Default::default()
            },
        ),
        create_saved_search(
            "no_pets",
            SearchCriteria {
                pet_policy: Some(PetPolicy { allowed: Some(false) }),
                ..Default::default()
            },
        ),
        create_saved_search(
            "luxury",
            SearchCriteria {
                price_range: Some(PriceRange { min: Some(5000.0), max: None }),
                ..Default::default()
            },
        ),
    ];

    let matched = matcher.matching_searches(&listing, &searches);

    assert_eq!(matched, vec!["within_budget".to_string(), "nearby".to_string()]);
}

#[test]
fn test_paused_search_never_matches() {
    let matcher = SearchMatcher::new();
    let listing = create_test_listing("1", 1500.0, 2, 5.6037, -0.187);

    let mut search = create_saved_search("wildcard", SearchCriteria::default());
    search.is_active = false;

    let matched = matcher.matching_searches(&listing, &[search]);

    assert!(matched.is_empty());
}

#[test]
fn test_delisted_property_never_matches() {
    let matcher = SearchMatcher::new();
    let mut listing = create_test_listing("1", 1500.0, 2, 5.6037, -0.187);
    listing.is_active = false;

    let searches = vec![create_saved_search("wildcard", SearchCriteria::default())];

    assert!(matcher.matching_searches(&listing, &searches).is_empty());
}
