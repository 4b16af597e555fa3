use serde::{Deserialize, Serialize};

/// Rental listing candidate with location, pricing and feature data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    #[serde(rename = "listingId")]
    pub listing_id: String,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Monthly price, currency-agnostic
    pub price: f64,
    pub beds: u8,
    pub baths: u8,
    #[serde(rename = "propertyType")]
    pub property_type: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(rename = "petFriendly", default)]
    pub pet_friendly: bool,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    #[serde(rename = "landlordId", default)]
    pub landlord_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn default_true() -> bool { true }

/// Geographic point in floating-point degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Location part of a search. The address is display-only; radius filtering
/// applies only when both `coordinates` and `radius` are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationCriteria {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Radius in miles around `coordinates`
    #[serde(default)]
    pub radius: Option<f64>,
}

/// Price bounds, each independently optional and inclusive
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// Tri-state pet constraint: `allowed = Some(false)` requires a listing that
/// is NOT pet friendly, `None` imposes nothing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PetPolicy {
    #[serde(default)]
    pub allowed: Option<bool>,
}

/// User-authored filter over listing attributes.
///
/// Every field is optional and an absent or empty field imposes no
/// restriction. Present fields combine with logical AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub location: Option<LocationCriteria>,
    #[serde(rename = "priceRange", default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub bedrooms: Option<Vec<u8>>,
    #[serde(default)]
    pub bathrooms: Option<Vec<u8>>,
    #[serde(rename = "propertyTypes", default)]
    pub property_types: Option<Vec<String>>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    #[serde(rename = "petPolicy", default)]
    pub pet_policy: Option<PetPolicy>,
}

impl SearchCriteria {
    /// Center point and radius in miles, when both are present.
    /// Radius filtering never applies with only one of the two.
    pub fn radius_filter(&self) -> Option<(Coordinates, f64)> {
        let location = self.location.as_ref()?;
        match (location.coordinates, location.radius) {
            (Some(center), Some(radius)) => Some((center, radius)),
            _ => None,
        }
    }
}

/// Saved search wrapping a criteria set with ownership metadata.
/// Lifecycle is owned by the marketplace backend; this service only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSearch {
    #[serde(rename = "searchId")]
    pub search_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub criteria: SearchCriteria,
    #[serde(rename = "notifyOnMatch", default)]
    pub notify_on_match: bool,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A listing that passed a criteria evaluation, annotated with its distance
/// from the search center when the search carried a radius filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedListing {
    #[serde(rename = "listingId")]
    pub listing_id: String,
    pub title: String,
    pub price: f64,
    pub beds: u8,
    pub baths: u8,
    #[serde(rename = "propertyType")]
    pub property_type: String,
    pub amenities: Vec<String>,
    #[serde(rename = "petFriendly")]
    pub pet_friendly: bool,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "distanceMiles")]
    pub distance_miles: Option<f64>,
}

impl MatchedListing {
    pub fn from_listing(listing: Listing, distance_miles: Option<f64>) -> Self {
        Self {
            listing_id: listing.listing_id,
            title: listing.title,
            price: listing.price,
            beds: listing.beds,
            baths: listing.baths,
            property_type: listing.property_type,
            amenities: listing.amenities,
            pet_friendly: listing.pet_friendly,
            latitude: listing.latitude,
            longitude: listing.longitude,
            distance_miles,
        }
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}
