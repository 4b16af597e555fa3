// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BoundingBox, Coordinates, Listing, LocationCriteria, MatchedListing, PetPolicy, PriceRange, SavedSearch, SearchCriteria};
pub use requests::{CheckListingRequest, ResetSearchRequest, RunSearchRequest};
pub use responses::{CheckListingResponse, ErrorResponse, HealthResponse, ResetSearchResponse, RunSearchResponse};
