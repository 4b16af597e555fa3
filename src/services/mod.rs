// Service exports
pub mod cache;
pub mod marketplace;
pub mod postgres;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use marketplace::{MarketplaceClient, MarketplaceError};
pub use postgres::{MatchSource, PostgresClient, PostgresError, SearchStats};
