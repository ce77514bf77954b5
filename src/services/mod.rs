// Service exports
pub mod appwrite;
pub mod cache;
pub mod discovery;
pub mod memory;
pub mod postgres;
pub mod store;

pub use appwrite::{AppwriteClient, AppwriteCollections, AppwriteError};
pub use cache::{CacheError, CacheKey, CacheManager, MemorySessionCache, SessionCache};
pub use discovery::{DiscoveryError, DiscoveryOutcome, DiscoveryService, TaxonomyStatus};
pub use memory::MemoryRequestStore;
pub use postgres::{PostgresClient, PostgresError};
pub use store::{CandidateDirectory, ContactRequestStore, StoreError, TaxonomySource};
