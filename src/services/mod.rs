pub mod fetcher;
pub mod gateway;

pub use fetcher::{HttpFetcher, PageFetcher};
pub use gateway::AccountGateway;
