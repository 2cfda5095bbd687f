pub mod analyzers;
pub mod cache;
pub mod description;
pub mod fetcher;
pub mod job_store;
pub mod orchestrator;
pub mod pagespeed;

pub use cache::*;
pub use description::*;
pub use fetcher::*;
pub use job_store::*;
pub use orchestrator::*;
pub use pagespeed::*;
