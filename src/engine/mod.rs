pub mod aggregator;
pub mod reconciler;
pub mod ticker;
pub mod ticker_controller;
pub mod worker_controller;
pub mod worker_pool;

pub use aggregator::Aggregator;
