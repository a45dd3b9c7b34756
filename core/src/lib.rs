//! Synthetic LearnFlow business-metrics generator and the read-only
//! SQL tool server that exposes the generated database.

pub mod apportion;
pub mod channel_metrics;
pub mod config;
pub mod daily_metrics;
pub mod error;
pub mod generator;
pub mod phase;
pub mod product_metrics;
pub mod rng;
pub mod sampler;
pub mod seasonality;
pub mod server;
pub mod sql_tools;
pub mod store;
pub mod summary;
pub mod support_tickets;
pub mod types;
pub mod weekly_funnel;
