pub mod aggregation;
pub mod peak;
pub mod tiers;
pub mod timeline;
pub mod volatility;
