use std::num::NonZeroUsize;

use chrono::TimeDelta;
use clap::Parser;

use crate::{prelude::*, report::Analyzer, statistics::tiers::TierScore};

#[derive(Parser)]
pub struct VolatilityArgs {
    /// Wall-clock window of the windowed standard deviation.
    #[clap(long, env = "VOLATILITY_WINDOW", default_value = "5min")]
    volatility_window: humantime::Duration,

    /// Number of samples in an interval of the interval estimators.
    #[clap(long, env = "INTERVAL_SIZE", default_value = "5")]
    pub interval_size: NonZeroUsize,

    /// Volatility figure to split the workloads into tiers by.
    #[clap(long, env = "TIER_SCORE", default_value = "windowed")]
    tier_score: TierScore,
}

impl VolatilityArgs {
    pub fn analyzer(&self) -> Result<Analyzer> {
        let volatility_window = TimeDelta::from_std(self.volatility_window.into())
            .context("the volatility window is out of range")?;
        ensure!(volatility_window > TimeDelta::zero(), "the volatility window must be positive");
        Ok(Analyzer::builder()
            .volatility_window(volatility_window)
            .interval_size(self.interval_size)
            .tier_score(self.tier_score)
            .build())
    }
}
