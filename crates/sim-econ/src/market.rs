use bevy_ecs::prelude::Resource;
use rand::Rng;
use sim_core::{MarketConfig, TrendCategory};
use std::collections::BTreeMap;
use tracing::debug;

/// Lowest and highest multiplier a trend can reach.
pub const TREND_BOUNDS: (f32, f32) = (0.5, 2.0);

/// Bounded random walk per market segment, re-rolled on a fixed timer.
#[derive(Clone, Debug, Resource)]
pub struct MarketTrends {
    trends: BTreeMap<TrendCategory, f32>,
    volatility: f32,
    update_secs: f64,
    since_update: f64,
}

impl MarketTrends {
    pub fn new(cfg: &MarketConfig) -> Self {
        Self {
            trends: TrendCategory::ALL.iter().map(|c| (*c, 1.0)).collect(),
            volatility: cfg.volatility.abs(),
            update_secs: cfg.trend_update_secs.max(1.0),
            since_update: 0.0,
        }
    }

    /// Current multiplier for `category` (1.0 = neutral).
    pub fn trend(&self, category: TrendCategory) -> f32 {
        self.trends.get(&category).copied().unwrap_or(1.0)
    }

    /// Advance the update timer; returns true when the trends were re-rolled.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        self.since_update += dt;
        if self.since_update < self.update_secs {
            return false;
        }
        self.since_update = 0.0;
        self.step(rng);
        true
    }

    /// Move every trend by a uniform step in `[-volatility, volatility]`.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for (category, value) in self.trends.iter_mut() {
            let change = if self.volatility > 0.0 {
                rng.gen_range(-self.volatility..=self.volatility)
            } else {
                0.0
            };
            *value = (*value + change).clamp(TREND_BOUNDS.0, TREND_BOUNDS.1);
            debug!(?category, trend = *value, "market trend updated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn updates_only_after_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut m = MarketTrends::new(&MarketConfig::default());
        assert!(!m.tick(120.0, &mut rng));
        assert!(!m.tick(120.0, &mut rng));
        assert!(m.tick(120.0, &mut rng));
    }

    proptest! {
        #[test]
        fn trends_stay_bounded(seed in any::<u64>(), steps in 1usize..500) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let cfg = MarketConfig { volatility: 0.4, ..MarketConfig::default() };
            let mut m = MarketTrends::new(&cfg);
            for _ in 0..steps {
                m.step(&mut rng);
            }
            for c in TrendCategory::ALL {
                let t = m.trend(c);
                prop_assert!((TREND_BOUNDS.0..=TREND_BOUNDS.1).contains(&t));
            }
        }
    }
}
