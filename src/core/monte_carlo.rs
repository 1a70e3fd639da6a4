use std::f64::consts::PI;

use super::engine::calculate_rent_vs_buy;
use super::types::{FinancialInputs, MonteCarloConfig, MonteCarloResult, PercentileBand};

/// Quantifies outcome uncertainty by rerunning the projection engine with
/// the three growth assumptions perturbed by independent Gaussian noise.
///
/// Volatilities are absolute percentage-point standard deviations applied
/// to the already-percentage rate fields (an appreciation rate of 3.5 with
/// volatility 15 is perturbed by N(0, 15), not N(0, 0.15 * 3.5)).
///
/// Reproducible for a fixed `config.seed`; each run draws from its own
/// derived stream so runs stay independent.
pub fn run_monte_carlo(
    inputs: &FinancialInputs,
    config: &MonteCarloConfig,
) -> Vec<MonteCarloResult> {
    let horizon = inputs.time_horizon_years as usize;
    let make = || {
        (0..horizon)
            .map(|_| Vec::with_capacity(config.simulations as usize))
            .collect::<Vec<_>>()
    };
    let mut rent_samples: Vec<Vec<f64>> = make();
    let mut buy_samples: Vec<Vec<f64>> = make();

    for run_id in 0..config.simulations {
        let mut rng = Rng::new(derive_seed(config.seed, run_id));
        let mut perturbed = inputs.clone();
        perturbed.home_appreciation_rate +=
            rng.standard_normal() * config.appreciation_volatility;
        perturbed.rent_growth_rate += rng.standard_normal() * config.rent_growth_volatility;
        perturbed.investment_return +=
            rng.standard_normal() * config.investment_return_volatility;

        let results = calculate_rent_vs_buy(&perturbed);
        for (year_index, rent) in rent_samples.iter_mut().enumerate() {
            // Runs share the horizon, so the row is always present; a short
            // run contributes zero rather than skewing the sort.
            let row = results.yearly_projections.get(year_index);
            rent.push(row.map_or(0.0, |r| r.rent_net_worth));
            buy_samples[year_index].push(row.map_or(0.0, |r| r.buy_net_worth));
        }
    }

    rent_samples
        .iter_mut()
        .zip(buy_samples.iter_mut())
        .enumerate()
        .map(|(year_index, (rent, buy))| MonteCarloResult {
            year: year_index as u32 + 1,
            rent_net_worth: build_band(rent),
            buy_net_worth: build_band(buy),
        })
        .collect()
}

fn build_band(values: &mut [f64]) -> PercentileBand {
    values.sort_by(|a, b| a.total_cmp(b));
    PercentileBand {
        p10: nearest_rank(values, 10.0),
        p25: nearest_rank(values, 25.0),
        p50: nearest_rank(values, 50.0),
        p75: nearest_rank(values, 75.0),
        p90: nearest_rank(values, 90.0),
    }
}

/// Nearest-rank percentile: `floor(n * p / 100)` clamped to the last index,
/// no interpolation. Input must already be sorted ascending.
fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((sorted.len() as f64 * p / 100.0).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

fn derive_seed(base_seed: u64, run_id: u32) -> u64 {
    let mixed = base_seed ^ ((run_id as u64) << 32) ^ run_id as u64;
    splitmix64(mixed)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

struct Rng {
    state: u64,
    cached_normal: Option<f64>,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
        Self {
            state,
            cached_normal: None,
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    fn next_f64(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        let v = self.next_u64() >> 11;
        ((v as f64) + 0.5) / DENOM
    }

    /// Box-Muller transform; the uniform draw is kept away from zero so
    /// `ln` stays finite, and the second variate is cached.
    fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.cached_normal.take() {
            return z;
        }

        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;

        let z0 = r * theta.cos();
        let z1 = r * theta.sin();
        self.cached_normal = Some(z1);
        z0
    }
}

#[cfg(test)]
mod tests {
    use super::super::engine::sample_inputs;
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn sample_config() -> MonteCarloConfig {
        MonteCarloConfig {
            simulations: 200,
            seed: 42,
            appreciation_volatility: 2.0,
            rent_growth_volatility: 1.0,
            investment_return_volatility: 15.0,
        }
    }

    #[test]
    fn produces_one_band_pair_per_year() {
        let inputs = sample_inputs();
        let bands = run_monte_carlo(&inputs, &sample_config());
        assert_eq!(bands.len(), inputs.time_horizon_years as usize);
        for (index, band) in bands.iter().enumerate() {
            assert_eq!(band.year as usize, index + 1);
        }
    }

    #[test]
    fn zero_volatility_collapses_bands_onto_base_run() {
        let inputs = sample_inputs();
        let config = MonteCarloConfig {
            simulations: 50,
            seed: 7,
            appreciation_volatility: 0.0,
            rent_growth_volatility: 0.0,
            investment_return_volatility: 0.0,
        };

        let base = calculate_rent_vs_buy(&inputs);
        let bands = run_monte_carlo(&inputs, &config);
        for (band, row) in bands.iter().zip(base.yearly_projections.iter()) {
            for (p, series) in [
                (band.rent_net_worth, row.rent_net_worth),
                (band.buy_net_worth, row.buy_net_worth),
            ] {
                assert!((p.p10 - series).abs() <= 1e-9);
                assert!((p.p50 - series).abs() <= 1e-9);
                assert!((p.p90 - series).abs() <= 1e-9);
            }
        }
    }

    #[test]
    fn same_seed_reproduces_identical_bands() {
        let inputs = sample_inputs();
        let config = sample_config();
        let first = run_monte_carlo(&inputs, &config);
        let second = run_monte_carlo(&inputs, &config);

        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.rent_net_worth.p50, b.rent_net_worth.p50);
            assert_eq!(a.buy_net_worth.p50, b.buy_net_worth.p50);
            assert_eq!(a.rent_net_worth.p10, b.rent_net_worth.p10);
            assert_eq!(a.buy_net_worth.p90, b.buy_net_worth.p90);
        }
    }

    #[test]
    fn nearest_rank_uses_floor_index_without_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(nearest_rank(&sorted, 10.0), 1.0);
        assert_eq!(nearest_rank(&sorted, 25.0), 2.0);
        assert_eq!(nearest_rank(&sorted, 50.0), 3.0);
        assert_eq!(nearest_rank(&sorted, 90.0), 4.0);
        assert_eq!(nearest_rank(&sorted, 100.0), 4.0);
    }

    #[test]
    fn standard_normal_has_roughly_unit_moments() {
        let mut rng = Rng::new(12345);
        let draws: Vec<f64> = (0..20_000).map(|_| rng.standard_normal()).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let variance =
            draws.iter().map(|z| (z - mean) * (z - mean)).sum::<f64>() / draws.len() as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((variance - 1.0).abs() < 0.05, "variance {variance}");
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(16))]

        #[test]
        fn prop_percentile_bands_are_ordered(
            seed in proptest::prelude::any::<u64>(),
            simulations in 2u32..60,
            appreciation_vol_bp in 0u32..500,
            rent_vol_bp in 0u32..300,
            investment_vol_bp in 0u32..2000,
            horizon_years in 1u32..16
        ) {
            let mut inputs = sample_inputs();
            inputs.time_horizon_years = horizon_years;
            let config = MonteCarloConfig {
                simulations,
                seed,
                appreciation_volatility: appreciation_vol_bp as f64 / 100.0,
                rent_growth_volatility: rent_vol_bp as f64 / 100.0,
                investment_return_volatility: investment_vol_bp as f64 / 100.0,
            };

            let bands = run_monte_carlo(&inputs, &config);
            prop_assert!(bands.len() == horizon_years as usize);
            for band in &bands {
                for p in [band.rent_net_worth, band.buy_net_worth] {
                    prop_assert!(p.p10 <= p.p25);
                    prop_assert!(p.p25 <= p.p50);
                    prop_assert!(p.p50 <= p.p75);
                    prop_assert!(p.p75 <= p.p90);
                }
            }
        }
    }
}
