use super::engine::calculate_rent_vs_buy;
use super::types::{FinancialInputs, SensitivityAnalysis};

const HOME_PRICE_DELTAS: [f64; 5] = [-20.0, -10.0, 0.0, 10.0, 20.0];
const RATE_DELTAS: [f64; 5] = [-2.0, -1.0, 0.0, 1.0, 2.0];

/// One-at-a-time sweep over the four assumptions that move the verdict
/// most. Home price varies by relative percentage, the three rates by
/// absolute percentage points; everything else stays at its base value.
/// Deltas are ascending with the unmodified scenario at index 2.
pub fn run_sensitivity(inputs: &FinancialInputs) -> Vec<SensitivityAnalysis> {
    vec![
        sweep(inputs, "Home Price", &HOME_PRICE_DELTAS, |scenario, delta| {
            scenario.home_price *= 1.0 + delta / 100.0;
            scenario.home_price
        }),
        sweep(inputs, "Interest Rate", &RATE_DELTAS, |scenario, delta| {
            scenario.interest_rate += delta;
            scenario.interest_rate
        }),
        sweep(
            inputs,
            "Home Appreciation Rate",
            &RATE_DELTAS,
            |scenario, delta| {
                scenario.home_appreciation_rate += delta;
                scenario.home_appreciation_rate
            },
        ),
        sweep(
            inputs,
            "Rent Growth Rate",
            &RATE_DELTAS,
            |scenario, delta| {
                scenario.rent_growth_rate += delta;
                scenario.rent_growth_rate
            },
        ),
    ]
}

fn sweep(
    inputs: &FinancialInputs,
    parameter: &str,
    deltas: &[f64],
    apply: impl Fn(&mut FinancialInputs, f64) -> f64,
) -> SensitivityAnalysis {
    let mut values = Vec::with_capacity(deltas.len());
    let mut break_even_years = Vec::with_capacity(deltas.len());
    let mut net_worth_differences = Vec::with_capacity(deltas.len());

    for &delta in deltas {
        let mut scenario = inputs.clone();
        values.push(apply(&mut scenario, delta));

        let results = calculate_rent_vs_buy(&scenario);
        break_even_years.push(results.break_even_year);
        net_worth_differences.push(results.net_worth_difference);
    }

    SensitivityAnalysis {
        parameter: parameter.to_string(),
        values,
        break_even_years,
        net_worth_differences,
    }
}

#[cfg(test)]
mod tests {
    use super::super::engine::sample_inputs;
    use super::*;

    #[test]
    fn covers_four_parameters_with_five_points_each() {
        let analyses = run_sensitivity(&sample_inputs());
        let names: Vec<&str> = analyses.iter().map(|a| a.parameter.as_str()).collect();
        assert_eq!(
            names,
            [
                "Home Price",
                "Interest Rate",
                "Home Appreciation Rate",
                "Rent Growth Rate"
            ]
        );
        for analysis in &analyses {
            assert_eq!(analysis.values.len(), 5);
            assert_eq!(analysis.break_even_years.len(), 5);
            assert_eq!(analysis.net_worth_differences.len(), 5);
        }
    }

    #[test]
    fn middle_point_matches_the_unmodified_scenario() {
        let inputs = sample_inputs();
        let base = calculate_rent_vs_buy(&inputs);
        for analysis in run_sensitivity(&inputs) {
            assert_eq!(analysis.break_even_years[2], base.break_even_year);
            assert!((analysis.net_worth_differences[2] - base.net_worth_difference).abs() <= 1e-9);
        }
    }

    #[test]
    fn home_price_points_are_relative_percent_steps() {
        let inputs = sample_inputs();
        let analyses = run_sensitivity(&inputs);
        let expected: Vec<f64> = [-20.0, -10.0, 0.0, 10.0, 20.0]
            .iter()
            .map(|d| inputs.home_price * (1.0 + d / 100.0))
            .collect();
        assert_eq!(analyses[0].values, expected);
    }

    #[test]
    fn rate_points_are_absolute_point_steps() {
        let inputs = sample_inputs();
        let analyses = run_sensitivity(&inputs);
        let expected: Vec<f64> = [-2.0, -1.0, 0.0, 1.0, 2.0]
            .iter()
            .map(|d| inputs.interest_rate + d)
            .collect();
        assert_eq!(analyses[1].values, expected);
    }

    #[test]
    fn swept_values_stay_sorted_ascending() {
        for analysis in run_sensitivity(&sample_inputs()) {
            for pair in analysis.values.windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
    }
}
