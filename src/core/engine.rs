use super::types::{CalculationResults, FinancialInputs, YearlyProjection};

/// SALT cap on deductible state-and-local (here, property) tax.
const SALT_CAP: f64 = 10_000.0;
/// 2024 married-filing-jointly standard deduction. Itemizing only helps
/// above this line, so tax savings are measured against it.
const STANDARD_DEDUCTION: f64 = 29_200.0;
/// Moving and immediate-repair buffer charged at purchase, as a share of
/// the home price.
const MOVE_IN_BUFFER_RATE: f64 = 0.01;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Leader {
    Rent,
    Buy,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fixed monthly payment for a standard amortizing loan, rounded to cents
/// so repeated yearly reuse does not accumulate floating-point drift.
/// Straight-line when the rate is zero.
///
/// Precondition: `term_years >= 1`; callers validate before invoking.
pub fn monthly_mortgage_payment(principal: f64, annual_rate_pct: f64, term_years: u32) -> f64 {
    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    let months = (term_years * 12) as f64;
    let raw = if monthly_rate == 0.0 {
        principal / months
    } else {
        let growth = (1.0 + monthly_rate).powf(months);
        principal * monthly_rate * growth / (growth - 1.0)
    };
    round2(raw)
}

/// Runs one deterministic rent-vs-buy projection over the full horizon.
///
/// The rent path assumes the renter invests the forgone down payment and,
/// each year, the difference between total ownership cost and rent (which
/// can be negative). The buy path is marked to home equity in interior
/// years and to net sale proceeds at the horizon, so liquidation cost is
/// charged exactly once.
///
/// Precondition: `time_horizon_years >= 1`; callers validate before
/// invoking.
pub fn calculate_rent_vs_buy(inputs: &FinancialInputs) -> CalculationResults {
    let down_payment = inputs.home_price * inputs.down_payment_percent / 100.0;
    let loan_amount = inputs.home_price - down_payment;
    let monthly_mortgage =
        monthly_mortgage_payment(loan_amount, inputs.interest_rate, inputs.loan_term_years);
    let annual_mortgage = monthly_mortgage * 12.0;
    let annual_pmi = loan_amount * inputs.pmi_rate / 100.0;
    let annual_hoa = inputs.monthly_hoa * 12.0;

    let closing_costs = inputs.home_price * inputs.closing_costs_percent / 100.0;
    let buy_upfront_costs = down_payment + closing_costs + inputs.home_price * MOVE_IN_BUFFER_RATE;
    // Deposit plus first month.
    let rent_upfront_costs = inputs.current_rent * 2.0;

    let mut mortgage_balance = loan_amount;
    let mut current_home_value = inputs.home_price;
    let mut investment_value = down_payment;
    let mut current_rent_payment = inputs.current_rent * 12.0;

    let mut total_rent_paid = 0.0;
    let mut cumulative_ownership_cost = 0.0;
    let mut total_tax_savings = 0.0;
    let mut total_interest_paid = 0.0;

    let mut break_even_year = None;
    let mut previous_leader: Option<Leader> = None;
    let mut final_rent_net_worth = 0.0;
    let mut final_buy_net_worth = 0.0;

    let mut yearly_projections = Vec::with_capacity(inputs.time_horizon_years as usize);

    for year in 1..=inputs.time_horizon_years {
        total_rent_paid += current_rent_payment;

        // Ownership cost components on this year's pre-update balance and
        // home value. PMI burns off once LTV drops to 0.8 or below, whether
        // through amortization or appreciation.
        let pmi = if mortgage_balance / current_home_value > 0.8 {
            annual_pmi
        } else {
            0.0
        };
        let property_tax = current_home_value * inputs.property_tax_rate / 100.0;
        let maintenance = current_home_value * inputs.maintenance_rate / 100.0;
        let total_ownership_cost = annual_mortgage
            + pmi
            + property_tax
            + inputs.annual_insurance
            + maintenance
            + annual_hoa;

        // The renter's opportunity-cost contribution: grow the account, then
        // add what ownership would have cost over rent this year.
        let annual_savings = total_ownership_cost - current_rent_payment;
        investment_value =
            investment_value * (1.0 + inputs.investment_return / 100.0) + annual_savings;

        cumulative_ownership_cost += total_ownership_cost;

        // Amortize on the annual schedule; the balance is floored at zero
        // and re-rounded to cents each year.
        let mortgage_interest = mortgage_balance * inputs.interest_rate / 100.0;
        let principal_payment = (annual_mortgage - mortgage_interest).min(mortgage_balance);
        mortgage_balance = round2((mortgage_balance - principal_payment).max(0.0));
        total_interest_paid += mortgage_interest;

        current_home_value *= 1.0 + inputs.home_appreciation_rate / 100.0;
        let home_equity = round2(current_home_value - mortgage_balance);

        let deductible_property_tax = property_tax.min(SALT_CAP);
        let itemized_deductions =
            mortgage_interest + deductible_property_tax + inputs.other_deductions;
        let tax_savings =
            ((itemized_deductions - STANDARD_DEDUCTION) * inputs.marginal_tax_rate / 100.0)
                .max(0.0);
        total_tax_savings += tax_savings;

        // Sale economics are tracked every year; only the final year's value
        // feeds the buy-path net worth.
        let selling_costs = current_home_value * inputs.selling_costs_percent / 100.0;
        let net_sale_proceeds = current_home_value - mortgage_balance - selling_costs;

        let rent_net_worth = investment_value - total_rent_paid;
        let buy_net_worth = if year == inputs.time_horizon_years {
            net_sale_proceeds
        } else {
            home_equity
        };

        // First-flip break-even: compare this year's leader against last
        // year's, and latch the first year where it changes.
        let leader = if rent_net_worth > buy_net_worth {
            Leader::Rent
        } else {
            Leader::Buy
        };
        if let Some(previous) = previous_leader {
            if break_even_year.is_none() && previous != leader {
                break_even_year = Some(year);
            }
        }
        previous_leader = Some(leader);

        let (annual_cash_outflow_rent, annual_cash_outflow_buy) = if year == 1 {
            (
                current_rent_payment + rent_upfront_costs,
                total_ownership_cost + buy_upfront_costs,
            )
        } else {
            (current_rent_payment, total_ownership_cost)
        };

        final_rent_net_worth = rent_net_worth;
        final_buy_net_worth = buy_net_worth;

        yearly_projections.push(YearlyProjection {
            year,
            annual_rent: current_rent_payment,
            total_rent_paid,
            mortgage_payment: annual_mortgage,
            pmi,
            property_tax,
            insurance: inputs.annual_insurance,
            maintenance,
            hoa: annual_hoa,
            total_ownership_cost,
            cumulative_ownership_cost,
            home_value: current_home_value,
            mortgage_balance,
            home_equity,
            mortgage_interest,
            deductible_property_tax,
            tax_savings,
            investment_value,
            rent_net_worth,
            buy_net_worth,
            annual_cash_outflow_rent,
            annual_cash_outflow_buy,
            selling_costs,
            net_sale_proceeds,
        });

        current_rent_payment *= 1.0 + inputs.rent_growth_rate / 100.0;
    }

    CalculationResults {
        yearly_projections,
        break_even_year,
        total_cost_rent: total_rent_paid + rent_upfront_costs,
        total_cost_buy: cumulative_ownership_cost + buy_upfront_costs,
        net_worth_difference: final_buy_net_worth - final_rent_net_worth,
        total_tax_savings,
        total_interest_paid,
        monte_carlo: None,
    }
}

#[cfg(test)]
pub(crate) fn sample_inputs() -> FinancialInputs {
    FinancialInputs {
        home_price: 500_000.0,
        down_payment_percent: 20.0,
        current_rent: 2_500.0,
        interest_rate: 7.0,
        loan_term_years: 30,
        pmi_rate: 0.5,
        property_tax_rate: 1.2,
        annual_insurance: 1_500.0,
        maintenance_rate: 1.0,
        monthly_hoa: 0.0,
        rent_growth_rate: 3.0,
        investment_return: 7.0,
        inflation_rate: 2.5,
        home_appreciation_rate: 3.5,
        time_horizon_years: 10,
        marginal_tax_rate: 24.0,
        other_deductions: 0.0,
        closing_costs_percent: 3.0,
        selling_costs_percent: 6.0,
    }
}
