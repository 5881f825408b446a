use super::error::ProjectionError;
use super::types::{AffordabilityInput, AffordabilityResult, GoalTime};

const MONTHS_PER_YEAR: i64 = 12;

/// Projects how long the buyer has to keep saving before the deposit is covered.
///
/// Pure: no logging, no I/O, identical input gives a bit-identical result.
pub fn project(input: &AffordabilityInput) -> Result<AffordabilityResult, ProjectionError> {
    validate(input)?;

    let max_loan = max_loan_amount(
        input.target_monthly_payment,
        input.annual_interest_rate_percent,
        input.loan_term_years,
    );
    let down_payment = required_down_payment(input.house_price, max_loan);
    let shortfall = down_payment - input.current_savings;

    let Some(months_needed) = months_to_goal(shortfall, input.monthly_saving) else {
        return Err(ProjectionError::invalid(
            "monthly_saving",
            "too small to close the shortfall in a countable number of months",
        ));
    };
    let time = split_months(months_needed);

    Ok(AffordabilityResult {
        years_to_goal: time.years,
        months_to_goal: time.months,
        required_down_payment: down_payment,
        max_loan_amount: max_loan,
    })
}

/// Rejects non-finite fields as malformed first, then out-of-domain values as invalid.
pub fn validate(input: &AffordabilityInput) -> Result<(), ProjectionError> {
    for (name, value) in [
        ("house_price", input.house_price),
        ("interest_rate", input.annual_interest_rate_percent),
        ("target_monthly_payment", input.target_monthly_payment),
        ("current_savings", input.current_savings),
        ("monthly_saving", input.monthly_saving),
    ] {
        if !value.is_finite() {
            return Err(ProjectionError::malformed(
                name,
                format!("{value} is not a finite number"),
            ));
        }
    }

    if input.house_price < 0.0 {
        return Err(ProjectionError::invalid("house_price", "must be >= 0"));
    }

    if input.annual_interest_rate_percent < 0.0 {
        return Err(ProjectionError::invalid("interest_rate", "must be >= 0"));
    }

    if input.loan_term_years <= 0 {
        return Err(ProjectionError::invalid("loan_term_years", "must be > 0"));
    }

    if input.target_monthly_payment <= 0.0 {
        return Err(ProjectionError::invalid(
            "target_monthly_payment",
            "must be > 0",
        ));
    }

    if input.current_savings < 0.0 {
        return Err(ProjectionError::invalid("current_savings", "must be >= 0"));
    }

    if input.monthly_saving <= 0.0 {
        return Err(ProjectionError::invalid("monthly_saving", "must be > 0"));
    }

    Ok(())
}

/// Present value of `n` monthly payments of `monthly_payment` at the monthly
/// periodic rate derived from `annual_interest_rate_percent`.
///
/// Callers must pass a positive term and a non-negative rate.
pub fn max_loan_amount(
    monthly_payment: f64,
    annual_interest_rate_percent: f64,
    loan_term_years: i64,
) -> f64 {
    let r = annual_interest_rate_percent / 12.0 / 100.0;
    let n = loan_term_years.saturating_mul(MONTHS_PER_YEAR);

    if r == 0.0 {
        return monthly_payment * n as f64;
    }

    let growth = match i32::try_from(n) {
        Ok(n) => (1.0 + r).powi(n),
        Err(_) => (1.0 + r).powf(n as f64),
    };

    // Rate below f64 resolution around 1.0: no visible compounding.
    if growth == 1.0 {
        return monthly_payment * n as f64;
    }

    // Perpetuity limit.
    if !growth.is_finite() {
        return monthly_payment / r;
    }

    monthly_payment * (growth - 1.0) / (r * growth)
}

pub fn required_down_payment(house_price: f64, max_loan: f64) -> f64 {
    (house_price - max_loan).max(0.0)
}

/// Whole months of saving needed to cover `shortfall`, rounding any partial
/// month up. `None` when the count does not fit in a `u64`.
pub fn months_to_goal(shortfall: f64, monthly_saving: f64) -> Option<u64> {
    if shortfall <= 0.0 {
        return Some(0);
    }

    let months = (shortfall / monthly_saving).ceil();
    if !months.is_finite() || months >= u64::MAX as f64 {
        return None;
    }
    Some(months as u64)
}

pub fn split_months(months_needed: u64) -> GoalTime {
    GoalTime {
        years: months_needed / MONTHS_PER_YEAR as u64,
        months: months_needed % MONTHS_PER_YEAR as u64,
    }
}
