/// Financial inputs for one affordability projection.
///
/// Rates are carried in percent, exactly as a buyer would type them.
#[derive(Debug, Clone, PartialEq)]
pub struct AffordabilityInput {
    pub house_price: f64,
    pub annual_interest_rate_percent: f64,
    pub loan_term_years: i64,
    pub target_monthly_payment: f64,
    pub current_savings: f64,
    pub monthly_saving: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GoalTime {
    pub years: u64,
    pub months: u64,
}

impl GoalTime {
    pub const REACHED: GoalTime = GoalTime {
        years: 0,
        months: 0,
    };

    pub fn total_months(self) -> u64 {
        self.years * 12 + self.months
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AffordabilityResult {
    pub years_to_goal: u64,
    pub months_to_goal: u64,
    pub required_down_payment: f64,
    pub max_loan_amount: f64,
}

impl AffordabilityResult {
    pub fn goal_time(&self) -> GoalTime {
        GoalTime {
            years: self.years_to_goal,
            months: self.months_to_goal,
        }
    }
}
