//! Loan payment estimates.

use serde::Serialize;

/// Result of an amortized loan calculation. Amounts are in dollars, rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanEstimate {
    pub principal: f64,
    pub monthly_payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub months: u32,
}

/// Standard amortization: `P * r / (1 - (1 + r)^-n)` with `r = apr / 1200`.
///
/// A zero rate splits the principal evenly. A down payment larger than the
/// price leaves nothing to finance. `months` must be non-zero.
pub fn loan_payment(price: f64, down_payment: f64, apr_percent: f64, months: u32) -> LoanEstimate {
    debug_assert!(months > 0);
    let principal = (price - down_payment).max(0.0);
    let n = f64::from(months);
    let rate = apr_percent / 1200.0;

    let monthly = if principal == 0.0 {
        0.0
    } else if rate == 0.0 {
        principal / n
    } else {
        principal * rate / (1.0 - (1.0 + rate).powf(-n))
    };

    let monthly = cents(monthly);
    let total_paid = cents(monthly * n);

    LoanEstimate {
        principal: cents(principal),
        monthly_payment: monthly,
        total_paid,
        total_interest: cents((total_paid - principal).max(0.0)),
        months,
    }
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
