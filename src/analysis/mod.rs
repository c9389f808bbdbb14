//! Analysis modules.
//!
//! Pure calculations over data the providers returned: market price
//! statistics and loan amortization.

pub mod finance;
pub mod market;

pub use finance::{loan_payment, LoanEstimate};
pub use market::market_stats;
