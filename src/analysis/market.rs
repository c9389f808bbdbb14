//! Market statistics over a page of listings.

use crate::models::{Listing, MarketStats};

/// Compute price and mileage statistics.
///
/// Listings without a price (price 0) are excluded from the price and
/// mileage figures but still count toward the new/certified tallies.
/// Returns `None` when no listing carries a price.
pub fn market_stats(listings: &[Listing]) -> Option<MarketStats> {
    let mut prices: Vec<u32> = listings
        .iter()
        .map(|l| l.price)
        .filter(|p| *p > 0)
        .collect();

    if prices.is_empty() {
        return None;
    }

    prices.sort_unstable();
    let count = prices.len();
    let total: u64 = prices.iter().map(|p| u64::from(*p)).sum();
    let miles_total: u64 = listings
        .iter()
        .filter(|l| l.price > 0)
        .map(|l| u64::from(l.miles_driven))
        .sum();

    Some(MarketStats {
        priced_count: count,
        min_price: prices[0],
        max_price: prices[count - 1],
        average_price: rounded_mean(total, count),
        median_price: median(&prices),
        average_miles: rounded_mean(miles_total, count),
        new_count: listings.iter().filter(|l| l.is_new).count(),
        certified_count: listings.iter().filter(|l| l.is_certified).count(),
    })
}

fn rounded_mean(total: u64, count: usize) -> u32 {
    let count = count as u64;
    ((total + count / 2) / count) as u32
}

/// Median of a sorted, non-empty slice; even lengths average the middle pair.
fn median(sorted: &[u32]) -> u32 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        let pair = u64::from(sorted[mid - 1]) + u64::from(sorted[mid]);
        ((pair + 1) / 2) as u32
    } else {
        sorted[mid]
    }
}
