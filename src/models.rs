//! Data models for the car profile service.
//!
//! This module contains the request keys, upstream records and the
//! assembled response types shared by providers, the aggregator and
//! the HTTP layer. All wire types serialize as camelCase JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The (make, model, year) triple used to query every provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleIdentity {
    pub make: String,
    pub model: String,
    pub year: u16,
}

impl VehicleIdentity {
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: u16) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year,
        }
    }
}

impl fmt::Display for VehicleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.make, self.model)
    }
}

/// Optional geographic scope for a listings search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFilter {
    /// Five-digit postal code. `None` means nationwide.
    pub postal_code: Option<String>,
    /// Search radius around the postal code.
    pub radius_miles: u32,
}

impl LocationFilter {
    pub fn near(postal_code: impl Into<String>, radius_miles: u32) -> Self {
        Self {
            postal_code: Some(postal_code.into()),
            radius_miles,
        }
    }
}

/// Paging window for a listings search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub rows: u32,
    pub start_offset: u32,
}

impl PageWindow {
    pub fn first(rows: u32) -> Self {
        Self {
            rows,
            start_offset: 0,
        }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::first(10)
    }
}

/// A marketplace listing. Read-only, externally sourced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    /// Asking price in whole dollars; 0 when the seller did not list one.
    pub price: u32,
    pub miles_driven: u32,
    pub photos: Vec<String>,
    pub seller_city: Option<String>,
    pub seller_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    pub is_new: bool,
    pub is_certified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_url: Option<String>,
}

/// One page of listings plus the upstream's total match count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSearchResult {
    pub listings: Vec<Listing>,
    pub total: u32,
}

impl ListingSearchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_results(&self) -> bool {
        self.total > 0
    }
}

/// Government crash-test star ratings. `None` means "Not Rated".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRatings {
    pub overall: Option<u8>,
    pub frontal: Option<u8>,
    pub side: Option<u8>,
    pub rollover: Option<u8>,
}

/// A manufacturer recall campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recall {
    pub campaign_number: String,
    pub component: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consequence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remedy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_date: Option<String>,
}

/// An owner complaint filed with the safety agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub odi_number: u64,
    pub components: String,
    pub summary: String,
    pub crash: bool,
    pub fire: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_filed: Option<String>,
}

/// Safety data for one vehicle. The degraded form is `SafetyReport::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyReport {
    pub ratings: Option<SafetyRatings>,
    pub recalls: Vec<Recall>,
    pub complaints: Vec<Complaint>,
}

impl SafetyReport {
    pub fn is_empty(&self) -> bool {
        self.ratings.is_none() && self.recalls.is_empty() && self.complaints.is_empty()
    }
}

/// "What owners say" narrative generated by the insights provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeInsights {
    pub summary: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub common_issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_sentiment: Option<String>,
}

/// Price and mileage statistics over a set of listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    /// Listings that carried a price.
    pub priced_count: usize,
    pub min_price: u32,
    pub max_price: u32,
    pub average_price: u32,
    pub median_price: u32,
    pub average_miles: u32,
    pub new_count: usize,
    pub certified_count: usize,
}

/// The assembled car profile returned by `/api/car/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub vehicle: VehicleIdentity,
    pub safety: SafetyReport,
    pub insights: Option<NarrativeInsights>,
    pub market_stats: Option<MarketStats>,
    pub sample_listings: Vec<Listing>,
    pub total_listings: u32,
    /// Set only when the fallback ladder produced the listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_display() {
        let vehicle = VehicleIdentity::new("Toyota", "RAV4", 2024);
        assert_eq!(vehicle.to_string(), "2024 Toyota RAV4");
    }

    #[test]
    fn test_profile_serializes_camel_case_without_note() {
        let profile = ProfileResponse {
            vehicle: VehicleIdentity::new("Honda", "Civic", 2022),
            safety: SafetyReport::default(),
            insights: None,
            market_stats: None,
            sample_listings: vec![],
            total_listings: 0,
            search_note: None,
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["totalListings"], 0);
        assert!(json["sampleListings"].as_array().unwrap().is_empty());
        assert!(json.get("searchNote").is_none());
        assert!(json["insights"].is_null());
        assert!(json["safety"]["ratings"].is_null());
    }

    #[test]
    fn test_degraded_safety_is_empty() {
        assert!(SafetyReport::default().is_empty());
    }

    #[test]
    fn test_insights_tolerate_missing_lists() {
        let insights: NarrativeInsights =
            serde_json::from_str(r#"{"summary": "Solid commuter"}"#).unwrap();
        assert_eq!(insights.summary, "Solid commuter");
        assert!(insights.pros.is_empty());
        assert!(insights.reliability.is_none());
    }
}
