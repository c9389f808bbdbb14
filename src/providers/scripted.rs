//! Scripted provider doubles for tests.

use super::{InsightsProvider, ListingQuery, ListingsProvider, SafetyProvider};
use crate::error::{ProviderError, ProviderResult};
use crate::models::{
    Listing, ListingSearchResult, NarrativeInsights, SafetyRatings, SafetyReport, VehicleIdentity,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// What a scripted call does.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Fail,
    /// Never answers within any sane timeout.
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn play(&self) -> ProviderResult<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Fail => Err(ProviderError::Status {
                status: 503,
                body: "scripted failure".to_string(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ProviderError::Timeout(Duration::from_secs(3600)))
            }
        }
    }
}

pub struct ScriptedSafety(pub Reply<SafetyReport>);

#[async_trait]
impl SafetyProvider for ScriptedSafety {
    async fn get(&self, _vehicle: &VehicleIdentity) -> ProviderResult<SafetyReport> {
        self.0.play().await
    }
}

pub struct ScriptedInsights(pub Reply<Option<NarrativeInsights>>);

#[async_trait]
impl InsightsProvider for ScriptedInsights {
    async fn get(
        &self,
        _make: &str,
        _model: &str,
        _year: Option<u16>,
    ) -> ProviderResult<Option<NarrativeInsights>> {
        self.0.play().await
    }
}

/// Answers by radius (`None` = nationwide) and records every query.
pub struct ScriptedListings {
    by_radius: HashMap<Option<u32>, Reply<ListingSearchResult>>,
    calls: Mutex<Vec<ListingQuery>>,
}

impl ScriptedListings {
    /// Every radius returns nothing until scripted otherwise.
    pub fn new() -> Self {
        Self {
            by_radius: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn at(mut self, radius: u32, reply: Reply<ListingSearchResult>) -> Self {
        self.by_radius.insert(Some(radius), reply);
        self
    }

    pub fn nationwide(mut self, reply: Reply<ListingSearchResult>) -> Self {
        self.by_radius.insert(None, reply);
        self
    }

    pub fn calls(&self) -> Vec<ListingQuery> {
        self.calls.lock().unwrap().clone()
    }

    /// Radii of the recorded calls, `None` for nationwide.
    pub fn radii(&self) -> Vec<Option<u32>> {
        self.calls().iter().map(|q| q.radius_miles()).collect()
    }
}

#[async_trait]
impl ListingsProvider for ScriptedListings {
    async fn search(&self, query: &ListingQuery) -> ProviderResult<ListingSearchResult> {
        self.calls.lock().unwrap().push(query.clone());
        match self.by_radius.get(&query.radius_miles()) {
            Some(reply) => reply.play().await,
            None => Ok(ListingSearchResult::empty()),
        }
    }
}

pub fn listing(id: &str, price: u32, miles: u32) -> Listing {
    Listing {
        id: id.to_string(),
        vin: None,
        price,
        miles_driven: miles,
        photos: vec![],
        seller_city: Some("Los Angeles".to_string()),
        seller_state: Some("CA".to_string()),
        seller_name: None,
        is_new: miles < 100,
        is_certified: false,
        heading: None,
        listing_url: None,
    }
}

/// A page of `count` listings reporting `count` total matches.
pub fn results(count: u32) -> ListingSearchResult {
    ListingSearchResult {
        listings: (0..count)
            .map(|i| listing(&format!("L{}", i), 30_000 + i * 1_000, 10_000 + i * 500))
            .collect(),
        total: count,
    }
}

pub fn safety_report() -> SafetyReport {
    SafetyReport {
        ratings: Some(SafetyRatings {
            overall: Some(5),
            frontal: Some(4),
            side: Some(5),
            rollover: Some(4),
        }),
        recalls: vec![],
        complaints: vec![],
    }
}

pub fn insights() -> NarrativeInsights {
    NarrativeInsights {
        summary: "Owners praise fuel economy and resale value.".to_string(),
        pros: vec!["Efficient hybrid drivetrain".to_string()],
        cons: vec!["Road noise at highway speeds".to_string()],
        common_issues: vec![],
        reliability: Some("Above average".to_string()),
        owner_sentiment: Some("positive".to_string()),
    }
}
