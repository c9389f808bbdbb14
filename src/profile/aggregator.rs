//! Car profile assembly.
//!
//! Fans out to the safety, insights and listings providers concurrently,
//! then, if a local listings search came back empty, walks the radius
//! ladder and finally tries a nationwide search.

use crate::analysis::market_stats;
use crate::config::SearchConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::models::{
    ListingSearchResult, LocationFilter, NarrativeInsights, PageWindow, ProfileResponse,
    SafetyReport, VehicleIdentity,
};
use crate::providers::{InsightsProvider, ListingQuery, ListingsProvider, SafetyProvider};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Note attached when only the nationwide search found anything.
pub const NATIONWIDE_NOTE: &str = "No listings near your location — showing nationwide results";

/// Settings the aggregator needs from `[search]`.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub page_size: u32,
    pub default_radius_miles: u32,
    /// Ascending radii tried after an empty local search.
    pub fallback_radii: Vec<u32>,
    pub call_timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        let mut fallback_radii = config.fallback_radii.clone();
        fallback_radii.sort_unstable();
        fallback_radii.dedup();

        Self {
            page_size: config.page_size,
            default_radius_miles: config.default_radius_miles,
            fallback_radii,
            call_timeout: config.call_timeout(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProfileError {
    /// Safety, insights and listings all failed on the initial fan-out.
    #[error("all vehicle data providers are unavailable")]
    AllProvidersUnavailable,
}

/// Builds `ProfileResponse`s. Holds no per-request state.
#[derive(Clone)]
pub struct ProfileAggregator {
    safety: Arc<dyn SafetyProvider>,
    insights: Arc<dyn InsightsProvider>,
    listings: Arc<dyn ListingsProvider>,
    settings: SearchSettings,
}

/// The listings the profile ends up showing.
#[derive(Debug)]
struct AdoptedListings {
    result: ListingSearchResult,
    note: Option<String>,
}

impl ProfileAggregator {
    pub fn new(
        safety: Arc<dyn SafetyProvider>,
        insights: Arc<dyn InsightsProvider>,
        listings: Arc<dyn ListingsProvider>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            safety,
            insights,
            listings,
            settings,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Assemble the profile for `vehicle`.
    ///
    /// Provider failures degrade the affected field. The only error is all
    /// three initial calls failing at once.
    pub async fn get_profile(
        &self,
        vehicle: VehicleIdentity,
        location: Option<LocationFilter>,
    ) -> Result<ProfileResponse, ProfileError> {
        let query = ListingQuery::new(
            vehicle.clone(),
            location,
            PageWindow::first(self.settings.page_size),
        );
        info!(
            "Building profile for {} (zip: {:?}, radius: {:?})",
            vehicle,
            query.postal_code(),
            query.radius_miles()
        );

        let (safety, insights, listings) = futures::future::join3(
            self.bounded("safety", self.safety.get(&vehicle)),
            self.bounded(
                "insights",
                self.insights.get(&vehicle.make, &vehicle.model, Some(vehicle.year)),
            ),
            self.bounded("listings", self.listings.search(&query)),
        )
        .await;

        if safety.is_err() && insights.is_err() && listings.is_err() {
            warn!("Every provider failed for {}", vehicle);
            return Err(ProfileError::AllProvidersUnavailable);
        }

        let safety = safety.unwrap_or_else(|e| {
            warn!("Safety data degraded for {}: {}", vehicle, e);
            SafetyReport::default()
        });
        if safety.is_empty() {
            debug!("No safety data on record for {}", vehicle);
        }
        let insights: Option<NarrativeInsights> = insights.unwrap_or_else(|e| {
            warn!("Insights degraded for {}: {}", vehicle, e);
            None
        });

        let adopted = match listings {
            Ok(initial) => self.widen_if_empty(&query, initial).await,
            Err(e) => {
                warn!("Listings search failed for {}: {}", vehicle, e);
                AdoptedListings {
                    result: ListingSearchResult::empty(),
                    note: None,
                }
            }
        };

        let mut sample_listings = adopted.result.listings;
        sample_listings.truncate(self.settings.page_size as usize);

        Ok(ProfileResponse {
            vehicle,
            safety,
            insights,
            market_stats: market_stats(&sample_listings),
            sample_listings,
            total_listings: adopted.result.total,
            search_note: adopted.note,
        })
    }

    /// Run the fallback ladder when a local search came back empty.
    async fn widen_if_empty(
        &self,
        query: &ListingQuery,
        initial: ListingSearchResult,
    ) -> AdoptedListings {
        let Some(initial_radius) = query.radius_miles() else {
            return AdoptedListings {
                result: initial,
                note: None,
            };
        };
        if initial.has_results() {
            return AdoptedListings {
                result: initial,
                note: None,
            };
        }

        for radius in self.ladder_after(initial_radius) {
            debug!("No listings within {} miles, trying {}", initial_radius, radius);
            if let Some(result) = self.search_step(&query.with_radius(radius)).await {
                info!("Found {} listings within {} miles", result.total, radius);
                return AdoptedListings {
                    result,
                    note: Some(format!("Showing listings within {} miles", radius)),
                };
            }
        }

        debug!("Radius ladder exhausted, searching nationwide");
        match self.search_step(&query.nationwide()).await {
            Some(result) => {
                info!("Found {} listings nationwide", result.total);
                AdoptedListings {
                    result,
                    note: Some(NATIONWIDE_NOTE.to_string()),
                }
            }
            None => AdoptedListings {
                result: initial,
                note: None,
            },
        }
    }

    /// Ladder radii strictly wider than what was already searched.
    fn ladder_after(&self, searched_radius: u32) -> impl Iterator<Item = u32> + '_ {
        self.settings
            .fallback_radii
            .iter()
            .copied()
            .filter(move |r| *r > searched_radius)
    }

    /// One fallback search. `None` when it failed or found nothing.
    async fn search_step(&self, query: &ListingQuery) -> Option<ListingSearchResult> {
        match self.bounded("listings", self.listings.search(query)).await {
            Ok(result) if result.has_results() => Some(result),
            Ok(_) => None,
            Err(e) => {
                warn!(
                    "Fallback listings search (radius: {:?}) failed: {}",
                    query.radius_miles(),
                    e
                );
                None
            }
        }
    }

    /// Apply the per-call timeout to a provider future.
    async fn bounded<T>(
        &self,
        provider: &'static str,
        call: impl Future<Output = ProviderResult<T>>,
    ) -> ProviderResult<T> {
        match tokio::time::timeout(self.settings.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "{} provider timed out after {:?}",
                    provider, self.settings.call_timeout
                );
                Err(ProviderError::Timeout(self.settings.call_timeout))
            }
        }
    }
}
