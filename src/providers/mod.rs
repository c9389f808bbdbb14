//! Upstream data providers.
//!
//! Each provider sits behind a trait so the aggregator and the HTTP layer
//! can be driven by scripted doubles in tests. Implementations return
//! `Err` on failure; degrading to an empty value is the caller's choice.

pub mod insights;
pub mod listings;
pub mod safety;

#[cfg(test)]
pub mod scripted;

use crate::error::{ProviderError, ProviderResult};
use crate::models::{
    ListingSearchResult, LocationFilter, NarrativeInsights, PageWindow, SafetyReport,
    VehicleIdentity,
};
use async_trait::async_trait;

pub use insights::ChatInsightsProvider;
pub use listings::MarketplaceListingsProvider;
pub use safety::NhtsaSafetyProvider;

/// Safety ratings, recalls and complaints keyed by make/model/year.
#[async_trait]
pub trait SafetyProvider: Send + Sync {
    async fn get(&self, vehicle: &VehicleIdentity) -> ProviderResult<SafetyReport>;
}

/// Narrative owner insights. `Ok(None)` means the provider had nothing to say.
#[async_trait]
pub trait InsightsProvider: Send + Sync {
    async fn get(
        &self,
        make: &str,
        model: &str,
        year: Option<u16>,
    ) -> ProviderResult<Option<NarrativeInsights>>;
}

/// Paginated marketplace search.
#[async_trait]
pub trait ListingsProvider: Send + Sync {
    async fn search(&self, query: &ListingQuery) -> ProviderResult<ListingSearchResult>;
}

/// A single listings search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub vehicle: VehicleIdentity,
    /// `None` searches nationwide.
    pub location: Option<LocationFilter>,
    pub page: PageWindow,
}

impl ListingQuery {
    pub fn new(vehicle: VehicleIdentity, location: Option<LocationFilter>, page: PageWindow) -> Self {
        // A filter without a postal code carries no geography.
        let location = location.filter(|l| l.postal_code.is_some());
        Self {
            vehicle,
            location,
            page,
        }
    }

    /// The same query with the geographic filter removed.
    pub fn nationwide(&self) -> Self {
        Self {
            location: None,
            ..self.clone()
        }
    }

    /// The same query at a different radius around the same postal code.
    pub fn with_radius(&self, radius_miles: u32) -> Self {
        let location = self.location.as_ref().map(|l| LocationFilter {
            postal_code: l.postal_code.clone(),
            radius_miles,
        });
        Self {
            location,
            ..self.clone()
        }
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.postal_code.as_deref())
    }

    pub fn radius_miles(&self) -> Option<u32> {
        self.location.as_ref().map(|l| l.radius_miles)
    }
}

/// Joins `segments` onto `base` as percent-encoded path segments.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> ProviderResult<reqwest::Url> {
    let mut url =
        reqwest::Url::parse(base).map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| ProviderError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Strips a Markdown code fence that chat models like to wrap JSON in.
pub(crate) fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
