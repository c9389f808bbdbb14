//! Marketplace listings provider.
//!
//! Talks to a MarketCheck-style `search/car/active` endpoint. Geographic
//! parameters are only sent when the query carries a postal code, which
//! is how the nationwide search is expressed.

use super::{endpoint, ListingQuery, ListingsProvider};
use crate::config::ListingsConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::models::{Listing, ListingSearchResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub struct MarketplaceListingsProvider {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl MarketplaceListingsProvider {
    pub fn new(config: &ListingsConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            http_client,
        })
    }
}

#[async_trait]
impl ListingsProvider for MarketplaceListingsProvider {
    async fn search(&self, query: &ListingQuery) -> ProviderResult<ListingSearchResult> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("listings API key"))?;

        let url = endpoint(&self.base_url, &["v2", "search", "car", "active"])?;
        debug!(
            "Listings search for {} (zip: {:?}, radius: {:?}, start: {})",
            query.vehicle,
            query.postal_code(),
            query.radius_miles(),
            query.page.start_offset
        );

        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", api_key)])
            .query(&search_params(query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(body.into_result())
    }
}

/// Query parameters for a search, excluding the API key.
fn search_params(query: &ListingQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("make", query.vehicle.make.clone()),
        ("model", query.vehicle.model.clone()),
        ("year", query.vehicle.year.to_string()),
        ("rows", query.page.rows.to_string()),
        ("start", query.page.start_offset.to_string()),
    ];

    if let (Some(zip), Some(radius)) = (query.postal_code(), query.radius_miles()) {
        params.push(("zip", zip.to_string()));
        params.push(("radius", radius.to_string()));
    }

    params
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    num_found: u32,
    #[serde(default)]
    listings: Vec<MarketListing>,
}

impl SearchResponse {
    fn into_result(self) -> ListingSearchResult {
        ListingSearchResult {
            listings: self.listings.into_iter().map(Listing::from).collect(),
            total: self.num_found,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarketListing {
    id: String,
    vin: Option<String>,
    price: Option<f64>,
    miles: Option<f64>,
    heading: Option<String>,
    vdp_url: Option<String>,
    inventory_type: Option<String>,
    #[serde(default)]
    is_certified: Option<serde_json::Value>,
    #[serde(default)]
    media: Option<Media>,
    #[serde(default)]
    dealer: Option<Dealer>,
}

#[derive(Debug, Default, Deserialize)]
struct Media {
    #[serde(default)]
    photo_links: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Dealer {
    name: Option<String>,
    city: Option<String>,
    state: Option<String>,
}

/// `is_certified` shows up as a bool, as 0/1, or not at all.
fn truthy(value: Option<&serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

fn whole(value: Option<f64>) -> u32 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.round().min(u32::MAX as f64) as u32)
        .unwrap_or(0)
}

impl From<MarketListing> for Listing {
    fn from(m: MarketListing) -> Self {
        let dealer = m.dealer.unwrap_or_default();
        Listing {
            is_certified: truthy(m.is_certified.as_ref()),
            is_new: m
                .inventory_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("new")),
            id: m.id,
            vin: m.vin,
            price: whole(m.price),
            miles_driven: whole(m.miles),
            photos: m.media.unwrap_or_default().photo_links,
            seller_city: dealer.city,
            seller_state: dealer.state,
            seller_name: dealer.name,
            heading: m.heading,
            listing_url: m.vdp_url,
        }
    }
}
