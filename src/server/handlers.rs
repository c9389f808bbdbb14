//! Request handlers for the `/api` routes.

use super::validation::{self, Params};
use super::AppState;
use crate::analysis::{loan_payment as amortize, LoanEstimate};
use crate::error::{ApiError, ApiResult};
use crate::models::{ListingSearchResult, NarrativeInsights, ProfileResponse, SafetyReport};
use crate::providers::ListingQuery;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /api/car/profile/{make}/{model}/{year}?zip=&radius=`
pub async fn get_profile(
    State(state): State<AppState>,
    Path((make, model, year)): Path<(String, String, String)>,
    Query(params): Query<Params>,
) -> ApiResult<Json<ProfileResponse>> {
    let vehicle = validation::vehicle(&make, &model, &year)?;
    let location = validation::location(&params, state.settings().default_radius_miles)?;

    let profile = state
        .aggregator
        .get_profile(vehicle, location)
        .await
        .map_err(|e| {
            error!("Profile request failed: {}", e);
            ApiError::Internal("Failed to load vehicle profile".to_string())
        })?;

    Ok(Json(profile))
}

/// `GET /api/listings/{make}/{model}/{year}?zip=&radius=&rows=&start=`
///
/// Plain paged search for "load more"; no fallback.
pub async fn search_listings(
    State(state): State<AppState>,
    Path((make, model, year)): Path<(String, String, String)>,
    Query(params): Query<Params>,
) -> ApiResult<Json<ListingSearchResult>> {
    let vehicle = validation::vehicle(&make, &model, &year)?;
    let location = validation::location(&params, state.settings().default_radius_miles)?;
    let page = validation::page(&params, state.settings().page_size)?;

    let query = ListingQuery::new(vehicle, location, page);
    let mut result = state.listings.search(&query).await?;
    result.listings.truncate(page.rows as usize);

    Ok(Json(result))
}

/// `GET /api/safety/{make}/{model}/{year}`
pub async fn get_safety(
    State(state): State<AppState>,
    Path((make, model, year)): Path<(String, String, String)>,
) -> ApiResult<Json<SafetyReport>> {
    let vehicle = validation::vehicle(&make, &model, &year)?;

    let report = state.safety.get(&vehicle).await.unwrap_or_else(|e| {
        warn!("Safety data unavailable for {}: {}", vehicle, e);
        SafetyReport::default()
    });

    Ok(Json(report))
}

/// `GET /api/insights/{make}/{model}?year=`
pub async fn get_insights(
    State(state): State<AppState>,
    Path((make, model)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Option<NarrativeInsights>>> {
    let year = validation::param(&params, "year")
        .map(validation::year)
        .transpose()?;
    let (make, model) = validation::make_and_model(&make, &model)?;

    let insights = state
        .insights
        .get(&make, &model, year)
        .await
        .unwrap_or_else(|e| {
            warn!("Insights unavailable for {} {}: {}", make, model, e);
            None
        });

    Ok(Json(insights))
}

/// `GET /api/finance/payment?price=&down=&apr=&months=`
pub async fn loan_payment(Query(params): Query<Params>) -> ApiResult<Json<LoanEstimate>> {
    let price: f64 = validation::number(&params, "price")?
        .ok_or_else(|| ApiError::BadRequest("price is required".to_string()))?;
    let down: f64 = validation::number(&params, "down")?.unwrap_or(0.0);
    let apr: f64 = validation::number(&params, "apr")?.unwrap_or(0.0);
    let months: u32 = validation::number(&params, "months")?.unwrap_or(60);

    if !price.is_finite() || price <= 0.0 {
        return Err(ApiError::BadRequest("price must be positive".to_string()));
    }
    if !down.is_finite() || down < 0.0 {
        return Err(ApiError::BadRequest("down must not be negative".to_string()));
    }
    if !apr.is_finite() || !(0.0..=100.0).contains(&apr) {
        return Err(ApiError::BadRequest("apr must be between 0 and 100".to_string()));
    }
    if months == 0 || months > 120 {
        return Err(ApiError::BadRequest("months must be between 1 and 120".to_string()));
    }

    Ok(Json(amortize(price, down, apr, months)))
}
