use super::{create_router, AppState};
use crate::profile::aggregator::NATIONWIDE_NOTE;
use crate::profile::SearchSettings;
use crate::providers::scripted::{
    insights, results, safety_report, Reply, ScriptedInsights, ScriptedListings, ScriptedSafety,
};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app_with(
    safety: Reply<crate::models::SafetyReport>,
    insights_reply: Reply<Option<crate::models::NarrativeInsights>>,
    listings: Arc<ScriptedListings>,
) -> Router {
    let state = AppState::new(
        Arc::new(ScriptedSafety(safety)),
        Arc::new(ScriptedInsights(insights_reply)),
        listings,
        SearchSettings {
            call_timeout: Duration::from_millis(200),
            ..SearchSettings::default()
        },
    );
    create_router(state)
}

fn app(listings: Arc<ScriptedListings>) -> Router {
    app_with(
        Reply::Ok(safety_report()),
        Reply::Ok(Some(insights())),
        listings,
    )
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(Arc::new(ScriptedListings::new())), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_profile_with_fallback_note() {
    let listings = Arc::new(
        ScriptedListings::new()
            .at(50, Reply::Ok(results(0)))
            .at(100, Reply::Ok(results(0)))
            .at(200, Reply::Ok(results(3))),
    );

    let (status, body) = get(
        app(listings.clone()),
        "/api/car/profile/Toyota/RAV4/2024?zip=90210&radius=50",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vehicle"]["make"], "Toyota");
    assert_eq!(body["vehicle"]["year"], 2024);
    assert_eq!(body["searchNote"], "Showing listings within 200 miles");
    assert_eq!(body["totalListings"], 3);
    assert_eq!(body["sampleListings"].as_array().unwrap().len(), 3);
    assert_eq!(body["safety"]["ratings"]["overall"], 5);
    assert!(body["marketStats"]["averagePrice"].is_number());
    assert_eq!(listings.calls().len(), 3);
}

#[tokio::test]
async fn test_profile_zip_without_radius_uses_default() {
    let listings = Arc::new(ScriptedListings::new().nationwide(Reply::Ok(results(2))));

    let (status, body) = get(app(listings.clone()), "/api/car/profile/Toyota/RAV4/2024?zip=90210").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["searchNote"], NATIONWIDE_NOTE);
    assert_eq!(listings.radii(), vec![Some(50), Some(100), Some(200), None]);
}

#[tokio::test]
async fn test_profile_without_zip_has_no_note() {
    let listings = Arc::new(ScriptedListings::new());

    let (status, body) = get(app(listings.clone()), "/api/car/profile/Toyota/RAV4/2024").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("searchNote").is_none());
    assert_eq!(body["totalListings"], 0);
    assert!(body["marketStats"].is_null());
    assert_eq!(listings.radii(), vec![None]);
}

#[tokio::test]
async fn test_profile_rejects_bad_input_before_calling_providers() {
    let listings = Arc::new(ScriptedListings::new());

    for uri in [
        "/api/car/profile/Toyota/RAV4/abcd",
        "/api/car/profile/Toyota/RAV4/2024?zip=ABCDE",
        "/api/car/profile/Toyota/RAV4/2024?zip=90210&radius=-10",
        "/api/car/profile/Toyota/RAV4/2024?zip=90210&radius=0",
    ] {
        let (status, body) = get(app(listings.clone()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string());
    }

    assert!(listings.calls().is_empty());
}

#[tokio::test]
async fn test_profile_total_outage_is_500() {
    let app = app_with(
        Reply::Fail,
        Reply::Fail,
        Arc::new(ScriptedListings::new().at(50, Reply::Fail)),
    );

    let (status, body) = get(app, "/api/car/profile/Toyota/RAV4/2024?zip=90210").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to load vehicle profile");
}

#[tokio::test]
async fn test_listings_page_passes_window_without_fallback() {
    let listings = Arc::new(ScriptedListings::new());

    let (status, body) = get(
        app(listings.clone()),
        "/api/listings/Toyota/RAV4/2024?zip=90210&radius=25&rows=20&start=40",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);

    let calls = listings.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].page.rows, 20);
    assert_eq!(calls[0].page.start_offset, 40);
    assert_eq!(calls[0].radius_miles(), Some(25));
}

#[tokio::test]
async fn test_listings_provider_failure_is_502() {
    let listings = Arc::new(ScriptedListings::new().nationwide(Reply::Fail));

    let (status, body) = get(app(listings), "/api/listings/Toyota/RAV4/2024").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_safety_degrades_to_empty_report() {
    let app = app_with(
        Reply::Fail,
        Reply::Ok(None),
        Arc::new(ScriptedListings::new()),
    );

    let (status, body) = get(app, "/api/safety/Honda/Civic/2022").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["ratings"].is_null());
    assert!(body["recalls"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_insights_endpoint() {
    let (status, body) = get(
        app(Arc::new(ScriptedListings::new())),
        "/api/insights/Toyota/RAV4?year=2024",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reliability"], "Above average");

    let app = app_with(
        Reply::Ok(safety_report()),
        Reply::Fail,
        Arc::new(ScriptedListings::new()),
    );
    let (status, body) = get(app, "/api/insights/Toyota/RAV4").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_loan_payment() {
    let router = app(Arc::new(ScriptedListings::new()));

    let (status, body) = get(
        router.clone(),
        "/api/finance/payment?price=35000&down=5000&apr=6&months=60",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["monthlyPayment"], 579.98);
    assert_eq!(body["principal"], 30000.0);

    let (status, _) = get(router.clone(), "/api/finance/payment?down=5000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(router, "/api/finance/payment?price=20000&months=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
