//! NHTSA safety provider.
//!
//! Star ratings need two round trips (model year lookup, then the vehicle
//! id), recalls and complaints one each. The three lookups run concurrently
//! and degrade individually; the provider only fails when all of them do.

use super::{endpoint, SafetyProvider};
use crate::config::SafetyConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::models::{Complaint, Recall, SafetyRatings, SafetyReport, VehicleIdentity};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Complaints are returned newest-last and can run into the thousands.
const MAX_COMPLAINTS: usize = 50;

pub struct NhtsaSafetyProvider {
    base_url: String,
    http_client: reqwest::Client,
}

impl NhtsaSafetyProvider {
    pub fn new(config: &SafetyConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            http_client,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: reqwest::Url,
        query: &[(&str, String)],
    ) -> ProviderResult<T> {
        debug!("GET {}", url);
        let response = self.http_client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn ratings(&self, vehicle: &VehicleIdentity) -> ProviderResult<Option<SafetyRatings>> {
        let year = vehicle.year.to_string();
        let url = endpoint(
            &self.base_url,
            &[
                "SafetyRatings",
                "modelyear",
                year.as_str(),
                "make",
                vehicle.make.as_str(),
                "model",
                vehicle.model.as_str(),
            ],
        )?;
        let variants: NhtsaEnvelope<RatedVariant> = self.get_json(url, &[]).await?;

        let Some(variant) = variants.results.first() else {
            return Ok(None);
        };

        let id = variant.vehicle_id.to_string();
        let url = endpoint(&self.base_url, &["SafetyRatings", "VehicleId", id.as_str()])?;
        let detail: NhtsaEnvelope<RatingDetail> = self.get_json(url, &[]).await?;

        Ok(detail.results.into_iter().next().map(RatingDetail::into_ratings))
    }

    async fn recalls(&self, vehicle: &VehicleIdentity) -> ProviderResult<Vec<Recall>> {
        let url = endpoint(&self.base_url, &["recalls", "recallsByVehicle"])?;
        let body: RecallsEnvelope = self.get_json(url, &vehicle_query(vehicle)).await?;
        Ok(body.results.into_iter().map(Recall::from).collect())
    }

    async fn complaints(&self, vehicle: &VehicleIdentity) -> ProviderResult<Vec<Complaint>> {
        let url = endpoint(&self.base_url, &["complaints", "complaintsByVehicle"])?;
        let body: ComplaintsEnvelope = self.get_json(url, &vehicle_query(vehicle)).await?;
        Ok(body
            .results
            .into_iter()
            .rev()
            .take(MAX_COMPLAINTS)
            .map(Complaint::from)
            .collect())
    }
}

#[async_trait]
impl SafetyProvider for NhtsaSafetyProvider {
    async fn get(&self, vehicle: &VehicleIdentity) -> ProviderResult<SafetyReport> {
        let (ratings, recalls, complaints) = tokio::join!(
            self.ratings(vehicle),
            self.recalls(vehicle),
            self.complaints(vehicle)
        );

        merge_lookups(vehicle, ratings, recalls, complaints)
    }
}

/// Combines the three lookups, degrading each failed one to its empty form.
fn merge_lookups(
    vehicle: &VehicleIdentity,
    ratings: ProviderResult<Option<SafetyRatings>>,
    recalls: ProviderResult<Vec<Recall>>,
    complaints: ProviderResult<Vec<Complaint>>,
) -> ProviderResult<SafetyReport> {
    match (ratings, recalls, complaints) {
        (Err(e), Err(_), Err(_)) => Err(e),
        (ratings, recalls, complaints) => Ok(SafetyReport {
            ratings: ratings.unwrap_or_else(|e| {
                warn!("Safety ratings unavailable for {}: {}", vehicle, e);
                None
            }),
            recalls: recalls.unwrap_or_else(|e| {
                warn!("Recalls unavailable for {}: {}", vehicle, e);
                Vec::new()
            }),
            complaints: complaints.unwrap_or_else(|e| {
                warn!("Complaints unavailable for {}: {}", vehicle, e);
                Vec::new()
            }),
        }),
    }
}

fn vehicle_query(vehicle: &VehicleIdentity) -> [(&'static str, String); 3] {
    [
        ("make", vehicle.make.clone()),
        ("model", vehicle.model.clone()),
        ("modelYear", vehicle.year.to_string()),
    ]
}

/// Star ratings come back as strings: "5", "4", or "Not Rated".
fn parse_stars(value: Option<&str>) -> Option<u8> {
    value
        .and_then(|v| v.trim().parse::<u8>().ok())
        .filter(|stars| (1..=5).contains(stars))
}

#[derive(Debug, Deserialize)]
struct NhtsaEnvelope<T> {
    #[serde(rename = "Results", default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RatedVariant {
    #[serde(rename = "VehicleId")]
    vehicle_id: u64,
}

#[derive(Debug, Deserialize)]
struct RatingDetail {
    #[serde(rename = "OverallRating")]
    overall: Option<String>,
    #[serde(rename = "OverallFrontCrashRating")]
    frontal: Option<String>,
    #[serde(rename = "OverallSideCrashRating")]
    side: Option<String>,
    #[serde(rename = "RolloverRating")]
    rollover: Option<String>,
}

impl RatingDetail {
    fn into_ratings(self) -> SafetyRatings {
        SafetyRatings {
            overall: parse_stars(self.overall.as_deref()),
            frontal: parse_stars(self.frontal.as_deref()),
            side: parse_stars(self.side.as_deref()),
            rollover: parse_stars(self.rollover.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecallsEnvelope {
    #[serde(default)]
    results: Vec<NhtsaRecall>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NhtsaRecall {
    #[serde(rename = "NHTSACampaignNumber")]
    campaign_number: String,
    #[serde(default)]
    component: String,
    #[serde(default)]
    summary: String,
    consequence: Option<String>,
    remedy: Option<String>,
    report_received_date: Option<String>,
}

impl From<NhtsaRecall> for Recall {
    fn from(r: NhtsaRecall) -> Self {
        Recall {
            campaign_number: r.campaign_number,
            component: r.component,
            summary: r.summary,
            consequence: r.consequence,
            remedy: r.remedy,
            report_date: r.report_received_date,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComplaintsEnvelope {
    #[serde(default)]
    results: Vec<NhtsaComplaint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NhtsaComplaint {
    odi_number: u64,
    #[serde(default)]
    components: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    crash: bool,
    #[serde(default)]
    fire: bool,
    date_complaint_filed: Option<String>,
}

impl From<NhtsaComplaint> for Complaint {
    fn from(c: NhtsaComplaint) -> Self {
        Complaint {
            odi_number: c.odi_number,
            components: c.components,
            summary: c.summary,
            crash: c.crash,
            fire: c.fire,
            date_filed: c.date_complaint_filed,
        }
    }
}
