//! Request validation.
//!
//! Path and query values arrive as strings; everything is checked here
//! and rejected with a 400 before any provider is called.

use crate::error::{ApiError, ApiResult};
use crate::models::{LocationFilter, PageWindow, VehicleIdentity};
use chrono::Datelike;
use std::collections::HashMap;
use std::str::FromStr;

const MAX_NAME_LEN: usize = 64;
const MIN_MODEL_YEAR: i32 = 1900;
pub const MAX_RADIUS_MILES: u32 = 500;
pub const MAX_PAGE_ROWS: u32 = 50;

pub type Params = HashMap<String, String>;

/// Value of a query parameter, treating `?zip=` the same as no `zip`.
pub fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Parse an optional numeric parameter.
pub fn number<T: FromStr>(params: &Params, key: &str) -> ApiResult<Option<T>> {
    param(params, key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| ApiError::BadRequest(format!("{} must be a number, got '{}'", key, raw)))
        })
        .transpose()
}

fn name(field: &str, value: &str) -> ApiResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(ApiError::BadRequest(format!("{} is too long", field)));
    }
    Ok(value.to_string())
}

/// Latest model year accepted: next year's models go on sale early.
fn latest_model_year() -> i32 {
    chrono::Utc::now().year() + 2
}

pub fn year(raw: &str) -> ApiResult<u16> {
    let year: i32 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("year must be a number, got '{}'", raw)))?;

    let latest = latest_model_year();
    if !(MIN_MODEL_YEAR..=latest).contains(&year) {
        return Err(ApiError::BadRequest(format!(
            "year must be between {} and {}",
            MIN_MODEL_YEAR, latest
        )));
    }
    Ok(year as u16)
}

pub fn make_and_model(make: &str, model: &str) -> ApiResult<(String, String)> {
    Ok((name("make", make)?, name("model", model)?))
}

pub fn vehicle(make: &str, model: &str, raw_year: &str) -> ApiResult<VehicleIdentity> {
    let (make, model) = make_and_model(make, model)?;
    Ok(VehicleIdentity::new(make, model, year(raw_year)?))
}

/// `zip` and `radius` query parameters. No zip means nationwide (`None`).
pub fn location(params: &Params, default_radius: u32) -> ApiResult<Option<LocationFilter>> {
    let radius = match number::<u32>(params, "radius")? {
        Some(0) => return Err(ApiError::BadRequest("radius must be positive".to_string())),
        Some(r) if r > MAX_RADIUS_MILES => {
            return Err(ApiError::BadRequest(format!(
                "radius must be at most {} miles",
                MAX_RADIUS_MILES
            )))
        }
        Some(r) => r,
        None => default_radius,
    };

    let Some(zip) = param(params, "zip") else {
        return Ok(None);
    };
    if zip.len() != 5 || !zip.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::BadRequest(format!(
            "zip must be a 5-digit postal code, got '{}'",
            zip
        )));
    }

    Ok(Some(LocationFilter::near(zip, radius)))
}

/// `rows` and `start` query parameters.
pub fn page(params: &Params, default_rows: u32) -> ApiResult<PageWindow> {
    let rows = number::<u32>(params, "rows")?.unwrap_or(default_rows);
    if rows == 0 || rows > MAX_PAGE_ROWS {
        return Err(ApiError::BadRequest(format!(
            "rows must be between 1 and {}",
            MAX_PAGE_ROWS
        )));
    }

    Ok(PageWindow {
        rows,
        start_offset: number::<u32>(params, "start")?.unwrap_or(0),
    })
}
