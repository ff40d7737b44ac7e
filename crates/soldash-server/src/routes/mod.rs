//! Route definitions for the HTTP API.

pub mod analytics;
pub mod games;
pub mod health;
pub mod live;
pub mod notifications;
pub mod patterns;

use std::fmt::Display;
use std::str::FromStr;

use axum::Router;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Prefix for versioned API routes.
pub const API_PREFIX: &str = "/api/v1";

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(games::routes())
        .merge(patterns::routes())
        .merge(analytics::routes())
        .merge(notifications::routes())
        .merge(live::routes());

    Router::new()
        .merge(health::routes())
        .nest(API_PREFIX, api)
        .with_state(state)
}

/// Parses an optional query parameter, falling back to `default`.
pub(crate) fn parse_param<T>(name: &str, raw: Option<&str>, default: T) -> ApiResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e| ApiError::BadRequest(format!("invalid {}: {}", name, e))),
    }
}

/// Rejects values outside `[min, max]`.
pub(crate) fn check_range(name: &str, value: usize, min: usize, max: usize) -> ApiResult<usize> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )))
    }
}
