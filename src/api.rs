use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::engine::{self, GroupBy, KpiSummary, TrendBucket};
use crate::error::ValidationError;
use crate::filter::RecordFilter;
use crate::period::{Granularity, Period};
use crate::record::SubscriptionRecord;

/// Shared, read-only session state: the dataset loaded at startup plus an
/// optional pinned reference date. Cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Vec<SubscriptionRecord>>,
    pub reference_date: Option<NaiveDate>,
}

impl AppState {
    pub fn new(dataset: Vec<SubscriptionRecord>, reference_date: Option<NaiveDate>) -> Self {
        Self {
            dataset: Arc::new(dataset),
            reference_date,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/summary", get(summary))
        .route("/metrics/active", get(active_vs_inactive))
        .route("/metrics/churn", get(churn))
        .route("/metrics/trend", get(trend))
        .route("/metrics/revenue", get(revenue))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Common filter + view parameters shared by every metrics endpoint.
/// `plan` and `segment` take comma-separated sets; absent means "all".
#[derive(Debug, Deserialize, Default)]
struct MetricsQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    plan: Option<String>,
    segment: Option<String>,
    /// Analysis reference date; defaults to the configured one, then today.
    reference: Option<NaiveDate>,
    granularity: Option<String>,
    #[serde(default)]
    fill: bool,
    group_by: Option<String>,
}

/// Validation failures map to 400 with a JSON error body; the dashboard
/// shows the message next to the offending control.
struct ApiError(StatusCode, String);

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError(StatusCode::BAD_REQUEST, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.1 }));
        (self.0, body).into_response()
    }
}

fn bad_request(msg: impl Into<String>) -> ApiError {
    ApiError(StatusCode::BAD_REQUEST, msg.into())
}

fn split_set(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl MetricsQuery {
    /// Open-ended ranges are allowed: a missing edge falls back to the
    /// calendar extremes so "everything since X" needs only `from`.
    fn period(&self) -> Result<Option<Period>, ValidationError> {
        match (self.from, self.to) {
            (None, None) => Ok(None),
            (from, to) => {
                let start = from.unwrap_or(NaiveDate::MIN);
                let end = to.unwrap_or(NaiveDate::MAX);
                Period::new(start, end).map(Some)
            }
        }
    }

    fn filter(&self) -> Result<RecordFilter, ValidationError> {
        Ok(RecordFilter {
            period: self.period()?,
            plan_types: split_set(&self.plan),
            segments: split_set(&self.segment),
        })
    }

    fn granularity(&self) -> Result<Granularity, ApiError> {
        match &self.granularity {
            None => Ok(Granularity::default()),
            Some(s) => Granularity::parse(s)
                .ok_or_else(|| bad_request(format!("unknown granularity '{s}'"))),
        }
    }

    fn group_by(&self) -> Result<GroupBy, ApiError> {
        let key = self.group_by.as_deref().unwrap_or("none");
        match key.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(GroupBy::None),
            "plan_type" => Ok(GroupBy::PlanType),
            "segment" => Ok(GroupBy::Segment),
            "period_bucket" => Ok(GroupBy::PeriodBucket(self.granularity()?)),
            other => Err(bad_request(format!("unknown group_by '{other}'"))),
        }
    }

    fn reference(&self, state: &AppState) -> NaiveDate {
        self.reference
            .or(state.reference_date)
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

async fn summary(
    State(state): State<AppState>,
    Query(q): Query<MetricsQuery>,
) -> Result<Json<KpiSummary>, ApiError> {
    let kept = q.filter()?.apply(&state.dataset);
    Ok(Json(engine::kpi_summary(&kept, q.reference(&state))))
}

#[derive(serde::Serialize)]
struct ActiveOut {
    active: usize,
    inactive: usize,
}

async fn active_vs_inactive(
    State(state): State<AppState>,
    Query(q): Query<MetricsQuery>,
) -> Result<Json<ActiveOut>, ApiError> {
    let kept = q.filter()?.apply(&state.dataset);
    let (active, inactive) = engine::active_vs_inactive(&kept, q.reference(&state));
    Ok(Json(ActiveOut { active, inactive }))
}

#[derive(serde::Serialize)]
struct ChurnOut {
    churn_rate: f64,
    period_start: NaiveDate,
    period_end: NaiveDate,
}

async fn churn(
    State(state): State<AppState>,
    Query(q): Query<MetricsQuery>,
) -> Result<Json<ChurnOut>, ApiError> {
    // Churn is relative to an explicit window; plan/segment filters still
    // apply, but the period selects the churn window, not the records.
    let (from, to) = match (q.from, q.to) {
        (Some(f), Some(t)) => (f, t),
        _ => return Err(bad_request("churn requires both 'from' and 'to'")),
    };
    let window = Period::new(from, to)?;

    let filter = RecordFilter {
        period: None,
        plan_types: split_set(&q.plan),
        segments: split_set(&q.segment),
    };
    let kept = filter.apply(&state.dataset);
    Ok(Json(ChurnOut {
        churn_rate: engine::churn_rate(&kept, window),
        period_start: window.start(),
        period_end: window.end(),
    }))
}

async fn trend(
    State(state): State<AppState>,
    Query(q): Query<MetricsQuery>,
) -> Result<Json<Vec<TrendBucket>>, ApiError> {
    let kept = q.filter()?.apply(&state.dataset);
    let g = q.granularity()?;
    Ok(Json(engine::trend(&kept, g, q.fill)))
}

async fn revenue(
    State(state): State<AppState>,
    Query(q): Query<MetricsQuery>,
) -> Result<Json<std::collections::BTreeMap<String, f64>>, ApiError> {
    let kept = q.filter()?.apply(&state.dataset);
    let group_by = q.group_by()?;
    Ok(Json(engine::revenue_summary(&kept, group_by)))
}
