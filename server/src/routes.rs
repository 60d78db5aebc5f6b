//! HTTP surface of the prediction service.
//!
//! Three endpoints over one shared, immutable pipeline handle: a health
//! snapshot at `/`, the canonical feature list at `/features`, and
//! `/predict`. Validation failures come back as 400 with an actionable
//! message; anything that fails past validation is logged in full
//! server-side and surfaced as a stable generic 500 body.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use homeprice::pipeline::PricePipeline;
use homeprice::schema::RawRecord;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Build the service router over a loaded pipeline.
pub fn router(pipeline: Arc<PricePipeline>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/features", get(features))
        .route("/predict", post(predict))
        .fallback(not_found)
        .with_state(pipeline)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

async fn health(State(pipeline): State<Arc<PricePipeline>>) -> Json<Value> {
    let report = pipeline.report();
    Json(json!({
        "status": "healthy",
        "message": "House Price Prediction API is running",
        "model_info": {
            "type": pipeline.model_type(),
            "features": pipeline.feature_names().len(),
            "trained_at": report.trained_at,
        },
        "model_metrics": {
            "r2_score": round_to(report.r2_score, 4),
            "mae": round_to(report.mae, 2),
            "rmse": round_to(report.rmse, 2),
        },
    }))
}

async fn features(State(pipeline): State<Arc<PricePipeline>>) -> Json<Value> {
    Json(json!({
        "features": pipeline.feature_names(),
        "feature_count": pipeline.feature_names().len(),
    }))
}

async fn predict(
    State(pipeline): State<Arc<PricePipeline>>,
    body: Option<Json<Value>>,
) -> (StatusCode, Json<Value>) {
    let Some(Json(body)) = body else {
        return bad_request("No data provided");
    };
    let Some(map) = body.as_object() else {
        return bad_request("No data provided");
    };

    // Fail fast on bad input, before any feature computation
    let record = match RawRecord::from_json(map) {
        Ok(record) => record,
        Err(err) => return bad_request(&err.to_string()),
    };

    match pipeline.predict(&record) {
        Ok(price) => {
            info!(predicted_price = price, "prediction served");
            let report = pipeline.report();
            (
                StatusCode::OK,
                Json(json!({
                    "predicted_price": price,
                    "metrics": {
                        "r2_score": round_to(report.r2_score, 4),
                        "mae": round_to(report.mae, 2),
                        "rmse": round_to(report.rmse, 2),
                        "mape": round_to(report.mape, 2),
                    },
                    "model_info": {
                        "features_used": pipeline.feature_names().len(),
                        "model_type": pipeline.model_type(),
                    },
                    "status": "success",
                })),
            )
        }
        Err(err) => {
            // Internal detail stays in the logs; clients get a stable body
            error!(error = %err, "prediction failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
        }
    }
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Endpoint not found"})),
    )
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
}
