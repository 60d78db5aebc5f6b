//! Prediction service entry point.
//!
//! Usage: `homeprice-server [artifacts-dir] [bind-addr]`
//!
//! Loads the artifact bundle once before binding; a missing, corrupt or
//! inconsistent bundle aborts startup rather than serving with partially
//! loaded state. The loaded pipeline is immutable and shared across
//! requests; swapping in a retrained bundle means restarting or replacing
//! the whole handle, never mutating it mid-request.

mod routes;

use homeprice::artifacts::ArtifactBundle;
use homeprice::pipeline::PricePipeline;
use std::env;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut args = env::args().skip(1);
    let artifacts_dir = args.next().unwrap_or_else(|| "artifacts".to_string());
    let bind_addr = args.next().unwrap_or_else(|| "0.0.0.0:5000".to_string());

    let bundle = match ArtifactBundle::load(Path::new(&artifacts_dir)) {
        Ok(bundle) => bundle,
        Err(err) => {
            error!(error = %err, dir = %artifacts_dir, "refusing to start without a consistent artifact bundle");
            return Err(err.into());
        }
    };

    info!(
        model_type = %bundle.metadata.model_type,
        features = bundle.metadata.feature_names.len(),
        r2_score = bundle.report.r2_score,
        "model and assets loaded"
    );

    let pipeline = Arc::new(PricePipeline::from_bundle(bundle));
    let app = routes::router(pipeline);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    println!("House Price Prediction API listening on http://{}", bind_addr);
    println!("Endpoints:");
    println!("  GET  /          - Health and model metrics");
    println!("  GET  /features  - Canonical feature list");
    println!("  POST /predict   - Price prediction");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}
