use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use registry_core::{LetterRegistry, RegistryConfig, SchemaOutcome};

/// Main entry point for the letter registry server
///
/// Resolves configuration once, reconciles the sheet with the current field catalog and then
/// serves the REST API (action endpoint, letter resources, catalog, health and Swagger UI).
///
/// # Environment Variables
/// - `REGISTRY_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `REGISTRY_DATA_DIR`: Directory holding the sheet file (default: "registry_data")
/// - `REGISTRY_SHEET_NAME`: Sheet file stem (default: "letter_registry")
/// - `CLINIC_CODE`: Clinic code used in letter numbers (default: "KNP")
/// - `REGISTRY_DATE_LOCALE`: Long-date locale, `id` or `en` (default: "id")
///
/// # Errors
/// Returns an error if the configuration is invalid, the sheet cannot be reconciled, the
/// address cannot be bound, or the server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("letters_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("registry_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = RegistryConfig::from_env_values(
        std::env::var("REGISTRY_DATA_DIR").ok(),
        std::env::var("REGISTRY_SHEET_NAME").ok(),
        std::env::var("CLINIC_CODE").ok(),
        std::env::var("REGISTRY_DATE_LOCALE").ok(),
    )?;
    let rest_addr =
        std::env::var("REGISTRY_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let registry = LetterRegistry::open(&cfg)?;
    match registry.reconcile()? {
        SchemaOutcome::Unchanged => {}
        outcome => tracing::info!("sheet {}: {:?}", cfg.sheet().path().display(), outcome),
    }

    tracing::info!(
        "++ Starting letter registry for clinic {} on {}",
        cfg.clinic_code(),
        rest_addr
    );

    let app = api_rest::router(AppState::new(Arc::new(registry)));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
