use std::sync::Arc;

use tutor_intake::config::ServiceConfig;
use tutor_intake::server;
use tutor_intake::store::{LibSqlBackend, SettingsStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env().inspect_err(|e| {
        tracing::error!("Refusing to start: {}", e);
    })?;

    eprintln!("Tutor Intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);
    eprintln!("   Form endpoint: {}", config.form_endpoint);
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!(
        "   Session idle timeout: {}s",
        config.session_idle_timeout.as_secs()
    );

    let store: Arc<dyn SettingsStore> = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);

    let app = server::build(&config, store);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Intake server started");
    axum::serve(listener, app).await?;

    Ok(())
}
