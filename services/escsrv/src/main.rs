//! Escalation Service (EscSrv)
//!
//! Receives alerts, walks the configured contact roster one call at a
//! time, and stops as soon as somebody answers.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use escsrv::app_state::AppState;
use escsrv::bootstrap::{determine_bind_address, initialize_logging, load_config, Args};
use escsrv::config::Config;
use escsrv::engine::{HttpCallNotifier, HttpStatusPoller};
use escsrv::error::Result;
use escsrv::routes::create_routes;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.validate {
        print_validation_summary(&config);
        return Ok(());
    }

    initialize_logging(&args, &config)?;
    info!("Starting Escalation Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Roster: {} contact(s), poll interval {}s",
        config.escalation.contacts.len(),
        config.escalation.poll_interval_seconds
    );

    let notifier = Arc::new(HttpCallNotifier::new(config.provider.clone())?);
    let poller = Arc::new(HttpStatusPoller::new(config.provider.clone())?);
    let bind_address = determine_bind_address(&args, &config);
    let state = Arc::new(AppState::new(config, notifier, poller));

    let app = create_routes(Arc::clone(&state));

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;
        app.merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", escsrv::routes::EscsrvApiDoc::openapi()),
        )
    };

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Escalation Service listening on http://{}", bind_address);
    #[cfg(feature = "swagger-ui")]
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    let shutdown_state = Arc::clone(&state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let signal = common::shutdown::wait_for_shutdown().await;
            info!("Received {}, shutting down", signal);
            // Cancel while the runtime still drains, so runs can observe
            // their tokens and write a terminal outcome
            shutdown_state.cancel_all();
        })
        .await?;

    info!("Escalation Service stopped");
    Ok(())
}

fn print_validation_summary(config: &Config) {
    println!("=== EscSrv Configuration Check ===");
    println!("Service:        {}", config.service.name);
    println!("API address:    {}:{}", config.api.host, config.api.port);
    println!("Log level:      {}", config.log.level);
    println!("Provider:       {}", config.provider.base_url);
    println!("Content base:   {}", config.provider.content_base_url);
    println!(
        "Poll interval:  {}s (collaborator timeout {}s)",
        config.escalation.poll_interval_seconds, config.escalation.collaborator_timeout_seconds
    );
    println!("Contacts:       {}", config.escalation.contacts.len());
    for (i, contact) in config.escalation.contacts.iter().enumerate() {
        println!(
            "  {}. {} ({}s wait)",
            i + 1,
            contact.name,
            contact.wait_seconds
        );
    }
    println!("Configuration OK");
}
