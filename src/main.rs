use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use medscan::auth::{AccessGate, StaticCredentials};
use medscan::classifier::ModelRegistry;
use medscan::config::Settings;
use medscan::handlers;
use medscan::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "medscan", about = "Medical image classification service")]
struct Cli {
    /// Extra configuration file layered over config/default.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.to_lowercase())),
        )
        .with_target(false)
        .init();

    info!("Settings loaded");
    if settings.has_weak_credentials() {
        warn!("Login username and password are identical; set MEDSCAN__AUTH__PASSWORD");
    }

    let registry = match ModelRegistry::load(&settings.models) {
        Ok(registry) => registry,
        Err(e) => {
            error!("Error loading the model: {}", e);
            return Err(e.into());
        }
    };

    let gate = AccessGate::new(Arc::new(StaticCredentials::from(&settings.auth)));
    let state = web::Data::new(AppState::new(
        registry,
        gate,
        settings.server.max_upload_bytes(),
    ));

    let host = settings.server.host.clone();
    let port = settings.server.port;
    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
