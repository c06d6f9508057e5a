//! Courier server entry point.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use courier::domain::ports::MailNotifier;
use courier::inbound::http::health::HealthState;
use courier::inbound::http::session_config::{BuildMode, session_settings_from_env};
use courier::outbound::notify::{LoggingMailNotifier, ResendMailNotifier};
use courier::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use courier::server::{ServerConfig, create_server};
use courier::settings::CourierSettings;

fn build_notifier(settings: &CourierSettings) -> Result<Arc<dyn MailNotifier>> {
    let Some(api_key) = settings.notify_api_key() else {
        warn!("COURIER_NOTIFY_API_KEY not set; notifications will only be logged");
        return Ok(Arc::new(LoggingMailNotifier));
    };
    let notifier = ResendMailNotifier::new(
        settings.notify_endpoint()?,
        api_key,
        settings.notify_timeout(),
    )
    .wrap_err("failed to build notifier http client")?;
    Ok(Arc::new(notifier))
}

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = CourierSettings::load().wrap_err("failed to load configuration")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::current())
        .wrap_err("invalid session configuration")?;

    let mut config = ServerConfig::new(session, settings.bind_addr()?)
        .with_delivery(settings.delivery())
        .with_reset(settings.reset()?)
        .with_notifier(build_notifier(&settings)?);

    match settings.database_url() {
        Some(url) => {
            run_migrations(url).await.wrap_err("database migrations failed")?;
            let pool = DbPool::new(
                PoolConfig::new(url).with_max_size(settings.db_pool_max_size()),
            )
            .await
            .wrap_err("failed to build database pool")?;
            config = config.with_db_pool(pool);
        }
        None => {
            info!("COURIER_DATABASE_URL not set; serving fixture data only");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await?;
    Ok(())
}
