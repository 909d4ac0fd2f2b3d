use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use generator_rental::clients::fleetop::{FleetopClient, IgnitionSource};
use generator_rental::config::{DatabaseConfig, EnvironmentConfig};
use generator_rental::services::runtime_sync_service::spawn_runtime_poller;
use generator_rental::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("⚡ Generator Rental - API de reservas");
    info!("====================================");

    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;
    info!("🔧 Entorno: {}", config.environment);

    // Inicializar base de datos
    let database = DatabaseConfig::new(config.database_url.clone());
    let pool = database
        .create_pool()
        .await
        .context("Error conectando a la base de datos")?;
    DatabaseConfig::run_migrations(&pool)
        .await
        .context("Error aplicando migraciones")?;
    info!("✅ Base de datos lista");

    let fleetop = Arc::new(
        FleetopClient::new(config.fleetop.clone()).context("Error creando cliente Fleetop")?,
    );

    // Poller de horas de motor
    let poller = if config.fleetop.poll_enabled {
        let source: Arc<dyn IgnitionSource> = fleetop.clone();
        Some(spawn_runtime_poller(
            pool.clone(),
            source,
            config.fleetop.poll_interval,
            config.fleetop.utc_offset,
        ))
    } else {
        warn!("⏸️ Poller Fleetop deshabilitado (FLEETOP_POLL_ENABLED=false)");
        None
    };

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Dirección inválida: {}", config.server_url()))?;

    let state = AppState::new(pool, config, fleetop);
    let app = create_router(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/auth/register | /api/auth/login, GET /api/auth/me");
    info!("   POST /api/pricing/estimate | /api/pricing/cart");
    info!("   POST /api/bookings | /api/bookings/checkout, GET /api/bookings/mine");
    info!("   PUT  /api/bookings/:id/status | /api/bookings/:id/assignment");
    info!("   POST /api/driver/bookings/:id/lines/:index/(start|pause|resume|end)");
    info!("   CRUD /api/generators | /api/vehicles | /api/addons, /api/users");
    info!("   POST /api/fleetop/token | /api/fleetop/ignition-summary | /api/fleetop/hours");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
    }

    if let Some(handle) = poller {
        handle.abort();
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
