use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use event_transport::build_app;
use event_transport::config::{DataBackend, DatabaseConfig, EnvironmentConfig};
use event_transport::database::{create_pool, run_migrations};
use event_transport::repositories::{InMemoryTransportStore, PgTransportStore, TransportStore};
use event_transport::services::notification_service::{
    HttpEmailNotifier, LogNotifier, RouteNotifier,
};
use event_transport::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚐 Event Transport - Asignación y rutas");
    info!("======================================");
    if config.is_development() {
        info!("🛠️ Modo desarrollo");
    }

    let store: Arc<dyn TransportStore> = match config.data_backend {
        DataBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = match create_pool(&db_config).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {:#}", e);
                    return Err(e);
                }
            };
            if config.run_migrations {
                run_migrations(&pool).await?;
            }
            info!("✅ Base de datos conectada");
            Arc::new(PgTransportStore::new(pool))
        }
        DataBackend::Memory => {
            warn!("🧪 Usando almacén en memoria (los datos no se persisten)");
            match &config.seed_file {
                Some(path) => Arc::new(InMemoryTransportStore::from_seed_file(path)?),
                None => Arc::new(InMemoryTransportStore::new()),
            }
        }
    };

    let notifier: Arc<dyn RouteNotifier> = match &config.email {
        Some(email) => {
            info!("✉️ Envío de rutas por {}", email.api_url);
            Arc::new(HttpEmailNotifier::new(email.clone())?)
        }
        None => {
            warn!("✉️ EMAIL_API_URL no configurado: las rutas solo se registran en el log");
            Arc::new(LogNotifier)
        }
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let app = build_app(AppState::new(config, store, notifier));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/transport/auto-assign");
    info!("   POST /api/transport/generate-routes");
    info!("   POST /api/transport/reset");
    info!("   POST /api/transport/send-routes");
    info!("   GET  /api/transport/routes/:event_id");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el manejador de Ctrl+C: {}", e);
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
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
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
