use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use drivelog::config::{DatabaseConfig, EnvironmentConfig, StorageBackend};
use drivelog::database::DatabaseConnection;
use drivelog::repositories::Repositories;
use drivelog::services::blob_storage::LocalBlobStore;
use drivelog::{create_router, AppState};

const UPLOAD_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("drivelog=debug,tower_http=info")),
        )
        .init();

    info!("🚗 DriveLog - Fahrtenbuch API");
    info!("============================");

    let config = EnvironmentConfig::from_env()?;

    let repositories = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let db_connection = match DatabaseConnection::connect(&db_config).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };
            Repositories::postgres(db_connection.pool().clone())
        }
        StorageBackend::Memory => {
            warn!("⚠️ STORAGE_BACKEND=memory: los datos se pierden al reiniciar");
            Repositories::in_memory()
        }
    };

    let blobs = LocalBlobStore::open(&config.upload_dir).await?;
    info!("📁 Archivos en {}", config.upload_dir.display());

    let addr: SocketAddr = config.server_url().parse()?;
    let app_state = AppState::new(repositories, config, blobs);

    // Purga periódica de subidas nunca adjuntadas
    let cleanup_state = app_state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(UPLOAD_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            cleanup_state.cleanup_expired_uploads().await;
        }
    });

    let app = create_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/auth/sign-up | /api/auth/sign-in");
    info!("   GET|PUT /api/users/me");
    info!("   POST /api/companies | GET /api/companies/current[/overview] | PUT /api/companies/:id");
    info!("   GET /api/drivers | POST /api/drivers/invite | DELETE /api/drivers/:profile_id");
    info!("   /api/vehicles[/:id][/assignments] | GET /api/vehicles/assigned");
    info!("   /api/trips[/:id] | GET /api/trips/mine | /api/trips/:id/attachments");
    info!("   POST /api/uploads/url | POST /api/uploads/:ticket | /api/attachments/:id[/content]");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
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
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
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
