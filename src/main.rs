use std::{net::SocketAddr, sync::Arc};

use tokio::signal;
use tracing::{error, info};

use stockroom_api as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(&cfg.log_level);

    let pool = api::db::establish_connection(&cfg).await?;
    if cfg.auto_migrate {
        if let Err(e) = api::db::run_migrations(&pool).await {
            error!("failed running migrations: {}", e);
            return Err(e.into());
        }
    }

    let db = Arc::new(pool);
    let services = api::AppServices::new(db.clone(), &cfg);
    let state = api::AppState {
        db,
        config: cfg.clone(),
        services,
    };

    let app = api::app_router(state);

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
    info!("stockroom-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
