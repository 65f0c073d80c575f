use std::{future::IntoFuture, net::SocketAddr, process, sync::Arc, time::Duration};

use apartments::{
    application::{
        apartments::ApartmentService,
        error::AppError,
        repos::{ApartmentsRepo, ApartmentsWriteRepo, HealthProbe},
        seed,
    },
    cache::{ApartmentCache, CacheConfig, spawn_sweeper},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiRateLimiter, ApiState, HttpOptions, RouterState, ServiceInfo},
        telemetry,
    },
};
use tokio::sync::watch;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Seed(args) => run_seed(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let cache = Arc::new(ApartmentCache::from_config(CacheConfig::from(&settings.cache)));
    let service = Arc::new(build_service(&repositories, cache.clone()));

    let sweeper = cache
        .is_enabled()
        .then(|| spawn_sweeper(cache.clone(), cache.config().sweep_interval()));

    let rate_limiter = Arc::new(ApiRateLimiter::new(
        Duration::from_secs(u64::from(settings.rate_limit.window_seconds.get())),
        settings.rate_limit.max_requests.get(),
    ));
    let pruner = spawn_rate_limit_pruner(rate_limiter.clone());

    let health: Arc<dyn HealthProbe> = repositories.clone();
    let router_state = RouterState {
        api: ApiState {
            apartments: service,
            rate_limiter,
        },
        health,
        info: ServiceInfo::new(settings.server.environment.clone()),
    };

    let result = serve_http(&settings, router_state).await;

    pruner.abort();
    let _ = pruner.await;
    if let Some(handle) = sweeper {
        handle.abort();
        let _ = handle.await;
    }
    cache.clear();
    info!(target = "apartments::server", "Shutdown complete");

    result
}

async fn run_seed(settings: config::Settings, args: config::SeedArgs) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let cache = Arc::new(ApartmentCache::from_config(CacheConfig::from(&settings.cache)));
    let service = build_service(&repositories, cache);

    info!(
        target = "apartments::seed",
        path = %args.file.display(),
        "Starting seed"
    );
    let report = seed::seed_from_path(&service, &args.file).await?;
    info!(
        target = "apartments::seed",
        created = report.created,
        skipped = report.skipped,
        "Seed completed"
    );
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_service(
    repositories: &Arc<PostgresRepositories>,
    cache: Arc<ApartmentCache>,
) -> ApartmentService {
    let reader: Arc<dyn ApartmentsRepo> = repositories.clone();
    let writer: Arc<dyn ApartmentsWriteRepo> = repositories.clone();
    ApartmentService::new(reader, writer, cache)
}

fn spawn_rate_limit_pruner(limiter: Arc<ApiRateLimiter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            limiter.prune();
        }
    })
}

async fn serve_http(settings: &config::Settings, router_state: RouterState) -> Result<(), AppError> {
    let router = http::build_router(router_state, &HttpOptions::from(&settings.server));

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "apartments::server",
        addr = %settings.server.addr,
        "Listening"
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        result = server.into_future() => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = async {
            let _ = shutdown_rx.changed().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(
                target = "apartments::server",
                grace_secs = grace.as_secs(),
                "Graceful shutdown timed out; dropping open connections"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(target = "apartments::server", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(target = "apartments::server", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(target = "apartments::server", "Shutdown signal received");
}
