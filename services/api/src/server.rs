use crate::cli::ServeArgs;
use crate::infra::{seed_demo_store, AppState};
use crate::routes::with_subsidy_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use employee_portal::config::AppConfig;
use employee_portal::error::AppError;
use employee_portal::telemetry;
use employee_portal::workflows::subsidy::{
    InMemorySubsidyRepository, SubsidyService, SubsidyServiceError,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemorySubsidyRepository::default());
    seed_demo_store(&repository, Local::now().date_naive()).map_err(SubsidyServiceError::from)?;
    let subsidy_service = Arc::new(SubsidyService::new(
        repository,
        config.subsidy.policy_table(),
    ));

    let app = with_subsidy_routes(subsidy_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        combined_cap = %config.subsidy.combined_cap,
        "employee portal ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
