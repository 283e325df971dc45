use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;
use chrono::Local;

use hrleave::database::{init_database, repositories::UserRepository};
use hrleave::middleware::RequestId;
use hrleave::services::{BalanceService, LogNotifier, UserContextService, UserLocks};
use hrleave::{AppState, Config, routes};

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

/// Runs the monthly accrual on every tick; repeated runs within a month are
/// no-ops, so the interval only bounds how late in the month credits land.
fn spawn_accrual_task(balance_service: BalanceService, locks: UserLocks, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            locks.prune();
            if let Err(error) = balance_service
                .run_monthly_accrual(Local::now().date_naive())
                .await
            {
                log::error!("Monthly accrual failed: {}", error);
            }
        }
    });
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    log::info!(
        "Starting hrleave API (environment: {})",
        config.environment
    );

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let app_state = web::Data::new(AppState::new(
        pool.clone(),
        &config,
        Arc::new(LogNotifier),
    ));
    let user_context_service =
        web::Data::new(UserContextService::new(UserRepository::new(pool.clone())));
    let config_data = web::Data::new(config.clone());

    spawn_accrual_task(
        app_state.balance_service.clone(),
        app_state.locks.clone(),
        Duration::from_secs(config.accrual_check_interval_secs.max(60)),
    );

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(user_context_service.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(health)
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await?;

    Ok(())
}
