use actix_web::{App, HttpServer, middleware, web};

use attendance::auth::rate_limit::LoginLimiter;
use attendance::backend::BackendClient;
use attendance::config::Config;
use attendance::models::RecordStore;
use attendance::{handlers, scheduler};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let backend = BackendClient::from_config(&config).map_err(std::io::Error::other)?;
    let store = RecordStore::new();
    let clock = config.clock();
    let limiter = LoginLimiter::default();
    let secret_key = attendance::session_key(config.session_key.as_deref());

    log::info!(
        "Service days: {}",
        config
            .calendar
            .days()
            .iter()
            .map(|d| format!("{} {}", d.weekday, d.start_time))
            .collect::<Vec<_>>()
            .join(", ")
    );

    if let Some(every) = config.refresh_interval {
        log::info!("Refreshing records every {}s", every.as_secs());
        scheduler::spawn_refresh(backend.clone(), store.clone(), clock, every);
    }

    let bind_addr = config.bind_addr.clone();
    log::info!("Starting server at http://{bind_addr}");

    let config = web::Data::new(config);
    let backend = web::Data::new(backend);
    let store = web::Data::new(store);
    let clock = web::Data::new(clock);
    let limiter = web::Data::new(limiter);

    HttpServer::new(move || {
        App::new()
            .wrap(attendance::session_middleware(secret_key.clone()))
            .wrap(middleware::Logger::default())
            .app_data(config.clone())
            .app_data(backend.clone())
            .app_data(store.clone())
            .app_data(clock.clone())
            .app_data(limiter.clone())
            .configure(attendance::configure)
            .default_service(web::to(handlers::not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}
