mod config;
mod error;
mod handlers;
mod models;
mod services;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Utc;
use dotenv::dotenv;
use std::sync::Arc;

use services::{
    background::BackgroundService,
    clients::ClientTable,
    cursor::DedupCursor,
    fetcher::HttpNotificationFetcher,
    presenter::NotificationPresenter,
    scheduler::{BackgroundScheduler, CycleRunner},
    surface::DisplayedNotifications,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = config::Config::from_env()?;

    let fetcher = HttpNotificationFetcher::new(config.api.clone())?;
    let surface = DisplayedNotifications::new();
    let clients = ClientTable::new();
    let presenter = NotificationPresenter::new(config.presenter.clone());

    // Only share requests created after this process started are surfaced.
    let runner = Arc::new(CycleRunner::new(
        Arc::new(fetcher),
        Arc::new(surface.clone()),
        presenter.clone(),
        DedupCursor::starting_at(Utc::now()),
    ));
    let scheduler = BackgroundScheduler::new(runner, config.scheduler.poll_interval());

    let (service, service_task) = BackgroundService::new(
        scheduler,
        presenter,
        Arc::new(surface.clone()),
        Arc::new(clients.clone()),
        config.app_root.clone(),
    )
    .spawn(config.channel_capacity);

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!(
        "SpaceBSA notification service listening on {} (polling {} every {}s)",
        bind_address,
        config.api.base_url,
        config.scheduler.poll_interval_secs
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(web::Data::new(service.clone()))
            .app_data(web::Data::new(clients.clone()))
            .app_data(web::Data::new(surface.clone()))
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    // The server held the last handles; the service loop drains and stops.
    if let Err(e) = service_task.await {
        log::error!("Background service task ended abnormally: {}", e);
    }
    Ok(())
}
