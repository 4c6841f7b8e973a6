pub mod clients;
pub mod control;
pub mod envelope;
pub mod health;
pub mod notifications;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(control::post_message)
            .service(control::dispatch_event)
            .service(
                web::scope("/clients")
                    .service(clients::register_client)
                    .service(clients::list_clients)
                    .service(clients::unregister_client),
            )
            .service(web::scope("/notifications").service(notifications::list_displayed))
            .route("/health", web::get().to(health::health_check)),
    );
}
