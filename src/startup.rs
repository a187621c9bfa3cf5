use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::aggregation::AggregationService;
use crate::config::Settings;
use crate::routes::{
    handle_create_subscription, handle_delete_subscription, handle_list_subscriptions,
    handle_read_subscription, handle_total_cost, handle_update_subscription, health_check,
    json_error_handler, path_error_handler, query_error_handler, ApiDoc,
};
use crate::storage::{PostgresSubscriptionStore, SubscriptionStore};

pub struct Application {
    port: u16,
    server: Server,
    store: Arc<dyn SubscriptionStore>,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let store = Arc::new(PostgresSubscriptionStore::connect_lazy(&config.database));

        Self::build_with_store(config, store).await
    }

    /// Builds the application on top of an already constructed store.
    pub async fn build_with_store(
        config: Settings,
        store: Arc<dyn SubscriptionStore>,
    ) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let service = AggregationService::new(store.clone());
        let server = run(listener, service)?;

        tracing::info!("Server listening on {}:{}", config.application.host, port);

        Ok(Self {
            port,
            server,
            store,
        })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    /// Serves requests until the server stops (SIGINT/SIGTERM trigger a graceful stop), then
    /// releases the store.
    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        let result = self.server.await;

        tracing::info!("Server stopped, closing the subscriptions store");
        self.store.close().await;

        result
    }
}

pub fn run(listener: TcpListener, service: AggregationService) -> Result<Server, std::io::Error> {
    let service = web::Data::new(service);
    let api_doc = ApiDoc::openapi();

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .route("/health_check", web::get().to(health_check))
            // Must stay ahead of the /api/v1 scope, which matches every path under its prefix
            .service(
                SwaggerUi::new("/api/v1/docs/{_:.*}")
                    .url("/api/v1/openapi.json", api_doc.clone()),
            )
            .service(
                web::scope("/api/v1")
                    .route("/subscription", web::post().to(handle_create_subscription))
                    .route(
                        "/subscription/update",
                        web::put().to(handle_update_subscription),
                    )
                    .route(
                        "/subscription/delete/{id}",
                        web::delete().to(handle_delete_subscription),
                    )
                    .route("/subscription/{id}", web::get().to(handle_read_subscription))
                    .route("/subscriptions", web::get().to(handle_list_subscriptions))
                    .route("/subscriptions/cost", web::get().to(handle_total_cost)),
            )
            .app_data(service.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
