use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{
    web,
    App,
    HttpServer,
};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_actix_web::TracingLogger;

use crate::app::configuration::{
    DatabaseSettings,
    Settings,
};
use crate::app::seed_admin;
use crate::routes::*;
use crate::store::{
    PostgresStore,
    Store,
};

pub struct NewsletterApp {
    pub server: Server,
    pub port: u16,
}

impl NewsletterApp {
    /// Connect to the database, apply the migrations, seed the administrator
    /// and bind the server. The returned server is not running yet.
    pub async fn from(configuration: Settings) -> Result<NewsletterApp, anyhow::Error> {
        let tcp_listener = TcpListener::bind(configuration.application.binding_address())
            .context("Failed to bind the application address")?;
        let port = tcp_listener.local_addr()?.port();

        let postgres_pool = NewsletterApp::postgres_pool(&configuration.database);
        sqlx::migrate!("./migrations")
            .run(&postgres_pool)
            .await
            .context("Failed to migrate the database")?;

        let store: Arc<dyn Store> = Arc::new(PostgresStore::new(postgres_pool));
        seed_admin(store.as_ref(), &configuration.admin).await?;
        let store = web::Data::from(store);

        // HttpServer handles all transport level concerns
        let server = HttpServer::new(move || {
            App::new()
                .wrap(TracingLogger::default())
                .app_data(web::JsonConfig::default().error_handler(|err, _| {
                    RouteError::InvalidRequest {
                        message: err.to_string(),
                    }
                    .into()
                }))
                .app_data(web::QueryConfig::default().error_handler(|err, _| {
                    RouteError::InvalidRequest {
                        message: err.to_string(),
                    }
                    .into()
                }))
                .app_data(web::PathConfig::default().error_handler(|err, _| {
                    RouteError::InvalidRequest {
                        message: err.to_string(),
                    }
                    .into()
                }))
                .app_data(store.clone())
                .route("/health_check", web::get().to(health_check))
                .service(
                    web::scope("/users")
                        .route("", web::get().to(users::list_users))
                        .route("", web::post().to(users::create_user))
                        .route("/{id}", web::get().to(users::get_user))
                        .route("/{id}", web::put().to(users::update_user))
                        .route("/{id}", web::delete().to(users::delete_user)),
                )
                .service(
                    web::scope("/subscribers")
                        .route("", web::get().to(subscribers::list_subscribers))
                        .route("", web::post().to(subscribers::create_subscriber))
                        .route("/my", web::get().to(subscribers::my_subscribers))
                        .route(
                            "/email/{email}",
                            web::get().to(subscribers::get_subscriber_by_email),
                        )
                        .route(
                            "/email/{email}",
                            web::delete().to(subscribers::delete_subscriber_by_email),
                        )
                        .route("/{id}", web::get().to(subscribers::get_subscriber))
                        .route("/{id}", web::put().to(subscribers::update_subscriber))
                        .route("/{id}", web::delete().to(subscribers::delete_subscriber)),
                )
                .service(
                    web::scope("/subscriber-lists")
                        .route("", web::get().to(subscriber_lists::list_lists))
                        .route("", web::post().to(subscriber_lists::create_list))
                        .route("/my", web::get().to(subscriber_lists::my_lists))
                        .route("/my", web::post().to(subscriber_lists::create_my_list))
                        .route("/my/{id}", web::get().to(subscriber_lists::get_my_list))
                        .route("/my/{id}", web::put().to(subscriber_lists::update_my_list))
                        .route(
                            "/my/{id}",
                            web::delete().to(subscriber_lists::delete_my_list),
                        )
                        .route("/{id}", web::get().to(subscriber_lists::get_list))
                        .route("/{id}", web::put().to(subscriber_lists::update_list))
                        .route("/{id}", web::delete().to(subscriber_lists::delete_list)),
                )
                .service(
                    web::scope("/subscriber-entries")
                        .route("", web::get().to(subscriber_entries::list_entries))
                        .route("", web::post().to(subscriber_entries::create_entry))
                        .route(
                            "/assign",
                            web::post().to(subscriber_entries::assign_subscriber),
                        )
                        .route("/my", web::get().to(subscriber_entries::my_entries))
                        .route(
                            "/my/assign",
                            web::post().to(subscriber_entries::assign_subscriber_to_my_list),
                        )
                        .route(
                            "/my/{id}",
                            web::delete().to(subscriber_entries::delete_my_entry),
                        )
                        .route("/{id}", web::get().to(subscriber_entries::get_entry))
                        .route("/{id}", web::put().to(subscriber_entries::update_entry))
                        .route(
                            "/{id}",
                            web::delete().to(subscriber_entries::delete_entry),
                        ),
                )
        })
        .backlog(configuration.application.max_pending_connections)
        .listen(tcp_listener)?
        .run();
        Ok(NewsletterApp { port, server })
    }

    /// The pool connects lazily: the first query waits up to
    /// `connect_timeout_seconds` for a connection.
    pub fn postgres_pool(database_config: &DatabaseSettings) -> PgPool {
        PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(
                database_config.connect_timeout_seconds,
            ))
            .max_connections(database_config.max_db_connections)
            .connect_lazy_with(database_config.database_connection_options())
    }
}
