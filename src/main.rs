use std::str::FromStr;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

use hairhub_backend::config::AppConfig;
use hairhub_backend::handlers;
use hairhub_backend::openapi_config::{configure_openapi, ApiDoc};
use hairhub_backend::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Initialize database
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database ready at {}", config.database_url);

    let state = AppState::new(pool, &config);
    state.scheduler.start().await;

    // Build the OpenAPI document once, outside the factory closure
    let openapi_spec = configure_openapi(ApiDoc::openapi());
    let cors_origin = config.cors_origin.clone();

    tracing::info!("HairHub API listening on http://{}", config.bind_address);
    tracing::info!("API documentation: http://{}/swagger-ui/", config.bind_address);

    let server_state = state.clone();
    HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header()
                .supports_credentials(),
            None => Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header(),
        };

        App::new()
            .configure(|cfg| server_state.configure(cfg))
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                utoipa_swagger_ui::SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi_spec.clone()),
            )
            .configure(handlers::configure_routes)
    })
    .bind(config.bind_address)?
    .run()
    .await?;

    state.scheduler.stop().await;
    Ok(())
}
