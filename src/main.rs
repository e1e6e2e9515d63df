use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;
use oz_backend::configuration::{get_configuration, DatabaseSettings, StorageBackend};
use oz_backend::repository::{
    InMemoryProductRepository, InMemoryUserRepository, PgProductRepository, PgUserRepository,
    ProductRepository, UserRepository,
};
use oz_backend::startup::{run, AppState};
use oz_backend::telemetry::init_telemetry;

type Repositories = (Arc<dyn UserRepository>, Arc<dyn ProductRepository>);

async fn connect_postgres(database: &DatabaseSettings) -> std::io::Result<Repositories> {
    tracing::info!(host = %database.host, database = %database.database_name, "Connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Database connection error")
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, "Database migration error")
        })?;

    tracing::info!("Database connection pool created successfully");
    Ok((
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgProductRepository::new(pool)),
    ))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    init_telemetry(&configuration.log);
    tracing::info!("Configuration loaded successfully");

    let (users, products): Repositories = match configuration.application.storage {
        StorageBackend::Postgres => connect_postgres(&configuration.database).await?,
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryProductRepository::new()),
            )
        }
    };

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(
        listener,
        AppState {
            users,
            products,
            jwt: configuration.jwt,
        },
    )?;

    server.await
}
