use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "bilancio={level},ledger={level},server={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect_database(&settings.database).await?;
    let ledger = ledger::Ledger::builder().database(db.clone()).build().await?;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    server::run_with_listener(ledger, db, listener).await?;

    Ok(())
}

/// Connects and migrates the configured database.
///
/// `":memory:"` selects an in-memory sqlite database; anything else is
/// treated as a file path and created on first use.
async fn connect_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config.url.as_str() {
        ":memory:" => String::from("sqlite::memory:"),
        path => format!("sqlite:{path}?mode=rwc"),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("Database ready at {}", config.url);
    Ok(database)
}
