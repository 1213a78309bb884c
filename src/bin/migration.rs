use tracing::info;

/// Standalone migration runner. Applies the embedded migrations against
/// DATABASE_URL (or APP__DATABASE_URL) and exits.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("APP__DATABASE_URL"))
        .unwrap_or_else(|_| "sqlite://plantops.db?mode=rwc".to_string());

    info!("Applying migrations against {}", database_url);

    plantops_api::migrator::run_migration(&database_url).await?;

    info!("Migration run finished");

    Ok(())
}
