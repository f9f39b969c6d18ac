use vastra_store_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;

    let applied = run_migrations(&orm).await?;
    if applied.is_empty() {
        println!("No migrations found");
    }
    for (version, description) in applied {
        println!("Migration {version} in place: {description}");
    }
    Ok(())
}
