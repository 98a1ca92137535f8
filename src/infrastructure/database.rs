use crate::config::LotteryConfig;
use crate::entities::{award, lotteries, removeds};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::info;

pub async fn setup_database(config: &LotteryConfig) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", config.database_url);

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    // Order matters for foreign keys: Removeds -> Lotteries
    let stmts = vec![
        (
            "removeds",
            schema
                .create_table_from_entity(removeds::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "lotteries",
            schema
                .create_table_from_entity(lotteries::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "award",
            schema
                .create_table_from_entity(award::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        let stmt = builder.build(&stmt);
        db.execute(stmt).await.map_err(|e| {
            tracing::error!("   - Failed to create table '{}': {}", name, e);
            e
        })?;
        info!("   - Table '{}' checked/created", name);
    }

    // Older databases were created without the unique constraints. Those two
    // indexes back the draw invariants, so failing to build them stops startup.
    let index_updates = [
        (
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_removeds_num ON removeds(num)",
            true,
        ),
        (
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_lotteries_filename ON lotteries(filename)",
            true,
        ),
        (
            "CREATE INDEX IF NOT EXISTS idx_removeds_session_id ON removeds(session_id)",
            false,
        ),
    ];

    let is_mysql = builder == sea_orm::DatabaseBackend::MySql;

    for (query, required) in index_updates {
        // MySQL has no CREATE INDEX IF NOT EXISTS
        let final_query = if is_mysql {
            query.replace(" IF NOT EXISTS", "")
        } else {
            query.to_owned()
        };

        match db
            .execute(sea_orm::Statement::from_string(builder, final_query.clone()))
            .await
        {
            Ok(_) => info!("   - Executed schema update: {}", final_query),
            Err(e) => {
                let err_msg = e.to_string().to_lowercase();
                if err_msg.contains("duplicate key name") || err_msg.contains("already exists") {
                    info!("   - Index already present (skipped): {}", final_query);
                } else if required {
                    tracing::error!("   - Schema update failed: {} -> {}", final_query, e);
                    return Err(anyhow::anyhow!(
                        "could not create required index ({}): {}",
                        final_query,
                        e
                    ));
                } else {
                    tracing::warn!("   - Schema update warning: {} -> {}", final_query, e);
                }
            }
        }
    }

    Ok(())
}

/// Migrated in-memory SQLite database on a single connection.
#[cfg(test)]
pub(crate) async fn test_database() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    run_migrations(&db).await.unwrap();
    db
}
