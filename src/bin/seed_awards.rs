use clap::Parser;
use dotenvy::dotenv;
use lottery_backend::config::LotteryConfig;
use lottery_backend::entities::{award, prelude::*};
use lottery_backend::infrastructure::database;
use lottery_backend::services::pool::NumberPool;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loads the winning numbers into the award table.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Award number to add (repeatable)
    #[arg(short, long = "num", required_unless_present = "clear")]
    nums: Vec<i32>,

    /// Delete all existing award numbers first
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_awards=info,lottery_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = LotteryConfig::from_env();
    config.validate()?;
    let pool = NumberPool::new(config.pool_min, config.pool_max)?;

    info!("🏆 Seeding award numbers...");
    let db = database::setup_database(&config).await?;

    if args.clear {
        let res = Award::delete_many().exec(&db).await?;
        info!("🧹 Removed {} existing award numbers", res.rows_affected);
    }

    let mut inserted = 0;
    for num in args.nums {
        if !pool.contains(num) {
            warn!(
                "Skipping {}: outside the draw pool {}..={}",
                num, config.pool_min, config.pool_max
            );
            continue;
        }

        let exists = Award::find()
            .filter(award::Column::Num.eq(num))
            .one(&db)
            .await?;
        if exists.is_some() {
            info!("   - {} already present", num);
            continue;
        }

        award::ActiveModel {
            num: Set(num),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        inserted += 1;
        info!("   - Added {}", num);
    }

    info!("✅ Inserted {} award numbers", inserted);
    Ok(())
}
