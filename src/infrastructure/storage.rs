use crate::config::LotteryConfig;
use crate::services::storage::{LocalPictureStore, NoOpPictureStore, PictureStore};
use std::sync::Arc;
use tracing::info;

pub async fn setup_picture_store(config: &LotteryConfig) -> anyhow::Result<Arc<dyn PictureStore>> {
    if !config.mirror_uploads {
        info!("🗂️  Picture mirror disabled, database is the only copy");
        return Ok(Arc::new(NoOpPictureStore));
    }

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("🗂️  Picture mirror: {}", config.upload_dir.display());

    Ok(Arc::new(LocalPictureStore::new(config.upload_dir.clone())))
}
