use crate::entities::{lotteries, prelude::*};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};

/// True iff an upload with exactly this filename is already stored.
///
/// A missing row is `Ok(false)`; only real storage failures are errors.
pub async fn is_duplicate<C>(db: &C, filename: &str) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    let count = Lotteries::find()
        .filter(lotteries::Column::Filename.eq(filename))
        .count(db)
        .await?;

    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::removeds;
    use crate::infrastructure::database::test_database;
    use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};

    #[tokio::test]
    async fn test_detects_existing_filename() {
        let db = test_database().await;

        assert!(!is_duplicate(&db, "cat.png").await.unwrap());

        let removed = removeds::ActiveModel {
            num: Set(7),
            session_id: Set("127.0.0.1".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        lotteries::ActiveModel {
            user: Set("SomeUser".to_string()),
            date: Set("2024-01-01".to_string()),
            picture: Set(b"png".to_vec()),
            filename: Set("cat.png".to_string()),
            removed_id: Set(removed.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        assert!(is_duplicate(&db, "cat.png").await.unwrap());
        assert!(!is_duplicate(&db, "Cat.png").await.unwrap());
        assert!(!is_duplicate(&db, "dog.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_storage_failure_is_an_error() {
        // No migrations: the table does not exist
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();
        assert!(is_duplicate(&db, "cat.png").await.is_err());
    }
}
