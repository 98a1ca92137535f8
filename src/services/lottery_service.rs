use crate::api::error::AppError;
use crate::entities::{award, lotteries, prelude::*, removeds};
use crate::services::duplicate_guard;
use crate::services::pool::NumberPool;
use crate::services::storage::PictureStore;
use chrono::{Local, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Attempts per draw when another process takes the selected number first.
const MAX_DRAW_ATTEMPTS: usize = 3;

/// A picture that passed form validation.
#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOutcome {
    pub number: i32,
    pub upload_id: i32,
    pub removed_id: i32,
}

enum Attempt {
    Drawn(DrawOutcome),
    NumberTaken(i32),
}

pub struct LotteryService {
    db: DatabaseConnection,
    pictures: Arc<dyn PictureStore>,
    pool: NumberPool,
    uploader_label: String,
    draw_lock: Mutex<()>,
}

impl LotteryService {
    pub fn new(
        db: DatabaseConnection,
        pictures: Arc<dyn PictureStore>,
        pool: NumberPool,
        uploader_label: String,
    ) -> Self {
        Self {
            db,
            pictures,
            pool,
            uploader_label,
            draw_lock: Mutex::new(()),
        }
    }

    /// Records the upload and draws a number for it.
    ///
    /// Draws are serialized in-process, and each one runs in a single
    /// transaction so the upload row, the drawn number and the mirrored file
    /// either all exist afterwards or none do. The unique index on
    /// `removeds.num` covers other processes sharing the database.
    pub async fn draw(
        &self,
        upload: PictureUpload,
        session_id: &str,
    ) -> Result<DrawOutcome, AppError> {
        let _guard = self.draw_lock.lock().await;

        for attempt in 1..=MAX_DRAW_ATTEMPTS {
            match self.try_draw(&upload, session_id).await? {
                Attempt::Drawn(outcome) => {
                    tracing::info!(
                        "🎟️  Drew {} for '{}' (session {})",
                        outcome.number,
                        upload.filename,
                        session_id
                    );
                    return Ok(outcome);
                }
                Attempt::NumberTaken(number) => {
                    tracing::warn!(
                        "Number {} was taken concurrently (attempt {}/{})",
                        number,
                        attempt,
                        MAX_DRAW_ATTEMPTS
                    );
                }
            }
        }

        Err(AppError::internal(
            "Error drawing a number",
            format!("gave up after {} concurrent conflicts", MAX_DRAW_ATTEMPTS),
        ))
    }

    async fn try_draw(&self, upload: &PictureUpload, session_id: &str) -> Result<Attempt, AppError> {
        let txn = self.db.begin().await?;

        if duplicate_guard::is_duplicate(&txn, &upload.filename)
            .await
            .map_err(|e| AppError::internal("Error checking duplicate picture", e))?
        {
            return Err(AppError::Conflict(format!(
                "Picture '{}' has already been uploaded",
                upload.filename
            )));
        }

        let used: HashSet<i32> = drawn_numbers(&txn)
            .await
            .map_err(|e| AppError::internal("Error fetching removed data", e))?
            .into_iter()
            .collect();
        let number = self.pool.select_unused(&used, &mut rand::thread_rng())?;

        let removed = match (removeds::ActiveModel {
            num: Set(number),
            session_id: Set(session_id.to_string()),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        })
        .insert(&txn)
        .await
        {
            Ok(model) => model,
            Err(e) if is_unique_violation(&e) => return Ok(Attempt::NumberTaken(number)),
            Err(e) => return Err(AppError::internal("Error inserting drawn number", e)),
        };

        let lottery = match (lotteries::ActiveModel {
            user: Set(self.uploader_label.clone()),
            date: Set(Local::now().format("%Y-%m-%d").to_string()),
            picture: Set(upload.data.clone()),
            filename: Set(upload.filename.clone()),
            removed_id: Set(removed.id),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        })
        .insert(&txn)
        .await
        {
            Ok(model) => model,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict(format!(
                    "Picture '{}' has already been uploaded",
                    upload.filename
                )));
            }
            Err(e) => {
                return Err(AppError::internal(
                    "Error inserting data into the database",
                    e,
                ));
            }
        };

        // Mirror before commit: a failed write aborts the whole draw
        if let Err(e) = self.pictures.save(&upload.filename, &upload.data).await {
            txn.rollback().await?;
            return Err(AppError::internal("Error saving file", e));
        }

        if let Err(e) = txn.commit().await {
            if let Err(cleanup) = self.pictures.remove(&upload.filename).await {
                tracing::warn!(
                    "Could not remove mirrored picture '{}' after failed commit: {}",
                    upload.filename,
                    cleanup
                );
            }
            return Err(AppError::internal("Error committing draw", e));
        }

        Ok(Attempt::Drawn(DrawOutcome {
            number,
            upload_id: lottery.id,
            removed_id: removed.id,
        }))
    }

    /// Every drawn number, in draw order.
    pub async fn removed_numbers(&self) -> Result<Vec<i32>, DbErr> {
        drawn_numbers(&self.db).await
    }

    pub async fn award_numbers(&self) -> Result<Vec<i32>, DbErr> {
        Award::find()
            .select_only()
            .column(award::Column::Num)
            .order_by_asc(award::Column::Id)
            .into_tuple::<i32>()
            .all(&self.db)
            .await
    }

    /// Numbers drawn under one caller identity, in draw order.
    pub async fn numbers_for_session(&self, session_id: &str) -> Result<Vec<i32>, DbErr> {
        Removeds::find()
            .select_only()
            .column(removeds::Column::Num)
            .filter(removeds::Column::SessionId.eq(session_id))
            .order_by_asc(removeds::Column::Id)
            .into_tuple::<i32>()
            .all(&self.db)
            .await
    }
}

async fn drawn_numbers<C>(db: &C) -> Result<Vec<i32>, DbErr>
where
    C: ConnectionTrait,
{
    Removeds::find()
        .select_only()
        .column(removeds::Column::Num)
        .order_by_asc(removeds::Column::Id)
        .into_tuple::<i32>()
        .all(db)
        .await
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
