use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One accepted picture upload.
///
/// The picture bytes live here; the copy under `UPLOAD_DIR` is only a mirror.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lotteries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user: String,
    /// Upload day, `YYYY-MM-DD`
    pub date: String,
    #[serde(skip_serializing)]
    pub picture: Vec<u8>,
    #[sea_orm(unique)]
    pub filename: String,
    pub removed_id: i32,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::removeds::Entity",
        from = "Column::RemovedId",
        to = "super::removeds::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Removeds,
}

impl Related<super::removeds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Removeds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
