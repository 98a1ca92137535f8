use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A number taken out of the pool. `num` is unique across the table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "removeds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub num: i32,
    pub session_id: String,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lotteries::Entity")]
    Lotteries,
}

impl Related<super::lotteries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lotteries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
