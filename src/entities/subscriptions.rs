use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A billing record: a named service owned by a user, priced per month,
/// active over an inclusive month range (open-ended when `end_date` is NULL).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
