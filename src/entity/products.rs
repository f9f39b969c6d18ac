use sea_orm::entity::prelude::*;

use super::json::StringList;
use crate::domain::review::Reviews;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub images: StringList,
    pub description: String,
    pub category_id: Uuid,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    #[sea_orm(column_type = "Double", nullable)]
    pub discount_price: Option<f64>,
    pub count_in_stock: i32,
    pub fabric: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub sizes: StringList,
    #[sea_orm(column_type = "Double")]
    pub delivery_charges: f64,
    pub is_featured: bool,
    pub is_trending: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub reviews: Reviews,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    pub num_reviews: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
