use sea_orm::{ActiveValue::Set, entity::prelude::*};

use crate::domain::order::{
    CourierDetails, OrderLines, OrderStatus, PostDeliveryRequest, ShippingAddress,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub order_items: OrderLines,
    #[sea_orm(column_type = "JsonBinary")]
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    #[sea_orm(column_type = "Double")]
    pub items_price: f64,
    #[sea_orm(column_type = "Double")]
    pub shipping_price: f64,
    #[sea_orm(column_type = "Double")]
    pub total_price: f64,
    pub is_paid: bool,
    pub paid_at: Option<DateTimeWithTimeZone>,
    pub status: OrderStatus,
    pub shipped_at: Option<DateTimeWithTimeZone>,
    pub delivered_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub courier_details: Option<CourierDetails>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub return_request: Option<PostDeliveryRequest>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub replacement_request: Option<PostDeliveryRequest>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Active model with every column set, for inserting a freshly built order.
    pub fn into_insert(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            user_id: Set(self.user_id),
            order_items: Set(self.order_items),
            shipping_address: Set(self.shipping_address),
            payment_method: Set(self.payment_method),
            items_price: Set(self.items_price),
            shipping_price: Set(self.shipping_price),
            total_price: Set(self.total_price),
            is_paid: Set(self.is_paid),
            paid_at: Set(self.paid_at),
            status: Set(self.status),
            shipped_at: Set(self.shipped_at),
            delivered_at: Set(self.delivered_at),
            courier_details: Set(self.courier_details),
            return_request: Set(self.return_request),
            replacement_request: Set(self.replacement_request),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
        }
    }
}
