use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::order::{
        CourierDetails, OrderDraft, OrderLine, OrderStatus, PostDeliveryRequest, ShippingAddress,
    },
    entity::{orders, users},
    media::absolute_image_url,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub order_items: Vec<OrderLine>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub items_price: f64,
    #[serde(default)]
    pub shipping_price: f64,
    #[serde(default)]
    pub total_price: f64,
}

impl From<CreateOrderRequest> for OrderDraft {
    fn from(req: CreateOrderRequest) -> Self {
        OrderDraft {
            order_items: req.order_items,
            shipping_address: req.shipping_address,
            payment_method: req.payment_method,
            items_price: req.items_price,
            shipping_price: req.shipping_price,
            total_price: req.total_price,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
    pub courier_company: Option<String>,
    pub tracking_number: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub estimated_delivery_date: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RequestReasonBody {
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestStatus {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
    pub courier_company: Option<String>,
    pub tracking_number: Option<String>,
    pub expected_pickup_date: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub paid: Option<String>,
    /// Owner id or e-mail.
    pub user: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub sort_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatsQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderOwner {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Client view of an order. Line images are absolute and the courier
/// details are repeated at the top level for older clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user: OrderOwner,
    pub order_items: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub courier_details: Option<CourierDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub return_request: Option<PostDeliveryRequest>,
    pub replacement_request: Option<PostDeliveryRequest>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn from_model(order: orders::Model, owner: Option<&users::Model>, origin: &str) -> Self {
        let order_items = order
            .order_items
            .0
            .into_iter()
            .map(|line| OrderLine {
                image: absolute_image_url(origin, &line.image),
                ..line
            })
            .collect();
        let courier = order.courier_details.clone();

        Self {
            id: order.id,
            user: OrderOwner {
                id: order.user_id,
                name: owner.map(|u| u.name.clone()),
                email: owner.map(|u| u.email.clone()),
            },
            order_items,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            items_price: order.items_price,
            shipping_price: order.shipping_price,
            total_price: order.total_price,
            is_paid: order.is_paid,
            paid_at: order.paid_at.map(|t| t.with_timezone(&Utc)),
            status: order.status,
            shipped_at: order.shipped_at.map(|t| t.with_timezone(&Utc)),
            delivered_at: order.delivered_at.map(|t| t.with_timezone(&Utc)),
            courier_company: courier.as_ref().and_then(|c| c.company.clone()),
            tracking_number: courier.as_ref().and_then(|c| c.tracking_number.clone()),
            estimated_delivery_date: courier.as_ref().and_then(|c| c.estimated_delivery_date),
            courier_details: courier,
            return_request: order.return_request,
            replacement_request: order.replacement_request,
            created_at: order.created_at.with_timezone(&Utc),
            updated_at: order.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct StatusCounts {
    pub pending: u64,
    pub shipped: u64,
    pub delivered: u64,
    pub cancelled: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderList {
    pub orders: Vec<OrderResponse>,
    pub status_counts: StatusCounts,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaidCounts {
    pub paid: u64,
    pub unpaid: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub status_counts: StatusCounts,
    pub revenue: f64,
    pub paid_counts: PaidCounts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderDraft, new_order};

    fn order() -> orders::Model {
        new_order(
            Uuid::new_v4(),
            Uuid::new_v4(),
            OrderDraft {
                order_items: vec![OrderLine {
                    product_id: Uuid::new_v4(),
                    name: "Kurta".into(),
                    image: "/uploads/kurta.jpg".into(),
                    price: 100.0,
                    qty: 2,
                    size: None,
                    delivery_charges: 0.0,
                }],
                shipping_address: ShippingAddress {
                    name: "Asha".into(),
                    phone: "1".into(),
                    address: "street".into(),
                    city: "Pune".into(),
                    state: "MH".into(),
                    pincode: "411001".into(),
                },
                payment_method: None,
                items_price: 200.0,
                shipping_price: 0.0,
                total_price: 200.0,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn response_uses_absolute_images_and_courier_aliases() {
        let mut model = order();
        model.courier_details = Some(CourierDetails {
            company: Some("BlueDart".into()),
            tracking_number: Some("TRK123".into()),
            estimated_delivery_date: None,
        });

        let json = serde_json::to_value(OrderResponse::from_model(model, None, "http://shop.test"))
            .unwrap();
        assert_eq!(json["orderItems"][0]["image"], "http://shop.test/uploads/kurta.jpg");
        assert!(json["orderItems"][0]["product"].is_string());
        assert_eq!(json["courierCompany"], "BlueDart");
        assert_eq!(json["courierDetails"]["trackingNumber"], "TRK123");
        assert_eq!(json["status"], "Pending");
    }

    #[test]
    fn status_bodies_tolerate_a_missing_status() {
        let req: UpdateStatusRequest = serde_json::from_str("{}").unwrap();
        assert!(req.status.is_none());
        let req: UpdateRequestStatus = serde_json::from_str(r#"{"adminNotes":"ok"}"#).unwrap();
        assert!(req.status.is_none());
        let req: RequestReasonBody = serde_json::from_str("{}").unwrap();
        assert!(req.reason.is_none());
    }

    #[test]
    fn create_request_defaults_missing_fields() {
        let req: CreateOrderRequest = serde_json::from_str("{}").unwrap();
        assert!(req.order_items.is_empty());
        assert_eq!(req.total_price, 0.0);
    }

    #[test]
    fn status_counts_use_status_names() {
        let counts = StatusCounts {
            delivered: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["Delivered"], 3);
        assert_eq!(json["Pending"], 0);
    }
}
