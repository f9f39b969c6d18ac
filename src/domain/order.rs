//! Order lifecycle rules.
//!
//! Everything here is pure: functions take the loaded order row, validate the
//! requested change and mutate it in place. A function that returns an error
//! leaves the order untouched, so callers can drop the row and roll back.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::entity::orders::Model as OrderModel;

pub const CASH_ON_DELIVERY: &str = "Cash on Delivery";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum OrderStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Shipped")]
    Shipped,
    #[sea_orm(string_value = "Delivered")]
    Delivered,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(LifecycleError::InvalidStatus)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl FromStr for RequestStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RequestStatus::Pending),
            "Approved" => Ok(RequestStatus::Approved),
            "Rejected" => Ok(RequestStatus::Rejected),
            "Completed" => Ok(RequestStatus::Completed),
            "Cancelled" => Ok(RequestStatus::Cancelled),
            _ => Err(LifecycleError::InvalidStatus),
        }
    }
}

/// The two post-delivery workflows. They share one request shape and one set
/// of rules; only the storage slot and the wording differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Return,
    Replacement,
}

impl RequestKind {
    fn lower(&self) -> &'static str {
        match self {
            RequestKind::Return => "return",
            RequestKind::Replacement => "replacement",
        }
    }

    fn not_delivered_message(&self) -> &'static str {
        match self {
            RequestKind::Return => "Can only return delivered orders",
            RequestKind::Replacement => "Can only request replacement for delivered orders",
        }
    }

    pub fn audit_action(&self) -> &'static str {
        match self {
            RequestKind::Return => "order_return",
            RequestKind::Replacement => "order_replacement",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Return => f.write_str("Return"),
            RequestKind::Replacement => f.write_str("Replacement"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("No order items")]
    EmptyOrder,
    #[error("Order item quantity must be at least 1")]
    InvalidQuantity,
    #[error("Shipping address is incomplete")]
    IncompleteAddress,
    #[error("Invalid status")]
    InvalidStatus,
    #[error("Courier company and tracking number are required when shipping")]
    CourierRequired,
    #[error("Not authorized")]
    NotOwner,
    #[error("{}", .0.not_delivered_message())]
    NotDelivered(RequestKind),
    #[error("{0} already requested")]
    AlreadyRequested(RequestKind),
    #[error("{0} reason is required")]
    ReasonRequired(RequestKind),
    #[error("No {} request found", .0.lower())]
    NoRequest(RequestKind),
    #[error("Cannot cancel {} request that has been processed", .0.lower())]
    AlreadyProcessed(RequestKind),
    #[error("Pickup courier company and tracking number are required when approving")]
    PickupCourierRequired,
}

/// Line item captured at order time. Never refreshed from the live product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(rename = "product")]
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub price: f64,
    pub qty: i32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub delivery_charges: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct OrderLines(pub Vec<OrderLine>);

impl OrderLines {
    pub fn total_quantity(&self) -> i64 {
        self.0.iter().map(|line| i64::from(line.qty)).sum()
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
#[serde(default)]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl ShippingAddress {
    fn is_complete(&self) -> bool {
        [
            &self.name,
            &self.phone,
            &self.address,
            &self.city,
            &self.state,
            &self.pincode,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourierDetails {
    pub company: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PickupCourierDetails {
    pub company: Option<String>,
    pub tracking_number: Option<String>,
    pub expected_pickup_date: Option<DateTime<Utc>>,
}

/// A return or replacement request attached to a delivered order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDeliveryRequest {
    pub requested: bool,
    pub reason: Option<String>,
    pub status: RequestStatus,
    pub requested_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub pickup_courier_details: Option<PickupCourierDetails>,
}

/// Validated input for a new order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order_items: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: Option<String>,
    pub items_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
}

#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub courier_company: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct RequestReview {
    pub status: String,
    pub admin_notes: Option<String>,
    pub courier_company: Option<String>,
    pub tracking_number: Option<String>,
    pub expected_pickup_date: Option<DateTime<Utc>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn is_cash_on_delivery(payment_method: &str) -> bool {
    payment_method == CASH_ON_DELIVERY || payment_method == "COD"
}

/// Builds a new order row. Prices are taken from the draft as submitted.
pub fn new_order(
    id: Uuid,
    user_id: Uuid,
    draft: OrderDraft,
    now: DateTime<Utc>,
) -> Result<OrderModel, LifecycleError> {
    if draft.order_items.is_empty() {
        return Err(LifecycleError::EmptyOrder);
    }
    if draft.order_items.iter().any(|line| line.qty < 1) {
        return Err(LifecycleError::InvalidQuantity);
    }
    if !draft.shipping_address.is_complete() {
        return Err(LifecycleError::IncompleteAddress);
    }

    let payment_method =
        non_blank(draft.payment_method).unwrap_or_else(|| CASH_ON_DELIVERY.to_string());

    Ok(OrderModel {
        id,
        user_id,
        order_items: OrderLines(draft.order_items),
        shipping_address: draft.shipping_address,
        payment_method,
        items_price: draft.items_price,
        shipping_price: draft.shipping_price,
        total_price: draft.total_price,
        is_paid: false,
        paid_at: None,
        status: OrderStatus::Pending,
        shipped_at: None,
        delivered_at: None,
        courier_details: None,
        return_request: None,
        replacement_request: None,
        created_at: now.into(),
        updated_at: now.into(),
    })
}

/// Moves the order to `change.status`. Any status may follow any other; only
/// the side effects of Shipped and Delivered are enforced.
pub fn apply_status(
    order: &mut OrderModel,
    change: StatusChange,
    now: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    match change.status {
        OrderStatus::Shipped => {
            let company = non_blank(change.courier_company);
            let tracking = non_blank(change.tracking_number);
            let (Some(company), Some(tracking)) = (company, tracking) else {
                return Err(LifecycleError::CourierRequired);
            };
            let estimated = change.estimated_delivery_date.or_else(|| {
                order
                    .courier_details
                    .as_ref()
                    .and_then(|c| c.estimated_delivery_date)
            });
            order.courier_details = Some(CourierDetails {
                company: Some(company),
                tracking_number: Some(tracking),
                estimated_delivery_date: estimated,
            });
            order.shipped_at = Some(now.into());
        }
        OrderStatus::Delivered => {
            order.delivered_at = Some(now.into());
            if !order.is_paid && is_cash_on_delivery(&order.payment_method) {
                order.is_paid = true;
                order.paid_at = Some(now.into());
            }
        }
        OrderStatus::Pending | OrderStatus::Cancelled => {}
    }
    order.status = change.status;
    Ok(())
}

pub fn mark_paid(order: &mut OrderModel, now: DateTime<Utc>) {
    order.is_paid = true;
    order.paid_at = Some(now.into());
}

fn slot(order: &mut OrderModel, kind: RequestKind) -> &mut Option<PostDeliveryRequest> {
    match kind {
        RequestKind::Return => &mut order.return_request,
        RequestKind::Replacement => &mut order.replacement_request,
    }
}

/// The request of `kind`, if the customer has ever opened one.
pub fn request_of(order: &OrderModel, kind: RequestKind) -> Option<&PostDeliveryRequest> {
    let request = match kind {
        RequestKind::Return => order.return_request.as_ref(),
        RequestKind::Replacement => order.replacement_request.as_ref(),
    };
    request.filter(|r| r.requested)
}

pub fn open_request(
    order: &mut OrderModel,
    caller: Uuid,
    kind: RequestKind,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    if order.user_id != caller {
        return Err(LifecycleError::NotOwner);
    }
    if order.status != OrderStatus::Delivered {
        return Err(LifecycleError::NotDelivered(kind));
    }
    if request_of(order, kind).is_some() {
        return Err(LifecycleError::AlreadyRequested(kind));
    }
    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or(LifecycleError::ReasonRequired(kind))?;

    *slot(order, kind) = Some(PostDeliveryRequest {
        requested: true,
        reason: Some(reason.to_string()),
        status: RequestStatus::Pending,
        requested_at: Some(now),
        processed_at: None,
        admin_notes: None,
        pickup_courier_details: None,
    });
    Ok(())
}

/// Admin decision on a request. The current request status is not checked.
pub fn review_request(
    order: &mut OrderModel,
    kind: RequestKind,
    review: RequestReview,
    now: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    if request_of(order, kind).is_none() {
        return Err(LifecycleError::NoRequest(kind));
    }
    let status: RequestStatus = review.status.parse()?;

    let Some(request) = slot(order, kind).as_mut() else {
        return Err(LifecycleError::NoRequest(kind));
    };

    let pickup = if status == RequestStatus::Approved {
        let previous = request.pickup_courier_details.clone().unwrap_or_default();
        let merged = PickupCourierDetails {
            company: non_blank(review.courier_company).or(previous.company),
            tracking_number: non_blank(review.tracking_number).or(previous.tracking_number),
            expected_pickup_date: review.expected_pickup_date.or(previous.expected_pickup_date),
        };
        if merged.company.is_none() || merged.tracking_number.is_none() {
            return Err(LifecycleError::PickupCourierRequired);
        }
        Some(merged)
    } else {
        None
    };

    request.status = status;
    request.processed_at = Some(now);
    if let Some(notes) = non_blank(review.admin_notes) {
        request.admin_notes = Some(notes);
    }
    if let Some(pickup) = pickup {
        request.pickup_courier_details = Some(pickup);
    }
    Ok(())
}

pub fn cancel_request(
    order: &mut OrderModel,
    caller: Uuid,
    kind: RequestKind,
    now: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    if order.user_id != caller {
        return Err(LifecycleError::NotOwner);
    }
    let Some(request) = slot(order, kind).as_mut().filter(|r| r.requested) else {
        return Err(LifecycleError::NoRequest(kind));
    };
    if request.status != RequestStatus::Pending {
        return Err(LifecycleError::AlreadyProcessed(kind));
    }
    request.status = RequestStatus::Cancelled;
    request.processed_at = Some(now);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Asha".into(),
            phone: "9999999999".into(),
            address: "12 MG Road".into(),
            city: "Pune".into(),
            state: "MH".into(),
            pincode: "411001".into(),
        }
    }

    fn line(name: &str, price: f64) -> OrderLine {
        OrderLine {
            product_id: Uuid::new_v4(),
            name: name.into(),
            image: "/uploads/kurta.jpg".into(),
            price,
            qty: 1,
            size: Some("M".into()),
            delivery_charges: 0.0,
        }
    }

    fn draft(payment_method: Option<&str>) -> OrderDraft {
        OrderDraft {
            order_items: vec![line("Kurta", 100.0), line("Dupatta", 50.0)],
            shipping_address: address(),
            payment_method: payment_method.map(String::from),
            items_price: 150.0,
            shipping_price: 0.0,
            total_price: 150.0,
        }
    }

    fn order_for(owner: Uuid) -> OrderModel {
        new_order(Uuid::new_v4(), owner, draft(None), Utc::now()).unwrap()
    }

    fn ship(
        order: &mut OrderModel,
        company: Option<&str>,
        tracking: Option<&str>,
    ) -> Result<(), LifecycleError> {
        apply_status(
            order,
            StatusChange {
                status: OrderStatus::Shipped,
                courier_company: company.map(String::from),
                tracking_number: tracking.map(String::from),
                estimated_delivery_date: None,
            },
            Utc::now(),
        )
    }

    fn to(status: OrderStatus) -> StatusChange {
        StatusChange {
            status,
            courier_company: None,
            tracking_number: None,
            estimated_delivery_date: None,
        }
    }

    fn delivered_order(owner: Uuid) -> OrderModel {
        let mut order = order_for(owner);
        apply_status(&mut order, to(OrderStatus::Delivered), Utc::now()).unwrap();
        order
    }

    fn approve(company: Option<&str>, tracking: Option<&str>) -> RequestReview {
        RequestReview {
            status: "Approved".into(),
            admin_notes: None,
            courier_company: company.map(String::from),
            tracking_number: tracking.map(String::from),
            expected_pickup_date: None,
        }
    }

    #[test]
    fn new_orders_start_pending_and_unpaid() {
        let order = order_for(Uuid::new_v4());
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.is_paid);
        assert!(order.paid_at.is_none());
        assert_eq!(order.payment_method, CASH_ON_DELIVERY);
        assert_eq!(order.order_items.0.len(), 2);
    }

    #[test]
    fn new_order_requires_items_and_address() {
        let mut empty = draft(None);
        empty.order_items.clear();
        assert_eq!(
            new_order(Uuid::new_v4(), Uuid::new_v4(), empty, Utc::now()).unwrap_err(),
            LifecycleError::EmptyOrder
        );

        let mut no_city = draft(None);
        no_city.shipping_address.city = "  ".into();
        assert_eq!(
            new_order(Uuid::new_v4(), Uuid::new_v4(), no_city, Utc::now()).unwrap_err(),
            LifecycleError::IncompleteAddress
        );
    }

    #[test]
    fn status_parsing_rejects_unknown_values() {
        assert_eq!("Shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
        assert_eq!("shipped".parse::<OrderStatus>(), Err(LifecycleError::InvalidStatus));
        assert_eq!("Refunded".parse::<OrderStatus>(), Err(LifecycleError::InvalidStatus));
    }

    #[test]
    fn shipping_without_courier_leaves_order_unchanged() {
        let mut order = order_for(Uuid::new_v4());
        let before = order.clone();

        assert_eq!(ship(&mut order, Some("BlueDart"), None), Err(LifecycleError::CourierRequired));
        assert_eq!(ship(&mut order, None, Some("TRK123")), Err(LifecycleError::CourierRequired));
        assert_eq!(ship(&mut order, Some(""), Some("TRK123")), Err(LifecycleError::CourierRequired));
        assert_eq!(order, before);
    }

    #[test]
    fn shipping_keeps_known_estimated_delivery_date() {
        let mut order = order_for(Uuid::new_v4());
        let eta = Utc::now() + Duration::days(4);
        apply_status(
            &mut order,
            StatusChange {
                status: OrderStatus::Shipped,
                courier_company: Some("BlueDart".into()),
                tracking_number: Some("TRK1".into()),
                estimated_delivery_date: Some(eta),
            },
            Utc::now(),
        )
        .unwrap();

        ship(&mut order, Some("Delhivery"), Some("TRK2")).unwrap();

        let courier = order.courier_details.expect("courier details");
        assert_eq!(courier.company.as_deref(), Some("Delhivery"));
        assert_eq!(courier.tracking_number.as_deref(), Some("TRK2"));
        assert_eq!(courier.estimated_delivery_date, Some(eta));
        assert!(order.shipped_at.is_some());
        assert_eq!(order.status, OrderStatus::Shipped);
    }

    #[test]
    fn delivering_cash_on_delivery_marks_paid() {
        let mut order = order_for(Uuid::new_v4());
        apply_status(&mut order, to(OrderStatus::Delivered), Utc::now()).unwrap();
        assert!(order.is_paid);
        assert!(order.paid_at.is_some());
        assert!(order.delivered_at.is_some());

        let mut cod = new_order(Uuid::new_v4(), Uuid::new_v4(), draft(Some("COD")), Utc::now()).unwrap();
        apply_status(&mut cod, to(OrderStatus::Delivered), Utc::now()).unwrap();
        assert!(cod.is_paid);
    }

    #[test]
    fn delivering_an_already_paid_order_keeps_paid_at() {
        let mut order = order_for(Uuid::new_v4());
        let paid_at = Utc::now() - Duration::days(2);
        mark_paid(&mut order, paid_at);

        apply_status(&mut order, to(OrderStatus::Delivered), Utc::now()).unwrap();
        assert_eq!(order.paid_at, Some(paid_at.into()));
    }

    #[test]
    fn delivering_prepaid_methods_does_not_touch_payment() {
        let mut order =
            new_order(Uuid::new_v4(), Uuid::new_v4(), draft(Some("UPI")), Utc::now()).unwrap();
        apply_status(&mut order, to(OrderStatus::Delivered), Utc::now()).unwrap();
        assert!(!order.is_paid);
        assert!(order.paid_at.is_none());
    }

    #[test]
    fn any_status_may_follow_any_other() {
        let mut order = delivered_order(Uuid::new_v4());
        ship(&mut order, Some("BlueDart"), Some("TRK9")).unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        apply_status(&mut order, to(OrderStatus::Pending), Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn mark_paid_is_repeatable() {
        let mut order = order_for(Uuid::new_v4());
        mark_paid(&mut order, Utc::now());
        mark_paid(&mut order, Utc::now());
        assert!(order.is_paid);
        assert!(order.paid_at.is_some());
    }

    #[test]
    fn return_requires_a_delivered_order() {
        let owner = Uuid::new_v4();
        let mut order = order_for(owner);
        assert_eq!(
            open_request(&mut order, owner, RequestKind::Return, Some("wrong size"), Utc::now()),
            Err(LifecycleError::NotDelivered(RequestKind::Return))
        );
        assert!(order.return_request.is_none());
    }

    #[test]
    fn return_can_be_requested_exactly_once() {
        let owner = Uuid::new_v4();
        let mut order = delivered_order(owner);

        open_request(&mut order, owner, RequestKind::Return, Some("wrong size"), Utc::now()).unwrap();
        let request = request_of(&order, RequestKind::Return).expect("return request");
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.reason.as_deref(), Some("wrong size"));
        assert!(request.requested_at.is_some());

        let err = open_request(&mut order, owner, RequestKind::Return, Some("again"), Utc::now())
            .unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyRequested(RequestKind::Return));
        assert_eq!(err.to_string(), "Return already requested");
    }

    #[test]
    fn request_preconditions_are_checked_in_order() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let mut pending = order_for(owner);
        assert_eq!(
            open_request(&mut pending, stranger, RequestKind::Return, None, Utc::now()),
            Err(LifecycleError::NotOwner)
        );

        let mut delivered = delivered_order(owner);
        let err = open_request(&mut delivered, owner, RequestKind::Replacement, Some("   "), Utc::now())
            .unwrap_err();
        assert_eq!(err.to_string(), "Replacement reason is required");
    }

    #[test]
    fn replacement_is_independent_of_return() {
        let owner = Uuid::new_v4();
        let mut order = delivered_order(owner);
        open_request(&mut order, owner, RequestKind::Return, Some("torn"), Utc::now()).unwrap();
        open_request(&mut order, owner, RequestKind::Replacement, Some("torn"), Utc::now()).unwrap();
        assert!(request_of(&order, RequestKind::Replacement).is_some());
    }

    #[test]
    fn cancelling_is_only_allowed_while_pending() {
        let owner = Uuid::new_v4();
        let mut order = delivered_order(owner);
        open_request(&mut order, owner, RequestKind::Return, Some("colour"), Utc::now()).unwrap();

        cancel_request(&mut order, owner, RequestKind::Return, Utc::now()).unwrap();
        let request = request_of(&order, RequestKind::Return).unwrap();
        assert_eq!(request.status, RequestStatus::Cancelled);
        assert!(request.processed_at.is_some());

        for status in ["Approved", "Rejected", "Completed"] {
            let mut order = delivered_order(owner);
            open_request(&mut order, owner, RequestKind::Return, Some("colour"), Utc::now()).unwrap();
            review_request(
                &mut order,
                RequestKind::Return,
                RequestReview {
                    status: status.into(),
                    admin_notes: None,
                    courier_company: Some("Delhivery".into()),
                    tracking_number: Some("TRK999".into()),
                    expected_pickup_date: None,
                },
                Utc::now(),
            )
            .unwrap();
            let err = cancel_request(&mut order, owner, RequestKind::Return, Utc::now()).unwrap_err();
            assert_eq!(err.to_string(), "Cannot cancel return request that has been processed");
        }
    }

    #[test]
    fn cancelling_someone_elses_request_is_rejected() {
        let owner = Uuid::new_v4();
        let mut order = delivered_order(owner);
        open_request(&mut order, owner, RequestKind::Return, Some("colour"), Utc::now()).unwrap();
        assert_eq!(
            cancel_request(&mut order, Uuid::new_v4(), RequestKind::Return, Utc::now()),
            Err(LifecycleError::NotOwner)
        );
    }

    #[test]
    fn reviewing_needs_an_existing_request_and_valid_status() {
        let owner = Uuid::new_v4();
        let mut order = delivered_order(owner);
        let err = review_request(&mut order, RequestKind::Replacement, approve(None, None), Utc::now())
            .unwrap_err();
        assert_eq!(err.to_string(), "No replacement request found");

        open_request(&mut order, owner, RequestKind::Replacement, Some("faded"), Utc::now()).unwrap();
        let mut review = approve(None, None);
        review.status = "Shipped".into();
        assert_eq!(
            review_request(&mut order, RequestKind::Replacement, review, Utc::now()),
            Err(LifecycleError::InvalidStatus)
        );
    }

    #[test]
    fn approval_requires_pickup_courier() {
        let owner = Uuid::new_v4();
        let mut order = delivered_order(owner);
        open_request(&mut order, owner, RequestKind::Return, Some("faded"), Utc::now()).unwrap();
        let before = order.clone();

        assert_eq!(
            review_request(&mut order, RequestKind::Return, approve(Some("Delhivery"), None), Utc::now()),
            Err(LifecycleError::PickupCourierRequired)
        );
        assert_eq!(order, before);
    }

    #[test]
    fn admin_notes_are_kept_when_not_resupplied() {
        let owner = Uuid::new_v4();
        let mut order = delivered_order(owner);
        open_request(&mut order, owner, RequestKind::Return, Some("faded"), Utc::now()).unwrap();
        let mut reject = approve(None, None);
        reject.status = "Rejected".into();
        reject.admin_notes = Some("outside window".into());
        review_request(&mut order, RequestKind::Return, reject, Utc::now()).unwrap();

        let mut reopen = approve(None, None);
        reopen.status = "Pending".into();
        review_request(&mut order, RequestKind::Return, reopen, Utc::now()).unwrap();

        let request = request_of(&order, RequestKind::Return).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.admin_notes.as_deref(), Some("outside window"));
    }

    #[test]
    fn ship_deliver_return_and_approve() {
        let owner = Uuid::new_v4();
        let mut order = order_for(owner);

        ship(&mut order, Some("BlueDart"), Some("TRK123")).unwrap();
        apply_status(&mut order, to(OrderStatus::Delivered), Utc::now()).unwrap();
        open_request(&mut order, owner, RequestKind::Return, Some("wrong size"), Utc::now()).unwrap();
        review_request(
            &mut order,
            RequestKind::Return,
            approve(Some("Delhivery"), Some("TRK999")),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(order.status, OrderStatus::Delivered);
        let request = request_of(&order, RequestKind::Return).unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        let pickup = request.pickup_courier_details.as_ref().unwrap();
        assert_eq!(pickup.company.as_deref(), Some("Delhivery"));
        assert_eq!(pickup.tracking_number.as_deref(), Some("TRK999"));
        assert!(request.processed_at.is_some());
    }
}
