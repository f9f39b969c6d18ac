use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    ActiveValue::{Set, Unchanged},
    sea_query::{Expr, LockType, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    domain::order::{
        self, OrderDraft, OrderStatus, RequestKind, RequestReview, StatusChange,
    },
    dto::{
        common::{page_window, parse_optional_date},
        orders::{
            CreateOrderRequest, OrderList, OrderListQuery, OrderResponse, OrderStats,
            OrderStatsQuery, PaidCounts, RequestReasonBody, StatusCounts, UpdateRequestStatus,
            UpdateStatusRequest,
        },
    },
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        users::{self, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::{
        auth::{AuthUser, ensure_admin},
        origin::RequestOrigin,
    },
    response::{ApiResponse, Meta},
    state::AppState,
};

pub(crate) async fn count_orders<C>(conn: &C, condition: Condition) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    Ok(Orders::find().filter(condition).count(conn).await?)
}

/// Sum of `total_price` over the matching orders, 0 when none match.
pub(crate) async fn sum_total<C>(conn: &C, condition: Condition) -> AppResult<f64>
where
    C: ConnectionTrait,
{
    let total: Option<Option<f64>> = Orders::find()
        .select_only()
        .column_as(Expr::col(OrderCol::TotalPrice).sum(), "total")
        .filter(condition)
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten().unwrap_or(0.0))
}

pub(crate) async fn status_counts<C>(conn: &C, base: Condition) -> AppResult<StatusCounts>
where
    C: ConnectionTrait,
{
    let with = |status: OrderStatus| base.clone().add(OrderCol::Status.eq(status));
    let (pending, shipped, delivered, cancelled) = tokio::try_join!(
        count_orders(conn, with(OrderStatus::Pending)),
        count_orders(conn, with(OrderStatus::Shipped)),
        count_orders(conn, with(OrderStatus::Delivered)),
        count_orders(conn, with(OrderStatus::Cancelled)),
    )?;
    Ok(StatusCounts {
        pending,
        shipped,
        delivered,
        cancelled,
    })
}

pub(crate) async fn owners_by_id<C>(
    conn: &C,
    orders: &[OrderModel],
) -> AppResult<HashMap<Uuid, users::Model>>
where
    C: ConnectionTrait,
{
    let mut ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let owners = Users::find()
        .filter(UserCol::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(owners.into_iter().map(|u| (u.id, u)).collect())
}

async fn respond_one(
    state: &AppState,
    order: OrderModel,
    origin: &RequestOrigin,
) -> AppResult<OrderResponse> {
    let owner = Users::find_by_id(order.user_id).one(&state.orm).await?;
    Ok(OrderResponse::from_model(order, owner.as_ref(), origin.as_str()))
}

/// Only the columns the lifecycle rules may change.
fn lifecycle_update(order: OrderModel) -> OrderActive {
    OrderActive {
        id: Unchanged(order.id),
        is_paid: Set(order.is_paid),
        paid_at: Set(order.paid_at),
        status: Set(order.status),
        shipped_at: Set(order.shipped_at),
        delivered_at: Set(order.delivered_at),
        courier_details: Set(order.courier_details),
        return_request: Set(order.return_request),
        replacement_request: Set(order.replacement_request),
        updated_at: Set(order.updated_at),
        ..Default::default()
    }
}

/// Loads the order under `FOR UPDATE`, applies `f` and persists the result in
/// the same transaction. Nothing is written when `f` fails.
async fn mutate_order<F>(state: &AppState, id: Uuid, f: F) -> AppResult<OrderModel>
where
    F: FnOnce(&mut OrderModel, DateTime<Utc>) -> AppResult<()>,
{
    let txn = state.orm.begin().await?;
    let mut order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let now = Utc::now();
    f(&mut order, now)?;
    order.updated_at = now.into();

    let saved = lifecycle_update(order).update(&txn).await?;
    txn.commit().await?;
    Ok(saved)
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    origin: &RequestOrigin,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderResponse>> {
    let draft = OrderDraft::from(payload);
    let model = order::new_order(Uuid::new_v4(), user.user_id, draft, Utc::now())?;
    let created = model.into_insert().insert(&state.orm).await?;

    tracing::info!(order_id = %created.id, user_id = %user.user_id, "order created");
    log_audit(
        &state.orm,
        Some(user.user_id),
        "order_create",
        Some("orders".into()),
        Some(serde_json::json!({ "order_id": created.id, "total_price": created.total_price })),
    )
    .await;

    let resp = respond_one(state, created, origin).await?;
    Ok(ApiResponse::success("Order created", resp, None))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    origin: &RequestOrigin,
    id: Uuid,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    if order.user_id != user.user_id && !user.is_admin {
        return Err(AppError::unauthorized("Not authorized to view this order"));
    }
    let resp = respond_one(state, order, origin).await?;
    Ok(ApiResponse::success("Order", resp, None))
}

pub async fn my_orders(
    state: &AppState,
    user: &AuthUser,
    origin: &RequestOrigin,
) -> AppResult<ApiResponse<Vec<OrderResponse>>> {
    let owner = Users::find_by_id(user.user_id).one(&state.orm).await?;
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|o| OrderResponse::from_model(o, owner.as_ref(), origin.as_str()))
        .collect();
    Ok(ApiResponse::success("Orders", orders, None))
}

fn matches_nothing() -> Condition {
    Condition::all().add(Expr::value(false))
}

async fn admin_filter(state: &AppState, query: &OrderListQuery) -> AppResult<Condition> {
    let mut condition = Condition::all();

    if let Some(status) = query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        match status.parse::<OrderStatus>() {
            Ok(status) => condition = condition.add(OrderCol::Status.eq(status)),
            Err(_) => return Ok(matches_nothing()),
        }
    }

    match query.paid.as_deref().map(str::trim) {
        Some("true") => condition = condition.add(OrderCol::IsPaid.eq(true)),
        Some("false") => condition = condition.add(OrderCol::IsPaid.eq(false)),
        _ => {}
    }

    if let Some(owner) = query.user.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        match Uuid::parse_str(owner) {
            Ok(id) => condition = condition.add(OrderCol::UserId.eq(id)),
            Err(_) => {
                let found = Users::find()
                    .filter(UserCol::Email.eq(owner.to_lowercase()))
                    .one(&state.orm)
                    .await?;
                match found {
                    Some(u) => condition = condition.add(OrderCol::UserId.eq(u.id)),
                    None => return Ok(matches_nothing()),
                }
            }
        }
    }

    if let Some(from) = parse_optional_date(query.date_from.as_deref())? {
        condition = condition.add(OrderCol::CreatedAt.gte(from));
    }
    if let Some(to) = parse_optional_date(query.date_to.as_deref())? {
        condition = condition.add(OrderCol::CreatedAt.lte(to));
    }

    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        if let Ok(id) = Uuid::parse_str(q) {
            condition = condition.add(OrderCol::Id.eq(id));
        } else {
            let pattern = format!("%{q}%");
            let owner_ids: Vec<Uuid> = Users::find()
                .select_only()
                .column(UserCol::Id)
                .filter(
                    Condition::any()
                        .add(Expr::col(UserCol::Name).ilike(pattern.as_str()))
                        .add(Expr::col(UserCol::Email).ilike(pattern.as_str())),
                )
                .into_tuple()
                .all(&state.orm)
                .await?;

            let mut any = Condition::any()
                .add(Expr::col(OrderCol::Status).ilike(pattern.as_str()))
                .add(Expr::col(OrderCol::PaymentMethod).ilike(pattern.as_str()));
            if !owner_ids.is_empty() {
                any = any.add(OrderCol::UserId.is_in(owner_ids));
            }
            condition = condition.add(any);
        }
    }

    Ok(condition)
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    origin: &RequestOrigin,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit) = page_window(query.page, query.limit, 20);
    let condition = admin_filter(state, &query).await?;

    let sort_col = match query.sort.as_deref() {
        Some("totalPrice") => OrderCol::TotalPrice,
        Some("status") => OrderCol::Status,
        _ => OrderCol::CreatedAt,
    };
    let finder = Orders::find().filter(condition.clone());
    let finder = match query.sort_dir.as_deref() {
        Some("asc") => finder.order_by_asc(sort_col),
        _ => finder.order_by_desc(sort_col),
    };

    let paginator = finder.paginate(&state.orm, limit);
    let (total, items, counts) = tokio::try_join!(
        async { Ok::<_, AppError>(paginator.num_items().await?) },
        async { Ok::<_, AppError>(paginator.fetch_page(page - 1).await?) },
        status_counts(&state.orm, condition),
    )?;

    let owners = owners_by_id(&state.orm, &items).await?;
    let orders = items
        .into_iter()
        .map(|o| {
            let owner = owners.get(&o.user_id);
            OrderResponse::from_model(o, owner, origin.as_str())
        })
        .collect();

    let meta = Meta::new(page as i64, limit as i64, total as i64);
    Ok(ApiResponse::success(
        "Orders",
        OrderList {
            orders,
            status_counts: counts,
        },
        Some(meta),
    ))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    origin: &RequestOrigin,
    id: Uuid,
    payload: UpdateStatusRequest,
) -> AppResult<ApiResponse<OrderResponse>> {
    ensure_admin(user)?;
    let estimated = parse_optional_date(payload.estimated_delivery_date.as_deref())?;

    let updated = mutate_order(state, id, |order, now| {
        let status: OrderStatus = payload
            .status
            .as_deref()
            .unwrap_or_default()
            .trim()
            .parse()?;
        let change = StatusChange {
            status,
            courier_company: payload.courier_company,
            tracking_number: payload.tracking_number,
            estimated_delivery_date: estimated,
        };
        order::apply_status(order, change, now)?;
        Ok(())
    })
    .await?;

    tracing::info!(order_id = %id, status = %updated.status, "order status updated");
    log_audit(
        &state.orm,
        Some(user.user_id),
        "order_status",
        Some("orders".into()),
        Some(serde_json::json!({ "order_id": id, "status": updated.status.as_str() })),
    )
    .await;

    let resp = respond_one(state, updated, origin).await?;
    Ok(ApiResponse::success("Order status updated", resp, None))
}

pub async fn mark_paid(
    state: &AppState,
    user: &AuthUser,
    origin: &RequestOrigin,
    id: Uuid,
) -> AppResult<ApiResponse<OrderResponse>> {
    ensure_admin(user)?;
    let updated = mutate_order(state, id, |order, now| {
        order::mark_paid(order, now);
        Ok(())
    })
    .await?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        "order_pay",
        Some("orders".into()),
        Some(serde_json::json!({ "order_id": id })),
    )
    .await;

    let resp = respond_one(state, updated, origin).await?;
    Ok(ApiResponse::success("Order marked as paid", resp, None))
}

pub async fn open_request(
    state: &AppState,
    user: &AuthUser,
    origin: &RequestOrigin,
    id: Uuid,
    kind: RequestKind,
    payload: RequestReasonBody,
) -> AppResult<ApiResponse<OrderResponse>> {
    let updated = mutate_order(state, id, |order, now| {
        order::open_request(order, user.user_id, kind, payload.reason.as_deref(), now)?;
        Ok(())
    })
    .await?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        kind.audit_action(),
        Some("orders".into()),
        Some(serde_json::json!({ "order_id": id, "event": "requested" })),
    )
    .await;

    let resp = respond_one(state, updated, origin).await?;
    Ok(ApiResponse::success(format!("{kind} requested"), resp, None))
}

pub async fn cancel_request(
    state: &AppState,
    user: &AuthUser,
    origin: &RequestOrigin,
    id: Uuid,
    kind: RequestKind,
) -> AppResult<ApiResponse<OrderResponse>> {
    let updated = mutate_order(state, id, |order, now| {
        order::cancel_request(order, user.user_id, kind, now)?;
        Ok(())
    })
    .await?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        kind.audit_action(),
        Some("orders".into()),
        Some(serde_json::json!({ "order_id": id, "event": "cancelled" })),
    )
    .await;

    let resp = respond_one(state, updated, origin).await?;
    Ok(ApiResponse::success(format!("{kind} request cancelled"), resp, None))
}

pub async fn update_request_status(
    state: &AppState,
    user: &AuthUser,
    origin: &RequestOrigin,
    id: Uuid,
    kind: RequestKind,
    payload: UpdateRequestStatus,
) -> AppResult<ApiResponse<OrderResponse>> {
    ensure_admin(user)?;
    let expected_pickup_date = parse_optional_date(payload.expected_pickup_date.as_deref())?;
    let status = payload
        .status
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_string();

    let review = RequestReview {
        status: status.clone(),
        admin_notes: payload.admin_notes,
        courier_company: payload.courier_company,
        tracking_number: payload.tracking_number,
        expected_pickup_date,
    };
    let updated = mutate_order(state, id, |order, now| {
        order::review_request(order, kind, review, now)?;
        Ok(())
    })
    .await?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        kind.audit_action(),
        Some("orders".into()),
        Some(serde_json::json!({ "order_id": id, "event": "reviewed", "status": status })),
    )
    .await;

    let resp = respond_one(state, updated, origin).await?;
    Ok(ApiResponse::success(format!("{kind} status updated"), resp, None))
}

pub async fn order_stats(
    state: &AppState,
    user: &AuthUser,
    query: OrderStatsQuery,
) -> AppResult<ApiResponse<OrderStats>> {
    ensure_admin(user)?;
    let mut base = Condition::all();
    if let Some(from) = parse_optional_date(query.date_from.as_deref())? {
        base = base.add(OrderCol::CreatedAt.gte(from));
    }
    if let Some(to) = parse_optional_date(query.date_to.as_deref())? {
        base = base.add(OrderCol::CreatedAt.lte(to));
    }

    let conn = &state.orm;
    let (counts, revenue, paid, unpaid) = tokio::try_join!(
        status_counts(conn, base.clone()),
        sum_total(conn, base.clone().add(OrderCol::Status.eq(OrderStatus::Delivered))),
        count_orders(conn, base.clone().add(OrderCol::IsPaid.eq(true))),
        count_orders(conn, base.clone().add(OrderCol::IsPaid.eq(false))),
    )?;

    Ok(ApiResponse::success(
        "Order stats",
        OrderStats {
            status_counts: counts,
            revenue,
            paid_counts: PaidCounts { paid, unpaid },
        },
        None,
    ))
}
