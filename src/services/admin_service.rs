use chrono::{Datelike, TimeZone, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::{
    domain::order::OrderStatus,
    dto::{
        admin::{DashboardStats, DashboardTotals, LowStockProduct, SalesWindow},
        orders::OrderResponse,
    },
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::{
        auth::{AuthUser, ensure_admin},
        origin::RequestOrigin,
    },
    response::ApiResponse,
    services::{
        order_service::{count_orders, owners_by_id, status_counts, sum_total},
        report_service::render_orders_csv,
    },
    state::AppState,
};

const LOW_STOCK_THRESHOLD: i32 = 5;
const DASHBOARD_LIST_LIMIT: u64 = 10;

pub async fn dashboard_stats(
    state: &AppState,
    user: &AuthUser,
    origin: &RequestOrigin,
) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(user)?;
    let conn = &state.orm;

    let now = Utc::now();
    let start_of_day = Utc
        .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("invalid start of day")))?;
    let start_of_month = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("invalid start of month")))?;

    let delivered = || Condition::all().add(OrderCol::Status.eq(OrderStatus::Delivered));

    let (
        total_users,
        total_orders,
        total_products,
        total_sales,
        counts,
        sales_today,
        sales_month,
        recent,
        low_stock,
    ) = tokio::try_join!(
        async { Ok::<_, AppError>(Users::find().count(conn).await?) },
        count_orders(conn, Condition::all()),
        async { Ok::<_, AppError>(Products::find().count(conn).await?) },
        sum_total(conn, delivered()),
        status_counts(conn, Condition::all()),
        sum_total(conn, delivered().add(OrderCol::DeliveredAt.gte(start_of_day))),
        sum_total(conn, delivered().add(OrderCol::DeliveredAt.gte(start_of_month))),
        async {
            Ok::<_, AppError>(
                Orders::find()
                    .order_by_desc(OrderCol::CreatedAt)
                    .limit(DASHBOARD_LIST_LIMIT)
                    .all(conn)
                    .await?,
            )
        },
        async {
            Ok::<_, AppError>(
                Products::find()
                    .filter(ProdCol::CountInStock.lte(LOW_STOCK_THRESHOLD))
                    .order_by_asc(ProdCol::CountInStock)
                    .limit(DASHBOARD_LIST_LIMIT)
                    .all(conn)
                    .await?,
            )
        },
    )?;

    let owners = owners_by_id(conn, &recent).await?;
    let recent_orders = recent
        .into_iter()
        .map(|o| {
            let owner = owners.get(&o.user_id);
            OrderResponse::from_model(o, owner, origin.as_str())
        })
        .collect();

    let low_stock = low_stock
        .into_iter()
        .map(|p| LowStockProduct {
            id: p.id,
            name: p.name,
            count_in_stock: p.count_in_stock,
        })
        .collect();

    let stats = DashboardStats {
        totals: DashboardTotals {
            total_users,
            total_orders,
            total_products,
            total_sales,
        },
        status_counts: counts,
        sales: SalesWindow {
            today: sales_today,
            month: sales_month,
        },
        recent_orders,
        low_stock,
    };
    Ok(ApiResponse::success("Dashboard stats", stats, None))
}

pub async fn orders_csv(state: &AppState, user: &AuthUser) -> AppResult<String> {
    ensure_admin(user)?;
    let orders = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let owners = owners_by_id(&state.orm, &orders).await?;

    tracing::debug!(rows = orders.len(), "rendering orders report");
    Ok(render_orders_csv(
        orders.iter().map(|o| (o, owners.get(&o.user_id))),
    ))
}
