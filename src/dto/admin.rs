use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::orders::{OrderResponse, StatusCounts};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub total_users: u64,
    pub total_orders: u64,
    pub total_products: u64,
    pub total_sales: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesWindow {
    pub today: f64,
    pub month: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub id: Uuid,
    pub name: String,
    pub count_in_stock: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub totals: DashboardTotals,
    pub status_counts: StatusCounts,
    pub sales: SalesWindow,
    pub recent_orders: Vec<OrderResponse>,
    pub low_stock: Vec<LowStockProduct>,
}
