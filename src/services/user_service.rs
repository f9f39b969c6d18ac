use sea_orm::{
    Condition, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        common::page_window,
        users::{UserList, UserListQuery},
    },
    entity::users::{Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit) = page_window(query.page, query.limit, 20);

    let mut finder = Users::find();
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{q}%");
        finder = finder.filter(
            Condition::any()
                .add(Expr::col(UserCol::Name).ilike(pattern.as_str()))
                .add(Expr::col(UserCol::Email).ilike(pattern.as_str())),
        );
    }

    let paginator = finder
        .order_by_desc(UserCol::CreatedAt)
        .paginate(&state.orm, limit);
    let total = paginator.num_items().await?;
    let users = paginator
        .fetch_page(page - 1)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let meta = Meta::new(page as i64, limit as i64, total as i64);
    Ok(ApiResponse::success("Users", UserList { users }, Some(meta)))
}

pub async fn delete_user(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    existing.delete(&state.orm).await?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        "user_delete",
        Some("users".into()),
        Some(serde_json::json!({ "user_id": id })),
    )
    .await;

    Ok(ApiResponse::success("User removed", (), None))
}
