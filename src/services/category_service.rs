use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, SqlErr,
    ActiveValue::{Set, Unchanged},
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::categories::{CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest},
    entity::categories::{
        self, ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    response::ApiResponse,
    state::AppState,
};

/// Finds a category by id, or by case-insensitive exact name.
pub async fn resolve_category(state: &AppState, value: &str) -> AppResult<Option<categories::Model>> {
    let value = value.trim();
    if let Ok(id) = Uuid::parse_str(value) {
        return Ok(Categories::find_by_id(id).one(&state.orm).await?);
    }
    let found = Categories::find()
        .filter(Expr::expr(Func::lower(Expr::col(CategoryCol::Name))).eq(value.to_lowercase()))
        .one(&state.orm)
        .await?;
    Ok(found)
}

async fn ensure_name_free(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Categories::find().filter(CategoryCol::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(CategoryCol::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::bad_request("Category already exists"));
    }
    Ok(())
}

/// Parents must exist, differ from the child and be top-level themselves.
async fn validate_parent(state: &AppState, parent: Uuid, child: Option<Uuid>) -> AppResult<()> {
    if Some(parent) == child {
        return Err(AppError::bad_request("A category cannot be its own parent"));
    }
    let parent = Categories::find_by_id(parent)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::bad_request("Parent category not found"))?;
    if parent.parent_category_id.is_some() {
        return Err(AppError::bad_request(
            "Parent category must be a top-level category",
        ));
    }
    if let Some(child) = child {
        let has_children = Categories::find()
            .filter(CategoryCol::ParentCategoryId.eq(child))
            .one(&state.orm)
            .await?
            .is_some();
        if has_children {
            return Err(AppError::bad_request(
                "A category with subcategories cannot have a parent",
            ));
        }
    }
    Ok(())
}

fn map_unique(err: sea_orm::DbErr) -> AppError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return AppError::bad_request("Category already exists");
    }
    err.into()
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<Vec<CategoryResponse>>> {
    let categories = Categories::find()
        .order_by_desc(CategoryCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ApiResponse::success("Categories", categories, None))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<CategoryResponse>> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::bad_request("Category name is required"));
    }
    ensure_name_free(state, &name, None).await?;
    if let Some(parent) = payload.parent_category {
        validate_parent(state, parent, None).await?;
    }

    let now = Utc::now();
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        image: Set(blank_to_none(payload.image)),
        parent_category_id: Set(payload.parent_category),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await
    .map_err(map_unique)?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        "category_create",
        Some("categories".into()),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await;

    Ok(ApiResponse::success("Category created", category.into(), None))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<CategoryResponse>> {
    ensure_admin(user)?;
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

    let mut active = CategoryActive {
        id: Unchanged(existing.id),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    if let Some(name) = payload.name.map(|n| n.trim().to_string()) {
        if name.is_empty() {
            return Err(AppError::bad_request("Category name is required"));
        }
        if name != existing.name {
            ensure_name_free(state, &name, Some(id)).await?;
        }
        active.name = Set(name);
    }
    if let Some(image) = payload.image {
        active.image = Set(blank_to_none(Some(image)));
    }
    match payload.parent_category {
        Some(Some(parent)) => {
            validate_parent(state, parent, Some(id)).await?;
            active.parent_category_id = Set(Some(parent));
        }
        Some(None) => active.parent_category_id = Set(None),
        None => {}
    }

    let category = active.update(&state.orm).await.map_err(map_unique)?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        "category_update",
        Some("categories".into()),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await;

    Ok(ApiResponse::success("Category updated", category.into(), None))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    existing.delete(&state.orm).await?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        "category_delete",
        Some("categories".into()),
        Some(serde_json::json!({ "category_id": id })),
    )
    .await;

    Ok(ApiResponse::success("Category removed", (), None))
}
