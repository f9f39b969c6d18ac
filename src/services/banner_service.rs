use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    ActiveValue::{Set, Unchanged},
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        banners::{BannerResponse, CreateBannerRequest, UpdateBannerRequest},
        common::flexible_list,
    },
    entity::{
        banners::{ActiveModel as BannerActive, Column as BannerCol, Entity as Banners},
        json::StringList,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    response::ApiResponse,
    state::AppState,
};

pub async fn list_active_banners(state: &AppState) -> AppResult<ApiResponse<Vec<BannerResponse>>> {
    let banners = Banners::find()
        .filter(BannerCol::IsActive.eq(true))
        .order_by_asc(BannerCol::DisplayOrder)
        .order_by_desc(BannerCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ApiResponse::success("Banners", banners, None))
}

pub async fn create_banner(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBannerRequest,
) -> AppResult<ApiResponse<BannerResponse>> {
    ensure_admin(user)?;
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::bad_request("Banner title is required"));
    }
    let images = flexible_list(payload.image_urls);
    if images.is_empty() {
        return Err(AppError::bad_request("At least one image is required"));
    }

    let now = Utc::now();
    let banner = BannerActive {
        id: Set(Uuid::new_v4()),
        images: Set(StringList(images)),
        title: Set(title),
        description: Set(payload.description),
        link: Set(payload.link),
        is_active: Set(payload.is_active.unwrap_or(true)),
        display_order: Set(payload.order.unwrap_or(0)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        "banner_create",
        Some("banners".into()),
        Some(serde_json::json!({ "banner_id": banner.id })),
    )
    .await;

    Ok(ApiResponse::success("Banner created", banner.into(), None))
}

pub async fn update_banner(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBannerRequest,
) -> AppResult<ApiResponse<BannerResponse>> {
    ensure_admin(user)?;
    let existing = Banners::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Banner"))?;

    let mut images = existing.images.clone();
    images.remove_all(&flexible_list(payload.remove_images));
    images.extend_unique(flexible_list(payload.image_urls));

    let mut active = BannerActive {
        id: Unchanged(existing.id),
        images: Set(images),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };
    if let Some(title) = payload.title.map(|t| t.trim().to_string()) {
        if title.is_empty() {
            return Err(AppError::bad_request("Banner title is required"));
        }
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(link) = payload.link {
        active.link = Set(Some(link));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(order) = payload.order {
        active.display_order = Set(order);
    }

    let banner = active.update(&state.orm).await?;
    Ok(ApiResponse::success("Banner updated", banner.into(), None))
}

pub async fn delete_banner(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let existing = Banners::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Banner"))?;
    existing.delete(&state.orm).await?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        "banner_delete",
        Some("banners".into()),
        Some(serde_json::json!({ "banner_id": id })),
    )
    .await;

    Ok(ApiResponse::success("Banner removed", (), None))
}
