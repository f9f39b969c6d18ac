use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::FlexibleList;
use crate::entity::banners;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBannerRequest {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
    #[schema(value_type = Option<Vec<String>>)]
    pub image_urls: Option<FlexibleList>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBannerRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
    #[schema(value_type = Option<Vec<String>>)]
    pub remove_images: Option<FlexibleList>,
    #[schema(value_type = Option<Vec<String>>)]
    pub image_urls: Option<FlexibleList>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BannerResponse {
    pub id: Uuid,
    pub images: Vec<String>,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub is_active: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<banners::Model> for BannerResponse {
    fn from(banner: banners::Model) -> Self {
        Self {
            id: banner.id,
            images: banner.images.0,
            title: banner.title,
            description: banner.description,
            link: banner.link,
            is_active: banner.is_active,
            order: banner.display_order,
            created_at: banner.created_at.with_timezone(&Utc),
            updated_at: banner.updated_at.with_timezone(&Utc),
        }
    }
}
