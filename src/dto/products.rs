use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::FlexibleList;
use crate::{
    domain::review::Review,
    entity::{categories, products},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub featured: Option<String>,
    pub trending: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub page_number: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Category id or exact category name.
    pub category: Option<String>,
    pub price: Option<f64>,
    pub discount_price: Option<f64>,
    pub count_in_stock: Option<i32>,
    pub fabric: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub sizes: Option<FlexibleList>,
    pub delivery_charges: Option<f64>,
    pub is_featured: Option<bool>,
    pub is_trending: Option<bool>,
    #[schema(value_type = Option<Vec<String>>)]
    pub image_urls: Option<FlexibleList>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub discount_price: Option<f64>,
    pub count_in_stock: Option<i32>,
    pub fabric: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub sizes: Option<FlexibleList>,
    pub delivery_charges: Option<f64>,
    pub is_featured: Option<bool>,
    pub is_trending: Option<bool>,
    #[schema(value_type = Option<Vec<String>>)]
    pub remove_images: Option<FlexibleList>,
    #[schema(value_type = Option<Vec<String>>)]
    pub image_urls: Option<FlexibleList>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub images: Vec<String>,
    pub description: String,
    pub category: CategoryRef,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub count_in_stock: i32,
    pub fabric: Option<String>,
    pub sizes: Vec<String>,
    pub delivery_charges: f64,
    pub is_featured: bool,
    pub is_trending: bool,
    pub reviews: Vec<Review>,
    pub rating: f64,
    pub num_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn from_model(product: products::Model, category: Option<&categories::Model>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            images: product.images.0,
            description: product.description,
            category: CategoryRef {
                id: product.category_id,
                name: category.map(|c| c.name.clone()),
            },
            price: product.price,
            discount_price: product.discount_price,
            count_in_stock: product.count_in_stock,
            fabric: product.fabric,
            sizes: product.sizes.0,
            delivery_charges: product.delivery_charges,
            is_featured: product.is_featured,
            is_trending: product.is_trending,
            reviews: product.reviews.0,
            rating: product.rating,
            num_reviews: product.num_reviews,
            created_at: product.created_at.with_timezone(&Utc),
            updated_at: product.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub products: Vec<ProductResponse>,
}
