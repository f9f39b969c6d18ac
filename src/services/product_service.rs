use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    ActiveValue::{Set, Unchanged},
    sea_query::{Expr, LockType, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    domain::review::{Review, Reviewer, Reviews},
    dto::{
        common::{flexible_list, meaningful, page_number},
        products::{
            CreateProductRequest, ProductList, ProductListQuery, ProductResponse, ReviewRequest,
            UpdateProductRequest,
        },
    },
    entity::{
        categories::{self, Column as CategoryCol, Entity as Categories},
        json::StringList,
        products::{self, ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    services::category_service::resolve_category,
    state::AppState,
};

pub const PAGE_SIZE: u64 = 12;

fn flag_requested(value: Option<&str>) -> bool {
    matches!(meaningful(value), Some(v) if v != "false" && v != "0")
}

async fn categories_by_id(
    state: &AppState,
    ids: impl IntoIterator<Item = Uuid>,
) -> AppResult<HashMap<Uuid, categories::Model>> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let found = Categories::find()
        .filter(CategoryCol::Id.is_in(ids))
        .all(&state.orm)
        .await?;
    Ok(found.into_iter().map(|c| (c.id, c)).collect())
}

async fn to_response(state: &AppState, product: products::Model) -> AppResult<ProductResponse> {
    let category = Categories::find_by_id(product.category_id)
        .one(&state.orm)
        .await?;
    Ok(ProductResponse::from_model(product, category.as_ref()))
}

pub async fn list_products(
    state: &AppState,
    query: ProductListQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let page = page_number(query.page_number, PAGE_SIZE);
    let mut condition = Condition::all();

    if let Some(keyword) = meaningful(query.keyword.as_deref()) {
        condition = condition.add(Expr::col(ProdCol::Name).ilike(format!("%{keyword}%")));
    }

    if let Some(raw) = meaningful(query.category.as_deref()) {
        match Uuid::parse_str(raw) {
            Ok(id) => condition = condition.add(ProdCol::CategoryId.eq(id)),
            Err(_) => match resolve_category(state, raw).await? {
                Some(category) => condition = condition.add(ProdCol::CategoryId.eq(category.id)),
                None => {
                    let meta = Meta::new(page as i64, PAGE_SIZE as i64, 0);
                    let data = ProductList { products: vec![] };
                    return Ok(ApiResponse::success("Products", data, Some(meta)));
                }
            },
        }
    }

    if flag_requested(query.featured.as_deref()) {
        condition = condition.add(ProdCol::IsFeatured.eq(true));
    }
    if flag_requested(query.trending.as_deref()) {
        condition = condition.add(ProdCol::IsTrending.eq(true));
    }
    if let Some(min) = query.min_price.filter(|p| *p != 0.0 && p.is_finite()) {
        condition = condition.add(ProdCol::Price.gte(min));
    }
    if let Some(max) = query.max_price.filter(|p| *p != 0.0 && p.is_finite()) {
        condition = condition.add(ProdCol::Price.lte(max));
    }

    let paginator = Products::find()
        .filter(condition)
        .order_by_desc(ProdCol::CreatedAt)
        .paginate(&state.orm, PAGE_SIZE);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;

    let categories = categories_by_id(state, items.iter().map(|p| p.category_id)).await?;
    let products = items
        .into_iter()
        .map(|p| {
            let category = categories.get(&p.category_id);
            ProductResponse::from_model(p, category)
        })
        .collect();

    let meta = Meta::new(page as i64, PAGE_SIZE as i64, total as i64);
    Ok(ApiResponse::success(
        "Products",
        ProductList { products },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductResponse>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    let resp = to_response(state, product).await?;
    Ok(ApiResponse::success("Product", resp, None))
}

async fn category_id_for(state: &AppState, value: &str) -> AppResult<Uuid> {
    resolve_category(state, value)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| AppError::bad_request("Invalid category"))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductResponse>> {
    ensure_admin(user)?;
    let name = meaningful(payload.name.as_deref()).map(str::to_string);
    let description = meaningful(payload.description.as_deref()).map(str::to_string);
    let category = meaningful(payload.category.as_deref()).map(str::to_string);
    let (Some(name), Some(description), Some(category), Some(price), Some(count_in_stock)) = (
        name,
        description,
        category,
        payload.price,
        payload.count_in_stock,
    ) else {
        return Err(AppError::bad_request(
            "name, description, category, price, countInStock are required",
        ));
    };

    let category_id = category_id_for(state, &category).await?;

    let now = Utc::now();
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        images: Set(StringList(flexible_list(payload.image_urls))),
        description: Set(description),
        category_id: Set(category_id),
        price: Set(price),
        discount_price: Set(payload.discount_price),
        count_in_stock: Set(count_in_stock),
        fabric: Set(payload.fabric),
        sizes: Set(StringList(flexible_list(payload.sizes))),
        delivery_charges: Set(payload.delivery_charges.unwrap_or(0.0)),
        is_featured: Set(payload.is_featured.unwrap_or(false)),
        is_trending: Set(payload.is_trending.unwrap_or(false)),
        reviews: Set(Reviews::default()),
        rating: Set(0.0),
        num_reviews: Set(0),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        "product_create",
        Some("products".into()),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await;

    let resp = to_response(state, product).await?;
    Ok(ApiResponse::success("Product created", resp, None))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductResponse>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let mut images = existing.images.clone();
    images.remove_all(&flexible_list(payload.remove_images));
    images.extend_unique(flexible_list(payload.image_urls));

    let mut active = ProductActive {
        id: Unchanged(existing.id),
        images: Set(images),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    if let Some(name) = meaningful(payload.name.as_deref()) {
        active.name = Set(name.to_string());
    }
    if let Some(description) = meaningful(payload.description.as_deref()) {
        active.description = Set(description.to_string());
    }
    if let Some(category) = meaningful(payload.category.as_deref()) {
        active.category_id = Set(category_id_for(state, category).await?);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(discount_price) = payload.discount_price {
        active.discount_price = Set(Some(discount_price));
    }
    if let Some(count) = payload.count_in_stock {
        active.count_in_stock = Set(count);
    }
    if let Some(fabric) = payload.fabric {
        active.fabric = Set(Some(fabric));
    }
    if let Some(sizes) = payload.sizes {
        active.sizes = Set(StringList(sizes.into_vec()));
    }
    if let Some(charges) = payload.delivery_charges {
        active.delivery_charges = Set(charges);
    }
    if let Some(featured) = payload.is_featured {
        active.is_featured = Set(featured);
    }
    if let Some(trending) = payload.is_trending {
        active.is_trending = Set(trending);
    }

    let product = active.update(&state.orm).await?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        "product_update",
        Some("products".into()),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await;

    let resp = to_response(state, product).await?;
    Ok(ApiResponse::success("Product updated", resp, None))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    existing.delete(&state.orm).await?;

    log_audit(
        &state.orm,
        Some(user.user_id),
        "product_delete",
        Some("products".into()),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await;

    Ok(ApiResponse::success("Product removed", (), None))
}

/// Runs `f` on the product's reviews under a row lock and stores the result
/// together with the recomputed rating.
async fn mutate_reviews<T, F>(state: &AppState, product_id: Uuid, f: F) -> AppResult<T>
where
    F: FnOnce(&mut Reviews) -> AppResult<T>,
{
    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(product_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let mut reviews = product.reviews;
    let out = f(&mut reviews)?;
    let (rating, num_reviews) = reviews.summarize();

    ProductActive {
        id: Unchanged(product.id),
        reviews: Set(reviews),
        rating: Set(rating),
        num_reviews: Set(num_reviews),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;
    Ok(out)
}

fn review_input(payload: &ReviewRequest) -> AppResult<(i32, String)> {
    match (payload.rating, payload.comment.as_deref()) {
        (Some(rating), Some(comment)) if rating != 0 && !comment.trim().is_empty() => {
            Ok((rating, comment.to_string()))
        }
        _ => Err(AppError::bad_request("Rating and comment are required")),
    }
}

pub async fn add_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: ReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let (rating, comment) = review_input(&payload)?;
    let author = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let now = Utc::now();
    let review = mutate_reviews(state, product_id, |reviews| {
        let added = reviews.add(user.user_id, &author.name, rating, &comment, now)?;
        Ok(added.clone())
    })
    .await?;

    Ok(ApiResponse::success("Review added", review, None))
}

pub async fn update_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    review_id: Uuid,
    payload: ReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let (rating, comment) = review_input(&payload)?;
    let by = Reviewer {
        user_id: user.user_id,
        is_admin: user.is_admin,
    };
    let now = Utc::now();
    let review = mutate_reviews(state, product_id, |reviews| {
        let edited = reviews.edit(review_id, by, rating, &comment, now)?;
        Ok(edited.clone())
    })
    .await?;

    Ok(ApiResponse::success("Review updated", review, None))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    review_id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let by = Reviewer {
        user_id: user.user_id,
        is_admin: user.is_admin,
    };
    mutate_reviews(state, product_id, |reviews| {
        reviews.remove(review_id, by)?;
        Ok(())
    })
    .await?;

    Ok(ApiResponse::success("Review removed", (), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_flags_follow_query_truthiness() {
        assert!(flag_requested(Some("true")));
        assert!(flag_requested(Some("1")));
        assert!(!flag_requested(Some("false")));
        assert!(!flag_requested(Some("")));
        assert!(!flag_requested(None));
    }

    #[test]
    fn reviews_need_rating_and_comment() {
        let missing = ReviewRequest {
            rating: Some(4),
            comment: None,
        };
        assert_eq!(
            review_input(&missing).unwrap_err().to_string(),
            "Rating and comment are required"
        );
        let ok = ReviewRequest {
            rating: Some(4),
            comment: Some("Lovely fabric".into()),
        };
        assert_eq!(review_input(&ok).unwrap(), (4, "Lovely fabric".to_string()));
    }
}
