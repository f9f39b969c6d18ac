use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;
use vastra_store_api::{
    config::AppConfig,
    db::{OrmConn, create_orm_conn, run_migrations},
    domain::review::Reviews,
    entity::{
        Categories, Products, Users,
        categories, products,
        json::{IdList, SavedAddresses, StringList},
        users,
    },
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "Store Admin", "admin@example.com", "admin123", true).await?;
    let user_id = ensure_user(&orm, "Asha Customer", "user@example.com", "user123", false).await?;
    seed_catalog(&orm).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    orm: &OrmConn,
    name: &str,
    email: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?
    {
        users::ActiveModel {
            id: Set(existing.id),
            is_admin: Set(is_admin),
            ..Default::default()
        }
        .update(orm)
        .await?;
        println!("Ensured user {email} (admin={is_admin})");
        return Ok(existing.id);
    }

    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        is_admin: Set(is_admin),
        addresses: Set(SavedAddresses::default()),
        wishlist: Set(IdList::default()),
        reset_password_token: Set(None),
        reset_password_expires: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(orm)
    .await?;

    println!("Created user {email} (admin={is_admin})");
    Ok(user.id)
}

async fn ensure_category(orm: &OrmConn, name: &str) -> anyhow::Result<Uuid> {
    if let Some(existing) = Categories::find()
        .filter(categories::Column::Name.eq(name))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let now = Utc::now();
    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        image: Set(None),
        parent_category_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(orm)
    .await?;
    Ok(category.id)
}

async fn seed_catalog(orm: &OrmConn) -> anyhow::Result<()> {
    let sarees = ensure_category(orm, "Sarees").await?;
    let kurtas = ensure_category(orm, "Kurtas").await?;

    let catalog = [
        ("Banarasi Silk Saree", sarees, "Silk", 4999.0, Some(4499.0), 12, true, false),
        ("Cotton Handloom Saree", sarees, "Cotton", 1899.0, None, 30, false, true),
        ("Chikankari Kurta", kurtas, "Georgette", 1499.0, Some(1299.0), 4, true, true),
        ("Block Print Kurta", kurtas, "Cotton", 899.0, None, 50, false, false),
    ];

    for (name, category_id, fabric, price, discount, stock, featured, trending) in catalog {
        let exists = Products::find()
            .filter(products::Column::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let now = Utc::now();
        products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            images: Set(StringList::default()),
            description: Set(format!("{name} in {fabric}")),
            category_id: Set(category_id),
            price: Set(price),
            discount_price: Set(discount),
            count_in_stock: Set(stock),
            fabric: Set(Some(fabric.to_string())),
            sizes: Set(StringList(vec!["S".into(), "M".into(), "L".into()])),
            delivery_charges: Set(0.0),
            is_featured: Set(featured),
            is_trending: Set(trending),
            reviews: Set(Reviews::default()),
            rating: Set(0.0),
            num_reviews: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
