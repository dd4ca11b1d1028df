use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;
use variant_inventory_core::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{categories, media, products, variants},
    repository,
};

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price_cents: i64,
    sku: &'static str,
    image_url: &'static str,
    variants: &'static [(&'static str, &'static str, i32)],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let dresses = ensure_category(&orm, "Vestidos", "Vestidos elegantes y casuales").await?;
    let blouses = ensure_category(&orm, "Blusas", "Blusas para toda ocasión").await?;
    let trousers = ensure_category(&orm, "Pantalones", "Pantalones cómodos y elegantes").await?;

    let seeded = [
        (
            dresses,
            SeedProduct {
                name: "Vestido Elegante",
                description: "Hermoso vestido con estampado floral para ocasiones especiales",
                price_cents: 14999,
                sku: "VEST-002",
                image_url: "https://th.bing.com/th/id/OIP.Q4_BNNZEr5rEmYew_6JfCgHaJQ?w=197&h=246&c=7&r=0&o=7&pid=1.7&rm=3",
                variants: &[("S", "Floral", 2), ("M", "Floral", 5), ("L", "Floral", 8)],
            },
        ),
        (
            blouses,
            SeedProduct {
                name: "Blusa Casual Moderna",
                description: "Blusa cómoda y elegante para uso diario",
                price_cents: 4500,
                sku: "BLUS-002",
                image_url: "https://th.bing.com/th/id/OIP.Rom95X4a0_QKCw7w7eZbJAHaLG?w=197&h=296&c=7&r=0&o=7&pid=1.7&rm=3",
                variants: &[("S", "Blanco", 20), ("M", "Blanco", 25), ("L", "Blanco", 12)],
            },
        ),
        (
            trousers,
            SeedProduct {
                name: "Pantalón Casual Elegante",
                description: "Pantalón cómodo para toda ocasión",
                price_cents: 7999,
                sku: "PANT-002",
                image_url: "https://i5.walmartimages.com.mx/mg/gm/1p/images/product-images/img_large/00750193047030l.jpg?odnHeight=612&odnWidth=612&odnBg=FFFFFF",
                variants: &[
                    ("28", "Beige", 15),
                    ("30", "Beige", 18),
                    ("32", "Beige", 10),
                    ("34", "Beige", 7),
                ],
            },
        ),
    ];

    let mut created = 0;
    for (category_id, product) in &seeded {
        if seed_product(&orm, *category_id, product).await? {
            created += 1;
        }
    }

    println!("Seed completed. Products created: {created}");
    Ok(())
}

async fn ensure_category(
    orm: &DatabaseConnection,
    name: &str,
    description: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = repository::categories::find_by_name(orm, name).await? {
        return Ok(existing.id);
    }
    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(Some(description.to_string())),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;
    Ok(category.id)
}

/// Returns `false` when a product with the same SKU is already present.
async fn seed_product(
    orm: &DatabaseConnection,
    category_id: Uuid,
    seed: &SeedProduct,
) -> anyhow::Result<bool> {
    if repository::products::find_by_sku(orm, seed.sku).await?.is_some() {
        return Ok(false);
    }

    let now = Utc::now();
    let product = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(seed.name.to_string()),
        description: Set(Some(seed.description.to_string())),
        price: Set(Decimal::new(seed.price_cents, 2)),
        sku: Set(seed.sku.to_string()),
        category_id: Set(category_id),
        created_at: Set(now.into()),
    }
    .insert(orm)
    .await?;

    for &(size, color, stock) in seed.variants {
        variants::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            size: Set(size.to_string()),
            color: Set(color.to_string()),
            stock: Set(stock),
            in_stock: Set(variants::in_stock_for(stock)),
            created_at: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    media::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        url: Set(seed.image_url.to_string()),
        is_image: Set(true),
        sort_order: Set(0),
        created_at: Set(now.into()),
    }
    .insert(orm)
    .await?;

    Ok(true)
}
