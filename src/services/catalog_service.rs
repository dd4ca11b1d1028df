use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, LoaderTrait, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{
        AddMediaRequest, CreateCategoryRequest, CreateProductRequest, CreateVariantRequest,
        UpdateCategoryRequest, UpdateMediaRequest, UpdateProductRequest, UpdateVariantRequest,
    },
    entity::{
        categories::ActiveModel as CategoryActive, media::ActiveModel as MediaActive,
        products::ActiveModel as ProductActive, variants::ActiveModel as VariantActive,
        variants::in_stock_for, Categories, Media as MediaEntity, Variants,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Media, Product, ProductDetails, Variant},
    repository::{categories, media, products, variants},
    state::AppState,
};

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<Category> {
    ensure_admin(user)?;
    let name = required("name", payload.name)?;
    if categories::find_by_name(&state.orm, &name).await?.is_some() {
        return Err(AppError::Duplicate(format!("category name '{name}'")));
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.clone()),
        description: Set(payload.description),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::from_constraint(e, || AppError::Duplicate(format!("category name '{name}'"))))?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(category.into())
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<Category> {
    categories::find_by_id(&state.orm, id)
        .await?
        .map(Category::from)
        .ok_or(AppError::NotFound("category"))
}

pub async fn list_categories(state: &AppState) -> AppResult<Vec<Category>> {
    Ok(categories::list(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect())
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<Category> {
    ensure_admin(user)?;
    let existing = categories::find_by_id(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound("category"))?;

    let mut active: CategoryActive = existing.into();
    if let Some(name) = payload.name {
        let name = required("name", name)?;
        if let Some(other) = categories::find_by_name(&state.orm, &name).await? {
            if other.id != id {
                return Err(AppError::Duplicate(format!("category name '{name}'")));
            }
        }
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }

    let category = active
        .update(&state.orm)
        .await
        .map_err(|e| AppError::from_constraint(e, || AppError::Duplicate("category name".into())))?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_update",
        "categories",
        serde_json::json!({ "category_id": category.id, "name": category.name }),
    )
    .await;

    Ok(category.into())
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<Product> {
    ensure_admin(user)?;
    let name = required("name", payload.name)?;
    let sku = required("sku", payload.sku)?;
    validate_price(payload.price)?;

    if categories::find_by_id(&state.orm, payload.category_id).await?.is_none() {
        return Err(AppError::NotFound("category"));
    }
    if products::find_by_sku(&state.orm, &sku).await?.is_some() {
        return Err(AppError::Duplicate(format!("sku '{sku}'")));
    }

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(payload.description),
        price: Set(payload.price),
        sku: Set(sku.clone()),
        category_id: Set(payload.category_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::from_constraint(e, || AppError::Duplicate(format!("sku '{sku}'"))))?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id, "sku": product.sku }),
    )
    .await;

    Ok(product.into())
}

/// Partial update. A price change affects future orders only; placed order
/// lines keep the unit price captured at placement.
pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<Product> {
    ensure_admin(user)?;
    let existing = products::find_by_id(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound("product"))?;

    let mut active: ProductActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(required("name", name)?);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(category_id) = payload.category_id {
        if categories::find_by_id(&state.orm, category_id).await?.is_none() {
            return Err(AppError::NotFound("category"));
        }
        active.category_id = Set(category_id);
    }

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id, "price": product.price }),
    )
    .await;

    Ok(product.into())
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ProductDetails> {
    let product = products::find_by_id(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound("product"))?;
    let category = categories::find_by_id(&state.orm, product.category_id).await?;
    let variants = variants::list_for_product(&state.orm, id).await?;
    let media = media::list_for_product(&state.orm, id).await?;

    Ok(ProductDetails {
        product: product.into(),
        category: category.map(Category::from),
        variants: variants.into_iter().map(Variant::from).collect(),
        media: media.into_iter().map(Media::from).collect(),
    })
}

/// Every product with its category, variants and media attached.
pub async fn list_products(state: &AppState) -> AppResult<Vec<ProductDetails>> {
    let products = products::list(&state.orm).await?;
    let categories = products.load_one(Categories, &state.orm).await?;
    let variants = products.load_many(Variants, &state.orm).await?;
    let media = products.load_many(MediaEntity, &state.orm).await?;

    let items = products
        .into_iter()
        .zip(categories)
        .zip(variants.into_iter().zip(media))
        .map(|((product, category), (variants, mut media))| {
            media.sort_by_key(|m| m.sort_order);
            ProductDetails {
                product: product.into(),
                category: category.map(Category::from),
                variants: variants.into_iter().map(Variant::from).collect(),
                media: media.into_iter().map(Media::from).collect(),
            }
        })
        .collect();

    Ok(items)
}

pub async fn create_variant(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateVariantRequest,
) -> AppResult<Variant> {
    ensure_admin(user)?;
    let size = required("size", payload.size)?;
    let color = required("color", payload.color)?;
    if payload.stock < 0 {
        return Err(AppError::Validation("stock must be >= 0".into()));
    }
    if products::find_by_id(&state.orm, product_id).await?.is_none() {
        return Err(AppError::NotFound("product"));
    }
    if variants::find_by_triple(&state.orm, product_id, &size, &color)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateVariant {
            product_id,
            size,
            color,
        });
    }

    let duplicate = {
        let (size, color) = (size.clone(), color.clone());
        move || AppError::DuplicateVariant {
            product_id,
            size,
            color,
        }
    };
    let variant = VariantActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        size: Set(size),
        color: Set(color),
        stock: Set(payload.stock),
        in_stock: Set(in_stock_for(payload.stock)),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::from_constraint(e, duplicate))?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "variant_create",
        "variants",
        serde_json::json!({ "variant_id": variant.id, "product_id": product_id }),
    )
    .await;

    Ok(variant.into())
}

/// Rename a variant's size or color. Stock is only changed through the
/// inventory operations.
pub async fn update_variant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateVariantRequest,
) -> AppResult<Variant> {
    ensure_admin(user)?;
    let existing = variants::find_by_id(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound("variant"))?;

    let size = match payload.size {
        Some(size) => required("size", size)?,
        None => existing.size.clone(),
    };
    let color = match payload.color {
        Some(color) => required("color", color)?,
        None => existing.color.clone(),
    };
    let product_id = existing.product_id;

    if let Some(other) = variants::find_by_triple(&state.orm, product_id, &size, &color).await? {
        if other.id != id {
            return Err(AppError::DuplicateVariant {
                product_id,
                size,
                color,
            });
        }
    }

    let mut active: VariantActive = existing.into();
    active.size = Set(size.clone());
    active.color = Set(color.clone());
    let variant = active.update(&state.orm).await.map_err(|e| {
        AppError::from_constraint(e, || AppError::DuplicateVariant {
            product_id,
            size,
            color,
        })
    })?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "variant_update",
        "variants",
        serde_json::json!({
            "variant_id": variant.id,
            "size": variant.size,
            "color": variant.color,
        }),
    )
    .await;

    Ok(variant.into())
}

pub async fn get_variant(state: &AppState, id: Uuid) -> AppResult<Variant> {
    variants::find_by_id(&state.orm, id)
        .await?
        .map(Variant::from)
        .ok_or(AppError::NotFound("variant"))
}

pub async fn find_variant(
    state: &AppState,
    product_id: Uuid,
    size: &str,
    color: &str,
) -> AppResult<Option<Variant>> {
    Ok(variants::find_by_triple(&state.orm, product_id, size, color)
        .await?
        .map(Variant::from))
}

pub async fn list_variants(state: &AppState, product_id: Uuid) -> AppResult<Vec<Variant>> {
    if products::find_by_id(&state.orm, product_id).await?.is_none() {
        return Err(AppError::NotFound("product"));
    }
    Ok(variants::list_for_product(&state.orm, product_id)
        .await?
        .into_iter()
        .map(Variant::from)
        .collect())
}

pub async fn add_media(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: AddMediaRequest,
) -> AppResult<Media> {
    ensure_admin(user)?;
    let url = required("url", payload.url)?;
    if products::find_by_id(&state.orm, product_id).await?.is_none() {
        return Err(AppError::NotFound("product"));
    }

    let media = MediaActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        url: Set(url),
        is_image: Set(payload.is_image),
        sort_order: Set(payload.order),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "media_create",
        "media",
        serde_json::json!({ "media_id": media.id, "product_id": product_id }),
    )
    .await;

    Ok(media.into())
}

pub async fn get_media(state: &AppState, id: Uuid) -> AppResult<Media> {
    media::find_by_id(&state.orm, id)
        .await?
        .map(Media::from)
        .ok_or(AppError::NotFound("media"))
}

/// Partial update; `order` moves the item within its product's display order.
pub async fn update_media(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMediaRequest,
) -> AppResult<Media> {
    ensure_admin(user)?;
    let existing = media::find_by_id(&state.orm, id)
        .await?
        .ok_or(AppError::NotFound("media"))?;

    let mut active: MediaActive = existing.into();
    if let Some(url) = payload.url {
        active.url = Set(required("url", url)?);
    }
    if let Some(is_image) = payload.is_image {
        active.is_image = Set(is_image);
    }
    if let Some(order) = payload.order {
        active.sort_order = Set(order);
    }

    let media = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "media_update",
        "media",
        serde_json::json!({ "media_id": media.id, "order": media.sort_order }),
    )
    .await;

    Ok(media.into())
}

pub async fn list_media(state: &AppState, product_id: Uuid) -> AppResult<Vec<Media>> {
    Ok(media::list_for_product(&state.orm, product_id)
        .await?
        .into_iter()
        .map(Media::from)
        .collect())
}

fn required(field: &str, value: String) -> AppResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(value)
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price < Decimal::ZERO {
        return Err(AppError::Validation("price must be >= 0".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("size", "  M ".into()).unwrap(), "M");
        assert!(matches!(required("color", "   ".into()), Err(AppError::Validation(_))));
    }

    #[test]
    fn price_must_not_be_negative() {
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::new(14999, 2)).is_ok());
        assert!(matches!(
            validate_price(Decimal::new(-1, 2)),
            Err(AppError::Validation(_))
        ));
    }
}
