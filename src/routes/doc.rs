use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        catalog::{
            AddMediaRequest, CreateCategoryRequest, CreateProductRequest, CreateVariantRequest,
            UpdateCategoryRequest, UpdateMediaRequest, UpdateProductRequest, UpdateVariantRequest,
        },
        customers::CreateCustomerRequest,
        inventory::{SetStockRequest, StockQuantityRequest},
        orders::{AdvanceOrderRequest, OrderLineRequest, PlaceOrderRequest},
    },
    entity::orders::OrderStatus,
    models::{
        Category, Customer, DeletedProduct, Media, Order, OrderLine, OrderWithLines, Product,
        ProductDetails, Variant,
    },
    response::Meta,
    routes::{catalog, customers, health, inventory, orders},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        catalog::list_categories,
        catalog::create_category,
        catalog::get_category,
        catalog::update_category,
        catalog::delete_category,
        catalog::list_products,
        catalog::create_product,
        catalog::get_product,
        catalog::update_product,
        catalog::delete_product,
        catalog::list_variants,
        catalog::create_variant,
        catalog::get_variant,
        catalog::update_variant,
        catalog::list_media,
        catalog::add_media,
        catalog::get_media,
        catalog::update_media,
        inventory::list_low_stock,
        inventory::deduct_stock,
        inventory::restock,
        inventory::set_stock,
        orders::list_orders,
        orders::place_order,
        orders::get_order,
        orders::cancel_order,
        orders::advance_order,
        customers::create_customer,
        customers::get_customer,
        customers::delete_customer,
        customers::list_customer_orders
    ),
    components(
        schemas(
            Category,
            Product,
            ProductDetails,
            Variant,
            Media,
            Customer,
            Order,
            OrderLine,
            OrderWithLines,
            OrderStatus,
            DeletedProduct,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CreateProductRequest,
            UpdateProductRequest,
            CreateVariantRequest,
            UpdateVariantRequest,
            AddMediaRequest,
            UpdateMediaRequest,
            StockQuantityRequest,
            SetStockRequest,
            OrderLineRequest,
            PlaceOrderRequest,
            AdvanceOrderRequest,
            CreateCustomerRequest,
            Meta
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Categories, products, variants and media"),
        (name = "Inventory", description = "Variant stock management"),
        (name = "Orders", description = "Order placement and lifecycle"),
        (name = "Customers", description = "Customer records"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_api_path_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/catalog/products/{id}",
            "/api/catalog/media/{id}",
            "/api/inventory/variants/{id}/deduct",
            "/api/orders",
            "/api/orders/{id}/cancel",
            "/api/customers/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
