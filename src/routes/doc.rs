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
        auth::{LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest, UserList},
        cart::{AddToCartRequest, CartItemDto, CartView},
        orders::{
            CreateOrderRequest, Customer, OrderLineRequest, OrderLineView, OrderList, OrderView,
            ProductSummary, UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateStockRequest},
        reviews::{AddReviewRequest, ReviewList, ReviewView, Reviewer},
    },
    models::{Address, Cart, LineItem, Order, Product, Review, User},
    response::{ApiResponse, Meta},
    routes::{cart, health, orders, products, reviews, users},
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
        users::register,
        users::login,
        users::get_profile,
        users::update_profile,
        users::list_users,
        users::delete_user,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_stock,
        products::delete_product,
        cart::get_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::create_order,
        orders::list_all_orders,
        orders::list_my_orders,
        orders::get_order,
        orders::update_order_status,
        reviews::list_reviews,
        reviews::add_review
    ),
    components(
        schemas(
            Address,
            User,
            Product,
            LineItem,
            Cart,
            Order,
            Review,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            UserList,
            CreateProductRequest,
            UpdateStockRequest,
            ProductList,
            AddToCartRequest,
            CartView,
            CartItemDto,
            CreateOrderRequest,
            OrderLineRequest,
            UpdateOrderStatusRequest,
            ProductSummary,
            Customer,
            OrderLineView,
            OrderView,
            OrderList,
            AddReviewRequest,
            Reviewer,
            ReviewView,
            ReviewList,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderView>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "Registration, login and profiles"),
        (name = "Products", description = "Product catalog"),
        (name = "Cart", description = "Per-user cart"),
        (name = "Orders", description = "Order placement and administration"),
        (name = "Reviews", description = "Product reviews"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
