use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    cart_items::Model as CartItemModel, carts::Model as CartModel,
    order_items::Model as OrderItemModel, orders::Model as OrderModel,
    products::Model as ProductModel, reviews::Model as ReviewModel, users::Model as UserModel,
};

pub const ORDER_STATUS_PENDING: &str = "Pending";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// A user as exposed over the API. The password hash never leaves the
/// entity layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub mobile: Option<String>,
    pub address: Address,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub stock: i32,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<LineItem>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub products: Vec<LineItem>,
    pub total_amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: model.id,
            name: model.name,
            email: model.email,
            is_admin: model.is_admin,
            mobile: model.mobile,
            address: Address {
                street: model.street,
                city: model.city,
                state: model.state,
                zip_code: model.zip_code,
                country: model.country,
            },
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<ProductModel> for Product {
    fn from(model: ProductModel) -> Self {
        Product {
            id: model.id,
            name: model.name,
            price: model.price,
            description: model.description,
            category: model.category,
            stock: model.stock,
            image: model.image,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<&CartItemModel> for LineItem {
    fn from(model: &CartItemModel) -> Self {
        LineItem {
            product_id: model.product_id,
            quantity: model.quantity,
        }
    }
}

impl From<&OrderItemModel> for LineItem {
    fn from(model: &OrderItemModel) -> Self {
        LineItem {
            product_id: model.product_id,
            quantity: model.quantity,
        }
    }
}

impl Cart {
    pub fn from_parts(cart: CartModel, items: &[CartItemModel]) -> Self {
        Cart {
            id: cart.id,
            user_id: cart.user_id,
            items: items.iter().map(LineItem::from).collect(),
            updated_at: cart.updated_at.with_timezone(&Utc),
        }
    }
}

impl Order {
    pub fn from_parts(order: OrderModel, items: &[OrderItemModel]) -> Self {
        Order {
            id: order.id,
            user_id: order.user_id,
            products: items.iter().map(LineItem::from).collect(),
            total_amount: order.total_amount,
            status: order.status,
            created_at: order.created_at.with_timezone(&Utc),
        }
    }
}

impl From<ReviewModel> for Review {
    fn from(model: ReviewModel) -> Self {
        Review {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
