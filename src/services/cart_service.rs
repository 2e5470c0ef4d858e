use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    dto::cart::{AddToCartRequest, CartItemDto, CartView},
    entity::{
        cart_items::{
            ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems,
            Model as CartItemModel,
        },
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult, is_unique_violation},
    middleware::auth::AuthUser,
    models::{Cart, Product},
    response::{ApiResponse, Meta},
    state::AppState,
};

async fn find_cart(orm: &OrmConn, user_id: Uuid) -> AppResult<Option<CartModel>> {
    Ok(Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(orm)
        .await?)
}

async fn cart_lines(orm: &OrmConn, cart_id: Uuid) -> AppResult<Vec<CartItemModel>> {
    Ok(CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .order_by_asc(CartItemCol::Position)
        .all(orm)
        .await?)
}

/// Inserts a fresh cart. A concurrent first add may win the unique `user_id`
/// slot; that cart is reused.
async fn create_cart(orm: &OrmConn, user_id: Uuid) -> AppResult<CartModel> {
    let now = Utc::now();
    let inserted = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(orm)
    .await;

    match inserted {
        Ok(cart) => Ok(cart),
        Err(err) if is_unique_violation(&err) => find_cart(orm, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cart")),
        Err(err) => Err(err.into()),
    }
}

async fn touch(orm: &OrmConn, cart: CartModel) -> AppResult<CartModel> {
    let mut active: CartActive = cart.into();
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(orm).await?)
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let Some(cart) = find_cart(&state.orm, user.user_id).await? else {
        return Ok(ApiResponse::success(
            "OK",
            CartView {
                id: None,
                items: Vec::new(),
            },
            Some(Meta::total(0)),
        ));
    };

    let lines = cart_lines(&state.orm, cart.id).await?;
    let product_ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
    let mut products: HashMap<Uuid, Product> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, Product::from(p)))
        .collect();

    let items: Vec<CartItemDto> = lines
        .into_iter()
        .map(|line| CartItemDto {
            product_id: line.product_id,
            // Repeated ids are merged on insert, so each product is taken once.
            product: products.remove(&line.product_id),
            quantity: line.quantity,
        })
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "OK",
        CartView {
            id: Some(cart.id),
            items,
        },
        Some(meta),
    ))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<Cart>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::not_found("Product"));
    }

    let cart = match find_cart(&state.orm, user.user_id).await? {
        Some(cart) => cart,
        None => create_cart(&state.orm, user.user_id).await?,
    };

    let lines = cart_lines(&state.orm, cart.id).await?;
    match lines.iter().find(|line| line.product_id == payload.product_id) {
        Some(line) => {
            let quantity = line.quantity.checked_add(payload.quantity).ok_or_else(|| {
                AppError::BadRequest("quantity exceeds the allowed maximum".to_string())
            })?;
            let mut active: CartItemActive = line.clone().into();
            active.quantity = Set(quantity);
            active.update(&state.orm).await?;
        }
        None => {
            let position = lines.iter().map(|line| line.position).max().unwrap_or(-1) + 1;
            CartItemActive {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(payload.product_id),
                quantity: Set(payload.quantity),
                position: Set(position),
            }
            .insert(&state.orm)
            .await?;
        }
    }

    let cart = touch(&state.orm, cart).await?;
    let lines = cart_lines(&state.orm, cart.id).await?;

    tracing::info!(
        user_id = %user.user_id,
        product_id = %payload.product_id,
        quantity = payload.quantity,
        "item added to cart"
    );

    Ok(ApiResponse::success(
        "Item added to cart",
        Cart::from_parts(cart, &lines),
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<Cart>> {
    let cart = find_cart(&state.orm, user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Cart"))?;

    let result = CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;

    let cart = touch(&state.orm, cart).await?;
    let lines = cart_lines(&state.orm, cart.id).await?;

    tracing::info!(
        user_id = %user.user_id,
        product_id = %product_id,
        removed = result.rows_affected,
        "item removed from cart"
    );

    Ok(ApiResponse::success(
        "Item removed from cart",
        Cart::from_parts(cart, &lines),
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if let Some(cart) = find_cart(&state.orm, user.user_id).await? {
        let txn = state.orm.begin().await?;
        CartItems::delete_many()
            .filter(CartItemCol::CartId.eq(cart.id))
            .exec(&txn)
            .await?;
        Carts::delete_by_id(cart.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(user_id = %user.user_id, cart_id = %cart.id, "cart cleared");
    }

    Ok(ApiResponse::success(
        "Cart cleared successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
