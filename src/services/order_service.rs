use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    dto::orders::{
        CreateOrderRequest, Customer, OrderLineView, OrderList, OrderView, ProductSummary,
        UpdateOrderStatusRequest,
    },
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_owner_or_admin},
    models::{Address, ORDER_STATUS_PENDING, Order},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// How much of the referenced records an order listing resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Population {
    /// Line products as name and price.
    Owner,
    /// Customer name/email/address, line products with description.
    Admin,
}

/// Round half away from zero to two decimal places.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    if payload.products.is_empty() {
        return Err(AppError::BadRequest(
            "Order must contain at least one product".into(),
        ));
    }
    if payload.products.iter().any(|line| line.quantity <= 0) {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".into(),
        ));
    }

    let ids: Vec<Uuid> = payload
        .products
        .iter()
        .map(|line| line.product_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    // Every product must resolve before anything is written.
    let mut total = 0.0;
    for line in &payload.products {
        let product = products.get(&line.product_id).ok_or_else(|| {
            AppError::NotFound(format!("Product with ID {} not found", line.product_id))
        })?;
        total += product.price * f64::from(line.quantity);
    }
    let total_amount = round_to_cents(total);

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        total_amount: Set(total_amount),
        status: Set(ORDER_STATUS_PENDING.into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItemModel> = Vec::with_capacity(payload.products.len());
    for (position, line) in payload.products.iter().enumerate() {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            position: Set(position as i32),
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        total_amount,
        "order placed"
    );

    Ok(ApiResponse::success(
        "Order placed",
        Order::from_parts(order, &items),
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let orders = Orders::find()
        .order_by_asc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = populate(&state.orm, orders, Population::Admin).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn list_user_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_asc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = populate(&state.orm, orders, Population::Owner).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    ensure_owner_or_admin(user, order.user_id)?;

    let view = populate(&state.orm, vec![order], Population::Owner)
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Order"))?;

    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

/// Overwrites the status with whatever the admin sent; transitions are not
/// checked against the current status.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    let order = active.update(&state.orm).await?;

    let items = order_lines(&state.orm, &[order.id]).await?;

    tracing::info!(order_id = %order.id, status = %order.status, "order status updated");

    Ok(ApiResponse::success(
        "Order status updated",
        Order::from_parts(order, &items),
        Some(Meta::empty()),
    ))
}

async fn order_lines(orm: &OrmConn, order_ids: &[Uuid]) -> AppResult<Vec<OrderItemModel>> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.to_vec()))
        .order_by_asc(OrderItemCol::Position)
        .all(orm)
        .await?)
}

async fn populate(
    orm: &OrmConn,
    orders: Vec<OrderModel>,
    population: Population,
) -> AppResult<Vec<OrderView>> {
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let lines = order_lines(orm, &order_ids).await?;

    let product_ids: Vec<Uuid> = lines
        .iter()
        .map(|l| l.product_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let products: HashMap<Uuid, ProductSummary> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        Products::find()
            .filter(ProdCol::Id.is_in(product_ids))
            .all(orm)
            .await?
            .into_iter()
            .map(|p| {
                let summary = ProductSummary {
                    id: p.id,
                    name: p.name,
                    price: p.price,
                    description: (population == Population::Admin).then_some(p.description),
                };
                (summary.id, summary)
            })
            .collect()
    };

    let customers: HashMap<Uuid, Customer> = if population == Population::Admin {
        let user_ids: Vec<Uuid> = orders
            .iter()
            .map(|o| o.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if user_ids.is_empty() {
            HashMap::new()
        } else {
            Users::find()
                .filter(UserCol::Id.is_in(user_ids))
                .all(orm)
                .await?
                .into_iter()
                .map(|u| {
                    let customer = Customer {
                        id: u.id,
                        name: u.name,
                        email: u.email,
                        address: Address {
                            street: u.street,
                            city: u.city,
                            state: u.state,
                            zip_code: u.zip_code,
                            country: u.country,
                        },
                    };
                    (customer.id, customer)
                })
                .collect()
        }
    } else {
        HashMap::new()
    };

    let mut lines_by_order: HashMap<Uuid, Vec<OrderLineView>> = HashMap::new();
    for line in lines {
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push(OrderLineView {
                product_id: line.product_id,
                product: products.get(&line.product_id).cloned(),
                quantity: line.quantity,
            });
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderView {
            id: order.id,
            user_id: order.user_id,
            user: customers.get(&order.user_id).cloned(),
            products: lines_by_order.remove(&order.id).unwrap_or_default(),
            total_amount: order.total_amount,
            status: order.status,
            created_at: order.created_at.with_timezone(&Utc),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::round_to_cents;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_to_cents(500.0), 500.0);
        assert_eq!(round_to_cents(19.99 * 3.0), 59.97);
        assert_eq!(round_to_cents(33.333 * 3.0), 100.0);
        assert_eq!(round_to_cents(0.125), 0.13);
        assert_eq!(round_to_cents(1.004), 1.0);
    }
}
