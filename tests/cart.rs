mod common;

use sea_orm::{EntityTrait, PaginatorTrait};
use storefront_api::{
    dto::cart::AddToCartRequest,
    entity::{CartItems, Carts, products},
    error::AppError,
    services::cart_service,
};

#[tokio::test]
async fn empty_cart_is_not_an_error() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "Ann", "ann@example.com", false).await?;

    let cart = cart_service::get_cart(&state, &user).await?.data.expect("cart");
    assert!(cart.id.is_none());
    assert!(cart.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn lines_keep_insertion_order_and_merge() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "Ann", "ann@example.com", false).await?;
    let first = common::create_product(&state, "First", 1.0, 1).await?;
    let second = common::create_product(&state, "Second", 2.0, 1).await?;

    for (product_id, quantity) in [(first, 1), (second, 4), (first, 2)] {
        cart_service::add_to_cart(
            &state,
            &user,
            AddToCartRequest {
                product_id,
                quantity,
            },
        )
        .await?;
    }

    let cart = cart_service::get_cart(&state, &user).await?.data.expect("cart");
    let lines: Vec<_> = cart
        .items
        .iter()
        .map(|item| (item.product_id, item.quantity))
        .collect();
    assert_eq!(lines, vec![(first, 3), (second, 4)]);
    assert_eq!(Carts::find().count(&state.orm).await?, 1);
    Ok(())
}

#[tokio::test]
async fn add_rejects_bad_quantity_and_unknown_product() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "Ann", "ann@example.com", false).await?;
    let product_id = common::create_product(&state, "Thing", 5.0, 1).await?;

    let zero = cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id,
            quantity: 0,
        },
    )
    .await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));

    let unknown = cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: uuid::Uuid::new_v4(),
            quantity: 1,
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
    assert_eq!(Carts::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn quantity_is_not_bounded_by_stock() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "Ann", "ann@example.com", false).await?;
    let product_id = common::create_product(&state, "Rare", 5.0, 1).await?;

    let cart = cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id,
            quantity: 50,
        },
    )
    .await?
    .data
    .expect("cart");
    assert_eq!(cart.items[0].quantity, 50);
    Ok(())
}

#[tokio::test]
async fn remove_and_clear_are_forgiving() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "Ann", "ann@example.com", false).await?;
    let product_id = common::create_product(&state, "Thing", 5.0, 1).await?;

    // clearing when no cart exists
    cart_service::clear_cart(&state, &user).await?;

    let no_cart = cart_service::remove_from_cart(&state, &user, product_id).await;
    assert!(matches!(no_cart, Err(AppError::NotFound(ref msg)) if msg == "Cart not found"));

    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id,
            quantity: 1,
        },
    )
    .await?;

    let untouched = cart_service::remove_from_cart(&state, &user, uuid::Uuid::new_v4())
        .await?
        .data
        .expect("cart");
    assert_eq!(untouched.items.len(), 1);

    let emptied = cart_service::remove_from_cart(&state, &user, product_id)
        .await?
        .data
        .expect("cart");
    assert!(emptied.items.is_empty());

    // the cart row outlives its last line
    let still_there = cart_service::get_cart(&state, &user).await?.data.expect("cart");
    assert_eq!(still_there.id, Some(emptied.id));
    assert!(still_there.items.is_empty());

    cart_service::clear_cart(&state, &user).await?;
    cart_service::clear_cart(&state, &user).await?;
    assert_eq!(Carts::find().count(&state.orm).await?, 0);
    assert_eq!(CartItems::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn deleted_product_shows_as_null_line() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "Ann", "ann@example.com", false).await?;
    let product_id = common::create_product(&state, "Gone", 5.0, 1).await?;

    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id,
            quantity: 2,
        },
    )
    .await?;
    products::Entity::delete_by_id(product_id)
        .exec(&state.orm)
        .await?;

    let cart = cart_service::get_cart(&state, &user).await?.data.expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert!(cart.items[0].product.is_none());
    assert_eq!(cart.items[0].quantity, 2);
    Ok(())
}

#[tokio::test]
async fn merged_quantity_overflow_is_rejected() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "Ann", "ann@example.com", false).await?;
    let product_id = common::create_product(&state, "Bulk", 0.01, 1).await?;

    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id,
            quantity: i32::MAX,
        },
    )
    .await?;

    let overflow = cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id,
            quantity: 1,
        },
    )
    .await;
    assert!(matches!(overflow, Err(AppError::BadRequest(_))));

    let cart = cart_service::get_cart(&state, &user).await?.data.expect("cart");
    assert_eq!(cart.items[0].quantity, i32::MAX);
    Ok(())
}

#[tokio::test]
async fn concurrent_first_adds_share_one_cart() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "Ann", "ann@example.com", false).await?;
    let first = common::create_product(&state, "First", 1.0, 1).await?;
    let second = common::create_product(&state, "Second", 2.0, 1).await?;

    let (a, b) = tokio::join!(
        cart_service::add_to_cart(
            &state,
            &user,
            AddToCartRequest {
                product_id: first,
                quantity: 1,
            },
        ),
        cart_service::add_to_cart(
            &state,
            &user,
            AddToCartRequest {
                product_id: second,
                quantity: 2,
            },
        ),
    );
    a?;
    b?;

    assert_eq!(Carts::find().count(&state.orm).await?, 1);
    let cart = cart_service::get_cart(&state, &user).await?.data.expect("cart");
    let mut lines: Vec<_> = cart
        .items
        .iter()
        .map(|item| (item.product_id, item.quantity))
        .collect();
    lines.sort();
    let mut expected = vec![(first, 1), (second, 2)];
    expected.sort();
    assert_eq!(lines, expected);
    Ok(())
}
