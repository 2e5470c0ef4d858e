use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::reviews::{AddReviewRequest, ReviewList, ReviewView, Reviewer},
    entity::{
        products::Entity as Products,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    let reviews = Reviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let user_ids: Vec<Uuid> = reviews.iter().map(|r| r.user_id).collect();
    let reviewers: HashMap<Uuid, Reviewer> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        Users::find()
            .filter(UserCol::Id.is_in(user_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|u| (u.id, Reviewer { id: u.id, name: u.name }))
            .collect()
    };

    let items: Vec<ReviewView> = reviews
        .into_iter()
        .map(|r| ReviewView {
            id: r.id,
            product_id: r.product_id,
            user: reviewers.get(&r.user_id).cloned(),
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at.with_timezone(&Utc),
        })
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

/// One review per (user, product). Uniqueness is checked here, not by the
/// schema.
pub async fn add_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: AddReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    if product.is_none() {
        return Err(AppError::not_found("Product"));
    }

    let existing = Reviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .filter(ReviewCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "You have already reviewed this product".into(),
        ));
    }

    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".into(),
        ));
    }

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(review_id = %review.id, product_id = %product_id, "review added");

    Ok(ApiResponse::success(
        "Review added successfully",
        review.into(),
        Some(Meta::empty()),
    ))
}
