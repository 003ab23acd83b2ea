//! Restaurant API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Serialize;

use crate::api::form::MultipartForm;
use crate::api::scope;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{category, restaurant};
use crate::orders::lifecycle;
use crate::services::ImageKind;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{
    CategoryWithItems, OrderCreate, OrderDetail, Restaurant, RestaurantCreate, RestaurantUpdate,
};

/// Public menu preview payload
#[derive(Debug, Serialize)]
pub struct MenuPreview {
    pub restaurant: MenuRestaurant,
    pub categories: Vec<CategoryWithItems>,
}

#[derive(Debug, Serialize)]
pub struct MenuRestaurant {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub profile_image: Option<String>,
}

/// GET /api/restaurant - 当前账号的餐厅 (没有则 data 为空)
pub async fn get_own(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Restaurant>>> {
    match scope::optional_restaurant(&state.pool, &user).await? {
        Some(r) => Ok(ok(r)),
        None => Ok(Json(AppResponse {
            code: "E0000".to_string(),
            message: "No restaurant yet".to_string(),
            data: None,
        })),
    }
}

/// POST /api/restaurant - 创建餐厅 (multipart: name, address, profile?)
pub async fn create_own(
    State(state): State<ServerState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<Restaurant>>> {
    let form = MultipartForm::read(multipart).await?;
    let name = form.require_text("name")?.to_string();
    let address = form.require_text("address")?.to_string();
    validate_required_text(&name, "name", MAX_NAME_LEN)?;
    validate_required_text(&address, "address", MAX_ADDRESS_LEN)?;

    // Store the profile image first; compensate if the row insert fails
    let profile_image = match form.file("profile") {
        Some(file) => Some(state.images.save(ImageKind::Profiles, &file.data, &file.filename)?),
        None => None,
    };

    let created = restaurant::create(
        &state.pool,
        user.id,
        RestaurantCreate { name, address },
        profile_image.clone(),
    )
    .await;

    match created {
        Ok(r) => Ok(ok(r)),
        Err(e) => {
            if let Some(path) = profile_image {
                state.images.delete(&path);
            }
            Err(e.into())
        }
    }
}

/// PUT /api/restaurant - 更新餐厅 (multipart: name?, address?, profile?)
pub async fn update_own(
    State(state): State<ServerState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<Restaurant>>> {
    let existing = scope::require_restaurant(&state.pool, &user).await?;

    let form = MultipartForm::read(multipart).await?;
    let data = RestaurantUpdate {
        name: form.text("name").map(|s| s.to_string()),
        address: form.text("address").map(|s| s.to_string()),
    };
    if let Some(ref name) = data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(ref address) = data.address {
        validate_required_text(address, "address", MAX_ADDRESS_LEN)?;
    }

    let new_image = match form.file("profile") {
        Some(file) => Some(state.images.save(ImageKind::Profiles, &file.data, &file.filename)?),
        None => None,
    };

    let updated = restaurant::update(&state.pool, existing.id, data, new_image.clone()).await;

    match updated {
        Ok(r) => {
            // Replaced image: best-effort delete of the old file
            if new_image.is_some()
                && let Some(old) = existing.profile_image
            {
                state.images.delete(&old);
            }
            Ok(ok(r))
        }
        Err(e) => {
            if let Some(path) = new_image {
                state.images.delete(&path);
            }
            Err(e.into())
        }
    }
}

/// DELETE /api/restaurant - 删除餐厅 (级联删除分类/菜品/桌台/订单)
pub async fn delete_own(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<bool>>> {
    let existing = scope::require_restaurant(&state.pool, &user).await?;

    let deleted = restaurant::delete(&state.pool, existing.id).await?;
    if deleted && let Some(old) = existing.profile_image {
        state.images.delete(&old);
    }

    Ok(ok_with_message(deleted, "Restaurant deleted"))
}

/// GET /api/restaurants/{id}/menu - 公开菜单预览 (扫码端)
pub async fn menu_preview(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<MenuPreview>>> {
    let r = restaurant::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {id} not found")))?;

    let categories = category::find_all_with_items(&state.pool, r.id).await?;

    Ok(ok(MenuPreview {
        restaurant: MenuRestaurant {
            id: r.id,
            name: r.name,
            address: r.address,
            profile_image: r.profile_image,
        },
        categories,
    }))
}

/// POST /api/restaurants/{id}/submit-order - 扫码下单 (公开)
///
/// Same placement path as the authenticated one; the restaurant comes from
/// the URL instead of the token.
pub async fn submit_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let r = restaurant::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {id} not found")))?;

    let detail = lifecycle::place_order(&state.pool, r.id, &payload).await?;
    Ok(ok_with_message(detail, "Order created"))
}
