//! Item API Handlers
//!
//! Create/update are multipart forms: text fields plus an optional `image`
//! file. The image is stored before the row is written; if the row write
//! then fails the stored file is deleted again (compensating action).

use axum::{
    Json,
    extract::{Multipart, Path, State},
};

use crate::api::form::MultipartForm;
use crate::api::scope;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{category, item};
use crate::services::ImageKind;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_price, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{Item, ItemCreate, ItemUpdate, ItemWithCategory};

/// GET /api/items - 当前餐厅的所有菜品 (含分类名)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<ItemWithCategory>>>> {
    let Some(r) = scope::optional_restaurant(&state.pool, &user).await? else {
        return Ok(ok(Vec::new()));
    };

    let items = item::find_all_for_restaurant(&state.pool, r.id).await?;
    Ok(ok(items))
}

/// GET /api/items/{id} - 获取单个菜品
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Item>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    let found = item::find_by_id_scoped(&state.pool, id, r.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Item {id} not found")))?;
    Ok(ok(found))
}

/// POST /api/items - 创建菜品 (multipart: category_id, name, price,
/// description?, image?)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<Item>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    let form = MultipartForm::read(multipart).await?;
    let category_id: i64 = form
        .parse("category_id")?
        .ok_or_else(|| AppError::validation("category_id is required"))?;
    let name = form.require_text("name")?.to_string();
    let price: f64 = form
        .parse("price")?
        .ok_or_else(|| AppError::validation("price is required"))?;
    let description = form.text("description").map(|s| s.to_string());

    validate_required_text(&name, "name", MAX_NAME_LEN)?;
    validate_price(price)?;
    validate_optional_text(&description, "description", MAX_NOTE_LEN)?;

    // The category must belong to the caller's restaurant
    if category::find_by_id_scoped(&state.pool, category_id, r.id).await?.is_none() {
        return Err(AppError::not_found(format!(
            "Category {category_id} not found"
        )));
    }

    // Store the image first; compensate if the row insert fails
    let image_path = match form.file("image") {
        Some(file) => Some(state.images.save(ImageKind::Items, &file.data, &file.filename)?),
        None => None,
    };

    let created = item::create(
        &state.pool,
        ItemCreate {
            category_id,
            name,
            description,
            price,
        },
        image_path.clone(),
    )
    .await;

    match created {
        Ok(i) => Ok(ok(i)),
        Err(e) => {
            if let Some(path) = image_path {
                state.images.delete(&path);
            }
            Err(e.into())
        }
    }
}

/// PUT /api/items/{id} - 更新菜品 (multipart，字段均可选)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<Item>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    // Ownership walk Item → Category → Restaurant
    let existing = item::find_by_id_scoped(&state.pool, id, r.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Item {id} not found")))?;

    let form = MultipartForm::read(multipart).await?;
    let data = ItemUpdate {
        category_id: form.parse("category_id")?,
        name: form.text("name").map(|s| s.to_string()),
        description: form.text("description").map(|s| s.to_string()),
        price: form.parse("price")?,
    };

    if let Some(ref name) = data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = data.price {
        validate_price(price)?;
    }
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;

    // A moved item must stay within the caller's restaurant
    if let Some(new_category) = data.category_id
        && category::find_by_id_scoped(&state.pool, new_category, r.id).await?.is_none()
    {
        return Err(AppError::not_found(format!(
            "Category {new_category} not found"
        )));
    }

    let new_image = match form.file("image") {
        Some(file) => Some(state.images.save(ImageKind::Items, &file.data, &file.filename)?),
        None => None,
    };

    let updated = item::update(&state.pool, id, data, new_image.clone()).await;

    match updated {
        Ok(i) => {
            // Replaced image: best-effort delete of the old file
            if new_image.is_some()
                && let Some(old) = existing.image_path
            {
                state.images.delete(&old);
            }
            Ok(ok(i))
        }
        Err(e) => {
            if let Some(path) = new_image {
                state.images.delete(&path);
            }
            Err(e.into())
        }
    }
}

/// DELETE /api/items/{id} - 删除菜品 (附带清理图片文件，尽力而为)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    let existing = item::find_by_id_scoped(&state.pool, id, r.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Item {id} not found")))?;

    let deleted = item::delete(&state.pool, id).await?;
    if deleted && let Some(image) = existing.image_path {
        state.images.delete(&image);
    }

    Ok(ok_with_message(deleted, "Item deleted"))
}
