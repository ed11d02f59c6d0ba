//! Subcategory API endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::{Envelope, subcategory::*};
use engine::users;

use crate::{ServerError, parse_stored_id, server::ServerState};

pub(crate) fn view(model: engine::subcategories::Model) -> Result<SubcategoryView, ServerError> {
    Ok(SubcategoryView {
        id: parse_stored_id(&model.id)?,
        category_id: parse_stored_id(&model.category_id)?,
        name: model.name,
        description: model.description,
        icon: model.icon,
    })
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<SubcategoryList>,
) -> Result<Json<Envelope<Vec<SubcategoryView>>>, ServerError> {
    let rows = state
        .engine
        .list_subcategories(&user.subject, query.category_id)
        .await?;
    let views = rows.into_iter().map(view).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(Envelope::ok(views)))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<SubcategoryView>>, ServerError> {
    let subcategory = state.engine.get_subcategory(&user.subject, id).await?;
    Ok(Json(Envelope::ok(view(subcategory)?)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SubcategoryNew>,
) -> Result<(StatusCode, Json<Envelope<SubcategoryView>>), ServerError> {
    let subcategory = state
        .engine
        .create_subcategory(
            &user.subject,
            payload.category_id,
            &payload.name,
            payload.description.as_deref(),
            payload.icon.as_deref(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(
            "Subcategory created successfully",
            view(subcategory)?,
        )),
    ))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubcategoryUpdate>,
) -> Result<Json<Envelope<SubcategoryView>>, ServerError> {
    let subcategory = state
        .engine
        .update_subcategory(
            &user.subject,
            id,
            payload.category_id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.icon.as_deref(),
        )
        .await?;
    Ok(Json(Envelope::ok_with_message(
        "Subcategory updated successfully",
        view(subcategory)?,
    )))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<SubcategoryView>>, ServerError> {
    let subcategory = state.engine.delete_subcategory(&user.subject, id).await?;
    Ok(Json(Envelope::ok_with_message(
        "Subcategory deleted successfully",
        view(subcategory)?,
    )))
}
