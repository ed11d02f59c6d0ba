//! Category API endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::{Envelope, category::*};
use engine::users;

use crate::{ServerError, parse_stored_id, server::ServerState};

pub(crate) fn view(
    model: engine::categories::Model,
    counts: Option<(u64, u64)>,
) -> Result<CategoryView, ServerError> {
    Ok(CategoryView {
        id: parse_stored_id(&model.id)?,
        name: model.name,
        description: model.description,
        icon: model.icon,
        subcategory_count: counts.map(|(subcategories, _)| subcategories),
        expense_count: counts.map(|(_, expenses)| expenses),
    })
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<CategoryView>>>, ServerError> {
    let summaries = state.engine.list_categories(&user.subject).await?;
    let views = summaries
        .into_iter()
        .map(|s| view(s.category, Some((s.subcategory_count, s.expense_count))))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(Envelope::ok(views)))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<CategoryView>>, ServerError> {
    let category = state.engine.get_category(&user.subject, id).await?;
    Ok(Json(Envelope::ok(view(category, None)?)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<Envelope<CategoryView>>), ServerError> {
    let category = state
        .engine
        .create_category(
            &user.subject,
            &payload.name,
            payload.description.as_deref(),
            payload.icon.as_deref(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(
            "Category created successfully",
            view(category, None)?,
        )),
    ))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<Envelope<CategoryView>>, ServerError> {
    let category = state
        .engine
        .update_category(
            &user.subject,
            id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.icon.as_deref(),
        )
        .await?;
    Ok(Json(Envelope::ok_with_message(
        "Category updated successfully",
        view(category, None)?,
    )))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<CategoryView>>, ServerError> {
    let category = state.engine.delete_category(&user.subject, id).await?;
    Ok(Json(Envelope::ok_with_message(
        "Category deleted successfully",
        view(category, None)?,
    )))
}
