//! Budget API endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::{Envelope, budget::*};
use engine::{BudgetPeriod, NewBudgetCmd, UpdateBudgetCmd, users};

use crate::{ServerError, parse_stored_id, server::ServerState};

fn view(model: engine::budgets::Model) -> Result<BudgetView, ServerError> {
    Ok(BudgetView {
        id: parse_stored_id(&model.id)?,
        category: model.category,
        amount_minor: model.amount_minor,
        period: model.period,
        created_at: model.created_at,
    })
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<BudgetView>>>, ServerError> {
    let rows = state.engine.list_budgets(&user.subject).await?;
    let views = rows.into_iter().map(view).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(Envelope::ok(views)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<Envelope<BudgetView>>), ServerError> {
    let mut cmd = NewBudgetCmd::new(&user.subject, &payload.category, payload.amount_minor);
    if let Some(period) = payload.period.as_deref() {
        cmd = cmd.period(BudgetPeriod::try_from(period)?);
    }

    let budget = state.engine.create_budget(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(
            "Budget created successfully",
            view(budget)?,
        )),
    ))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<Envelope<BudgetView>>, ServerError> {
    let mut cmd = UpdateBudgetCmd::new(&user.subject, id);
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(amount_minor) = payload.amount_minor {
        cmd = cmd.amount_minor(amount_minor);
    }
    if let Some(period) = payload.period.as_deref() {
        cmd = cmd.period(BudgetPeriod::try_from(period)?);
    }

    let budget = state.engine.update_budget(cmd).await?;
    Ok(Json(Envelope::ok_with_message(
        "Budget updated successfully",
        view(budget)?,
    )))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<BudgetView>>, ServerError> {
    let budget = state.engine.delete_budget(&user.subject, id).await?;
    Ok(Json(Envelope::ok_with_message(
        "Budget deleted successfully",
        view(budget)?,
    )))
}
