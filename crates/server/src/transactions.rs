//! Standalone transaction API endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use api_types::{Envelope, transaction::*};
use engine::{NewTransactionCmd, TransactionFilter, TransactionKind, UpdateTransactionCmd, users};

use crate::{ServerError, parse_stored_id, server::ServerState};

fn view(model: engine::transactions::Model) -> Result<TransactionView, ServerError> {
    Ok(TransactionView {
        id: parse_stored_id(&model.id)?,
        kind: model.kind,
        amount_minor: model.amount_minor,
        category: model.category,
        description: model.description,
        occurred_at: model.occurred_at,
    })
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<Envelope<Vec<TransactionView>>>, ServerError> {
    let mut filter = TransactionFilter {
        category: query.category,
        occurred_after: query.occurred_after,
        occurred_before: query.occurred_before,
        ..Default::default()
    };
    if let Some(kind) = query.kind.as_deref() {
        filter = filter.kind(TransactionKind::try_from(kind)?);
    }
    let rows = state.engine.list_transactions(&user.subject, filter).await?;
    let views = rows.into_iter().map(view).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(Envelope::ok(views)))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let transaction = state.engine.get_transaction(&user.subject, id).await?;
    Ok(Json(Envelope::ok(view(transaction)?)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<Envelope<TransactionView>>), ServerError> {
    let kind = TransactionKind::try_from(payload.kind.as_str())?;
    let occurred_at = payload.occurred_at.unwrap_or_else(Utc::now);
    let mut cmd = NewTransactionCmd::new(
        &user.subject,
        kind,
        payload.amount_minor,
        &payload.category,
        occurred_at,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let transaction = state.engine.create_transaction(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(
            "Transaction created successfully",
            view(transaction)?,
        )),
    ))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let mut cmd = UpdateTransactionCmd::new(&user.subject, id);
    if let Some(kind) = payload.kind.as_deref() {
        cmd = cmd.kind(TransactionKind::try_from(kind)?);
    }
    if let Some(amount_minor) = payload.amount_minor {
        cmd = cmd.amount_minor(amount_minor);
    }
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(occurred_at) = payload.occurred_at {
        cmd = cmd.occurred_at(occurred_at);
    }

    let transaction = state.engine.update_transaction(cmd).await?;
    Ok(Json(Envelope::ok_with_message(
        "Transaction updated successfully",
        view(transaction)?,
    )))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let transaction = state.engine.delete_transaction(&user.subject, id).await?;
    Ok(Json(Envelope::ok_with_message(
        "Transaction deleted successfully",
        view(transaction)?,
    )))
}
