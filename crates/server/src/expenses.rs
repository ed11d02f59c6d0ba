//! Expense API endpoints.
//!
//! These are thin wrappers over the engine's atomic expense operations; all
//! balance bookkeeping happens inside the engine transaction.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use api_types::{Envelope, expense::*};
use engine::{
    CreateExpenseCmd, ExpenseDetail, ExpenseFilter, PaymentMethod, SubcategoryPatch,
    UpdateExpenseCmd, users,
};

use crate::{ServerError, bank_accounts, categories, parse_stored_id, server::ServerState, subcategories};

fn view(detail: ExpenseDetail) -> Result<ExpenseView, ServerError> {
    Ok(ExpenseView {
        id: parse_stored_id(&detail.expense.id)?,
        amount_minor: detail.expense.amount_minor,
        description: detail.expense.description,
        occurred_at: detail.expense.occurred_at,
        payment_method: detail.expense.payment_method,
        tags: engine::expenses::decode_tags(&detail.expense.tags),
        category: categories::view(detail.category, None)?,
        subcategory: detail.subcategory.map(subcategories::view).transpose()?,
        bank_account: bank_accounts::view(detail.bank_account, None)?,
    })
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseList>,
) -> Result<Json<Envelope<Vec<ExpenseView>>>, ServerError> {
    let filter = ExpenseFilter {
        category_id: query.category_id,
        subcategory_id: query.subcategory_id,
        bank_account_id: query.bank_account_id,
        occurred_after: query.occurred_after,
        occurred_before: query.occurred_before,
    };
    let details = state.engine.list_expenses(&user.subject, filter).await?;
    let views = details.into_iter().map(view).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(Envelope::ok(views)))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ExpenseView>>, ServerError> {
    let detail = state.engine.get_expense(&user.subject, id).await?;
    Ok(Json(Envelope::ok(view(detail)?)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<Envelope<ExpenseView>>), ServerError> {
    let occurred_at = payload.occurred_at.unwrap_or_else(Utc::now);
    let mut cmd = CreateExpenseCmd::new(
        &user.subject,
        payload.amount_minor,
        payload.category_id,
        payload.bank_account_id,
        occurred_at,
    );
    if let Some(subcategory_id) = payload.subcategory_id {
        cmd = cmd.subcategory_id(subcategory_id);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(method) = payload.payment_method.as_deref() {
        cmd = cmd.payment_method(PaymentMethod::try_from(method)?);
    }
    if let Some(tags) = payload.tags {
        cmd = cmd.tags(tags);
    }

    let detail = state.engine.create_expense(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(
            "Expense created successfully",
            view(detail)?,
        )),
    ))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<Envelope<ExpenseView>>, ServerError> {
    let mut cmd = UpdateExpenseCmd::new(&user.subject, id);
    if let Some(amount_minor) = payload.amount_minor {
        cmd = cmd.amount_minor(amount_minor);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    cmd = match payload.subcategory_id {
        None => cmd,
        Some(None) => cmd.subcategory(SubcategoryPatch::Clear),
        Some(Some(subcategory_id)) => cmd.subcategory(SubcategoryPatch::Set(subcategory_id)),
    };
    if let Some(bank_account_id) = payload.bank_account_id {
        cmd = cmd.bank_account_id(bank_account_id);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(occurred_at) = payload.occurred_at {
        cmd = cmd.occurred_at(occurred_at);
    }
    if let Some(method) = payload.payment_method.as_deref() {
        cmd = cmd.payment_method(PaymentMethod::try_from(method)?);
    }
    if let Some(tags) = payload.tags {
        cmd = cmd.tags(tags);
    }

    let detail = state.engine.update_expense(cmd).await?;
    Ok(Json(Envelope::ok_with_message(
        "Expense updated successfully",
        view(detail)?,
    )))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ExpenseView>>, ServerError> {
    let detail = state.engine.delete_expense(&user.subject, id).await?;
    Ok(Json(Envelope::ok_with_message(
        "Expense deleted successfully",
        view(detail)?,
    )))
}
