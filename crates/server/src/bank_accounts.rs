//! Bank account API endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::{Envelope, bank_account::*};
use engine::{AccountType, Currency, NewBankAccountCmd, UpdateBankAccountCmd, users};

use crate::{ServerError, parse_stored_id, server::ServerState};

pub(crate) fn view(
    model: engine::bank_accounts::Model,
    expense_count: Option<u64>,
) -> Result<BankAccountView, ServerError> {
    Ok(BankAccountView {
        id: parse_stored_id(&model.id)?,
        name: model.name,
        bank_name: model.bank_name,
        account_number: model.account_number,
        account_type: model.account_type,
        balance_minor: model.balance_minor,
        currency: model.currency,
        is_active: model.is_active,
        expense_count,
    })
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<BankAccountView>>>, ServerError> {
    let accounts = state.engine.list_bank_accounts(&user.subject).await?;
    let views = accounts
        .into_iter()
        .map(|(model, count)| view(model, Some(count)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(Envelope::ok(views)))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<BankAccountView>>, ServerError> {
    let account = state.engine.get_bank_account(&user.subject, id).await?;
    Ok(Json(Envelope::ok(view(account, None)?)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BankAccountNew>,
) -> Result<(StatusCode, Json<Envelope<BankAccountView>>), ServerError> {
    let mut cmd = NewBankAccountCmd::new(&user.subject, &payload.name, &payload.bank_name)
        .balance_minor(payload.balance_minor.unwrap_or(0));
    if let Some(number) = payload.account_number {
        cmd = cmd.account_number(number);
    }
    if let Some(kind) = payload.account_type.as_deref() {
        cmd = cmd.account_type(AccountType::try_from(kind)?);
    }
    if let Some(currency) = payload.currency.as_deref() {
        cmd = cmd.currency(Currency::try_from(currency)?);
    }

    let account = state.engine.create_bank_account(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(
            "Bank account created successfully",
            view(account, None)?,
        )),
    ))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BankAccountUpdate>,
) -> Result<Json<Envelope<BankAccountView>>, ServerError> {
    let mut cmd = UpdateBankAccountCmd::new(&user.subject, id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(bank_name) = payload.bank_name {
        cmd = cmd.bank_name(bank_name);
    }
    if let Some(number) = payload.account_number {
        cmd = cmd.account_number(number);
    }
    if let Some(kind) = payload.account_type.as_deref() {
        cmd = cmd.account_type(AccountType::try_from(kind)?);
    }
    if let Some(balance_minor) = payload.balance_minor {
        cmd = cmd.balance_minor(balance_minor);
    }
    if let Some(currency) = payload.currency.as_deref() {
        cmd = cmd.currency(Currency::try_from(currency)?);
    }
    if let Some(is_active) = payload.is_active {
        cmd = cmd.is_active(is_active);
    }

    let account = state.engine.update_bank_account(cmd).await?;
    Ok(Json(Envelope::ok_with_message(
        "Bank account updated successfully",
        view(account, None)?,
    )))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<BankAccountView>>, ServerError> {
    let account = state.engine.delete_bank_account(&user.subject, id).await?;
    Ok(Json(Envelope::ok_with_message(
        "Bank account deleted successfully",
        view(account, None)?,
    )))
}
