//! Command structs for engine write operations.
//!
//! These types group parameters for the create/update paths, keeping call
//! sites readable and avoiding long argument lists. Optional fields default
//! to "leave unchanged" on updates.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AccountType, BudgetPeriod, Currency, PaymentMethod, TransactionKind};

/// How an update treats the expense's subcategory link.
///
/// A plain `Option` cannot distinguish "leave as is" from "remove", so the
/// patch is explicit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubcategoryPatch {
    #[default]
    Keep,
    Clear,
    Set(Uuid),
}

/// Create an expense against a bank account.
#[derive(Clone, Debug)]
pub struct CreateExpenseCmd {
    pub user_id: String,
    pub amount_minor: i64,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub bank_account_id: Uuid,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub tags: Vec<String>,
}

impl CreateExpenseCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        amount_minor: i64,
        category_id: Uuid,
        bank_account_id: Uuid,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            amount_minor,
            category_id,
            subcategory_id: None,
            bank_account_id,
            description: String::new(),
            occurred_at,
            payment_method: PaymentMethod::default(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn subcategory_id(mut self, subcategory_id: Uuid) -> Self {
        self.subcategory_id = Some(subcategory_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = payment_method;
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Partially update an existing expense.
#[derive(Clone, Debug)]
pub struct UpdateExpenseCmd {
    pub user_id: String,
    pub expense_id: Uuid,
    pub amount_minor: Option<i64>,
    pub category_id: Option<Uuid>,
    pub subcategory: SubcategoryPatch,
    pub bank_account_id: Option<Uuid>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
    pub tags: Option<Vec<String>>,
}

impl UpdateExpenseCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, expense_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            expense_id,
            amount_minor: None,
            category_id: None,
            subcategory: SubcategoryPatch::Keep,
            bank_account_id: None,
            description: None,
            occurred_at: None,
            payment_method: None,
            tags: None,
        }
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn subcategory(mut self, patch: SubcategoryPatch) -> Self {
        self.subcategory = patch;
        self
    }

    #[must_use]
    pub fn bank_account_id(mut self, bank_account_id: Uuid) -> Self {
        self.bank_account_id = Some(bank_account_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = Some(payment_method);
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }
}

/// Create a bank account.
#[derive(Clone, Debug)]
pub struct NewBankAccountCmd {
    pub user_id: String,
    pub name: String,
    pub bank_name: String,
    pub account_number: Option<String>,
    pub account_type: AccountType,
    pub balance_minor: i64,
    pub currency: Currency,
}

impl NewBankAccountCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        bank_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            bank_name: bank_name.into(),
            account_number: None,
            account_type: AccountType::default(),
            balance_minor: 0,
            currency: Currency::default(),
        }
    }

    #[must_use]
    pub fn account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = Some(account_number.into());
        self
    }

    #[must_use]
    pub fn account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = account_type;
        self
    }

    #[must_use]
    pub fn balance_minor(mut self, balance_minor: i64) -> Self {
        self.balance_minor = balance_minor;
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

/// Partially update a bank account. This is the user-driven edit path and may
/// set `balance_minor` directly.
#[derive(Clone, Debug)]
pub struct UpdateBankAccountCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub name: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_type: Option<AccountType>,
    pub balance_minor: Option<i64>,
    pub currency: Option<Currency>,
    pub is_active: Option<bool>,
}

impl UpdateBankAccountCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, account_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            name: None,
            bank_name: None,
            account_number: None,
            account_type: None,
            balance_minor: None,
            currency: None,
            is_active: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn bank_name(mut self, bank_name: impl Into<String>) -> Self {
        self.bank_name = Some(bank_name.into());
        self
    }

    #[must_use]
    pub fn account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = Some(account_number.into());
        self
    }

    #[must_use]
    pub fn account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = Some(account_type);
        self
    }

    #[must_use]
    pub fn balance_minor(mut self, balance_minor: i64) -> Self {
        self.balance_minor = Some(balance_minor);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Create a standalone income/expense record.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub category: String,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        kind: TransactionKind,
        amount_minor: i64,
        category: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            amount_minor,
            category: category.into(),
            description: None,
            occurred_at,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partially update a standalone income/expense record.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,
    pub kind: Option<TransactionKind>,
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transaction_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            kind: None,
            amount_minor: None,
            category: None,
            description: None,
            occurred_at: None,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}

/// Create a budget.
#[derive(Clone, Debug)]
pub struct NewBudgetCmd {
    pub user_id: String,
    pub category: String,
    pub amount_minor: i64,
    pub period: BudgetPeriod,
}

impl NewBudgetCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, category: impl Into<String>, amount_minor: i64) -> Self {
        Self {
            user_id: user_id.into(),
            category: category.into(),
            amount_minor,
            period: BudgetPeriod::default(),
        }
    }

    #[must_use]
    pub fn period(mut self, period: BudgetPeriod) -> Self {
        self.period = period;
        self
    }
}

/// Partially update a budget.
#[derive(Clone, Debug)]
pub struct UpdateBudgetCmd {
    pub user_id: String,
    pub budget_id: Uuid,
    pub category: Option<String>,
    pub amount_minor: Option<i64>,
    pub period: Option<BudgetPeriod>,
}

impl UpdateBudgetCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, budget_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            budget_id,
            category: None,
            amount_minor: None,
            period: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn period(mut self, period: BudgetPeriod) -> Self {
        self.period = Some(period);
        self
    }
}
