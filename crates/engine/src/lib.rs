pub use bank_accounts::{AccountType, BankAccount};
pub use budgets::BudgetPeriod;
pub use commands::{
    CreateExpenseCmd, NewBankAccountCmd, NewBudgetCmd, NewTransactionCmd, SubcategoryPatch,
    UpdateBankAccountCmd, UpdateBudgetCmd, UpdateExpenseCmd, UpdateTransactionCmd,
};
pub use currency::Currency;
pub use error::EngineError;
pub use expenses::{ExpenseDetail, PaymentMethod};
pub use ops::{CategorySummary, Engine, EngineBuilder, ExpenseFilter, TransactionFilter};
pub use transactions::TransactionKind;

pub mod bank_accounts;
pub mod budgets;
mod commands;
mod currency;
mod error;
pub mod categories;
pub mod expenses;
mod ops;
pub mod subcategories;
pub mod transactions;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
