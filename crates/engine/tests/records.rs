use chrono::Utc;
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    CreateExpenseCmd, Engine, EngineError, NewBankAccountCmd, NewBudgetCmd, NewTransactionCmd,
    TransactionFilter, TransactionKind, UpdateBudgetCmd, UpdateTransactionCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .sync_user("alice", Some("alice@example.com"), Some("Alice"), None)
        .await
        .unwrap();
    engine
}

async fn engine_with_file_db(path: &str) -> Engine {
    let db = Database::connect(format!("sqlite:{path}?mode=rwc"))
        .await
        .unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine.sync_user("alice", None, None, None).await.unwrap();
    engine
}

async fn seed_account(engine: &Engine, name: &str, balance_minor: i64) -> Uuid {
    let account = engine
        .create_bank_account(NewBankAccountCmd::new("alice", name, "Acme Bank").balance_minor(balance_minor))
        .await
        .unwrap();
    Uuid::parse_str(&account.id).unwrap()
}

async fn seed_category(engine: &Engine, name: &str) -> Uuid {
    let category = engine
        .create_category("alice", name, None, None)
        .await
        .unwrap();
    Uuid::parse_str(&category.id).unwrap()
}

#[tokio::test]
async fn bank_account_with_expenses_cannot_be_deleted() {
    let engine = engine_with_db().await;
    let account_id = seed_account(&engine, "Checking", 10_000).await;
    let category_id = seed_category(&engine, "Food").await;

    let detail = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 1_000, category_id, account_id,
            Utc::now(),
        ))
        .await
        .unwrap();

    let err = engine
        .delete_bank_account("alice", account_id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InUse("bank_account has 1 expenses".to_string()));

    let expense_id = Uuid::parse_str(&detail.expense.id).unwrap();
    engine.delete_expense("alice", expense_id).await.unwrap();
    engine.delete_bank_account("alice", account_id).await.unwrap();

    let err = engine
        .get_bank_account("alice", account_id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("bank_account not exists".to_string()));
}

#[tokio::test]
async fn category_deletion_blocked_by_subcategories_then_expenses() {
    let engine = engine_with_db().await;
    let account_id = seed_account(&engine, "Checking", 10_000).await;
    let category_id = seed_category(&engine, "Food").await;
    let subcategory = engine
        .create_subcategory("alice", category_id, "Restaurants", None, None)
        .await
        .unwrap();
    let subcategory_id = Uuid::parse_str(&subcategory.id).unwrap();

    let detail = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 1_000, category_id, account_id,
            Utc::now(),
        ))
        .await
        .unwrap();

    let err = engine.delete_category("alice", category_id).await.unwrap_err();
    assert_eq!(err, EngineError::InUse("category has 1 subcategories".to_string()));

    engine
        .delete_subcategory("alice", subcategory_id)
        .await
        .unwrap();
    let err = engine.delete_category("alice", category_id).await.unwrap_err();
    assert_eq!(err, EngineError::InUse("category has 1 expenses".to_string()));

    let expense_id = Uuid::parse_str(&detail.expense.id).unwrap();
    engine.delete_expense("alice", expense_id).await.unwrap();
    engine.delete_category("alice", category_id).await.unwrap();
}

#[tokio::test]
async fn subcategory_with_expenses_cannot_be_deleted() {
    let engine = engine_with_db().await;
    let account_id = seed_account(&engine, "Checking", 10_000).await;
    let category_id = seed_category(&engine, "Food").await;
    let subcategory = engine
        .create_subcategory("alice", category_id, "Restaurants", None, None)
        .await
        .unwrap();
    let subcategory_id = Uuid::parse_str(&subcategory.id).unwrap();

    let detail = engine
        .create_expense(
            CreateExpenseCmd::new("alice", 1_000, category_id, account_id, Utc::now())
                .subcategory_id(subcategory_id),
        )
        .await
        .unwrap();

    let err = engine
        .delete_subcategory("alice", subcategory_id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InUse("subcategory has 1 expenses".to_string()));

    let expense_id = Uuid::parse_str(&detail.expense.id).unwrap();
    engine.delete_expense("alice", expense_id).await.unwrap();
    engine
        .delete_subcategory("alice", subcategory_id)
        .await
        .unwrap();
}

#[tokio::test]
async fn sync_user_is_idempotent() {
    let engine = engine_with_db().await;

    let first = engine
        .sync_user("alice", Some("other@example.com"), Some("Other"), Some("Name"))
        .await
        .unwrap();
    // The row created by the helper wins; later syncs never overwrite it.
    assert_eq!(first.email.as_deref(), Some("alice@example.com"));
    assert_eq!(first.first_name.as_deref(), Some("Alice"));

    let updated = engine
        .update_profile("alice", Some("new@example.com"), None, Some("Smith"))
        .await
        .unwrap();
    assert_eq!(updated.email.as_deref(), Some("new@example.com"));
    assert_eq!(updated.first_name.as_deref(), Some("Alice"));
    assert_eq!(updated.last_name.as_deref(), Some("Smith"));

    let current = engine.current_user("alice").await.unwrap();
    assert_eq!(current, updated);
}

#[tokio::test]
async fn transaction_round_trip_with_filters() {
    let engine = engine_with_db().await;

    let salary = engine
        .create_transaction(
            NewTransactionCmd::new("alice", TransactionKind::Income, 300_000, "Salary", Utc::now())
                .description("August"),
        )
        .await
        .unwrap();
    engine
        .create_transaction(NewTransactionCmd::new(
            "alice",
            TransactionKind::Expense,
            12_000,
            "Rent",
            Utc::now(),
        ))
        .await
        .unwrap();

    let income = engine
        .list_transactions("alice", TransactionFilter::default().kind(TransactionKind::Income))
        .await
        .unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].category, "Salary");

    let salary_id = Uuid::parse_str(&salary.id).unwrap();
    let updated = engine
        .update_transaction(
            UpdateTransactionCmd::new("alice", salary_id).amount_minor(310_000),
        )
        .await
        .unwrap();
    assert_eq!(updated.amount_minor, 310_000);

    let err = engine
        .update_transaction(UpdateTransactionCmd::new("alice", salary_id).amount_minor(-5))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidAmount("amount_minor must be > 0".to_string()));

    engine.delete_transaction("alice", salary_id).await.unwrap();
    let remaining = engine
        .list_transactions("alice", TransactionFilter::default())
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].category, "Rent");
}

#[tokio::test]
async fn budget_round_trip() {
    let engine = engine_with_db().await;

    let budget = engine
        .create_budget(NewBudgetCmd::new("alice", "Food", 40_000))
        .await
        .unwrap();
    assert_eq!(budget.period, "monthly");

    let budget_id = Uuid::parse_str(&budget.id).unwrap();
    let updated = engine
        .update_budget(
            UpdateBudgetCmd::new("alice", budget_id)
                .amount_minor(45_000)
                .period(engine::BudgetPeriod::Weekly),
        )
        .await
        .unwrap();
    assert_eq!(updated.amount_minor, 45_000);
    assert_eq!(updated.period, "weekly");

    engine.delete_budget("alice", budget_id).await.unwrap();
    assert!(engine.list_budgets("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let engine = engine_with_db().await;

    let err = engine
        .create_category("alice", "   ", None, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingField("category name must not be empty".to_string()));

    let err = engine
        .create_bank_account(NewBankAccountCmd::new("alice", "", "Acme Bank"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingField("bank_account name must not be empty".to_string()));
}

#[tokio::test]
async fn balances_survive_a_restart() {
    let path = format!("target/test_dbs/engine_{}.db", Uuid::new_v4());
    std::fs::create_dir_all("target/test_dbs").unwrap();

    let account_id = {
        let engine = engine_with_file_db(&path).await;
        let account_id = seed_account(&engine, "Checking", 10_000).await;
        let category_id = seed_category(&engine, "Food").await;
        engine
            .create_expense(CreateExpenseCmd::new(
                "alice", 2_500, category_id, account_id,
                Utc::now(),
            ))
            .await
            .unwrap();
        account_id
    };

    let engine = engine_with_file_db(&path).await;
    let account = engine.get_bank_account("alice", account_id).await.unwrap();
    assert_eq!(account.balance_minor, 7_500);

    std::fs::remove_file(&path).ok();
}
