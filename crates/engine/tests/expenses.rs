use chrono::Utc;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    AccountType, CreateExpenseCmd, Currency, Engine, EngineError, ExpenseFilter,
    NewBankAccountCmd, SubcategoryPatch, UpdateExpenseCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    engine
        .sync_user("alice", Some("alice@example.com"), Some("Alice"), None)
        .await
        .unwrap();
    (engine, db)
}

async fn seed_account(engine: &Engine, user: &str, name: &str, balance_minor: i64) -> Uuid {
    let account = engine
        .create_bank_account(
            NewBankAccountCmd::new(user, name, "Acme Bank")
                .account_type(AccountType::Checking)
                .currency(Currency::Usd)
                .balance_minor(balance_minor),
        )
        .await
        .unwrap();
    Uuid::parse_str(&account.id).unwrap()
}

async fn seed_category(engine: &Engine, user: &str, name: &str) -> Uuid {
    let category = engine
        .create_category(user, name, None, None)
        .await
        .unwrap();
    Uuid::parse_str(&category.id).unwrap()
}

async fn seed_subcategory(engine: &Engine, user: &str, category_id: Uuid, name: &str) -> Uuid {
    let subcategory = engine
        .create_subcategory(user, category_id, name, None, None)
        .await
        .unwrap();
    Uuid::parse_str(&subcategory.id).unwrap()
}

async fn balance_of(engine: &Engine, user: &str, account_id: Uuid) -> i64 {
    engine
        .get_bank_account(user, account_id)
        .await
        .unwrap()
        .balance_minor
}

#[tokio::test]
async fn create_expense_debits_account() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, "alice", "Checking", 10_000).await;
    let category_id = seed_category(&engine, "alice", "Food").await;

    let detail = engine
        .create_expense(
            CreateExpenseCmd::new("alice", 2_500, category_id, account_id, Utc::now())
                .description("groceries")
                .tags(vec!["weekly".to_string()]),
        )
        .await
        .unwrap();

    assert_eq!(detail.expense.amount_minor, 2_500);
    assert_eq!(detail.category.name, "Food");
    assert_eq!(detail.bank_account.balance_minor, 7_500);
    assert_eq!(balance_of(&engine, "alice", account_id).await, 7_500);
}

#[tokio::test]
async fn running_balance_invariant_across_sequence() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, "alice", "Checking", 50_000).await;
    let category_id = seed_category(&engine, "alice", "Food").await;

    let first = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 10_000, category_id, account_id,
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, "alice", account_id).await, 40_000);

    let second = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 5_000, category_id, account_id,
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, "alice", account_id).await, 35_000);

    let first_id = Uuid::parse_str(&first.expense.id).unwrap();
    engine
        .update_expense(UpdateExpenseCmd::new("alice", first_id).amount_minor(12_000))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, "alice", account_id).await, 33_000);

    let second_id = Uuid::parse_str(&second.expense.id).unwrap();
    engine.delete_expense("alice", second_id).await.unwrap();
    assert_eq!(balance_of(&engine, "alice", account_id).await, 38_000);

    // initial - sum of live expenses: 50_000 - 12_000
    engine.delete_expense("alice", first_id).await.unwrap();
    assert_eq!(balance_of(&engine, "alice", account_id).await, 50_000);
}

#[tokio::test]
async fn create_then_delete_restores_prior_balance() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, "alice", "Checking", 12_345).await;
    let category_id = seed_category(&engine, "alice", "Travel").await;

    let detail = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 699, category_id, account_id,
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, "alice", account_id).await, 11_646);

    let expense_id = Uuid::parse_str(&detail.expense.id).unwrap();
    let deleted = engine.delete_expense("alice", expense_id).await.unwrap();
    assert_eq!(deleted.expense.amount_minor, 699);
    assert_eq!(balance_of(&engine, "alice", account_id).await, 12_345);
}

#[tokio::test]
async fn same_account_amount_change_applies_single_delta() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, "alice", "Checking", 10_000).await;
    let category_id = seed_category(&engine, "alice", "Food").await;

    let detail = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 3_000, category_id, account_id,
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, "alice", account_id).await, 7_000);

    let expense_id = Uuid::parse_str(&detail.expense.id).unwrap();
    let updated = engine
        .update_expense(UpdateExpenseCmd::new("alice", expense_id).amount_minor(4_500))
        .await
        .unwrap();

    assert_eq!(updated.expense.amount_minor, 4_500);
    assert_eq!(balance_of(&engine, "alice", account_id).await, 5_500);
}

#[tokio::test]
async fn cross_account_move_credits_old_and_debits_new() {
    let (engine, _db) = engine_with_db().await;
    let account_a = seed_account(&engine, "alice", "Checking", 10_000).await;
    let account_b = seed_account(&engine, "alice", "Savings", 20_000).await;
    let category_id = seed_category(&engine, "alice", "Food").await;

    let detail = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 5_000, category_id, account_a,
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, "alice", account_a).await, 5_000);

    let expense_id = Uuid::parse_str(&detail.expense.id).unwrap();
    let moved = engine
        .update_expense(UpdateExpenseCmd::new("alice", expense_id).bank_account_id(account_b))
        .await
        .unwrap();

    assert_eq!(moved.bank_account.id, account_b.to_string());
    assert_eq!(balance_of(&engine, "alice", account_a).await, 10_000);
    assert_eq!(balance_of(&engine, "alice", account_b).await, 15_000);
}

#[tokio::test]
async fn cross_account_move_with_new_amount_uses_each_accounts_own_delta() {
    let (engine, _db) = engine_with_db().await;
    let account_a = seed_account(&engine, "alice", "Checking", 10_000).await;
    let account_b = seed_account(&engine, "alice", "Savings", 20_000).await;
    let category_id = seed_category(&engine, "alice", "Food").await;

    let detail = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 5_000, category_id, account_a,
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, "alice", account_a).await, 5_000);

    // Old account is credited the old amount, new account debited the new one.
    let expense_id = Uuid::parse_str(&detail.expense.id).unwrap();
    let moved = engine
        .update_expense(
            UpdateExpenseCmd::new("alice", expense_id)
                .bank_account_id(account_b)
                .amount_minor(7_000),
        )
        .await
        .unwrap();

    assert_eq!(moved.expense.amount_minor, 7_000);
    assert_eq!(moved.bank_account.balance_minor, 13_000);
    assert_eq!(balance_of(&engine, "alice", account_a).await, 10_000);
    assert_eq!(balance_of(&engine, "alice", account_b).await, 13_000);
}

#[tokio::test]
async fn foreign_category_is_invisible_and_leaves_no_side_effects() {
    let (engine, _db) = engine_with_db().await;
    engine.sync_user("bob", None, None, None).await.unwrap();

    let account_id = seed_account(&engine, "alice", "Checking", 10_000).await;
    let bob_category = seed_category(&engine, "bob", "Secret").await;

    let err = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 1_000, bob_category, account_id,
            Utc::now(),
        ))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("category not exists".to_string()));
    assert_eq!(balance_of(&engine, "alice", account_id).await, 10_000);
    let expenses = engine
        .list_expenses("alice", ExpenseFilter::default())
        .await
        .unwrap();
    assert!(expenses.is_empty());
}

#[tokio::test]
async fn subcategory_of_other_category_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, "alice", "Checking", 10_000).await;
    let food = seed_category(&engine, "alice", "Food").await;
    let travel = seed_category(&engine, "alice", "Travel").await;
    let restaurants = seed_subcategory(&engine, "alice", food, "Restaurants").await;

    let err = engine
        .create_expense(
            CreateExpenseCmd::new("alice", 1_000, travel, account_id, Utc::now())
                .subcategory_id(restaurants),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::CategoryMismatch(_)));
    assert_eq!(balance_of(&engine, "alice", account_id).await, 10_000);
    let expenses = engine
        .list_expenses("alice", ExpenseFilter::default())
        .await
        .unwrap();
    assert!(expenses.is_empty());
}

#[tokio::test]
async fn retained_subcategory_is_validated_against_new_category() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, "alice", "Checking", 10_000).await;
    let food = seed_category(&engine, "alice", "Food").await;
    let travel = seed_category(&engine, "alice", "Travel").await;
    let restaurants = seed_subcategory(&engine, "alice", food, "Restaurants").await;

    let detail = engine
        .create_expense(
            CreateExpenseCmd::new("alice", 1_000, food, account_id, Utc::now())
                .subcategory_id(restaurants),
        )
        .await
        .unwrap();

    let expense_id = Uuid::parse_str(&detail.expense.id).unwrap();
    let err = engine
        .update_expense(UpdateExpenseCmd::new("alice", expense_id).category_id(travel))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CategoryMismatch(_)));

    // Clearing the subcategory in the same update makes the move legal.
    let moved = engine
        .update_expense(
            UpdateExpenseCmd::new("alice", expense_id)
                .category_id(travel)
                .subcategory(SubcategoryPatch::Clear),
        )
        .await
        .unwrap();
    assert_eq!(moved.category.id, travel.to_string());
    assert!(moved.subcategory.is_none());
    assert_eq!(balance_of(&engine, "alice", account_id).await, 9_000);
}

#[tokio::test]
async fn nonpositive_amounts_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, "alice", "Checking", 10_000).await;
    let category_id = seed_category(&engine, "alice", "Food").await;

    for amount in [0, -100] {
        let err = engine
            .create_expense(CreateExpenseCmd::new(
                "alice", amount, category_id, account_id,
                Utc::now(),
            ))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("amount_minor must be > 0".to_string())
        );
    }
    assert_eq!(balance_of(&engine, "alice", account_id).await, 10_000);

    let detail = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 500, category_id, account_id,
            Utc::now(),
        ))
        .await
        .unwrap();
    let expense_id = Uuid::parse_str(&detail.expense.id).unwrap();
    let err = engine
        .update_expense(UpdateExpenseCmd::new("alice", expense_id).amount_minor(0))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("amount_minor must be > 0".to_string())
    );
    assert_eq!(balance_of(&engine, "alice", account_id).await, 9_500);
}

#[tokio::test]
async fn zero_delta_update_leaves_balance_untouched() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, "alice", "Checking", 10_000).await;
    let category_id = seed_category(&engine, "alice", "Food").await;

    let detail = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 2_000, category_id, account_id,
            Utc::now(),
        ))
        .await
        .unwrap();

    let expense_id = Uuid::parse_str(&detail.expense.id).unwrap();
    let updated = engine
        .update_expense(UpdateExpenseCmd::new("alice", expense_id).description("renamed"))
        .await
        .unwrap();

    assert_eq!(updated.expense.description, "renamed");
    assert_eq!(updated.expense.amount_minor, 2_000);
    assert_eq!(balance_of(&engine, "alice", account_id).await, 8_000);
}

#[tokio::test]
async fn list_expenses_filters_by_account_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let account_a = seed_account(&engine, "alice", "Checking", 10_000).await;
    let account_b = seed_account(&engine, "alice", "Savings", 10_000).await;
    let category_id = seed_category(&engine, "alice", "Food").await;

    let older = Utc::now() - chrono::Duration::days(2);
    let newer = Utc::now();
    engine
        .create_expense(
            CreateExpenseCmd::new("alice", 100, category_id, account_a, older)
                .description("older"),
        )
        .await
        .unwrap();
    engine
        .create_expense(
            CreateExpenseCmd::new("alice", 200, category_id, account_a, newer)
                .description("newer"),
        )
        .await
        .unwrap();
    engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 300, category_id, account_b,
            Utc::now(),
        ))
        .await
        .unwrap();

    let all = engine
        .list_expenses("alice", ExpenseFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let only_a = engine
        .list_expenses(
            "alice",
            ExpenseFilter::default().bank_account_id(account_a),
        )
        .await
        .unwrap();
    assert_eq!(only_a.len(), 2);
    assert_eq!(only_a[0].expense.description, "newer");
    assert_eq!(only_a[1].expense.description, "older");
}

#[tokio::test]
async fn expense_of_other_user_is_invisible() {
    let (engine, _db) = engine_with_db().await;
    engine.sync_user("bob", None, None, None).await.unwrap();

    let account_id = seed_account(&engine, "alice", "Checking", 10_000).await;
    let category_id = seed_category(&engine, "alice", "Food").await;
    let detail = engine
        .create_expense(CreateExpenseCmd::new(
            "alice", 1_000, category_id, account_id,
            Utc::now(),
        ))
        .await
        .unwrap();

    let expense_id = Uuid::parse_str(&detail.expense.id).unwrap();
    let err = engine.delete_expense("bob", expense_id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("expense not exists".to_string()));
    assert_eq!(balance_of(&engine, "alice", account_id).await, 9_000);
}
