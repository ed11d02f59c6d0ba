use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Standard response wrapper: every endpoint answers with this shape.
///
/// Success bodies set `success: true` and carry the payload in `data`;
/// error bodies set `success: false` and only carry `message`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

/// Error body. Kept as its own type so the `data` field never shows up.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Distinguishes a JSON field that is absent from one that is `null`.
///
/// `None` = absent (leave unchanged), `Some(None)` = null (clear),
/// `Some(Some(v))` = set to `v`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

pub mod bank_account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankAccountNew {
        pub name: String,
        pub bank_name: String,
        pub account_number: Option<String>,
        /// One of `checking`, `savings`, `credit`, `cash`. Defaults to `checking`.
        pub account_type: Option<String>,
        pub balance_minor: Option<i64>,
        /// Currency code, `USD` by default.
        pub currency: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankAccountUpdate {
        pub name: Option<String>,
        pub bank_name: Option<String>,
        pub account_number: Option<String>,
        pub account_type: Option<String>,
        pub balance_minor: Option<i64>,
        pub currency: Option<String>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankAccountView {
        pub id: Uuid,
        pub name: String,
        pub bank_name: String,
        pub account_number: Option<String>,
        pub account_type: String,
        pub balance_minor: i64,
        pub currency: String,
        pub is_active: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub expense_count: Option<u64>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub description: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub icon: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub subcategory_count: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub expense_count: Option<u64>,
    }
}

pub mod subcategory {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubcategoryNew {
        pub category_id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubcategoryUpdate {
        pub category_id: Option<Uuid>,
        pub name: Option<String>,
        pub description: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubcategoryView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubcategoryList {
        pub category_id: Option<Uuid>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        /// Must be > 0.
        pub amount_minor: i64,
        pub category_id: Uuid,
        pub subcategory_id: Option<Uuid>,
        pub bank_account_id: Uuid,
        pub description: Option<String>,
        /// RFC3339 timestamp; the server uses now() when absent.
        pub occurred_at: Option<DateTime<Utc>>,
        /// One of `cash`, `card`, `bank_transfer`, `mobile`, `other`.
        pub payment_method: Option<String>,
        pub tags: Option<Vec<String>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub amount_minor: Option<i64>,
        pub category_id: Option<Uuid>,
        /// Absent = keep, `null` = clear, a value = set.
        #[serde(default, deserialize_with = "super::double_option")]
        pub subcategory_id: Option<Option<Uuid>>,
        pub bank_account_id: Option<Uuid>,
        pub description: Option<String>,
        pub occurred_at: Option<DateTime<Utc>>,
        pub payment_method: Option<String>,
        pub tags: Option<Vec<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub category_id: Option<Uuid>,
        pub subcategory_id: Option<Uuid>,
        pub bank_account_id: Option<Uuid>,
        pub occurred_after: Option<DateTime<Utc>>,
        pub occurred_before: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub description: String,
        pub occurred_at: DateTime<Utc>,
        pub payment_method: String,
        pub tags: Vec<String>,
        pub category: super::category::CategoryView,
        pub subcategory: Option<super::subcategory::SubcategoryView>,
        pub bank_account: super::bank_account::BankAccountView,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// `income` or `expense`.
        pub kind: String,
        /// Must be > 0.
        pub amount_minor: i64,
        pub category: String,
        pub description: Option<String>,
        pub occurred_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub kind: Option<String>,
        pub amount_minor: Option<i64>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub occurred_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionList {
        pub kind: Option<String>,
        pub category: Option<String>,
        pub occurred_after: Option<DateTime<Utc>>,
        pub occurred_before: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: String,
        pub amount_minor: i64,
        pub category: String,
        pub description: Option<String>,
        pub occurred_at: DateTime<Utc>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub category: String,
        /// Must be > 0.
        pub amount_minor: i64,
        /// One of `weekly`, `monthly`, `yearly`. Defaults to `monthly`.
        pub period: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub category: Option<String>,
        pub amount_minor: Option<i64>,
        pub period: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub category: String,
        pub amount_minor: i64,
        pub period: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub subject: String,
        pub email: Option<String>,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub email: Option<String>,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::expense::ExpenseUpdate;

    #[test]
    fn subcategory_patch_distinguishes_absent_from_null() {
        let absent: ExpenseUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.subcategory_id, None);

        let cleared: ExpenseUpdate = serde_json::from_str(r#"{"subcategory_id": null}"#).unwrap();
        assert_eq!(cleared.subcategory_id, Some(None));

        let set: ExpenseUpdate =
            serde_json::from_str(r#"{"subcategory_id": "7f4df04b-6ebd-4e94-a6e0-0a6f2f3e53e1"}"#)
                .unwrap();
        assert!(matches!(set.subcategory_id, Some(Some(_))));
    }
}
