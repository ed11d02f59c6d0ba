use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod access;
mod bank_accounts;
mod budgets;
mod categories;
mod expenses;
mod subcategories;
mod transactions;
mod users;

pub use categories::CategorySummary;
pub use expenses::ExpenseFilter;
pub use transactions::TransactionFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::MissingField(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn ensure_positive_amount(amount_minor: i64) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(
            "amount_minor must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// Parse a stored key column back into a `Uuid`, mapping failure onto the
/// same not-found error a missing row would produce.
fn parse_key(raw: &str, err_msg: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(raw).map_err(|_| EngineError::KeyNotFound(err_msg.to_string()))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected() {
        assert_eq!(
            normalize_required_name("   ", "category"),
            Err(EngineError::MissingField(
                "category name must not be empty".to_string()
            ))
        );
        assert_eq!(
            normalize_required_name(" Food ", "category"),
            Ok("Food".to_string())
        );
    }

    #[test]
    fn optional_text_trims_to_none() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(
            normalize_optional_text(Some(" note ")),
            Some("note".to_string())
        );
    }

    #[test]
    fn nonpositive_amounts_are_rejected() {
        assert!(ensure_positive_amount(0).is_err());
        assert!(ensure_positive_amount(-5).is_err());
        assert!(ensure_positive_amount(1).is_ok());
    }
}
