//! # Price Rule Repository
//!
//! Loads and stores the rules of a price book.
//!
//! Rows are validated on the way out. A rule with an unknown action type,
//! a missing target or an unparsable date fails the whole list with
//! [`DbError::InvalidRecord`]; the simulator surfaces that as a catalog error
//! instead of pricing with a partial rule set.

use sqlx::SqlitePool;
use tracing::debug;

use super::{format_window_bound, parse_window_bound, WindowBound};
use crate::error::{DbError, DbResult};
use vetpos_core::validation::validate_price_rule;
use vetpos_core::{PriceRule, RuleAction, Scope};

#[derive(Debug, sqlx::FromRow)]
struct PriceRuleRow {
    id: i64,
    price_book_id: i64,
    name: String,
    action_type: String,
    action_value: i64,
    priority: i32,
    min_qty: Option<i64>,
    max_qty: Option<i64>,
    scope: String,
    target: Option<String>,
    is_active: bool,
    effective_from: Option<String>,
    effective_to: Option<String>,
}

impl TryFrom<PriceRuleRow> for PriceRule {
    type Error = DbError;

    fn try_from(row: PriceRuleRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = |reason: String| DbError::invalid_record("price_rule", id, reason);

        let action = RuleAction::from_parts(&row.action_type, row.action_value)
            .map_err(|e| invalid(e.to_string()))?;
        let scope = row
            .scope
            .parse::<Scope>()
            .map_err(|e| invalid(e.to_string()))?;
        let effective_from = parse_window_bound(row.effective_from.as_deref(), WindowBound::From)
            .map_err(|e| invalid(format!("effective_from: {}", e)))?;
        let effective_to = parse_window_bound(row.effective_to.as_deref(), WindowBound::To)
            .map_err(|e| invalid(format!("effective_to: {}", e)))?;

        let rule = PriceRule {
            id,
            price_book_id: row.price_book_id,
            name: row.name,
            action,
            priority: row.priority,
            min_qty: row.min_qty,
            max_qty: row.max_qty,
            scope,
            target: row.target,
            is_active: row.is_active,
            effective_from,
            effective_to,
        };

        validate_price_rule(&rule).map_err(|e| invalid(e.to_string()))?;
        Ok(rule)
    }
}

/// Repository for price rule operations.
#[derive(Debug, Clone)]
pub struct PriceRuleRepository {
    pool: SqlitePool,
}

impl PriceRuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PriceRuleRepository { pool }
    }

    /// Lists every rule of a price book, inactive ones included, by id.
    ///
    /// Eligibility (active flag, dates, quantity, scope) is decided by the
    /// resolver, not here.
    ///
    /// ## Returns
    /// * `Err(DbError::InvalidRecord)` - A stored rule is malformed
    pub async fn list_by_price_book(&self, price_book_id: i64) -> DbResult<Vec<PriceRule>> {
        debug!(price_book_id, "Loading price rules");

        let rows = sqlx::query_as::<_, PriceRuleRow>(
            r#"
            SELECT id, price_book_id, name, action_type, action_value, priority,
                   min_qty, max_qty, scope, target, is_active,
                   effective_from, effective_to
            FROM price_rules
            WHERE price_book_id = ?1
            ORDER BY id
            "#,
        )
        .bind(price_book_id)
        .fetch_all(&self.pool)
        .await?;

        let rules = rows
            .into_iter()
            .map(PriceRule::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        debug!(price_book_id, count = rules.len(), "Price rules loaded");
        Ok(rules)
    }

    /// Inserts a rule and returns it with its assigned id.
    ///
    /// The `id` of the argument is ignored.
    ///
    /// ## Returns
    /// * `Err(DbError::InvalidRecord)` - The rule fails validation
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown price book
    pub async fn insert(&self, rule: &PriceRule) -> DbResult<PriceRule> {
        validate_price_rule(rule).map_err(|e| DbError::invalid_record("price_rule", "new", e))?;

        let result = sqlx::query(
            r#"
            INSERT INTO price_rules (
                price_book_id, name, action_type, action_value, priority,
                min_qty, max_qty, scope, target, is_active,
                effective_from, effective_to
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(rule.price_book_id)
        .bind(&rule.name)
        .bind(rule.action.action_type())
        .bind(rule.action.scaled_value())
        .bind(rule.priority)
        .bind(rule.min_qty)
        .bind(rule.max_qty)
        .bind(rule.scope.as_str())
        .bind(&rule.target)
        .bind(rule.is_active)
        .bind(format_window_bound(rule.effective_from))
        .bind(format_window_bound(rule.effective_to))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(rule_id = id, price_book_id = rule.price_book_id, "Price rule inserted");

        Ok(PriceRule {
            id,
            ..rule.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{TimeZone, Utc};
    use vetpos_core::money::Money;
    use vetpos_core::Percentage;

    fn clinic_rule(price_book_id: i64) -> PriceRule {
        PriceRule {
            id: 0,
            price_book_id,
            name: "Clinic".to_string(),
            action: RuleAction::Percent(Percentage::from_bps(1000)),
            priority: 10,
            min_qty: Some(1),
            max_qty: None,
            scope: Scope::Sku,
            target: Some("AMOX-250".to_string()),
            is_active: true,
            effective_from: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            effective_to: None,
        }
    }

    async fn setup() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let book = db.price_books().insert("Clinic").await.unwrap();
        (db, book.id)
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let (db, book_id) = setup().await;

        let inserted = db.price_rules().insert(&clinic_rule(book_id)).await.unwrap();
        let mut net = clinic_rule(book_id);
        net.action = RuleAction::Net(Money::from_major(190_000));
        net.scope = Scope::All;
        net.target = None;
        db.price_rules().insert(&net).await.unwrap();

        let rules = db.price_rules().list_by_price_book(book_id).await.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0], inserted);
        assert_eq!(rules[1].action, RuleAction::Net(Money::from_major(190_000)));
        assert!(rules[0].id < rules[1].id);

        assert!(db.price_rules().list_by_price_book(book_id + 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bare_dates_expand_to_whole_days() {
        let (db, book_id) = setup().await;
        sqlx::query(
            r#"
            INSERT INTO price_rules (price_book_id, action_type, action_value, scope,
                                     effective_from, effective_to)
            VALUES (?1, 'amount', 500, 'all', '2025-03-01', '2025-03-31')
            "#,
        )
        .bind(book_id)
        .execute(db.pool())
        .await
        .unwrap();

        let rules = db.price_rules().list_by_price_book(book_id).await.unwrap();
        let rule = &rules[0];
        assert_eq!(rule.effective_from, Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
        assert!(rule.effective_to.unwrap() > Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap());
        assert_eq!(rule.label(), format!("rule #{}", rule.id));
    }

    #[tokio::test]
    async fn test_malformed_rows_are_invalid_records() {
        let (db, book_id) = setup().await;
        sqlx::query(
            r#"
            INSERT INTO price_rules (price_book_id, action_type, action_value, scope, target)
            VALUES (?1, 'percent', 1000, 'category', NULL)
            "#,
        )
        .bind(book_id)
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.price_rules().list_by_price_book(book_id).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord { ref entity, .. } if entity == "price_rule"));

        let (db, book_id) = setup().await;
        sqlx::query(
            r#"
            INSERT INTO price_rules (price_book_id, action_type, action_value, scope, effective_to)
            VALUES (?1, 'amount', 100, 'all', 'soon')
            "#,
        )
        .bind(book_id)
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.price_rules().list_by_price_book(book_id).await.unwrap_err();
        assert!(err.to_string().contains("effective_to"));
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_rule() {
        let (db, book_id) = setup().await;

        let mut rule = clinic_rule(book_id);
        rule.min_qty = Some(10);
        rule.max_qty = Some(5);
        let err = db.price_rules().insert(&rule).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord { .. }));

        let err = db.price_rules().insert(&clinic_rule(book_id + 100)).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
