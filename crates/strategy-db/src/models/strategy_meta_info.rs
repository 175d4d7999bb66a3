use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::strategy_meta_info;

/// Current derived state of a strategy, keyed by its address.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Queryable,
    Selectable,
    Identifiable,
    Insertable,
    AsChangeset,
)]
#[diesel(table_name = strategy_meta_info)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct StrategyMetaInfo {
    pub id: String,
    pub vault: Option<String>,
    pub name: Option<String>,
    pub added_at: Option<DateTime<Utc>>,
    pub removed_at: Option<DateTime<Utc>>,
    pub is_paused: bool,
    pub share_percent: Option<BigDecimal>,
    pub total_assets: BigDecimal,
    /// Block of the log that first attached the strategy to its vault
    pub tracked_from_block: Option<i64>,
    pub tracked_from_log_index: Option<i64>,
}

impl StrategyMetaInfo {
    /// Blank record: not paused, no assets, everything else unset
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vault: None,
            name: None,
            added_at: None,
            removed_at: None,
            is_paused: false,
            share_percent: None,
            total_assets: BigDecimal::from(0),
            tracked_from_block: None,
            tracked_from_log_index: None,
        }
    }

    /// `(block, log index)` of the first registration, if any
    pub fn tracked_from(&self) -> Option<(u64, u64)> {
        Some((
            self.tracked_from_block? as u64,
            self.tracked_from_log_index? as u64,
        ))
    }

    /// Find the meta info of a strategy
    pub fn find_by_id(id: &str, conn: &mut diesel::PgConnection) -> QueryResult<Option<Self>> {
        strategy_meta_info::table
            .find(id)
            .select(Self::as_select())
            .first(conn)
            .optional()
    }

    /// Every strategy ever attached to a vault
    pub fn find_by_vault(vault: &str, conn: &mut diesel::PgConnection) -> QueryResult<Vec<Self>> {
        strategy_meta_info::table
            .filter(strategy_meta_info::vault.eq(vault))
            .select(Self::as_select())
            .order(strategy_meta_info::id.asc())
            .load(conn)
    }

    /// Insert the record or overwrite every column of the existing one
    pub fn upsert(&self, conn: &mut diesel::PgConnection) -> QueryResult<Self> {
        diesel::insert_into(strategy_meta_info::table)
            .values(self)
            .on_conflict(strategy_meta_info::id)
            .do_update()
            .set(self)
            .returning(Self::as_returning())
            .get_result(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_meta_info_is_unpaused_and_empty() {
        let info = StrategyMetaInfo::new("0xabc");
        assert_eq!(info.id, "0xabc");
        assert!(!info.is_paused);
        assert_eq!(info.total_assets, BigDecimal::from(0));
        assert!(info.vault.is_none());
        assert!(info.share_percent.is_none());
        assert!(info.removed_at.is_none());
        assert_eq!(info.tracked_from(), None);
    }

    #[test]
    fn test_tracked_from_needs_both_columns() {
        let mut info = StrategyMetaInfo::new("0xabc");
        info.tracked_from_block = Some(150);
        assert_eq!(info.tracked_from(), None);

        info.tracked_from_log_index = Some(3);
        assert_eq!(info.tracked_from(), Some((150, 3)));
    }
}
