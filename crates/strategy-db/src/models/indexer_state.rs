use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::schema::indexer_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum IndexerStatus {
    Active,
    Error,
    Synced,
}

/// Resume cursor of the log indexer of one vault
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = indexer_state)]
pub struct IndexerState {
    pub id: i32,
    pub vault_address: String,
    pub last_processed_block: i64,
    pub last_processed_timestamp: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl IndexerState {
    /// Unknown strings are treated as no status.
    pub fn status_enum(&self) -> Option<IndexerStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn is_error(&self) -> bool {
        self.status_enum() == Some(IndexerStatus::Error)
    }

    pub fn is_synced(&self) -> bool {
        self.status_enum() == Some(IndexerStatus::Synced)
    }
}

#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = indexer_state)]
pub struct NewIndexerState {
    pub vault_address: String,
    pub last_processed_block: i64,
    pub last_processed_timestamp: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

#[derive(Default, AsChangeset, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = indexer_state)]
pub struct IndexerStateUpdate {
    pub last_processed_block: Option<i64>,
    pub last_processed_timestamp: Option<DateTime<Utc>>,
    pub last_error: Option<Option<String>>,
    pub last_error_at: Option<Option<DateTime<Utc>>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl IndexerState {
    pub fn find_by_vault_address(
        vault_address: &str,
        conn: &mut PgConnection,
    ) -> Result<Self, diesel::result::Error> {
        indexer_state::table
            .filter(indexer_state::vault_address.eq(vault_address))
            .first(conn)
    }

    pub fn create(
        new_state: &NewIndexerState,
        conn: &mut PgConnection,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(indexer_state::table)
            .values(new_state)
            .returning(Self::as_returning())
            .get_result(conn)
    }

    pub fn update(
        &self,
        updates: &IndexerStateUpdate,
        conn: &mut PgConnection,
    ) -> Result<Self, diesel::result::Error> {
        diesel::update(indexer_state::table.filter(indexer_state::id.eq(self.id)))
            .set(updates)
            .returning(Self::as_returning())
            .get_result(conn)
    }

    /// Create the cursor of a vault, or keep the stored one untouched.
    pub fn find_or_create(
        vault_address: &str,
        last_processed_block: i64,
        conn: &mut PgConnection,
    ) -> Result<Self, diesel::result::Error> {
        match Self::find_by_vault_address(vault_address, conn) {
            Ok(state) => Ok(state),
            Err(diesel::result::Error::NotFound) => Self::create(
                &NewIndexerState {
                    vault_address: vault_address.to_string(),
                    last_processed_block,
                    last_processed_timestamp: None,
                    status: Some(IndexerStatus::Active.to_string()),
                },
                conn,
            ),
            Err(e) => Err(e),
        }
    }

    /// Advance the cursor, keeping `synced` if it was already reached and
    /// clearing any recorded error.
    pub fn advance(
        vault_address: &str,
        last_processed_block: i64,
        last_processed_timestamp: Option<DateTime<Utc>>,
        conn: &mut PgConnection,
    ) -> Result<Self, diesel::result::Error> {
        let current_state = Self::find_by_vault_address(vault_address, conn)?;

        let new_status = if current_state.is_synced() {
            IndexerStatus::Synced
        } else {
            IndexerStatus::Active
        };

        let updates = IndexerStateUpdate {
            last_processed_block: Some(last_processed_block),
            last_processed_timestamp,
            status: Some(new_status.to_string()),
            last_error: Some(None),
            last_error_at: Some(None),
            updated_at: Some(Utc::now()),
        };

        current_state.update(&updates, conn)
    }

    pub fn mark_synced(&self, conn: &mut PgConnection) -> Result<Self, diesel::result::Error> {
        self.update(
            &IndexerStateUpdate {
                status: Some(IndexerStatus::Synced.to_string()),
                updated_at: Some(Utc::now()),
                ..Default::default()
            },
            conn,
        )
    }

    pub fn record_error(
        &self,
        error_message: String,
        conn: &mut PgConnection,
    ) -> Result<Self, diesel::result::Error> {
        let updates = IndexerStateUpdate {
            last_error: Some(Some(error_message)),
            last_error_at: Some(Some(Utc::now())),
            status: Some(IndexerStatus::Error.to_string()),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        self.update(&updates, conn)
    }
}
