use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::event_records;

/// Immutable copy of one on-chain event.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = event_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventRecord {
    pub id: String,
    pub kind: String,
    pub contract_address: String,
    pub block_number: i64,
    pub block_timestamp: DateTime<Utc>,
    pub transaction_hash: String,
    pub log_index: i64,
    pub params: serde_json::Value,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = event_records)]
pub struct NewEventRecord {
    pub id: String,
    pub kind: String,
    pub contract_address: String,
    pub block_number: i64,
    pub block_timestamp: DateTime<Utc>,
    pub transaction_hash: String,
    pub log_index: i64,
    pub params: serde_json::Value,
}

impl EventRecord {
    /// Insert an event record; a record with the same id is left untouched.
    ///
    /// Returns the number of inserted rows (0 for a re-delivered event).
    pub fn create(
        new_record: &NewEventRecord,
        conn: &mut diesel::PgConnection,
    ) -> QueryResult<usize> {
        diesel::insert_into(event_records::table)
            .values(new_record)
            .on_conflict(event_records::id)
            .do_nothing()
            .execute(conn)
    }
}
