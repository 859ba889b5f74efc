// src/repositories/record_repository.rs
//
// Record persistence
//
// One table holds records of every entity type; the field map is stored as a
// JSON object. Results are always ordered by key, which is insertion order.

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Row};
use std::sync::Arc;

use crate::db::{get_connection, ConnectionPool};
use crate::domain::{FieldMap, Predicate, Record, RecordId};
use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------
// Repository contract
// ---------------------------------------------------------------------
#[cfg_attr(test, mockall::automock)]
pub trait RecordRepository: Send + Sync {
    /// Insert a new record and assign its key
    fn create(&self, entity_type: &str, fields: &FieldMap) -> AppResult<Record>;

    fn find_by_id(&self, entity_type: &str, id: RecordId) -> AppResult<Option<Record>>;

    /// All records of `entity_type` matching `predicate`, in key order
    fn find_all_where(&self, entity_type: &str, predicate: &Predicate) -> AppResult<Vec<Record>>;

    /// Record of `entity_type` with the highest key
    fn find_last(&self, entity_type: &str) -> AppResult<Option<Record>>;

    /// Overwrite fields and `updated_at` of an existing record
    fn update(&self, record: &Record) -> AppResult<()>;

    fn delete(&self, entity_type: &str, id: RecordId) -> AppResult<()>;

    fn count(&self, entity_type: &str) -> AppResult<i64>;
}

pub struct SqliteRecordRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteRecordRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map database row to Record - returns rusqlite::Error for query_map compatibility
    fn row_to_record(row: &Row) -> rusqlite::Result<Record> {
        let id: i64 = row.get("id")?;
        let entity_type: String = row.get("entity_type")?;

        let fields_json: String = row.get("fields")?;
        let fields: FieldMap = serde_json::from_str(&fields_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let created_at = parse_timestamp(row, "created_at", 3)?;
        let updated_at = parse_timestamp(row, "updated_at", 4)?;

        Ok(Record {
            id: RecordId::new(id),
            entity_type,
            fields,
            created_at,
            updated_at,
        })
    }
}

fn parse_timestamp(row: &Row, column: &str, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                index,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

impl RecordRepository for SqliteRecordRepository {
    fn create(&self, entity_type: &str, fields: &FieldMap) -> AppResult<Record> {
        let conn = get_connection(&self.pool)?;

        let fields_json = serde_json::to_string(fields)?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO records (entity_type, fields, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![entity_type, fields_json, now.to_rfc3339(), now.to_rfc3339()],
        )?;

        Ok(Record {
            id: RecordId::new(conn.last_insert_rowid()),
            entity_type: entity_type.to_string(),
            fields: fields.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    fn find_by_id(&self, entity_type: &str, id: RecordId) -> AppResult<Option<Record>> {
        let conn = get_connection(&self.pool)?;

        let mut stmt = conn.prepare(
            "SELECT id, entity_type, fields, created_at, updated_at
             FROM records WHERE id = ?1 AND entity_type = ?2",
        )?;

        match stmt.query_row(params![id.value(), entity_type], Self::row_to_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn find_all_where(&self, entity_type: &str, predicate: &Predicate) -> AppResult<Vec<Record>> {
        let mut args = vec![SqlValue::Text(entity_type.to_string())];

        // Key lookups go to SQL; field predicates are evaluated on the decoded rows
        let id_filter = match predicate {
            Predicate::IdIn { ids } if ids.is_empty() => return Ok(Vec::new()),
            Predicate::IdIn { ids } => {
                args.extend(ids.iter().map(|id| SqlValue::Integer(id.value())));
                let placeholders: Vec<String> = (2..=args.len()).map(|n| format!("?{}", n)).collect();
                format!(" AND id IN ({})", placeholders.join(", "))
            }
            _ => String::new(),
        };

        let conn = get_connection(&self.pool)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT id, entity_type, fields, created_at, updated_at
             FROM records WHERE entity_type = ?1{}
             ORDER BY id",
            id_filter
        ))?;

        let mut records = Vec::new();
        for row in stmt.query_map(params_from_iter(args.iter()), Self::row_to_record)? {
            let record = row?;
            if predicate.matches(&record) {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn find_last(&self, entity_type: &str) -> AppResult<Option<Record>> {
        let conn = get_connection(&self.pool)?;

        let mut stmt = conn.prepare(
            "SELECT id, entity_type, fields, created_at, updated_at
             FROM records WHERE entity_type = ?1
             ORDER BY id DESC LIMIT 1",
        )?;

        match stmt.query_row(params![entity_type], Self::row_to_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn update(&self, record: &Record) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;

        let fields_json = serde_json::to_string(&record.fields)?;

        let rows_affected = conn.execute(
            "UPDATE records SET fields = ?1, updated_at = ?2
             WHERE id = ?3 AND entity_type = ?4",
            params![
                fields_json,
                record.updated_at.to_rfc3339(),
                record.id.value(),
                record.entity_type,
            ],
        )?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    fn delete(&self, entity_type: &str, id: RecordId) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;

        let rows_affected = conn.execute(
            "DELETE FROM records WHERE id = ?1 AND entity_type = ?2",
            params![id.value(), entity_type],
        )?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    fn count(&self, entity_type: &str) -> AppResult<i64> {
        let conn = get_connection(&self.pool)?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE entity_type = ?1",
            params![entity_type],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_connection_pool, initialize_database, StoreConfig};
    use crate::domain::Value;
    use crate::fields;

    fn repo() -> SqliteRecordRepository {
        let pool = create_connection_pool(&StoreConfig::in_memory()).unwrap();
        {
            let conn = get_connection(&pool).unwrap();
            initialize_database(&conn).unwrap();
        }
        SqliteRecordRepository::new(Arc::new(pool))
    }

    #[test]
    fn test_create_assigns_increasing_keys() {
        let repo = repo();

        let a = repo.create("User", &fields! { "name" => "Josh" }).unwrap();
        let b = repo.create("User", &fields! { "name" => "Brant" }).unwrap();

        assert!(b.id > a.id);
        assert_eq!(a.text("name"), Some("Josh"));
    }

    #[test]
    fn test_find_by_id_round_trips_fields() {
        let repo = repo();
        let created = repo
            .create("Leaf", &fields! { "diseased" => false, "tree_id" => Value::Null })
            .unwrap();

        let found = repo.find_by_id("Leaf", created.id).unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.fields, created.fields);
        assert_eq!(found.created_at, created.created_at);
    }

    #[test]
    fn test_find_by_id_checks_entity_type() {
        let repo = repo();
        let user = repo.create("User", &fields! { "name" => "Rod" }).unwrap();

        assert!(repo.find_by_id("Post", user.id).unwrap().is_none());
    }

    #[test]
    fn test_find_all_where_keeps_insertion_order() {
        let repo = repo();
        repo.create("Post", &fields! { "title" => "b", "user_id" => 1 }).unwrap();
        repo.create("Post", &fields! { "title" => "a", "user_id" => 2 }).unwrap();
        repo.create("Post", &fields! { "title" => "c", "user_id" => 1 }).unwrap();
        repo.create("Comment", &fields! { "user_id" => 1 }).unwrap();

        let posts = repo
            .find_all_where("Post", &Predicate::field_equals("user_id", 1))
            .unwrap();

        let titles: Vec<_> = posts.iter().filter_map(|p| p.text("title")).collect();
        assert_eq!(titles, vec!["b", "c"]);
    }

    #[test]
    fn test_id_in_filters_by_key_and_type() {
        let repo = repo();
        let a = repo.create("User", &fields! { "name" => "a" }).unwrap();
        let post = repo.create("Post", &fields! { "title" => "p" }).unwrap();
        let b = repo.create("User", &fields! { "name" => "b" }).unwrap();
        repo.create("User", &fields! { "name" => "c" }).unwrap();

        let users = repo
            .find_all_where("User", &Predicate::id_in(vec![b.id, post.id, a.id]))
            .unwrap();
        assert_eq!(users, vec![a, b]);

        assert!(repo
            .find_all_where("User", &Predicate::id_in(vec![]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_find_last() {
        let repo = repo();
        assert!(repo.find_last("Tree").unwrap().is_none());

        repo.create("Tree", &fields! {}).unwrap();
        let newest = repo.create("Tree", &fields! {}).unwrap();
        repo.create("Leaf", &fields! {}).unwrap();

        assert_eq!(repo.find_last("Tree").unwrap(), Some(newest));
    }

    #[test]
    fn test_update_and_delete() {
        let repo = repo();
        let mut user = repo.create("User", &fields! { "name" => "Jim" }).unwrap();

        user.fields.insert("name".to_string(), Value::from("Jan"));
        repo.update(&user).unwrap();
        assert_eq!(
            repo.find_by_id("User", user.id).unwrap().unwrap().text("name"),
            Some("Jan")
        );

        repo.delete("User", user.id).unwrap();
        assert!(repo.find_by_id("User", user.id).unwrap().is_none());
        assert!(matches!(repo.delete("User", user.id), Err(AppError::NotFound)));
        assert!(matches!(repo.update(&user), Err(AppError::NotFound)));
    }

    #[test]
    fn test_keys_are_never_reused() {
        let repo = repo();
        let first = repo.create("Tree", &fields! {}).unwrap();
        repo.delete("Tree", first.id).unwrap();

        let second = repo.create("Tree", &fields! {}).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_count() {
        let repo = repo();
        repo.create("Leaf", &fields! {}).unwrap();
        repo.create("Leaf", &fields! {}).unwrap();

        assert_eq!(repo.count("Leaf").unwrap(), 2);
        assert_eq!(repo.count("Tree").unwrap(), 0);
    }
}
