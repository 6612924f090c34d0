use std::path::Path;

use rusqlite::{params, params_from_iter, Connection};

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::models::event::{new_event_id, Event, NewEvent};
use crate::store::EventStore;

/// `EventStore` over a single SQLite table. The storage location is an
/// explicit constructor argument; there is no process-global database.
pub struct SqliteEventStore {
    conn: Connection,
}

impl SqliteEventStore {
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }
}

impl EventStore for SqliteEventStore {
    fn create(&self, event: NewEvent) -> DbResult<String> {
        let id = new_event_id();
        self.conn.execute(
            "INSERT INTO events (id, start_time, end_time, text, people, prompt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                event.start_time,
                event.end_time,
                event.text,
                event.people,
                event.prompt,
            ],
        )?;
        Ok(id)
    }

    fn query(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        people: Option<&[String]>,
    ) -> DbResult<Vec<Event>> {
        let mut sql =
            String::from("SELECT id, start_time, end_time, text, people, prompt FROM events");
        let mut clauses: Vec<&str> = Vec::new();
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(start) = start {
            clauses.push("start_time >= ?");
            bind_values.push(start.to_string());
        }
        if let Some(end) = end {
            clauses.push("start_time <= ?");
            bind_values.push(end.to_string());
        }
        if let Some(people) = people {
            // Substring containment on the joined representation, one LIKE
            // per requested name.
            for name in people {
                clauses.push("people LIKE ?");
                bind_values.push(format!("%{}%", name));
            }
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY start_time ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind_values.iter()), |row| {
            Ok(Event {
                id: row.get(0)?,
                start_time: row.get(1)?,
                end_time: row.get(2)?,
                text: row.get(3)?,
                people: row.get(4)?,
                prompt: row.get(5)?,
            })
        })?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    fn delete_range(&self, start: &str, end: &str) -> DbResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM events WHERE start_time >= ?1 AND start_time <= ?2",
            params![start, end],
        )?;
        Ok(deleted)
    }

    fn delete_all(&self) -> DbResult<usize> {
        let deleted = self.conn.execute("DELETE FROM events", [])?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteEventStore {
        SqliteEventStore::open_in_memory().unwrap()
    }

    fn event(start: &str, end: &str, text: &str, people: &str) -> NewEvent {
        NewEvent {
            start_time: start.to_string(),
            end_time: end.to_string(),
            text: text.to_string(),
            people: people.to_string(),
            prompt: None,
        }
    }

    #[test]
    fn create_assigns_unique_ids_and_persists_all_fields() {
        let store = store();
        let mut new_event = event("2024-01-20", "2024-01-20", "Test Event", "");
        new_event.prompt = Some("test prompt".to_string());
        let first = store.create(new_event).unwrap();
        let second = store
            .create(event("2024-01-21", "2024-01-21", "Other", ""))
            .unwrap();
        assert_ne!(first, second);

        let events = store.query(None, None, None).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, first);
        assert_eq!(events[0].text, "Test Event");
        assert_eq!(events[0].prompt.as_deref(), Some("test prompt"));
        assert_eq!(events[1].prompt, None);
    }

    #[test]
    fn query_bounds_are_inclusive_and_ordered_ascending() {
        let store = store();
        for day in ["2024-01-22", "2024-01-19", "2024-01-20", "2024-01-23"] {
            store.create(event(day, day, day, "")).unwrap();
        }

        let events = store
            .query(Some("2024-01-20"), Some("2024-01-22"), None)
            .unwrap();
        let starts: Vec<&str> = events.iter().map(|e| e.start_time.as_str()).collect();
        assert_eq!(starts, vec!["2024-01-20", "2024-01-22"]);
    }

    #[test]
    fn query_without_end_returns_everything_from_start() {
        let store = store();
        store
            .create(event("2024-01-19", "2024-01-19", "before", ""))
            .unwrap();
        store
            .create(event("2024-06-01", "2024-06-01", "after", ""))
            .unwrap();

        let events = store.query(Some("2024-01-20"), None, None).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "after");
    }

    #[test]
    fn people_filter_requires_every_name() {
        let store = store();
        store
            .create(event("2024-01-20", "2024-01-20", "dinner", "mom, dad"))
            .unwrap();
        store
            .create(event("2024-01-21", "2024-01-21", "coffee", "Alice"))
            .unwrap();

        let both = store
            .query(None, None, Some(&["mom".to_string(), "dad".to_string()]))
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].text, "dinner");

        let alice = store
            .query(None, None, Some(&["Alice".to_string()]))
            .unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].text, "coffee");

        let nobody = store
            .query(None, None, Some(&["Bob".to_string()]))
            .unwrap();
        assert!(nobody.is_empty());
    }

    #[test]
    fn delete_range_is_inclusive_and_idempotent() {
        let store = store();
        for day in ["2023-12-31", "2024-01-01", "2024-01-31", "2024-02-01"] {
            store.create(event(day, day, day, "")).unwrap();
        }

        let deleted = store.delete_range("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(deleted, 2);
        let again = store.delete_range("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(again, 0);

        let remaining = store.query(None, None, None).unwrap();
        let starts: Vec<&str> = remaining.iter().map(|e| e.start_time.as_str()).collect();
        assert_eq!(starts, vec!["2023-12-31", "2024-02-01"]);
    }

    #[test]
    fn delete_all_returns_prior_total() {
        let store = store();
        for day in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            store.create(event(day, day, day, "")).unwrap();
        }
        assert_eq!(store.delete_all().unwrap(), 3);
        assert_eq!(store.delete_all().unwrap(), 0);
    }
}
