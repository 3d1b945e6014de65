//! SQLite persistence for subscriptions, published events and filters.
//!
//! Schema:
//! - calendars: url, last_synced
//! - events: downstream id, calendar_url -> calendars, name, description,
//!   start_time, end_time, location
//! - filters: (calendar_url, field, pattern) -> calendars
//!
//! Foreign keys are enforced, so events and filters can only be written for a
//! subscribed calendar, and a subscription can only be deleted once its events
//! are gone.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use calbot_core::{Event, Filter, FilterField, Subscription, compile_pattern};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use tracing::{debug, trace};

use crate::error::{StoreError, StoreResult};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS calendars (
    url TEXT PRIMARY KEY,
    last_synced TIMESTAMP
);

CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    calendar_url TEXT REFERENCES calendars(url),
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    start_time TIMESTAMP NOT NULL,
    end_time TIMESTAMP NOT NULL,
    location TEXT
);

CREATE TABLE IF NOT EXISTS filters (
    calendar_url TEXT REFERENCES calendars(url),
    field TEXT CHECK(field IN ('name', 'description', 'location')),
    pattern TEXT,
    PRIMARY KEY (calendar_url, field, pattern)
);

CREATE INDEX IF NOT EXISTS idx_events_calendar_url ON events(calendar_url);
";

/// `end_time` is `NOT NULL`; events without an end are stored with this value.
const NO_END_TIME: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

/// Any stored end at or before [`NO_END_TIME`] reads back as "no end". This
/// also covers databases that stored a zero time (`0001-01-01`) instead.
fn stored_end_time(end_time: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (end_time > NO_END_TIME).then_some(end_time)
}

/// Durable state of subscriptions, their published events and filters.
///
/// Calls are synchronous and short. Implementations serialize access
/// internally so one store can be shared between concurrent operations.
pub trait EventStore: Send + Sync {
    /// Records a new subscription. Fails if the URL is already subscribed.
    fn insert_subscription(&self, subscription: &Subscription) -> StoreResult<()>;

    fn subscription(&self, url: &str) -> StoreResult<Option<Subscription>>;

    fn subscriptions(&self) -> StoreResult<Vec<Subscription>>;

    /// Deletes a subscription and its filters. Its events must already be gone.
    fn delete_subscription(&self, url: &str) -> StoreResult<()>;

    /// Stores a published event. `event.id` must be set.
    fn insert_event(&self, event: &Event) -> StoreResult<()>;

    /// Returns the events of a calendar ordered by start time.
    fn events_for_url(&self, url: &str) -> StoreResult<Vec<Event>>;

    /// Deletes every event of a calendar and returns their ids.
    fn delete_events_for_url(&self, url: &str) -> StoreResult<Vec<String>>;

    /// Deletes events by id in one transaction. Returns the number deleted.
    fn delete_events_by_ids(&self, ids: &[String]) -> StoreResult<usize>;

    /// Returns ids of the filter's calendar events whose field does NOT match.
    fn event_ids_not_matching(&self, filter: &Filter) -> StoreResult<Vec<String>>;

    fn insert_filter(&self, filter: &Filter) -> StoreResult<()>;

    fn delete_filter(&self, filter: &Filter) -> StoreResult<()>;

    fn filters_for_url(&self, url: &str) -> StoreResult<Vec<Filter>>;
}

/// [`EventStore`] backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates the database at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        debug!(path = %path.display(), "opening database");
        Self::init(Connection::open(path)?)
    }

    /// Opens an in-memory database.
    pub fn in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Distinguishes duplicate keys from missing parents.
enum Constraint {
    Duplicate,
    MissingParent,
}

fn constraint(err: &rusqlite::Error) -> Option<Constraint> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            match e.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => Some(Constraint::Duplicate),
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Constraint::MissingParent),
                _ => None,
            }
        }
        _ => None,
    }
}

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    let end_time: DateTime<Utc> = row.get(4)?;
    Ok(Event {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        start_time: row.get(3)?,
        end_time: stored_end_time(end_time),
        location: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        calendar_url: row.get(6)?,
    })
}

fn field_column(field: FilterField) -> &'static str {
    match field {
        FilterField::Name => "name",
        FilterField::Description => "description",
        FilterField::Location => "COALESCE(location, '')",
    }
}

impl EventStore for SqliteStore {
    fn insert_subscription(&self, subscription: &Subscription) -> StoreResult<()> {
        self.conn()
            .execute(
                "INSERT INTO calendars (url, last_synced) VALUES (?1, ?2)",
                params![subscription.url, subscription.last_synced_at],
            )
            .map_err(|e| match constraint(&e) {
                Some(Constraint::Duplicate) => {
                    StoreError::already_exists("subscription", &subscription.url)
                }
                _ => e.into(),
            })?;
        trace!(url = %subscription.url, "inserted subscription");
        Ok(())
    }

    fn subscription(&self, url: &str) -> StoreResult<Option<Subscription>> {
        let subscription = self
            .conn()
            .query_row(
                "SELECT url, last_synced FROM calendars WHERE url = ?1",
                params![url],
                |row| {
                    Ok(Subscription {
                        url: row.get(0)?,
                        last_synced_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(subscription)
    }

    fn subscriptions(&self) -> StoreResult<Vec<Subscription>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT url, last_synced FROM calendars ORDER BY url")?;
        let rows = stmt.query_map([], |row| {
            Ok(Subscription {
                url: row.get(0)?,
                last_synced_at: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_subscription(&self, url: &str) -> StoreResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM filters WHERE calendar_url = ?1", params![url])?;
        let deleted = tx.execute("DELETE FROM calendars WHERE url = ?1", params![url])?;
        if deleted == 0 {
            return Err(StoreError::not_found("subscription", url));
        }
        tx.commit()?;
        trace!(url = %url, "deleted subscription");
        Ok(())
    }

    fn insert_event(&self, event: &Event) -> StoreResult<()> {
        if event.id.is_empty() {
            return Err(StoreError::invalid("event", "missing downstream id"));
        }

        self.conn()
            .execute(
                "INSERT INTO events (id, calendar_url, name, description, start_time, end_time, location)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    event.id,
                    event.calendar_url,
                    event.name,
                    event.description,
                    event.start_time,
                    event.end_time.unwrap_or(NO_END_TIME),
                    event.location,
                ],
            )
            .map_err(|e| match constraint(&e) {
                Some(Constraint::Duplicate) => StoreError::already_exists("event", &event.id),
                Some(Constraint::MissingParent) => {
                    StoreError::unknown_calendar(&event.calendar_url)
                }
                None => e.into(),
            })?;
        trace!(id = %event.id, url = %event.calendar_url, "inserted event");
        Ok(())
    }

    fn events_for_url(&self, url: &str) -> StoreResult<Vec<Event>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, description, start_time, end_time, location, calendar_url
             FROM events WHERE calendar_url = ?1 ORDER BY start_time, id",
        )?;
        let rows = stmt.query_map(params![url], event_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_events_for_url(&self, url: &str) -> StoreResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("DELETE FROM events WHERE calendar_url = ?1 RETURNING id")?;
        let ids = stmt
            .query_map(params![url], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(url = %url, count = ids.len(), "deleted events for calendar");
        Ok(ids)
    }

    fn delete_events_by_ids(&self, ids: &[String]) -> StoreResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let mut deleted = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM events WHERE id = ?1")?;
            for id in ids {
                deleted += stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        debug!(requested = ids.len(), deleted, "deleted events by id");
        Ok(deleted)
    }

    fn event_ids_not_matching(&self, filter: &Filter) -> StoreResult<Vec<String>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT id, {} FROM events WHERE calendar_url = ?1 ORDER BY start_time, id",
            field_column(filter.field())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![filter.url()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter(|(_, value)| !filter.matches_value(value))
            .map(|(id, _)| id)
            .collect())
    }

    fn insert_filter(&self, filter: &Filter) -> StoreResult<()> {
        self.conn()
            .execute(
                "INSERT INTO filters (calendar_url, field, pattern) VALUES (?1, ?2, ?3)",
                params![filter.url(), filter.field().as_str(), filter.pattern_str()],
            )
            .map_err(|e| match constraint(&e) {
                Some(Constraint::Duplicate) => {
                    StoreError::already_exists("filter", filter.to_string())
                }
                Some(Constraint::MissingParent) => StoreError::unknown_calendar(filter.url()),
                None => e.into(),
            })?;
        trace!(url = %filter.url(), filter = %filter, "inserted filter");
        Ok(())
    }

    fn delete_filter(&self, filter: &Filter) -> StoreResult<()> {
        let deleted = self.conn().execute(
            "DELETE FROM filters WHERE calendar_url = ?1 AND field = ?2 AND pattern = ?3",
            params![filter.url(), filter.field().as_str(), filter.pattern_str()],
        )?;
        if deleted == 0 {
            return Err(StoreError::not_found("filter", filter.to_string()));
        }
        Ok(())
    }

    fn filters_for_url(&self, url: &str) -> StoreResult<Vec<Filter>> {
        let rows = {
            let conn = self.conn();
            let mut stmt = conn.prepare(
                "SELECT field, pattern FROM filters WHERE calendar_url = ?1 ORDER BY field, pattern",
            )?;
            stmt.query_map(params![url], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?
        };

        rows.into_iter()
            .map(|(field, pattern)| {
                let field = field
                    .parse::<FilterField>()
                    .map_err(|e| StoreError::invalid("filter", e.to_string()))?;
                let pattern = compile_pattern(&pattern)
                    .map_err(|e| StoreError::invalid("filter", e.to_string()))?;
                Ok(Filter::from_parts(url, field, pattern))
            })
            .collect()
    }
}
