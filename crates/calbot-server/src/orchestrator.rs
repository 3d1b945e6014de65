//! Subscribe, Unsubscribe and Filter orchestration.
//!
//! The [`Orchestrator`] drives the feed fetcher, normalizer, filter, publisher
//! and store for one request at a time per calendar URL. No operation rolls
//! back the store when a downstream call fails; the error reports what was
//! left behind instead.

use std::sync::Arc;

use calbot_core::{Event, Filter, Subscription};
use calbot_providers::{EventPublisher, FeedFetcher, NewScheduledEvent, normalize_event};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::error::{PublishFailures, StoreError, SyncError, SyncResult};
use crate::locks::UrlLocks;
use crate::progress::{ProgressReporter, Transcript};
use crate::store::EventStore;

/// A request to subscribe a guild to a calendar.
#[derive(Debug, Clone)]
pub struct SubscribeRequest {
    pub url: String,
    pub guild_id: String,
    /// Only events matching this filter are published.
    pub filter: Option<Filter>,
}

impl SubscribeRequest {
    pub fn new(url: impl Into<String>, guild_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            guild_id: guild_id.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// What a successful subscribe did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeOutcome {
    /// Published events, in feed order, with their downstream ids.
    pub published: Vec<Event>,
    /// Feed records that failed normalization.
    pub skipped_invalid: usize,
    /// Events rejected by the request filter.
    pub skipped_filtered: usize,
    /// Events that had already started.
    pub skipped_past: usize,
}

/// What a successful unsubscribe did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsubscribeOutcome {
    /// Ids of the deleted downstream events.
    pub removed: Vec<String>,
}

/// What a successful filter did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub filter: Filter,
    /// Ids of the events that no longer matched and were deleted.
    pub removed: Vec<String>,
}

/// Coordinates the feed, the store and the downstream publisher.
pub struct Orchestrator {
    store: Arc<dyn EventStore>,
    fetcher: Arc<dyn FeedFetcher>,
    publisher: Arc<dyn EventPublisher>,
    locks: UrlLocks,
    clock: fn() -> DateTime<Utc>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn EventStore>,
        fetcher: Arc<dyn FeedFetcher>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            fetcher,
            publisher,
            locks: UrlLocks::new(),
            clock: Utc::now,
        }
    }

    /// Replaces the clock used for sync timestamps and past-event checks.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Fetches a calendar, records the subscription and publishes every
    /// upcoming event that passes the request filter.
    ///
    /// Records that fail normalization are skipped. The first publish or
    /// store failure aborts; events published before it stay published and
    /// persisted.
    #[instrument(skip_all, fields(url = %request.url, guild = %request.guild_id))]
    pub async fn subscribe(
        &self,
        request: SubscribeRequest,
        progress: &dyn ProgressReporter,
    ) -> SyncResult<SubscribeOutcome> {
        let SubscribeRequest {
            url,
            guild_id,
            filter,
        } = request;
        let _guard = self.locks.lock(&url).await;

        let mut transcript = Transcript::new();
        transcript
            .report(progress, format!("Subscribing to calendar at: {}", url))
            .await;

        let raw_events = self.fetcher.fetch(&url).await.map_err(SyncError::Fetch)?;
        transcript.report(progress, "Parsed calendar").await;

        let now = (self.clock)();
        self.store.insert_subscription(&Subscription::new(&url, now))?;
        transcript.report(progress, "Parsing events...").await;

        let mut outcome = SubscribeOutcome::default();
        for raw in &raw_events {
            let event = match normalize_event(raw, &url) {
                Ok(event) => event,
                Err(e) => {
                    warn!(event = raw.label(), error = %e, "skipping invalid event");
                    outcome.skipped_invalid += 1;
                    continue;
                }
            };

            if let Some(filter) = &filter
                && !filter.matches(&event)
            {
                debug!(event = %event.name, filter = %filter, "event filtered out");
                outcome.skipped_filtered += 1;
                continue;
            }

            if event.starts_before(now) {
                debug!(event = %event.name, start = %event.start_time, "skipping past event");
                outcome.skipped_past += 1;
                continue;
            }

            let id = self
                .publisher
                .create_scheduled_event(&guild_id, NewScheduledEvent::from(&event))
                .await
                .map_err(|e| PublishFailures::single(&event.name, e))?;
            let event = event.with_id(id);
            self.store.insert_event(&event)?;

            transcript
                .report(progress, format!("Added event {}", event.name))
                .await;
            outcome.published.push(event);
        }

        transcript
            .report(
                progress,
                format!(
                    "Subscribed to calendar at {} with {} events",
                    url,
                    outcome.published.len()
                ),
            )
            .await;
        info!(
            published = outcome.published.len(),
            invalid = outcome.skipped_invalid,
            filtered = outcome.skipped_filtered,
            past = outcome.skipped_past,
            "subscribed to calendar"
        );
        Ok(outcome)
    }

    /// Removes every event of a calendar, downstream and in the store, then
    /// the subscription itself.
    ///
    /// Store rows are deleted first. If any downstream deletion fails the
    /// subscription is kept and the failures are returned; the deleted rows
    /// are not restored.
    #[instrument(skip(self))]
    pub async fn unsubscribe(&self, url: &str, guild_id: &str) -> SyncResult<UnsubscribeOutcome> {
        let _guard = self.locks.lock(url).await;

        let removed = self.store.delete_events_for_url(url)?;
        self.delete_downstream(guild_id, &removed)
            .await
            .into_result()?;
        self.store.delete_subscription(url)?;

        info!(removed = removed.len(), "unsubscribed from calendar");
        Ok(UnsubscribeOutcome { removed })
    }

    /// Stores a filter and deletes every event of the calendar whose field
    /// does not match it.
    ///
    /// If any downstream deletion fails, the failures are returned and no
    /// event rows are removed.
    #[instrument(skip(self))]
    pub async fn filter(
        &self,
        url: &str,
        guild_id: &str,
        field: &str,
        pattern: &str,
    ) -> SyncResult<FilterOutcome> {
        let filter = Filter::new(url, field, pattern)?;
        let _guard = self.locks.lock(url).await;

        self.store.insert_filter(&filter)?;
        let removed = self.store.event_ids_not_matching(&filter)?;
        self.delete_downstream(guild_id, &removed)
            .await
            .into_result()?;
        self.store.delete_events_by_ids(&removed)?;

        info!(filter = %filter, removed = removed.len(), "applied filter");
        Ok(FilterOutcome { filter, removed })
    }

    /// Deletes a stored filter. Events it already removed are not restored.
    #[instrument(skip(self))]
    pub async fn remove_filter(&self, url: &str, field: &str, pattern: &str) -> SyncResult<Filter> {
        let filter = Filter::new(url, field, pattern)?;
        let _guard = self.locks.lock(url).await;

        self.store.delete_filter(&filter)?;
        info!(filter = %filter, "removed filter");
        Ok(filter)
    }

    /// Returns the stored events of a subscribed calendar.
    pub fn events(&self, url: &str) -> SyncResult<Vec<Event>> {
        self.require_subscription(url)?;
        Ok(self.store.events_for_url(url)?)
    }

    /// Returns the stored filters of a subscribed calendar.
    pub fn filters(&self, url: &str) -> SyncResult<Vec<Filter>> {
        self.require_subscription(url)?;
        Ok(self.store.filters_for_url(url)?)
    }

    pub fn subscriptions(&self) -> SyncResult<Vec<Subscription>> {
        Ok(self.store.subscriptions()?)
    }

    fn require_subscription(&self, url: &str) -> SyncResult<Subscription> {
        self.store
            .subscription(url)?
            .ok_or_else(|| StoreError::not_found("subscription", url).into())
    }

    async fn delete_downstream(&self, guild_id: &str, ids: &[String]) -> PublishFailures {
        let mut failures = PublishFailures::new();
        for id in ids {
            if let Err(e) = self.publisher.delete_scheduled_event(guild_id, id).await {
                warn!(event_id = %id, error = %e, "failed to delete scheduled event");
                failures.push(id, e);
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use calbot_providers::{BoxFuture, ProviderError, ProviderResult, RawEvent};
    use chrono::TimeZone;
    use std::collections::HashSet;
    use std::sync::Mutex;

    const URL: &str = "https://example.com/team.ics";
    const GUILD: &str = "42";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 2, 5, 9, 0, 0).unwrap()
    }

    fn raw(name: &str, start: &str) -> RawEvent {
        RawEvent::new().with_summary(name).with_start(start)
    }

    struct FakeFetcher(ProviderResult<Vec<RawEvent>>);

    impl FakeFetcher {
        fn events(events: Vec<RawEvent>) -> Self {
            Self(Ok(events))
        }
    }

    impl FeedFetcher for FakeFetcher {
        fn name(&self) -> &str {
            "fake"
        }

        fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
            Box::pin(async move {
                match &self.0 {
                    Ok(events) => Ok(events.clone()),
                    Err(e) => Err(ProviderError::new(e.code(), e.message())),
                }
            })
        }
    }

    #[derive(Default)]
    struct FakePublisher {
        created: Mutex<Vec<NewScheduledEvent>>,
        deleted: Mutex<Vec<String>>,
        fail_create: HashSet<String>,
        fail_delete: HashSet<String>,
        fixed_id: Option<String>,
    }

    impl FakePublisher {
        fn failing_create(name: &str) -> Self {
            Self {
                fail_create: HashSet::from([name.to_string()]),
                ..Self::default()
            }
        }

        fn failing_delete(ids: &[&str]) -> Self {
            Self {
                fail_delete: ids.iter().map(|id| id.to_string()).collect(),
                ..Self::default()
            }
        }

        /// Returns the same id for every created event.
        fn reusing_id(id: &str) -> Self {
            Self {
                fixed_id: Some(id.to_string()),
                ..Self::default()
            }
        }

        fn created_names(&self) -> Vec<String> {
            self.created
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.name.clone())
                .collect()
        }

        fn deleted(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }
    }

    impl EventPublisher for FakePublisher {
        fn name(&self) -> &str {
            "fake"
        }

        fn create_scheduled_event<'a>(
            &'a self,
            _guild_id: &'a str,
            event: NewScheduledEvent,
        ) -> BoxFuture<'a, ProviderResult<String>> {
            Box::pin(async move {
                if self.fail_create.contains(&event.name) {
                    return Err(ProviderError::status(403, "missing permissions"));
                }
                let mut created = self.created.lock().unwrap();
                created.push(event);
                match &self.fixed_id {
                    Some(id) => Ok(id.clone()),
                    None => Ok(format!("{}", 1000 + created.len())),
                }
            })
        }

        fn delete_scheduled_event<'a>(
            &'a self,
            _guild_id: &'a str,
            event_id: &'a str,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                if self.fail_delete.contains(event_id) {
                    return Err(ProviderError::status(404, "unknown scheduled event"));
                }
                self.deleted.lock().unwrap().push(event_id.to_string());
                Ok(())
            })
        }
    }

    #[derive(Default)]
    struct RecordingProgress(Mutex<Vec<String>>);

    impl ProgressReporter for RecordingProgress {
        fn update<'a>(&'a self, transcript: &'a str) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                self.0.lock().unwrap().push(transcript.to_string());
                Ok(())
            })
        }
    }

    struct FailingProgress;

    impl ProgressReporter for FailingProgress {
        fn update<'a>(&'a self, _transcript: &'a str) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async { Err(ProviderError::network("interaction expired")) })
        }
    }

    struct Harness {
        store: Arc<SqliteStore>,
        publisher: Arc<FakePublisher>,
        orchestrator: Orchestrator,
    }

    fn harness(fetcher: FakeFetcher, publisher: FakePublisher) -> Harness {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let publisher = Arc::new(publisher);
        let orchestrator =
            Orchestrator::new(store.clone(), Arc::new(fetcher), publisher.clone()).with_clock(now);
        Harness {
            store,
            publisher,
            orchestrator,
        }
    }

    async fn subscribe(h: &Harness, filter: Option<Filter>) -> SyncResult<SubscribeOutcome> {
        let mut request = SubscribeRequest::new(URL, GUILD);
        if let Some(filter) = filter {
            request = request.with_filter(filter);
        }
        h.orchestrator
            .subscribe(request, &RecordingProgress::default())
            .await
    }

    fn stored_names(h: &Harness) -> Vec<String> {
        h.store
            .events_for_url(URL)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect()
    }

    fn team_feed() -> FakeFetcher {
        FakeFetcher::events(vec![
            raw("Team Sync", "20300205T100000Z").with_location("Room A"),
            raw("Solo Work", "20300205T110000Z").with_location("Room B"),
        ])
    }

    #[tokio::test]
    async fn subscribe_publishes_upcoming_events() {
        let h = harness(team_feed(), FakePublisher::default());
        let outcome = subscribe(&h, None).await.unwrap();

        assert_eq!(outcome.published.len(), 2);
        assert!(outcome.published.iter().all(Event::is_published));
        assert_eq!(h.publisher.created_names(), vec!["Team Sync", "Solo Work"]);
        assert_eq!(stored_names(&h), vec!["Team Sync", "Solo Work"]);

        let sub = h.store.subscription(URL).unwrap().unwrap();
        assert_eq!(sub.last_synced_at, Some(now()));
    }

    #[tokio::test]
    async fn subscribe_filter_keeps_matching_events() {
        let feed = FakeFetcher::events(vec![
            raw("Standup", "20300205T100000Z"),
            raw("Retro", "20300207T150000Z"),
        ]);
        let h = harness(feed, FakePublisher::default());
        let filter = Filter::new(URL, "name", "Standup").unwrap();

        let outcome = subscribe(&h, Some(filter)).await.unwrap();
        assert_eq!(outcome.skipped_filtered, 1);
        assert_eq!(h.publisher.created_names(), vec!["Standup"]);
        assert_eq!(stored_names(&h), vec!["Standup"]);
    }

    #[tokio::test]
    async fn subscribe_name_prefix_filter() {
        let h = harness(team_feed(), FakePublisher::default());
        let filter = Filter::new(URL, "name", "^Team").unwrap();

        let outcome = subscribe(&h, Some(filter)).await.unwrap();
        assert_eq!(outcome.skipped_filtered, 1);
        assert_eq!(h.publisher.created_names(), vec!["Team Sync"]);
        assert_eq!(stored_names(&h), vec!["Team Sync"]);
    }

    #[tokio::test]
    async fn subscribe_skips_past_and_invalid_events() {
        let feed = FakeFetcher::events(vec![
            raw("Yesterday", "20300204T100000Z"),
            raw("Right Now", "20300205T090000Z"),
            RawEvent::new().with_start("20300205T100000Z"),
            raw("Bad Start", "tomorrow"),
            raw("Bad End", "20300205T100000Z").with_end("later"),
            raw("Later", "20300205T100000"),
        ]);
        let h = harness(feed, FakePublisher::default());

        let outcome = subscribe(&h, None).await.unwrap();
        assert_eq!(outcome.skipped_past, 1);
        assert_eq!(outcome.skipped_invalid, 3);
        // Starting exactly now is not in the past.
        assert_eq!(stored_names(&h), vec!["Right Now", "Later"]);
    }

    #[tokio::test]
    async fn subscribe_empty_feed_still_subscribes() {
        let h = harness(FakeFetcher::events(Vec::new()), FakePublisher::default());
        let outcome = subscribe(&h, None).await.unwrap();
        assert!(outcome.published.is_empty());
        assert!(h.store.subscription(URL).unwrap().is_some());
    }

    #[tokio::test]
    async fn fetch_failure_writes_nothing() {
        let fetcher = FakeFetcher(Err(ProviderError::status(404, "not found")));
        let h = harness(fetcher, FakePublisher::default());

        let err = subscribe(&h, None).await.unwrap_err();
        assert!(matches!(err, SyncError::Fetch(_)));
        assert!(h.store.subscriptions().unwrap().is_empty());
        assert!(h.publisher.created_names().is_empty());
    }

    #[tokio::test]
    async fn resubscribe_is_a_persistence_error() {
        let h = harness(team_feed(), FakePublisher::default());
        subscribe(&h, None).await.unwrap();

        let err = subscribe(&h, None).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Persistence(StoreError::AlreadyExists { .. })
        ));
        assert_eq!(h.publisher.created_names().len(), 2);
    }

    #[tokio::test]
    async fn publish_failure_aborts_without_rollback() {
        let feed = FakeFetcher::events(vec![
            raw("Standup", "20300205T100000Z"),
            raw("Retro", "20300205T110000Z"),
            raw("Planning", "20300205T120000Z"),
        ]);
        let h = harness(feed, FakePublisher::failing_create("Retro"));

        let err = subscribe(&h, None).await.unwrap_err();
        match err {
            SyncError::Publish(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures.iter().next().unwrap().target, "Retro");
            }
            other => panic!("expected publish error, got {other:?}"),
        }
        assert_eq!(stored_names(&h), vec!["Standup"]);
        assert!(h.store.subscription(URL).unwrap().is_some());
    }

    #[tokio::test]
    async fn store_failure_after_publish_aborts() {
        let feed = FakeFetcher::events(vec![
            raw("Standup", "20300205T100000Z"),
            raw("Retro", "20300205T110000Z"),
            raw("Planning", "20300205T120000Z"),
        ]);
        let h = harness(feed, FakePublisher::reusing_id("1001"));

        let err = subscribe(&h, None).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Persistence(StoreError::AlreadyExists { what: "event", .. })
        ));
        // Retro was published before its insert failed; Planning never was.
        assert_eq!(h.publisher.created_names(), vec!["Standup", "Retro"]);
        assert_eq!(stored_names(&h), vec!["Standup"]);
    }

    #[tokio::test]
    async fn progress_failures_do_not_abort_subscribe() {
        let feed = FakeFetcher::events(vec![
            raw("Standup", "20300205T100000Z"),
            raw("Retro", "20300205T110000Z"),
        ]);
        let h = harness(feed, FakePublisher::default());

        let outcome = h
            .orchestrator
            .subscribe(SubscribeRequest::new(URL, GUILD), &FailingProgress)
            .await
            .unwrap();
        assert_eq!(outcome.published.len(), 2);
        assert_eq!(stored_names(&h), vec!["Standup", "Retro"]);
    }

    #[tokio::test]
    async fn subscribe_reports_progress() {
        let feed = FakeFetcher::events(vec![
            raw("Standup", "20300205T100000Z"),
            raw("Retro", "20300205T110000Z"),
        ]);
        let h = harness(feed, FakePublisher::default());
        let progress = RecordingProgress::default();

        h.orchestrator
            .subscribe(SubscribeRequest::new(URL, GUILD), &progress)
            .await
            .unwrap();

        let updates = progress.0.lock().unwrap().clone();
        assert_eq!(updates.len(), 6);
        insta::assert_snapshot!(updates.last().unwrap(), @r"
        Subscribing to calendar at: https://example.com/team.ics
        Parsed calendar
        Parsing events...
        Added event Standup
        Added event Retro
        Subscribed to calendar at https://example.com/team.ics with 2 events
        ");
    }

    #[tokio::test]
    async fn unsubscribe_removes_everything() {
        let h = harness(team_feed(), FakePublisher::default());
        let published = subscribe(&h, None).await.unwrap().published;
        h.store
            .insert_filter(&Filter::new(URL, "name", "Team").unwrap())
            .unwrap();

        let outcome = h.orchestrator.unsubscribe(URL, GUILD).await.unwrap();
        assert_eq!(outcome.removed.len(), 2);

        let mut deleted = h.publisher.deleted();
        deleted.sort();
        let mut expected: Vec<_> = published.into_iter().map(|e| e.id).collect();
        expected.sort();
        assert_eq!(deleted, expected);

        assert!(h.store.events_for_url(URL).unwrap().is_empty());
        assert!(h.store.subscription(URL).unwrap().is_none());
        assert!(h.store.filters_for_url(URL).unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsubscribe_partial_failure_keeps_subscription() {
        // The fake hands out ids 1001, 1002 in feed order.
        let h = harness(team_feed(), FakePublisher::failing_delete(&["1002"]));
        subscribe(&h, None).await.unwrap();

        let err = h.orchestrator.unsubscribe(URL, GUILD).await.unwrap_err();
        match err {
            SyncError::Publish(failures) => {
                let targets: Vec<_> = failures.iter().map(|f| f.target.as_str()).collect();
                assert_eq!(targets, vec!["1002"]);
            }
            other => panic!("expected publish error, got {other:?}"),
        }
        assert_eq!(h.publisher.deleted(), vec!["1001"]);
        assert!(h.store.events_for_url(URL).unwrap().is_empty());
        assert!(h.store.subscription(URL).unwrap().is_some());
    }

    #[tokio::test]
    async fn unsubscribe_unknown_url() {
        let h = harness(team_feed(), FakePublisher::default());
        let err = h.orchestrator.unsubscribe(URL, GUILD).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Persistence(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn filter_by_name_removes_non_matching() {
        let h = harness(team_feed(), FakePublisher::default());
        subscribe(&h, None).await.unwrap();

        let outcome = h
            .orchestrator
            .filter(URL, GUILD, "name", "^Team")
            .await
            .unwrap();
        assert_eq!(outcome.removed, vec!["1002"]);
        assert_eq!(h.publisher.deleted(), vec!["1002"]);
        assert_eq!(stored_names(&h), vec!["Team Sync"]);
        assert_eq!(h.orchestrator.filters(URL).unwrap(), vec![outcome.filter]);
    }

    #[tokio::test]
    async fn filter_by_location_removes_non_matching() {
        let h = harness(team_feed(), FakePublisher::default());
        subscribe(&h, None).await.unwrap();

        h.orchestrator
            .filter(URL, GUILD, "location", "Room A")
            .await
            .unwrap();
        assert_eq!(stored_names(&h), vec!["Team Sync"]);
    }

    #[tokio::test]
    async fn filter_rejects_bad_input_before_writing() {
        let h = harness(team_feed(), FakePublisher::default());
        subscribe(&h, None).await.unwrap();

        let err = h
            .orchestrator
            .filter(URL, GUILD, "attendees", ".*")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidField(_)));

        let err = h
            .orchestrator
            .filter(URL, GUILD, "name", "(unclosed")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Pattern(_)));

        assert!(h.store.filters_for_url(URL).unwrap().is_empty());
        assert_eq!(stored_names(&h).len(), 2);
    }

    #[tokio::test]
    async fn filter_downstream_failure_keeps_rows() {
        let h = harness(team_feed(), FakePublisher::failing_delete(&["1002"]));
        subscribe(&h, None).await.unwrap();

        let err = h
            .orchestrator
            .filter(URL, GUILD, "name", "^Team")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Publish(_)));
        assert_eq!(stored_names(&h), vec!["Team Sync", "Solo Work"]);
        assert_eq!(h.store.filters_for_url(URL).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn filter_unknown_url_is_a_persistence_error() {
        let h = harness(team_feed(), FakePublisher::default());
        let err = h
            .orchestrator
            .filter(URL, GUILD, "name", "x")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::Persistence(StoreError::UnknownCalendar { .. })
        ));
    }

    #[tokio::test]
    async fn remove_filter_does_not_restore_events() {
        let h = harness(team_feed(), FakePublisher::default());
        subscribe(&h, None).await.unwrap();
        h.orchestrator
            .filter(URL, GUILD, "name", "^Team")
            .await
            .unwrap();

        let removed = h
            .orchestrator
            .remove_filter(URL, "name", "^Team")
            .await
            .unwrap();
        assert_eq!(removed.pattern_str(), "^Team");
        assert!(h.orchestrator.filters(URL).unwrap().is_empty());
        assert_eq!(stored_names(&h), vec!["Team Sync"]);

        let err = h
            .orchestrator
            .remove_filter(URL, "name", "^Team")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::Persistence(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn listing_requires_subscription() {
        let h = harness(team_feed(), FakePublisher::default());
        assert!(matches!(
            h.orchestrator.events(URL).unwrap_err(),
            SyncError::Persistence(StoreError::NotFound { .. })
        ));

        subscribe(&h, None).await.unwrap();
        let events = h.orchestrator.events(URL).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(h.orchestrator.subscriptions().unwrap().len(), 1);
    }
}
