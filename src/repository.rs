//! Query facade over the member and interest stores
//!
//! Every read is a [`Subscription`]: it yields the current result, then yields
//! again after each committed write to a table the query reads. Writes run on
//! the blocking pool and notify subscribers once the row is committed. Commits
//! from other connections to the same file are picked up by polling
//! `PRAGMA data_version`.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::sync::{Mutex, watch};

use crate::interest::Interest;
use crate::member::Member;
use crate::storage::{DbStats, TecStore};
use crate::Result;

/// Tables a query can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Members,
    Interests,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Members => "members",
            Table::Interests => "interests",
        }
    }
}

/// Per-table revision counters, bumped after every committed write
#[derive(Debug)]
struct Revisions {
    members: watch::Sender<u64>,
    interests: watch::Sender<u64>,
}

impl Revisions {
    fn new() -> Self {
        Self {
            members: watch::channel(0).0,
            interests: watch::channel(0).0,
        }
    }

    fn sender(&self, table: Table) -> &watch::Sender<u64> {
        match table {
            Table::Members => &self.members,
            Table::Interests => &self.interests,
        }
    }

    fn bump(&self, table: Table) {
        self.sender(table).send_modify(|rev| *rev += 1);
    }
}

type Query<T> = Arc<dyn Fn(&TecStore) -> Result<T> + Send + Sync>;

/// How often a waiting subscription checks for commits made by other connections
pub const EXTERNAL_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Run `op` against the locked store on the blocking pool
async fn with_store<R, F>(store: &Arc<Mutex<TecStore>>, op: F) -> Result<R>
where
    R: Send + 'static,
    F: FnOnce(&TecStore) -> R + Send + 'static,
{
    let store = Arc::clone(store);
    let value = tokio::task::spawn_blocking(move || {
        let guard = store.blocking_lock();
        op(&*guard)
    })
    .await?;
    Ok(value)
}

/// Cloneable async handle over a [`TecStore`]
#[derive(Clone)]
pub struct Repository {
    store: Arc<Mutex<TecStore>>,
    revisions: Arc<Revisions>,
}

impl Repository {
    pub fn new(store: TecStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            revisions: Arc::new(Revisions::new()),
        }
    }

    // ========== Group Queries ==========

    /// Dean of `field_a` or `field_b`; pass an empty `field_b` to match one field
    pub fn dean_of_faculty(&self, field_a: &str, field_b: &str) -> Subscription<Option<Member>> {
        let (a, b) = (field_a.to_string(), field_b.to_string());
        self.subscribe("dean_of_faculty", &[Table::Members], move |store| {
            store.dean_of_faculty(&a, &b)
        })
    }

    /// Academics of either field, sorted by last name
    pub fn academics(&self, field_a: &str, field_b: &str) -> Subscription<Vec<Member>> {
        let (a, b) = (field_a.to_string(), field_b.to_string());
        self.subscribe("academics", &[Table::Members], move |store| store.academics(&a, &b))
    }

    /// Authorities of either field, sorted by last name
    pub fn authorities(&self, field_a: &str, field_b: &str) -> Subscription<Vec<Member>> {
        let (a, b) = (field_a.to_string(), field_b.to_string());
        self.subscribe("authorities", &[Table::Members], move |store| store.authorities(&a, &b))
    }

    /// Interests of either field, sorted by name
    pub fn interests(&self, field_a: &str, field_b: &str) -> Subscription<Vec<Interest>> {
        let (a, b) = (field_a.to_string(), field_b.to_string());
        self.subscribe("interests", &[Table::Interests], move |store| store.interests(&a, &b))
    }

    // ========== Home Queries ==========

    pub fn dean_of_complex(&self) -> Subscription<Option<Member>> {
        self.subscribe("dean_of_complex", &[Table::Members], |store| store.dean_of_complex())
    }

    /// Number of deans and academics
    pub fn academics_number(&self) -> Subscription<u64> {
        self.subscribe("academics_number", &[Table::Members], |store| store.count_academics())
    }

    pub fn authorities_number(&self) -> Subscription<u64> {
        self.subscribe("authorities_number", &[Table::Members], |store| store.count_authorities())
    }

    pub fn interests_number(&self) -> Subscription<u64> {
        self.subscribe("interests_number", &[Table::Interests], |store| store.count_interests())
    }

    /// Distinct stages across all interests
    pub fn educational_stages(&self) -> Subscription<Vec<String>> {
        self.subscribe("educational_stages", &[Table::Interests], |store| {
            store.educational_stages()
        })
    }

    pub fn stats(&self) -> Subscription<DbStats> {
        self.subscribe("stats", &[Table::Members, Table::Interests], |store| store.stats())
    }

    /// One-shot lookup by id
    pub async fn get_member(&self, id: i64) -> Result<Option<Member>> {
        self.read(move |store| store.get_member(id)).await
    }

    // ========== Writes ==========

    /// Insert a member; returns the assigned id
    pub async fn add_member(&self, member: Member) -> Result<i64> {
        let id = self
            .write(Table::Members, move |store| store.insert_member(&member))
            .await?;
        tracing::info!(id, "Added member");
        Ok(id)
    }

    /// Replace the member with the same id
    pub async fn update_member(&self, member: Member) -> Result<()> {
        let id = member.id;
        self.write(Table::Members, move |store| store.update_member(&member))
            .await?;
        tracing::info!(id, "Updated member");
        Ok(())
    }

    /// Insert an interest; returns the assigned id
    pub async fn add_interest(&self, interest: Interest) -> Result<i64> {
        let id = self
            .write(Table::Interests, move |store| store.insert_interest(&interest))
            .await?;
        tracing::info!(id, "Added interest");
        Ok(id)
    }

    async fn write<R, F>(&self, table: Table, op: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&TecStore) -> Result<R> + Send + 'static,
    {
        match with_store(&self.store, op).await? {
            Ok(value) => {
                self.revisions.bump(table);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(table = table.as_str(), "Write rejected: {}", e);
                Err(e)
            }
        }
    }

    async fn read<R, F>(&self, op: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&TecStore) -> Result<R> + Send + 'static,
    {
        with_store(&self.store, op).await?
    }

    fn subscribe<T, F>(&self, label: &'static str, tables: &[Table], query: F) -> Subscription<T>
    where
        F: Fn(&TecStore) -> Result<T> + Send + Sync + 'static,
    {
        Subscription {
            label,
            store: Arc::clone(&self.store),
            query: Arc::new(query),
            watchers: tables
                .iter()
                .map(|table| self.revisions.sender(*table).subscribe())
                .collect(),
            primed: false,
            data_version: None,
        }
    }
}

/// A live query result.
///
/// The first [`next`](Subscription::next) yields the current result; later calls
/// wait for a committed write to a watched table and yield the re-executed query.
/// Several writes landing before the subscriber catches up produce one emission.
/// Returns `None` once every [`Repository`] handle is gone.
pub struct Subscription<T> {
    label: &'static str,
    store: Arc<Mutex<TecStore>>,
    query: Query<T>,
    watchers: Vec<watch::Receiver<u64>>,
    primed: bool,
    /// `PRAGMA data_version` seen by the last run
    data_version: Option<i64>,
}

impl<T: Send + 'static> Subscription<T> {
    pub async fn next(&mut self) -> Option<Result<T>> {
        if self.primed {
            if !self.wait_for_change().await {
                return None;
            }
        } else {
            self.primed = true;
        }
        for rx in &mut self.watchers {
            rx.borrow_and_update();
        }
        Some(self.run().await)
    }

    /// One-shot read of the current result
    pub async fn first(mut self) -> Result<T> {
        self.primed = true;
        self.run().await
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send {
        futures::stream::unfold(self, |mut sub| async move {
            let item = sub.next().await?;
            Some((item, sub))
        })
    }

    /// Returns false when the watched tables can no longer change.
    ///
    /// Wakes on a write through any handle of this repository, or on a commit by
    /// another connection noticed at the next poll.
    async fn wait_for_change(&mut self) -> bool {
        if self.watchers.is_empty() {
            return false;
        }
        let label = self.label;
        let store = Arc::clone(&self.store);
        let seen = self.data_version;
        let mut poll = tokio::time::interval(EXTERNAL_POLL_INTERVAL);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        poll.tick().await;

        loop {
            let pending = self
                .watchers
                .iter_mut()
                .map(|rx| Box::pin(rx.changed()))
                .collect::<Vec<_>>();
            tokio::select! {
                (changed, _, _) = futures::future::select_all(pending) => return changed.is_ok(),
                _ = poll.tick() => {
                    if committed_elsewhere(&store, seen).await {
                        tracing::debug!(query = label, "External commit detected");
                        return true;
                    }
                }
            }
        }
    }

    async fn run(&mut self) -> Result<T> {
        let query = Arc::clone(&self.query);
        let (version, result) = with_store(&self.store, move |store| {
            // Read the version first so a commit racing the query is seen again later
            (store.data_version().ok(), query(store))
        })
        .await?;
        if version.is_some() {
            self.data_version = version;
        }
        tracing::debug!(query = self.label, ok = result.is_ok(), "Emitting");
        result
    }
}

/// Whether another connection committed since `seen`; poll failures count as no change
async fn committed_elsewhere(store: &Arc<Mutex<TecStore>>, seen: Option<i64>) -> bool {
    let Some(seen) = seen else {
        return false;
    };
    match with_store(store, |store| store.data_version()).await {
        Ok(Ok(current)) => current != seen,
        Ok(Err(e)) | Err(e) => {
            tracing::debug!("data_version poll failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use futures::StreamExt;

    const COMPUTER: &str = "کامپیوتر";

    fn repo() -> Repository {
        Repository::new(TecStore::open_in_memory().unwrap())
    }

    fn academic(last: &str) -> Member {
        Member::new("Ali", last, "ali@tec.ac.ir")
            .with_field(COMPUTER)
            .with_dean_of_faculty(false)
    }

    #[tokio::test]
    async fn test_subscription_reemits_after_write() {
        let repo = repo();
        let mut academics = repo.academics(COMPUTER, "");

        assert!(academics.next().await.unwrap().unwrap().is_empty());

        repo.add_member(academic("Rezaei")).await.unwrap();
        let second = academics.next().await.unwrap().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].last_name, "Rezaei");
    }

    #[tokio::test]
    async fn test_unrelated_table_write_does_not_reemit() {
        let repo = repo();
        let mut count = repo.academics_number();
        assert_eq!(count.next().await.unwrap().unwrap(), 0);

        repo.add_interest(Interest::new("Networks", COMPUTER, "1")).await.unwrap();
        let waited = tokio::time::timeout(Duration::from_millis(100), count.next()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_rejected_write_does_not_reemit() {
        let repo = repo();
        let mut authorities = repo.authorities_number();
        assert_eq!(authorities.next().await.unwrap().unwrap(), 0);

        let err = repo.update_member(academic("Ghost").with_id(99)).await.unwrap_err();
        assert!(matches!(err, Error::MemberNotFound(99)));

        let waited = tokio::time::timeout(Duration::from_millis(100), authorities.next()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_independent_subscribers() {
        let repo = repo();
        let mut first = repo.interests_number();
        let mut second = repo.interests_number();
        assert_eq!(first.next().await.unwrap().unwrap(), 0);
        assert_eq!(second.next().await.unwrap().unwrap(), 0);

        repo.add_interest(Interest::new("Networks", COMPUTER, "1")).await.unwrap();
        assert_eq!(first.next().await.unwrap().unwrap(), 1);
        assert_eq!(second.next().await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stream_ends_when_repository_dropped() {
        let repo = repo();
        repo.add_member(academic("Rezaei")).await.unwrap();
        let mut stream = Box::pin(repo.academics(COMPUTER, "").into_stream());

        assert_eq!(stream.next().await.unwrap().unwrap().len(), 1);
        drop(repo);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_commit_from_other_connection_reemits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tec.db");
        let watching = Repository::new(TecStore::open(&path).unwrap());
        let writing = Repository::new(TecStore::open(&path).unwrap());

        let mut academics = watching.academics(COMPUTER, "");
        assert!(academics.next().await.unwrap().unwrap().is_empty());

        writing.add_member(academic("Rezaei")).await.unwrap();
        let next = tokio::time::timeout(Duration::from_secs(5), academics.next())
            .await
            .expect("commit from the other connection was not observed");
        assert_eq!(next.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_first_is_snapshot() {
        let repo = repo();
        repo.add_member(academic("Rezaei")).await.unwrap();
        let count = repo.academics_number().first().await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(repo.revisions.sender(Table::Members).receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_get_member_registers_no_watcher() {
        let repo = repo();
        let id = repo.add_member(academic("Rezaei")).await.unwrap();
        let live = repo.academics(COMPUTER, "");
        assert_eq!(repo.revisions.sender(Table::Members).receiver_count(), 1);

        let member = repo.get_member(id).await.unwrap().unwrap();
        assert_eq!(member.last_name, "Rezaei");
        assert!(repo.get_member(id + 1).await.unwrap().is_none());
        assert_eq!(repo.revisions.sender(Table::Members).receiver_count(), 1);
        drop(live);
    }
}
