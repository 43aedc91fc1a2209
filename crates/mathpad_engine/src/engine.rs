//! The evaluation engine: dispatch → pending-result staging → explicit
//! commit into the history cache, plus startup replay.

use mathpad_session::{HistoryCache, HistoryConfig, HistoryPersistence, HistoryRecord, VariableStore};
use tracing::debug;

use crate::delegate::MathDelegate;
use crate::dispatch::dispatch;

/// Which logical field of the session changed. Observers receive these
/// synchronously, immediately after the mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    History,
    Variables,
}

type ObserverFn = Box<dyn FnMut(ChangeEvent)>;

/// Evaluation session over a math delegate.
///
/// Operations are synchronous and must not be invoked concurrently from
/// multiple logical threads against the same instance; the only internal
/// asynchrony is the fire-and-forget persistence writer.
pub struct Engine<D> {
    delegate: D,
    vars: VariableStore,
    history: HistoryCache,
    pending: Option<HistoryRecord>,
    persistence: Option<HistoryPersistence>,
    observers: Vec<ObserverFn>,
}

impl<D: MathDelegate> Engine<D> {
    /// Cold engine with the default history capacity and no persistence.
    pub fn new(delegate: D) -> Self {
        Self::with_config(delegate, HistoryConfig::default())
    }

    /// Cold engine with a custom history configuration.
    pub fn with_config(delegate: D, config: HistoryConfig) -> Self {
        Self {
            delegate,
            vars: VariableStore::new(),
            history: HistoryCache::with_config(config),
            pending: None,
            persistence: None,
            observers: Vec::new(),
        }
    }

    /// Engine seeded from persisted history.
    ///
    /// Loads the stored records into the cache, then replays each stored
    /// equation through the dispatcher in stored order, keeping only the
    /// VariableStore side effects: bindings are derived state, never
    /// persisted directly. The records produced by replay are discarded and
    /// nothing is staged as pending.
    pub fn with_persistence(
        delegate: D,
        config: HistoryConfig,
        persistence: HistoryPersistence,
    ) -> Self {
        let mut engine = Self::with_config(delegate, config);
        let records = persistence.load();
        engine.persistence = Some(persistence);

        for record in records.iter().rev() {
            engine.history.insert_front(record.clone());
        }
        for record in &records {
            debug!(equation = %record.equation, "replaying persisted equation");
            let _ = dispatch(&record.equation, &mut engine.vars, &engine.delegate);
        }
        engine
    }

    /// Subscribe to change events. Observers are called synchronously,
    /// in subscription order, after each mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(ChangeEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Run one input line through the dispatcher and stage the result as
    /// pending. Does not mutate the history cache; mutates the variable
    /// store when the input is an assignment.
    pub fn evaluate(&mut self, input: &str) -> HistoryRecord {
        let outcome = dispatch(input, &mut self.vars, &self.delegate);
        if outcome.bound_variable.is_some() {
            self.notify(ChangeEvent::Variables);
        }
        self.pending = Some(outcome.record.clone());
        outcome.record
    }

    /// Promote-or-insert the pending record into the cache, persist the new
    /// snapshot, and clear the pending slot. No-op when nothing is pending.
    pub fn commit(&mut self) {
        if let Some(record) = self.pending.take() {
            self.commit_record(record);
        }
    }

    /// External promote request: same effect as `commit` would have for
    /// exactly this record. Re-inserts records that were evicted or cleared
    /// away, so it can reorder without re-evaluating.
    pub fn select(&mut self, record: HistoryRecord) {
        self.commit_record(record);
    }

    /// Clear the history cache, the variable store, and the pending slot,
    /// then persist the now-empty cache.
    pub fn clear_all(&mut self) {
        self.history.clear();
        self.vars.clear();
        self.pending = None;
        self.persist();
        self.notify(ChangeEvent::History);
        self.notify(ChangeEvent::Variables);
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    pub fn variables(&self) -> &VariableStore {
        &self.vars
    }

    pub fn pending(&self) -> Option<&HistoryRecord> {
        self.pending.as_ref()
    }

    fn commit_record(&mut self, record: HistoryRecord) {
        if !self.history.promote(&record) {
            self.history.insert_front(record);
        }
        self.notify(ChangeEvent::History);
        self.persist();
    }

    fn persist(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.save(&self.history.snapshot());
        }
    }

    fn notify(&mut self, event: ChangeEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}
