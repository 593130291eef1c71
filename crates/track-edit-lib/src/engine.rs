//! Operation log engine
//!
//! The engine owns an immutable base collection and the operation log. Current state
//! is always `replay(base, log)`: every mutation appends (or pops) one operation and
//! replays the whole log from the base. Nothing is cached per operation, only the
//! final result, which is handed to subscribers after each successful replay.

use crate::{
    EditError, EditOp, FeatureCollection, Lineage, Operation, OperationLog, Result, apply,
    structure,
};

/// Handle returned by [`Engine::subscribe`], used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FeatureCollection)>;

/// Reconstruct the state described by `log` on top of `base`
///
/// Pure: `base` is cloned, never modified, and the same inputs always give the same
/// output. The first failing operation aborts the replay.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn replay(base: &FeatureCollection, log: &[Operation]) -> Result<FeatureCollection> {
    let mut state = base.clone();
    for op in log {
        apply_operation(&mut state, op)?;
    }
    tracing::debug!(
        operations = log.len(),
        features = state.len(),
        "Replayed operation log"
    );
    Ok(state)
}

fn apply_operation(state: &mut FeatureCollection, op: &Operation) -> Result<()> {
    match op {
        Operation::Edit {
            feature_index,
            script,
        } => {
            let len = state.len();
            let feature = state
                .features
                .get_mut(*feature_index)
                .ok_or(EditError::IndexOutOfRange {
                    index: *feature_index,
                    len,
                })?;
            let edited = apply(feature.coordinates(), script)?;
            *feature.coordinates_mut() = edited;
            Ok(())
        }
        Operation::Split {
            feature_index,
            point_index,
        } => structure::split(state, *feature_index, *point_index),
        Operation::Merge { feature_indices } => structure::merge(state, feature_indices),
    }
}

/// Edit session over one base collection
///
/// Mutations are validated when they are appended: the candidate operation is
/// replayed together with the existing log and only kept if that succeeds. A failed
/// mutation leaves the log, the cached state and the subscribers untouched.
pub struct Engine {
    /// Snapshot taken at construction, never modified
    base: FeatureCollection,
    /// Operations applied on top of `base`, oldest first
    log: OperationLog,
    /// Result of the last successful replay
    cached_state: Option<FeatureCollection>,
    /// Listeners in registration order
    subscribers: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Engine {
    /// Create an engine over `base`, optionally resuming a saved log
    ///
    /// Nothing is replayed yet; call [`Engine::update`] (or read
    /// [`Engine::current_state`]) to validate a resumed log.
    pub fn new(base: FeatureCollection, saved_log: OperationLog) -> Self {
        tracing::info!(
            features = base.len(),
            operations = saved_log.len(),
            "Created edit engine"
        );
        Self {
            base,
            log: saved_log,
            cached_state: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Replace the coordinates of `feature_index` using an edit script
    pub fn edit(&mut self, feature_index: usize, script: Vec<EditOp>) -> Result<&FeatureCollection> {
        self.commit(Operation::Edit {
            feature_index,
            script,
        })
    }

    /// Split `feature_index` before `point_index`
    pub fn split(&mut self, feature_index: usize, point_index: usize) -> Result<&FeatureCollection> {
        self.commit(Operation::Split {
            feature_index,
            point_index,
        })
    }

    /// Merge features; the first index decides where the result is placed
    pub fn merge(&mut self, feature_indices: Vec<usize>) -> Result<&FeatureCollection> {
        self.commit(Operation::Merge { feature_indices })
    }

    /// Drop the most recent operation; does nothing on an empty log
    pub fn undo(&mut self) -> Result<&FeatureCollection> {
        let Some(last) = self.log.pop() else {
            tracing::debug!("Nothing to undo");
            return self.current_state();
        };

        match replay(&self.base, &self.log) {
            Ok(state) => {
                tracing::info!(operation = %last, remaining = self.log.len(), "Undid operation");
                Ok(self.publish(state))
            }
            Err(err) => {
                // Only reachable with a resumed log that was never valid
                self.log.push(last);
                Err(err)
            }
        }
    }

    /// Drop the most recent operation without replaying
    ///
    /// For recovering a resumed log that no longer replays, where [`Engine::undo`]
    /// would refuse. The cached state is cleared; the next
    /// [`Engine::current_state`] replays what is left.
    pub fn discard_last(&mut self) -> Option<Operation> {
        let last = self.log.pop()?;
        self.cached_state = None;
        tracing::info!(operation = %last, remaining = self.log.len(), "Discarded operation");
        Some(last)
    }

    /// Replay the current log without changing it
    pub fn update(&mut self) -> Result<&FeatureCollection> {
        let state = replay(&self.base, &self.log).inspect_err(|err| {
            tracing::warn!(error = %err, "Replay of the operation log failed");
        })?;
        Ok(self.publish(state))
    }

    /// The last computed state, replaying first if there is none yet
    pub fn current_state(&mut self) -> Result<&FeatureCollection> {
        match self.cached_state {
            Some(ref state) => Ok(state),
            None => self.update(),
        }
    }

    /// Register a listener called with the new state after every successful replay
    pub fn subscribe(&mut self, listener: impl FnMut(&FeatureCollection) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    /// Remove one listener; returns whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(subscriber, _)| *subscriber != id);
        self.subscribers.len() != before
    }

    /// Copy of the log suitable for persisting and replaying later
    pub fn serialize(&self) -> OperationLog {
        self.log.clone()
    }

    #[inline]
    pub fn log(&self) -> &[Operation] {
        &self.log
    }

    #[inline]
    pub fn base(&self) -> &FeatureCollection {
        &self.base
    }

    /// Number of features before any operation was applied
    #[inline]
    pub fn initial_feature_count(&self) -> usize {
        self.base.len()
    }

    /// History-tree depths for the current log
    pub fn lineage(&self) -> Result<Lineage> {
        Lineage::from_log(self.initial_feature_count(), &self.log)
    }

    fn commit(&mut self, op: Operation) -> Result<&FeatureCollection> {
        self.log.push(op);
        match replay(&self.base, &self.log) {
            Ok(state) => {
                if let Some(op) = self.log.last() {
                    tracing::info!(operation = %op, total = self.log.len(), "Applied operation");
                }
                Ok(self.publish(state))
            }
            Err(err) => {
                let rejected = self.log.pop();
                tracing::warn!(operation = ?rejected, error = %err, "Rejected operation");
                Err(err)
            }
        }
    }

    fn publish(&mut self, state: FeatureCollection) -> &FeatureCollection {
        let state = self.cached_state.insert(state);
        for (_, listener) in &mut self.subscribers {
            listener(state);
        }
        state
    }
}
