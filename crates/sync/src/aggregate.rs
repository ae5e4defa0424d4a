//! Fan-in completion for rounds that perform several independent writes.
//!
//! An [`Aggregate`] collapses N branch outcomes into one completion: the
//! first failure (with the failing branch's context), or the map of every
//! branch's value once all have succeeded. The completion fires exactly
//! once per round no matter how many branches fail afterwards, and a
//! branch dropped without settling counts as a failure, so a panicked
//! writer can never hang the round.

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::error::SyncError;

/// The first failing branch of a round, with its registration context.
#[derive(Debug, Error)]
#[error("{detail} failed: {error}")]
pub struct BranchFailure {
    pub name: String,
    pub detail: String,
    pub error: SyncError,
}

impl From<BranchFailure> for SyncError {
    fn from(failure: BranchFailure) -> Self {
        SyncError::Aggregate {
            name: failure.name,
            detail: failure.detail,
            source: Box::new(failure.error),
        }
    }
}

type Completion<T> = Result<IndexMap<String, T>, BranchFailure>;

enum State<T> {
    /// Branches outstanding. `slots` is keyed in registration order and
    /// filled in as branches succeed, so the final map is deterministic
    /// regardless of settle order.
    Gathering {
        pending: usize,
        slots: IndexMap<String, Option<T>>,
        tx: Option<oneshot::Sender<Completion<T>>>,
    },
    /// Latched: a branch failed, or every branch succeeded. Any further
    /// settle is a no-op.
    Done,
}

/// One aggregation round. Register every branch before settling any of
/// them, then [`join`](Aggregate::join) for the single combined outcome.
pub struct Aggregate<T> {
    shared: Arc<Mutex<State<T>>>,
    rx: oneshot::Receiver<Completion<T>>,
}

impl<T> Aggregate<T> {
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        let shared = Arc::new(Mutex::new(State::Gathering {
            pending: 0,
            slots: IndexMap::new(),
            tx: Some(tx),
        }));
        Self { shared, rx }
    }

    /// Register one branch. `name` keys the branch's value in the success
    /// map; `detail` describes the operation for failure reports. A branch
    /// registered after the round has latched is inert.
    pub fn branch(&self, name: impl Into<String>, detail: impl Into<String>) -> Branch<T> {
        let name = name.into();
        let mut state = self.shared.lock().unwrap();
        if let State::Gathering { pending, slots, .. } = &mut *state {
            *pending += 1;
            slots.insert(name.clone(), None);
        }
        Branch {
            name,
            detail: detail.into(),
            shared: Arc::clone(&self.shared),
            settled: false,
        }
    }

    /// Await the round's single completion: the first branch failure, or
    /// all branch values keyed by name in registration order. A round with
    /// zero branches resolves immediately with an empty map.
    pub async fn join(self) -> Completion<T> {
        {
            let mut state = self.shared.lock().unwrap();
            let resolved = match &mut *state {
                State::Gathering { pending: 0, slots, tx } => {
                    tx.take().map(|tx| (tx, Ok(drain_slots(slots))))
                }
                _ => None,
            };
            if let Some((tx, outcome)) = resolved {
                let _ = tx.send(outcome);
                *state = State::Done;
            }
        }
        match self.rx.await {
            Ok(outcome) => outcome,
            // Unreachable while the shared state exists; never panic here.
            Err(_) => Err(BranchFailure {
                name: String::new(),
                detail: "aggregation".to_string(),
                error: SyncError::Canceled,
            }),
        }
    }
}

impl<T> Default for Aggregate<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn drain_slots<T>(slots: &mut IndexMap<String, Option<T>>) -> IndexMap<String, T> {
    std::mem::take(slots)
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect()
}

/// One-shot observer for a single branch of a round. Settle it with
/// [`succeed`](Branch::succeed) or [`fail`](Branch::fail); dropping an
/// unsettled branch settles it as a failure.
pub struct Branch<T> {
    name: String,
    detail: String,
    shared: Arc<Mutex<State<T>>>,
    settled: bool,
}

impl<T> Branch<T> {
    pub fn succeed(mut self, value: T) {
        self.settle(Ok(value));
    }

    pub fn fail(mut self, error: SyncError) {
        self.settle(Err(error));
    }

    fn settle(&mut self, outcome: Result<T, SyncError>) {
        if self.settled {
            return;
        }
        self.settled = true;

        let mut state = self.shared.lock().unwrap();
        let resolved = match &mut *state {
            State::Done => None,
            State::Gathering { pending, slots, tx } => match outcome {
                Err(error) => tx.take().map(|tx| {
                    (
                        tx,
                        Err(BranchFailure {
                            name: self.name.clone(),
                            detail: self.detail.clone(),
                            error,
                        }),
                    )
                }),
                Ok(value) => {
                    slots.insert(self.name.clone(), Some(value));
                    *pending -= 1;
                    if *pending == 0 {
                        tx.take().map(|tx| (tx, Ok(drain_slots(slots))))
                    } else {
                        None
                    }
                }
            },
        };
        if let Some((tx, outcome)) = resolved {
            let _ = tx.send(outcome);
            *state = State::Done;
        }
    }
}

impl<T> Drop for Branch<T> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(Err(SyncError::Canceled));
        }
    }
}
