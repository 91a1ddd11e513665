//! [`BlackboardManager`] – registry of individual and shared blackboards.
//!
//! Every agent gets at most one individual board; groups of agents share a
//! board through a numeric id.  Boards are handed out as
//! [`SharedBlackboard`] handles so tree callbacks can capture them.
//!
//! A board's key type is fixed by whoever asks for it first.  Asking for the
//! same board with a different key type is an error rather than a silent
//! second board.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use arbor_types::AgentId;
use parking_lot::Mutex;
use tracing::debug;

use crate::blackboard::{Blackboard, BlackboardError};

/// Lockable handle to a blackboard.
pub type SharedBlackboard<K> = Arc<Mutex<Blackboard<K>>>;

struct BoardEntry {
    key_type: &'static str,
    board: Box<dyn Any + Send + Sync>,
}

#[derive(Default)]
pub struct BlackboardManager {
    individual: HashMap<AgentId, BoardEntry>,
    shared: HashMap<u32, BoardEntry>,
}

impl BlackboardManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The individual board for `agent`, created on first request.
    ///
    /// # Errors
    ///
    /// [`BlackboardError::KeyTypeMismatch`] if the board already exists with
    /// a different key type.
    pub fn individual<K>(&mut self, agent: AgentId) -> Result<SharedBlackboard<K>, BlackboardError>
    where
        K: Eq + Hash + fmt::Debug + Send + 'static,
    {
        fetch_or_create(&mut self.individual, agent, "individual")
    }

    /// The shared board with the given id, created on first request.
    ///
    /// # Errors
    ///
    /// [`BlackboardError::KeyTypeMismatch`] if the board already exists with
    /// a different key type.
    pub fn shared<K>(&mut self, id: u32) -> Result<SharedBlackboard<K>, BlackboardError>
    where
        K: Eq + Hash + fmt::Debug + Send + 'static,
    {
        fetch_or_create(&mut self.shared, id, "shared")
    }

    /// Drop the registry's handle on `agent`'s board.  Returns `true` if one
    /// existed.
    pub fn release_individual(&mut self, agent: &AgentId) -> bool {
        self.individual.remove(agent).is_some()
    }

    pub fn individual_count(&self) -> usize {
        self.individual.len()
    }

    pub fn shared_count(&self) -> usize {
        self.shared.len()
    }
}

fn fetch_or_create<I, K>(
    boards: &mut HashMap<I, BoardEntry>,
    id: I,
    scope: &str,
) -> Result<SharedBlackboard<K>, BlackboardError>
where
    I: Eq + Hash + fmt::Display,
    K: Eq + Hash + fmt::Debug + Send + 'static,
{
    let label = format!("{scope}:{id}");
    let entry = boards.entry(id).or_insert_with(|| {
        debug!(board = %label, key_type = type_name::<K>(), "creating blackboard");
        let board: SharedBlackboard<K> = Arc::new(Mutex::new(Blackboard::new()));
        BoardEntry {
            key_type: type_name::<K>(),
            board: Box::new(board),
        }
    });

    entry
        .board
        .downcast_ref::<SharedBlackboard<K>>()
        .cloned()
        .ok_or_else(|| BlackboardError::KeyTypeMismatch {
            board: label,
            existing: entry.key_type,
            requested: type_name::<K>(),
        })
}
