use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use openc2::CommandId;

/// Commands that have been sent but not yet answered.
///
/// Clones share the same table, so a producer and the consumer reading its responses can
/// correlate them.
#[derive(Debug, Clone, Default)]
pub struct Outstanding(Arc<Mutex<HashSet<CommandId>>>);

impl Outstanding {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<CommandId>> {
        // The set is valid after any panic while it was held.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track `command_id`, returning `false` if it was already outstanding.
    pub(crate) fn insert(&self, command_id: CommandId) -> bool {
        self.lock().insert(command_id)
    }

    /// Forget `command_id`, returning whether it was outstanding.
    pub(crate) fn complete(&self, command_id: &str) -> bool {
        self.lock().remove(command_id)
    }

    pub fn contains(&self, command_id: &str) -> bool {
        self.lock().contains(command_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
