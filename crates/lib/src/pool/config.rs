//! Pool configuration.

use serde::{Deserialize, Serialize};

use super::PoolError;

/// Upper bound for [`PoolConfig::initial_slot_capacity`].
pub const MAX_INITIAL_SLOT_CAPACITY: usize = 1 << 24;

/// Tuning knobs for a [`Pool`](super::Pool).
///
/// Every field has a default, so a partial JSON object is a valid
/// configuration:
///
/// ```
/// # use dtree::PoolConfig;
/// let config: PoolConfig = serde_json::from_str(r#"{"max_retained_arenas": 4}"#)?;
/// assert_eq!(config.max_retained_arenas, 4);
/// assert_eq!(config.matcher_cache_capacity, PoolConfig::default().matcher_cache_capacity);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Arenas kept on the free list once their scope ends. Extra arenas are
    /// dropped.
    pub max_retained_arenas: usize,

    /// Slots reserved up front in each newly created arena.
    pub initial_slot_capacity: usize,

    /// Spare child maps and member vectors each arena keeps for reuse.
    pub max_retained_buffers: usize,

    /// Compiled path expressions cached by the pool's locator. Zero disables
    /// the cache.
    pub matcher_cache_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_retained_arenas: 64,
            initial_slot_capacity: 32,
            max_retained_buffers: 256,
            matcher_cache_capacity: 256,
        }
    }
}

impl PoolConfig {
    pub fn with_max_retained_arenas(mut self, max_retained_arenas: usize) -> Self {
        self.max_retained_arenas = max_retained_arenas;
        self
    }

    pub fn with_initial_slot_capacity(mut self, initial_slot_capacity: usize) -> Self {
        self.initial_slot_capacity = initial_slot_capacity;
        self
    }

    pub fn with_max_retained_buffers(mut self, max_retained_buffers: usize) -> Self {
        self.max_retained_buffers = max_retained_buffers;
        self
    }

    pub fn with_matcher_cache_capacity(mut self, matcher_cache_capacity: usize) -> Self {
        self.matcher_cache_capacity = matcher_cache_capacity;
        self
    }

    /// Checks that every field is in range.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.initial_slot_capacity > MAX_INITIAL_SLOT_CAPACITY {
            return Err(PoolError::InvalidConfig {
                field: "initial_slot_capacity".to_string(),
                reason: format!("must not exceed {MAX_INITIAL_SLOT_CAPACITY}"),
            });
        }
        Ok(())
    }
}
