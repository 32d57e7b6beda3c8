//! Pooled, scope-bound document allocation.
//!
//! A [`Pool`] hands out node arenas and takes them back. Reusable documents
//! are created through a [`PoolScope`] and borrow it, so they cannot outlive
//! it; when the scope drops, every arena it issued is reset and returned to
//! the pool's free list, ready for the next scope. Pinned documents
//! ([`Document::new`](crate::Document::new) and friends) never touch a pool.
//!
//! ```
//! # use dtree::Pool;
//! let pool = Pool::new();
//! let encoded = pool.run(|scope| -> dtree::Result<String> {
//!     let doc = scope.document();
//!     doc.set("order.id", 7)?;
//!     doc.encode(false)
//! })?;
//! assert_eq!(encoded, r#"{"order":{"id":7}}"#);
//!
//! // The arena used above is back on the free list.
//! assert_eq!(pool.stats().retained, 1);
//! # Ok::<(), dtree::Error>(())
//! ```

mod config;
mod errors;

use std::{cell::RefCell, fmt, rc::Rc};

use tracing::{debug, trace, warn};

pub use config::{MAX_INITIAL_SLOT_CAPACITY, PoolConfig};
pub use errors::PoolError;

use crate::{
    Result,
    doc::Document,
    locator::{Locator, PathLocator},
    node::{NodeArena, PinMode},
};

pub(crate) type SharedArena = Rc<RefCell<NodeArena>>;

/// Counters describing how a pool's arenas have been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Arenas allocated because the free list was empty.
    pub arenas_created: u64,
    /// Arenas taken from the free list.
    pub arenas_reused: u64,
    /// Arenas reset and put back on the free list.
    pub arenas_recycled: u64,
    /// Arenas reset and dropped because the free list was full.
    pub arenas_discarded: u64,
    /// Arenas still referenced when their scope ended.
    pub arenas_leaked: u64,
    /// Arenas currently on the free list.
    pub retained: usize,
}

struct PoolInner {
    config: PoolConfig,
    free: RefCell<Vec<SharedArena>>,
    stats: RefCell<PoolStats>,
    locator: Rc<dyn Locator>,
}

/// Source of reusable document arenas.
///
/// Cloning a `Pool` yields another handle to the same free list. Pools are
/// single-threaded; give each thread of work its own.
#[derive(Clone)]
pub struct Pool {
    inner: Rc<PoolInner>,
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::build(PoolConfig::default())
    }
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool after validating `config`.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PoolConfig) -> Self {
        let locator = Rc::new(PathLocator::with_cache_capacity(
            config.matcher_cache_capacity,
        ));
        Self {
            inner: Rc::new(PoolInner {
                config,
                free: RefCell::new(Vec::new()),
                stats: RefCell::new(PoolStats::default()),
                locator,
            }),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    pub fn stats(&self) -> PoolStats {
        let mut stats = *self.inner.stats.borrow();
        stats.retained = self.inner.free.borrow().len();
        stats
    }

    /// The locator given to documents created through this pool.
    pub fn locator(&self) -> Rc<dyn Locator> {
        Rc::clone(&self.inner.locator)
    }

    /// Opens a scope. Arenas it issues are recycled when it drops.
    pub fn scope(&self) -> PoolScope {
        debug!(retained = self.inner.free.borrow().len(), "opened pool scope");
        PoolScope {
            pool: self.clone(),
            issued: RefCell::new(Vec::new()),
        }
    }

    /// Runs `f` inside a fresh scope, which closes when `f` returns or
    /// unwinds.
    pub fn run<T>(&self, f: impl FnOnce(&PoolScope) -> T) -> T {
        let scope = self.scope();
        f(&scope)
    }

    fn acquire(&self) -> SharedArena {
        let reused = self.inner.free.borrow_mut().pop();
        if let Some(arena) = reused {
            trace!(slots = arena.borrow().slot_count(), "reusing pooled arena");
            self.inner.stats.borrow_mut().arenas_reused += 1;
            return arena;
        }
        self.inner.stats.borrow_mut().arenas_created += 1;
        let config = &self.inner.config;
        Rc::new(RefCell::new(NodeArena::with_capacity(
            PinMode::Reusable,
            config.initial_slot_capacity,
            config.max_retained_buffers,
        )))
    }

    fn release(&self, arena: SharedArena) {
        arena.borrow_mut().reset();
        let mut free = self.inner.free.borrow_mut();
        let mut stats = self.inner.stats.borrow_mut();
        if free.len() < self.inner.config.max_retained_arenas {
            free.push(arena);
            stats.arenas_recycled += 1;
        } else {
            stats.arenas_discarded += 1;
        }
    }
}

/// Lifetime boundary for reusable documents.
///
/// Documents created here borrow the scope. Dropping the scope resets every
/// arena it issued exactly once and returns it to the pool.
pub struct PoolScope {
    pool: Pool,
    issued: RefCell<Vec<SharedArena>>,
}

impl fmt::Debug for PoolScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolScope")
            .field("issued", &self.issued())
            .finish()
    }
}

impl PoolScope {
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Number of arenas issued so far.
    pub fn issued(&self) -> usize {
        self.issued.borrow().len()
    }

    pub(crate) fn issue(&self) -> SharedArena {
        let arena = self.pool.acquire();
        self.issued.borrow_mut().push(Rc::clone(&arena));
        arena
    }

    /// Creates an empty reusable document.
    pub fn document(&self) -> Document<'_> {
        let tree = self.issue();
        let root = tree.borrow_mut().create_object("");
        Document::bind(tree, root, false, Some(self), self.pool.locator())
    }

    /// Parses encoded text into a reusable document.
    pub fn parse(&self, text: &str) -> Result<Document<'_>> {
        self.decode(text, false)
    }

    /// Parses encoded text into a read-only reusable document.
    pub fn parse_read_only(&self, text: &str) -> Result<Document<'_>> {
        self.decode(text, true)
    }

    /// Decodes UTF-8 encoded bytes into a reusable document.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Document<'_>> {
        self.parse(crate::doc::utf8(bytes)?)
    }

    fn decode(&self, text: &str, read_only: bool) -> Result<Document<'_>> {
        let tree = self.issue();
        let root = tree.borrow_mut().decode(text)?;
        Ok(Document::bind(
            tree,
            root,
            read_only,
            Some(self),
            self.pool.locator(),
        ))
    }
}

impl Drop for PoolScope {
    fn drop(&mut self) {
        let issued = std::mem::take(self.issued.get_mut());
        let count = issued.len();
        for arena in issued {
            let handles = Rc::strong_count(&arena) - 1;
            if handles == 0 {
                self.pool.release(arena);
            } else {
                warn!(handles, "reusable arena still referenced at scope end, not recycled");
                self.pool.inner.stats.borrow_mut().arenas_leaked += 1;
            }
        }
        debug!(arenas = count, "closed pool scope");
    }
}
