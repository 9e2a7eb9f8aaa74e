//! Bounds on recursive walks.
//!
//! Matching recurses through type structure and the supertype graph. A
//! [`RecursionGuard`] keeps the set of keys currently being worked on, so a
//! walk that comes back to a pending key is seen as a cycle, and it caps how
//! deep and how long a walk may run. The caps are named by
//! [`RecursionProfile`]:
//!
//! ```ignore
//! let mut guard = RecursionGuard::with_profile(RecursionProfile::SupertypeTraversal);
//! let found = guard.scope(def, |guard| search(guard, def))?;
//! ```
//!
//! A refused entry is an answer, not an error: callers treat it as "no
//! result" for that key. Debug builds check that every entered key is left
//! again.

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Limits for one kind of recursive walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Nested `match_types` calls.
    ///
    /// One level per structural step or superinterface hop. Deep nesting is
    /// carried by stack growth, so the depth cap only stops runaway input.
    ///
    /// depth = 4096, steps = 1,000,000 per walk
    ConstraintMatching,

    /// Superinterface search and collection.
    ///
    /// depth = 1024, steps = 100,000
    SupertypeTraversal,

    /// Explicit limits.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::ConstraintMatching => 4096,
            Self::SupertypeTraversal => 1024,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    /// Number of `enter` calls allowed in one walk, see [`RecursionGuard::reset`].
    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::ConstraintMatching => 1_000_000,
            Self::SupertypeTraversal => 100_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already pending further up the walk.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    /// Whether a limit, rather than a cycle, refused entry.
    pub fn is_limit(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

/// Pending keys plus depth and step counters for one walk.
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    pending: FxHashSet<K>,
    depth: u32,
    steps: u32,
    max_depth: u32,
    max_steps: u32,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn with_profile(profile: RecursionProfile) -> Self {
        RecursionGuard {
            pending: FxHashSet::default(),
            depth: 0,
            steps: 0,
            max_depth: profile.max_depth(),
            max_steps: profile.max_iterations(),
        }
    }

    /// Start work on `key`. Only [`RecursionResult::Entered`] must be paired
    /// with a [`leave`](Self::leave).
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.steps = self.steps.saturating_add(1);
        if self.steps > self.max_steps {
            RecursionResult::IterationExceeded
        } else if self.depth >= self.max_depth {
            RecursionResult::DepthExceeded
        } else if !self.pending.insert(key) {
            RecursionResult::Cycle
        } else {
            self.depth += 1;
            RecursionResult::Entered
        }
    }

    /// Finish work on `key`.
    pub fn leave(&mut self, key: K) {
        let removed = self.pending.remove(&key);
        debug_assert!(removed, "left a recursion key that was never entered");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` with `key` entered, or report why entry was refused.
    pub fn scope<T>(&mut self, key: K, f: impl FnOnce(&mut Self) -> T) -> Result<T, RecursionResult> {
        match self.enter(key) {
            RecursionResult::Entered => {
                let result = f(self);
                self.leave(key);
                Ok(result)
            }
            refused => Err(refused),
        }
    }

    /// Start a new walk. Only valid while no key is entered.
    pub fn reset(&mut self) {
        debug_assert!(self.pending.is_empty(), "reset while keys are still entered");
        self.steps = 0;
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.pending.is_empty() {
            panic!("recursion guard dropped with {} keys still entered", self.pending.len());
        }
    }
}
