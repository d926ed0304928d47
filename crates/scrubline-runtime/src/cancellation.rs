#![forbid(unsafe_code)]

//! Shared cancel flags for recurring tasks and thumbnail batches.
//!
//! The scrubber never blocks on a token. A [`CancellationSource`] belongs to
//! whoever started the work: the scheduler holds one per named task and the
//! thumbnail scheduler holds one per request batch. A frame provider keeps
//! the matching [`CancellationToken`] (inside its `FrameSink`) and checks it
//! between decodes, possibly from another thread.
//!
//! # Invariants
//!
//! 1. Cancellation is one-way: once a token reads `true` it never reads
//!    `false` again.
//! 2. Every token obtained from a source, and every clone of one, observes
//!    the same flag.
//!
//! # Example
//!
//! ```
//! use scrubline_runtime::cancellation::CancellationSource;
//!
//! let batch = CancellationSource::new();
//! let token = batch.token();
//!
//! let mut decoded = Vec::new();
//! for (i, t) in [0.0, 0.5, 1.0, 1.5].into_iter().enumerate() {
//!     if token.is_cancelled() {
//!         break;
//!     }
//!     decoded.push(t);
//!     if i == 1 {
//!         // A reload replaced the clip mid-batch.
//!         assert!(batch.cancel());
//!     }
//! }
//! assert_eq!(decoded, vec![0.0, 0.5]);
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Read side of a cancel flag. Cheap to clone and `Send + Sync`.
#[derive(Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

/// Write side of a cancel flag.
///
/// Dropping the source leaves its tokens uncancelled.
pub struct CancellationSource {
    flag: Arc<AtomicBool>,
}

impl CancellationSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            flag: Arc::clone(&self.flag),
        }
    }

    /// Raise the flag. Returns `true` if this call was the one that raised it.
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::AcqRel)
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationSource")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancellationToken {
    /// A token with no source; it stays uncancelled forever.
    #[must_use]
    pub fn never() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
