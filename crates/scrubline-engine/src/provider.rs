#![forbid(unsafe_code)]

//! External collaborator: the frame provider.
//!
//! A provider turns timestamps into thumbnail images, usually on a decoder
//! thread. Results come back through a [`FrameSink`], which wraps a channel
//! into the engine; the engine drains it on its own thread during `tick`, so
//! slot state is never touched from the provider's thread.
//!
//! # Invariants
//!
//! 1. Every completion carries the generation of the batch that requested
//!    it. Completions from an older generation are discarded on drain.
//! 2. A sink whose batch was cancelled refuses further deliveries.
//!
//! # Failure Modes
//!
//! - Delivering after the engine was dropped returns `false` and the
//!   image is discarded.

use std::sync::mpsc::Sender;

use scrubline_core::Size;
use scrubline_runtime::CancellationToken;

use crate::error::FrameError;

/// One batch of frame requests.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRequest {
    /// Requested frame times, in seconds.
    pub timestamps: Vec<f64>,
    /// Allowed distance (seconds) between a requested time and the frame
    /// actually decoded, before and after.
    pub tolerance: f64,
    /// Largest image size the engine will draw.
    pub max_size: Size,
}

/// The outcome for one requested timestamp.
#[derive(Debug)]
pub struct FrameCompletion<I> {
    pub generation: u64,
    /// The timestamp as it was requested.
    pub timestamp: f64,
    pub result: Result<I, FrameError>,
}

/// Channel end handed to a provider with each batch.
#[derive(Debug)]
pub struct FrameSink<I> {
    sender: Sender<FrameCompletion<I>>,
    generation: u64,
    token: CancellationToken,
}

impl<I> Clone for FrameSink<I> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            generation: self.generation,
            token: self.token.clone(),
        }
    }
}

impl<I> FrameSink<I> {
    pub(crate) fn new(
        sender: Sender<FrameCompletion<I>>,
        generation: u64,
        token: CancellationToken,
    ) -> Self {
        Self {
            sender,
            generation,
            token,
        }
    }

    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the batch was cancelled by a clip reload.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token observing the batch's cancellation.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Hand a result back to the engine.
    ///
    /// Returns `false` if the batch was cancelled or the engine is gone.
    pub fn deliver(&self, timestamp: f64, result: Result<I, FrameError>) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.sender
            .send(FrameCompletion {
                generation: self.generation,
                timestamp,
                result,
            })
            .is_ok()
    }
}

/// Produces thumbnail images for timestamps.
pub trait FrameProvider {
    /// Decoded image type, opaque to the engine.
    type Image;

    /// Start producing one result per timestamp in `request`, delivered
    /// through `sink` in any order. Must not block on decoding.
    fn request(&mut self, request: FrameRequest, sink: FrameSink<Self::Image>);

    /// Drop every outstanding request.
    fn cancel_all(&mut self);
}
