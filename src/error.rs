//! Errors and the diagnostic sink.
//!
//! Two classes of failure exist while a frame is declared:
//!
//! - **Fatal**: structural misuse of the declaration protocol (unbalanced
//!   open/close, a second record of one category on an element, a stale
//!   text or config handle). The frame is poisoned and [`Frame::end`]
//!   returns the error.
//! - **Degraded**: resource exhaustion or an external backend failure. The
//!   offending declaration is skipped and the frame keeps going.
//!
//! Both classes are handed to the [`ErrorHandler`] exactly once.
//!
//! [`Frame::end`]: crate::pipeline::Frame::end

use std::fmt;

use thiserror::Error;

/// Errors produced while declaring, laying out or resolving a frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("close_element called while no element is open")]
    UnbalancedClose,

    #[error("frame ended with {open} element(s) still open")]
    UnclosedElements { open: usize },

    #[error("{kind} configuration already attached to element {element}")]
    DuplicateConfig { kind: &'static str, element: usize },

    #[error("no element is open to receive the declaration")]
    NoOpenElement,

    #[error("text reference from generation {handle} used after the text arena moved to generation {current}")]
    StaleText { handle: u32, current: u32 },

    #[error("configuration handle from generation {handle} used after the arena moved to generation {current}")]
    StaleConfig { handle: u32, current: u32 },

    #[error("element capacity of {capacity} exceeded, element skipped")]
    ElementCapacityExceeded { capacity: usize },

    #[error("{kind} configuration rejected, arena capacity of {capacity} records exceeded")]
    ConfigCapacityExceeded { kind: &'static str, capacity: usize },

    #[error("text arena capacity exceeded: {requested} bytes requested, {available} available")]
    TextCapacityExceeded { requested: usize, available: usize },

    #[error("element id {id:#010x} declared more than once this frame")]
    DuplicateId { id: u32 },

    #[error("text measurement failed: {0}")]
    Measure(String),

    #[error("layout failed: {0}")]
    Layout(String),
}

impl Error {
    /// Structural misuse that invalidates the whole frame.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::UnbalancedClose
                | Error::UnclosedElements { .. }
                | Error::DuplicateConfig { .. }
                | Error::NoOpenElement
                | Error::StaleText { .. }
                | Error::StaleConfig { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Diagnostics
// =============================================================================

/// One report delivered to the diagnostic sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub frame: u64,
    pub error: Error,
}

impl Diagnostic {
    pub fn is_fatal(&self) -> bool {
        self.error.is_fatal()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = if self.is_fatal() { "fatal" } else { "degraded" };
        write!(f, "frame {} ({}): {}", self.frame, class, self.error)
    }
}

/// Receives every diagnostic. Never used for control flow.
pub type ErrorHandler = Box<dyn FnMut(&Diagnostic)>;

/// Default sink: forwards to `tracing`.
pub fn log_diagnostic(diagnostic: &Diagnostic) {
    if diagnostic.is_fatal() {
        tracing::error!(frame = diagnostic.frame, "{}", diagnostic.error);
    } else {
        tracing::warn!(frame = diagnostic.frame, "{}", diagnostic.error);
    }
}
