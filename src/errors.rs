use thiserror::Error; // Import the `Error` derive macro from the `thiserror` crate

use crate::context::Target;

// Errors raised by builder operations, generic over the host DOM's own error type
#[derive(Debug, Error)] // Automatically implement `Debug` and `Error` traits for the enum
pub enum BuildError<E: std::error::Error + 'static> {
    // The current target has nothing to resolve to (no bound node, or empty spawn stack)
    #[error("no receiver for {target} target")]
    Unresolved { target: Target },

    // A receiver-less append found nothing on the spawn stack to pop
    #[error("spawn stack is empty")]
    EmptySpawnStack,

    // Whatever the host DOM layer reported, passed through untouched
    #[error(transparent)]
    Dom(E),
}

impl<E: std::error::Error + 'static> BuildError<E> {
    /// True for failures caused by builder misuse rather than by the host DOM.
    pub fn is_precondition(&self) -> bool {
        matches!(self, BuildError::Unresolved { .. } | BuildError::EmptySpawnStack)
    }
}

// Type alias for results that use `BuildError` as the error type
pub type Result<T, E> = std::result::Result<T, BuildError<E>>;
