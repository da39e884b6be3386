//! Errors raised while building or parsing selectors.

use crate::FragmentKind;
use thiserror::Error;

/// Why a fragment or a piece of selector text was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// An element, id or pseudo-element fragment was appended a second time.
    #[error("a selector may contain only one {kind} fragment")]
    DuplicateFragment {
        /// The kind that was already present.
        kind: FragmentKind,
    },
    /// A fragment was appended after one that must come later.
    #[error("{attempted} fragment cannot follow {previous} fragment")]
    Order {
        /// Kind of the most recently appended fragment.
        previous: FragmentKind,
        /// Kind of the rejected fragment.
        attempted: FragmentKind,
    },
    /// Selector text could not be tokenized into fragments and combinators.
    #[error("invalid selector at byte {position}: {reason}")]
    Syntax {
        /// Byte offset into the parsed text.
        position: usize,
        /// Short description of what was expected.
        reason: &'static str,
    },
}
