use thiserror::Error;

/// A path that does not resolve to a stack in the current tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressingError {
    #[error("Layout node at depth {depth} is a {found}, not a stack")]
    NotAStack { depth: usize, found: &'static str },

    #[error("Index {index} out of range at depth {depth} (stack has {len} children)")]
    OutOfRange {
        depth: usize,
        index: usize,
        len: usize,
    },
}

/// Layout request errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Only one of append, insert or remove can be used")]
    ConflictingEdits,

    #[error("Do not give layouts together with remove")]
    LayoutWithRemove,

    /// Insert and remove need at least the child position.
    #[error("{0} needs a child position")]
    MissingPosition(&'static str),

    #[error(transparent)]
    Addressing(#[from] AddressingError),
}

impl LayoutError {
    pub fn is_addressing(&self) -> bool {
        matches!(self, LayoutError::Addressing(_))
    }
}
