use thiserror::Error;

/// Errors that can occur while building, querying or transforming a [`crate::MooreMachine`].
///
/// States and symbols are generic, so they are stored in their rendered (`Debug`) form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MooreError {
    /// A second transition was declared for a state and symbol that already have one.
    #[error("state {state} already has a transition on symbol {symbol}")]
    DuplicateTransition {
        /// The state whose transition was declared twice.
        state: String,
        /// The offending symbol.
        symbol: String,
    },
    /// A state was referenced but never given an output value.
    #[error("state {0} has no output assigned")]
    MissingOutput(String),
    /// No state was designated as initial.
    #[error("no initial state was designated")]
    NoInitialState,
    /// A state was queried that does not belong to the machine.
    #[error("state {0} does not belong to the machine")]
    UnknownState(String),
    /// Completion was requested over an empty alphabet.
    #[error("cannot complete a machine with {0} states over an empty alphabet")]
    EmptyAlphabet(usize),
    /// The machine violates a structural invariant.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Shorthand for results whose error is a [`MooreError`].
pub type Result<T> = std::result::Result<T, MooreError>;
