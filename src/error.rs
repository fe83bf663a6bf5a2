use thiserror::Error;

macro_rules! invalid_argument {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvalidArgument {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidArgument {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! illegal_state {
    // Single string version
    ($msg:expr) => {
        crate::Error::IllegalState {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::IllegalState {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which covers every failure the analysis engine can report.
///
/// None of these errors describe an "expected" lattice condition: Top and Bottom are
/// ordinary values. Every variant signals a broken contract or an instruction the
/// selected domain does not model, and aborts the precalculation that raised it.
///
/// # Error Categories
///
/// ## Contract Violations
/// - [`Error::InvalidArgument`] - Unknown variable, unknown block, or otherwise bad input
/// - [`Error::EmptyInput`] - A join was requested over zero elements
/// - [`Error::MismatchedDomain`] - Joined elements do not share the same variable universe
/// - [`Error::IllegalState`] - Controller or initializer used out of order
///
/// ## Domain Limits
/// - [`Error::UnsupportedInstruction`] - Instruction kind not modelled by the analysis
/// - [`Error::UnsupportedValue`] - Operand kind not modelled by the analysis
///
/// ## Synchronization
/// - [`Error::LockError`] - The controller lock was poisoned by a panicking thread
///
/// # Examples
///
/// ```rust
/// use dfa_replay::{analysis::MapElement, ir::{Local, LocalType}, Error};
///
/// let x = Local::new("x", LocalType::Int);
/// let element = MapElement::new([x], |_| 0u8);
///
/// match element.get(&Local::new("y", LocalType::Int)) {
///     Err(Error::InvalidArgument { message, .. }) => println!("rejected: {message}"),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller passed an argument outside of the accepted domain.
    ///
    /// Raised for variables that are not part of an element's universe, blocks that
    /// do not belong to the graph, and similar caller bugs. The source location where
    /// the violation was detected is recorded for debugging.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the rejected argument
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Invalid argument - {file}:{line}: {message}")]
    InvalidArgument {
        /// The message to be printed for the InvalidArgument error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A join was requested over an empty set of elements.
    ///
    /// The least upper bound of nothing is undefined; callers must pass at least one
    /// element.
    #[error("Cannot join an empty set of lattice elements")]
    EmptyInput,

    /// Two lattice elements that were joined do not share the same variable universe.
    ///
    /// This indicates broken analysis wiring, e.g. states of two different procedures
    /// being merged, and is never a valid lattice state.
    #[error("Lattice elements do not share the same domain - {0}")]
    MismatchedDomain(String),

    /// The instruction kind is not modelled by the analysis.
    ///
    /// The first field names the analysis, the second the rendered instruction.
    #[error("{0} does not support instruction `{1}`")]
    UnsupportedInstruction(&'static str, String),

    /// The operand or expression kind is not modelled by the analysis.
    ///
    /// The first field names the analysis, the second the rendered value.
    #[error("{0} does not support value `{1}`")]
    UnsupportedValue(&'static str, String),

    /// An operation was invoked in a state that does not allow it.
    ///
    /// Covers a missing or ambiguous boundary block, retrieving a result before one
    /// exists, publishing a result twice, and resuming a stopped run.
    #[error("Illegal state - {file}:{line}: {message}")]
    IllegalState {
        /// The message to be printed for the IllegalState error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Failed to lock target.
    ///
    /// This error occurs when the controller mutex was poisoned by a thread that
    /// panicked while holding it.
    #[error("Failed to lock target")]
    LockError,
}
