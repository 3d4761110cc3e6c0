use std::fmt::{Debug, Display};

/// Describes a domain error raised while evaluating a named attribute on a
/// context object.
///
/// The resolver inspects [`is_silent`][`Fault::is_silent`] on every fault
/// surfaced by an attribute evaluation. A silent fault makes the whole
/// resolution fail quietly, so the expression renders as the engine's
/// invalid text. Any other fault aborts the render and is handed back to
/// the caller inside an [`Error`][`crate::filter::Error`].
///
/// The marker is a capability, not a type check, so any error type owned by
/// the embedding application may participate:
///
/// ```
/// use std::fmt::{Display, Formatter, Result};
/// use sluice::Fault;
///
/// #[derive(Debug)]
/// struct Unavailable;
///
/// impl Display for Unavailable {
///     fn fmt(&self, f: &mut Formatter<'_>) -> Result {
///         write!(f, "record is unavailable")
///     }
/// }
///
/// impl Fault for Unavailable {
///     fn is_silent(&self) -> bool {
///         true
///     }
/// }
/// ```
pub trait Fault: Display + Debug + Send + Sync {
    /// Return true when resolution should absorb this fault and continue
    /// rendering with the invalid sentinel instead of aborting.
    fn is_silent(&self) -> bool {
        false
    }
}
