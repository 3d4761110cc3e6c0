use super::{Fault, Pointer, RED, RESET};
use crate::{log::Visual, region::Region};
use std::fmt::{Debug, Display, Formatter, Result};

/// Describes an error, and allows adding a contextual help text and
/// visualization.
///
/// Every error raised while compiling an expression is a syntax error and
/// carries a [`Pointer`] to the offending text. Errors raised while
/// rendering either come from a filter, or wrap a [`Fault`] surfaced by a
/// context object.
///
/// # Examples
///
/// Creating an [`Error`] that includes a [`Visual`] of type [`Pointer`]:
///
/// ```
/// use sluice::{filter::Error, Region};
///
/// Error::build("unknown filter")
///     .with_pointer("name | upcase", Region::new(7..13))
///     .with_name("greeting")
///     .with_help("did you mean `upper`?");
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this
/// output:
///
/// ```text
/// error: unknown filter
///  --> greeting:1:8
///   |
/// 1 | name | upcase
///   |        ^^^^^^
///   |
///  = help: did you mean `upper`?
/// ```
pub struct Error {
    /// Describes the cause of the [`Error`].
    reason: String,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the expression that the [`Error`] comes from.
    name: Option<String>,
    /// The domain error that caused this [`Error`], if any.
    fault: Option<Box<dyn Fault>>,
}

impl Error {
    /// Create a new [`Error`] with the given reason text.
    ///
    /// The additional fields may be populated using the various methods
    /// defined on `Error`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::filter::Error;
    ///
    /// Error::build("invalid argument")
    ///     .with_help("expected a number, found a string");
    /// ```
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            reason: reason.into(),
            name: None,
            visual: None,
            help: None,
            fault: None,
        }
    }

    /// Create a new [`Error`] wrapping the given [`Fault`].
    ///
    /// The reason text is taken from the display form of the fault, and the
    /// fault itself remains available through
    /// [`get_fault`][`Error::get_fault`].
    pub fn from_fault(fault: Box<dyn Fault>) -> Self {
        Error {
            reason: fault.to_string(),
            name: None,
            visual: None,
            help: None,
            fault: Some(fault),
        }
    }

    /// Set the reason text, which is a short summary of the [`Error`].
    pub fn with_reason<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.reason = text.into();

        self
    }

    /// Set the name text, which is the name of the expression that the
    /// [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate
    /// the cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] with the given source
    /// text and [`Region`].
    ///
    /// This is a shortcut method for creating a `Pointer` yourself and then
    /// passing it to [`with_visual`][`Error::with_visual`].
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        self.visual = Some(Box::new(Pointer::new(source, region.into())));

        self
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Return the name of the expression that the error is related to.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the [`Fault`] that caused this error, if any.
    pub fn get_fault(&self) -> Option<&dyn Fault> {
        self.fault.as_deref()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .field("fault", &self.fault)
            .finish()?;

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let header = format!("{RED}error{RESET}");
        write!(f, "{header}: {}", self.reason)?;

        if self.visual.is_some() && f.alternate() {
            return self.visual.as_ref().unwrap().display(
                f,
                self.name.as_deref(),
                self.help.as_deref(),
            );
        }

        Ok(())
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.reason == other.reason && self.help == other.help && self.name == other.name
    }
}
