use super::{RESET, YELLOW};
use std::fmt::{Display, Formatter, Result};

/// A non-fatal diagnostic collected while compiling an expression.
///
/// Notices never block compilation. They are stored on the compiled
/// [`Expression`][`crate::Expression`] so the embedding application can
/// decide whether to surface them.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    /// Describes the cause of the [`Notice`].
    reason: String,
    /// Additional information to display with the [`Notice`].
    help: Option<String>,
}

impl Notice {
    /// Create a new [`Notice`] with the given reason text.
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Notice {
            reason: reason.into(),
            help: None,
        }
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

    /// Return the reason text.
    pub fn get_reason(&self) -> &str {
        &self.reason
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let header = format!("{YELLOW}warning{RESET}");
        write!(f, "{header}: {}", self.reason)?;

        if let Some(help) = &self.help {
            if f.alternate() {
                write!(f, "\n = help: {help}")?;
            }
        }

        Ok(())
    }
}
