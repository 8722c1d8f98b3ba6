// ============================================================================
// spark-components - Errors
// ============================================================================

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// `mount` could not resolve its selector
    #[error("Mount point \"{selector}\" not found.")]
    MountTargetNotFound { selector: String },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The component was destroyed and no longer accepts state changes
    #[error("component has been destroyed")]
    Destroyed,

    #[error("unknown method: {name}")]
    UnknownMethod { name: String },

    #[error("router has no root element")]
    NoRouterRoot,
}

impl Error {
    #[must_use]
    pub fn mount_target_not_found(selector: impl Into<String>) -> Self {
        Self::MountTargetNotFound {
            selector: selector.into(),
        }
    }

    #[must_use]
    pub fn invalid_selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_error_message_names_the_selector() {
        let err = Error::mount_target_not_found("#missing");
        assert_eq!(err.to_string(), "Mount point \"#missing\" not found.");
    }

    #[test]
    fn invalid_selector_message() {
        let err = Error::invalid_selector("##", "expected a selector");
        assert_eq!(err.to_string(), "invalid selector \"##\": expected a selector");
    }
}
