//! Error type shared by the scheduler, the lifecycle and renderers.
//!
//! Errors are `Clone` because one failed update is observed by every
//! holder of its [`UpdateHandle`](crate::UpdateHandle).

use crate::types::Lifecycle;

pub type Result<T> = std::result::Result<T, ComponentError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// `template()` or `prepare_template()` failed.
    #[error("template error: {0}")]
    Template(String),

    /// The renderer failed to apply a template.
    #[error("render error: {0}")]
    Render(String),

    /// Attach/detach called in a state that does not allow it.
    #[error("cannot {action} an element that is {from}")]
    Lifecycle {
        from: Lifecycle,
        action: &'static str,
    },

    /// The microtask queue refused a task or was re-entered.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// The update's task was dropped before it could settle.
    #[error("update dropped before it settled")]
    Dropped,
}

impl ComponentError {
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn lifecycle(from: Lifecycle, action: &'static str) -> Self {
        Self::Lifecycle { from, action }
    }

    pub fn scheduler(msg: impl Into<String>) -> Self {
        Self::Scheduler(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_are_stable() {
        assert!(ComponentError::template("x").to_string().contains("template error:"));
        assert!(ComponentError::render("x").to_string().contains("render error:"));
        assert!(ComponentError::scheduler("x").to_string().contains("scheduler error:"));
    }

    #[test]
    fn test_lifecycle_message_names_state_and_action() {
        let err = ComponentError::lifecycle(Lifecycle::Mounted, "attach");
        assert_eq!(err.to_string(), "cannot attach an element that is mounted");
    }
}
