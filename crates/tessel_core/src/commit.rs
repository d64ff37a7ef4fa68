//! Live versus delayed commit of text edits
//!
//! In `Live` mode every edit is committed to the bound value immediately. In
//! `Delayed` mode edits accumulate in a pending text buffer that is committed
//! only on explicit submit or focus loss, and discarded on revert.

/// Commit mode of a text-backed field
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CommitMode {
    #[default]
    Live,
    Delayed {
        /// Edited text not yet committed
        pending: Option<String>,
    },
}

/// What the caller should do after an edit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// Commit this text to the value now
    Commit(String),
    /// Text was buffered; only the display changes
    Buffered,
}

impl CommitMode {
    pub fn delayed() -> Self {
        CommitMode::Delayed { pending: None }
    }

    pub fn is_delayed(&self) -> bool {
        matches!(self, CommitMode::Delayed { .. })
    }

    /// Switch modes; leaving `Delayed` drops any pending text
    pub fn set_delayed(&mut self, delayed: bool) {
        match (delayed, self.is_delayed()) {
            (true, false) => *self = CommitMode::delayed(),
            (false, true) => *self = CommitMode::Live,
            _ => {}
        }
    }

    /// Record an edit
    pub fn edit(&mut self, text: String) -> EditOutcome {
        match self {
            CommitMode::Live => EditOutcome::Commit(text),
            CommitMode::Delayed { pending } => {
                *pending = Some(text);
                EditOutcome::Buffered
            }
        }
    }

    /// Take the pending text for committing (submit or focus loss)
    pub fn take_pending(&mut self) -> Option<String> {
        match self {
            CommitMode::Live => None,
            CommitMode::Delayed { pending } => pending.take(),
        }
    }

    /// Discard the pending text; returns whether anything was pending
    pub fn revert(&mut self) -> bool {
        self.take_pending().is_some()
    }

    pub fn pending(&self) -> Option<&str> {
        match self {
            CommitMode::Live => None,
            CommitMode::Delayed { pending } => pending.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_commits_immediately() {
        let mut mode = CommitMode::Live;
        assert_eq!(mode.edit("4".into()), EditOutcome::Commit("4".into()));
        assert_eq!(mode.take_pending(), None);
    }

    #[test]
    fn test_delayed_buffers_until_taken() {
        let mut mode = CommitMode::delayed();
        assert_eq!(mode.edit("4".into()), EditOutcome::Buffered);
        assert_eq!(mode.edit("42".into()), EditOutcome::Buffered);
        assert_eq!(mode.pending(), Some("42"));
        assert_eq!(mode.take_pending().as_deref(), Some("42"));
        assert_eq!(mode.take_pending(), None);
    }

    #[test]
    fn test_revert_and_switch() {
        let mut mode = CommitMode::Live;
        mode.set_delayed(true);
        mode.edit("x".into());
        assert!(mode.revert());
        assert!(!mode.revert());

        mode.edit("y".into());
        mode.set_delayed(false);
        assert_eq!(mode, CommitMode::Live);
    }
}
