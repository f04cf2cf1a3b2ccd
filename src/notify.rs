//! Transient, auto-expiring user notifications.
//!
//! Every operation's result ends up here. Errors are turned into notices at
//! the operation boundary and go no further.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::lifecycle::{AllocationOutcome, LifecycleError};

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// The operation succeeded.
    Success,
    /// The operation failed or was refused.
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Success or failure.
    pub level: Level,
    /// What to show.
    pub text: String,
    /// When the notice was raised.
    pub shown_at: DateTime<Utc>,
}

impl Notice {
    /// A success notice raised now.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            text: text.into(),
            shown_at: Utc::now(),
        }
    }

    /// An error notice raised now.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
            shown_at: Utc::now(),
        }
    }

    /// Converts an operation result into a notice.
    ///
    /// `success` describes the happy path. Failures the backend did not
    /// explain are shown as `fallback`.
    pub fn from_result<T>(
        result: &Result<T, LifecycleError>,
        success: impl FnOnce(&T) -> String,
        fallback: &str,
    ) -> Self {
        match result {
            Ok(value) => Self::success(success(value)),
            Err(error) => Self::error(error.user_message(fallback)),
        }
    }

    /// Whether this notice reports a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl From<&AllocationOutcome> for Notice {
    fn from(outcome: &AllocationOutcome) -> Self {
        if outcome.is_success() {
            Self::success(outcome.to_string())
        } else {
            Self::error(outcome.to_string())
        }
    }
}

/// Holds at most one notice, for a fixed display duration.
#[derive(Debug, Clone)]
pub struct Notifier {
    current: Option<Notice>,
    duration: TimeDelta,
}

impl Notifier {
    /// Creates a notifier whose notices expire after `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            duration: TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Shows a notice, replacing any current one.
    pub fn show(&mut self, notice: Notice) {
        self.current = Some(notice);
    }

    /// The notice still on display at `now`, if any.
    #[must_use]
    pub fn current(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|notice| {
                notice
                    .shown_at
                    .checked_add_signed(self.duration)
                    .is_none_or(|expiry| now < expiry)
            })
    }

    /// Removes the current notice.
    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::ApiError, domain::RequestId};

    #[test]
    fn notice_expires_after_the_display_duration() {
        let mut notifier = Notifier::new(Duration::from_secs(3));
        let notice = Notice::success("Request created successfully!");
        let shown_at = notice.shown_at;
        notifier.show(notice);

        assert!(notifier.current(shown_at).is_some());
        assert!(notifier.current(shown_at + TimeDelta::milliseconds(2_999)).is_some());
        assert!(notifier.current(shown_at + TimeDelta::seconds(3)).is_none());
    }

    #[test]
    fn a_new_notice_replaces_the_old_one() {
        let mut notifier = Notifier::new(Duration::from_secs(3));
        notifier.show(Notice::success("first"));
        notifier.show(Notice::error("second"));

        let current = notifier.current(Utc::now()).unwrap();
        assert_eq!(current.text, "second");
        assert!(current.is_error());

        notifier.dismiss();
        assert!(notifier.current(Utc::now()).is_none());
    }

    #[test]
    fn results_become_notices() {
        let created: Result<RequestId, LifecycleError> = Ok(RequestId::new(14));
        let notice = Notice::from_result(
            &created,
            |id| format!("Request {id} created successfully!"),
            "Error creating request",
        );
        assert_eq!(notice.level, Level::Success);
        assert_eq!(notice.text, "Request 14 created successfully!");

        let unreachable: Result<RequestId, LifecycleError> =
            Err(ApiError::Transport("connection refused".into()).into());
        let notice = Notice::from_result(&unreachable, |_| String::new(), "Error creating request");
        assert_eq!(notice.level, Level::Error);
        assert_eq!(notice.text, "Error creating request");
    }

    #[test]
    fn allocation_outcomes_become_notices() {
        let outcome = AllocationOutcome::Rejected {
            detail: "No matching unit".to_string(),
            denied: true,
        };
        let notice = Notice::from(&outcome);
        assert!(notice.is_error());
        assert_eq!(notice.text, "No matching unit");
    }
}
