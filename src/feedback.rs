//! Transient notifications handed back to the UI.
//!
//! The library never renders anything; it describes the toast and the UI
//! shows it after `show_after_ms`, starts hiding it `visible_ms` after
//! creation and removes it once the `fade_ms` transition ends.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::FeedbackTiming;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Success,
    Error,
    #[default]
    Info,
}

impl FeedbackKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "success" => FeedbackKind::Success,
            "error" => FeedbackKind::Error,
            _ => FeedbackKind::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub message: String,
    pub kind: FeedbackKind,
    pub show_after_ms: u64,
    pub visible_ms: u64,
    pub fade_ms: u64,
}

impl Feedback {
    pub fn new(message: impl Into<String>, kind: FeedbackKind, timing: &FeedbackTiming) -> Self {
        let feedback = Self {
            message: message.into(),
            kind,
            show_after_ms: timing.show_after_ms,
            visible_ms: timing.visible_ms,
            fade_ms: timing.fade_ms,
        };
        match kind {
            FeedbackKind::Error => warn!("feedback: {}", feedback.message),
            _ => info!("feedback: {}", feedback.message),
        }
        feedback
    }

    /// Time from creation until the toast has left the page.
    pub fn total_lifetime_ms(&self) -> u64 {
        self.visible_ms + self.fade_ms
    }
}

/// A value produced by a page action plus the toast that should accompany it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome<T> {
    pub value: T,
    pub feedback: Option<Feedback>,
}

impl<T> ActionOutcome<T> {
    pub fn with_feedback(value: T, feedback: Feedback) -> Self {
        Self {
            value,
            feedback: Some(feedback),
        }
    }

    pub fn silent(value: T) -> Self {
        Self {
            value,
            feedback: None,
        }
    }
}
