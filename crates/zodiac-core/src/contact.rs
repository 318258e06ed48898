//! Contact form submission state.
//!
//! Submission goes through an injected [`Submitter`], which says how the
//! request ends and how long it takes. The controller is driven by
//! timestamps, so the status banner timing can be tested without timers.

use crate::constants::{DEFAULT_SUBMIT_DELAY_MS, STATUS_DISPLAY_MS};
use thiserror::Error;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("message could not be delivered: {0}")]
    Rejected(String),
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), FormError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(FormError::Missing(field));
            }
        }
        let email = self.email.trim();
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
        if !valid {
            return Err(FormError::InvalidEmail(email.to_owned()));
        }
        Ok(())
    }
}

/// How a submission will settle.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSubmission {
    pub settle_after_ms: f64,
    pub outcome: Result<(), SubmitError>,
}

pub trait Submitter {
    fn submit(&mut self, form: &ContactForm) -> PendingSubmission;
}

/// Stand-in transport: settles after a fixed delay with a fixed outcome.
#[derive(Clone, Debug)]
pub struct SimulatedSubmitter {
    pub delay_ms: f64,
    pub fail_with: Option<String>,
    pub calls: usize,
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_SUBMIT_DELAY_MS,
            fail_with: None,
            calls: 0,
        }
    }
}

impl Submitter for SimulatedSubmitter {
    fn submit(&mut self, _form: &ContactForm) -> PendingSubmission {
        self.calls += 1;
        PendingSubmission {
            settle_after_ms: self.delay_ms,
            outcome: match &self.fail_with {
                Some(msg) => Err(SubmitError::Rejected(msg.clone())),
                None => Ok(()),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormState {
    Idle,
    Submitting {
        settles_at_ms: f64,
        outcome: Result<(), SubmitError>,
    },
    Success {
        until_ms: f64,
    },
    Error {
        until_ms: f64,
        reason: String,
    },
}

impl FormState {
    /// Stable key for the status element's CSS class.
    pub fn key(&self) -> &'static str {
        match self {
            FormState::Idle => "idle",
            FormState::Submitting { .. } => "submitting",
            FormState::Success { .. } => "success",
            FormState::Error { .. } => "error",
        }
    }
}

pub struct FormController<S: Submitter> {
    submitter: S,
    state: FormState,
    status_display_ms: f64,
}

impl<S: Submitter> FormController<S> {
    pub fn new(submitter: S) -> Self {
        Self {
            submitter,
            state: FormState::Idle,
            status_display_ms: STATUS_DISPLAY_MS,
        }
    }

    pub fn with_status_display(mut self, ms: f64) -> Self {
        self.status_display_ms = ms.max(0.0);
        self
    }

    /// Start a submission. Invalid forms never reach the submitter, and a
    /// second submit while one is in flight is ignored.
    pub fn submit(&mut self, form: &ContactForm, now_ms: f64) -> Result<&FormState, FormError> {
        form.validate()?;
        if matches!(self.state, FormState::Submitting { .. }) {
            log::debug!("[contact] submit ignored; already in flight");
            return Ok(&self.state);
        }
        let pending = self.submitter.submit(form);
        log::info!(
            "[contact] submitting for {}; settles in {} ms",
            form.email.trim(),
            pending.settle_after_ms
        );
        self.state = FormState::Submitting {
            settles_at_ms: now_ms + pending.settle_after_ms.max(0.0),
            outcome: pending.outcome,
        };
        Ok(&self.state)
    }

    /// Advance by time. Returns true when the state changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let next = match &self.state {
            FormState::Submitting {
                settles_at_ms,
                outcome,
            } if now_ms >= *settles_at_ms => {
                let until_ms = now_ms + self.status_display_ms;
                Some(match outcome {
                    Ok(()) => FormState::Success { until_ms },
                    Err(e) => {
                        log::error!("[contact] {e}");
                        FormState::Error {
                            until_ms,
                            reason: e.to_string(),
                        }
                    }
                })
            }
            FormState::Success { until_ms } | FormState::Error { until_ms, .. }
                if now_ms >= *until_ms =>
            {
                Some(FormState::Idle)
            }
            _ => None,
        };
        match next {
            Some(s) => {
                self.state = s;
                true
            }
            None => false,
        }
    }

    /// When the next state change is due, if any.
    pub fn next_deadline(&self) -> Option<f64> {
        match &self.state {
            FormState::Idle => None,
            FormState::Submitting { settles_at_ms, .. } => Some(*settles_at_ms),
            FormState::Success { until_ms } | FormState::Error { until_ms, .. } => Some(*until_ms),
        }
    }

    #[inline]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    #[inline]
    pub fn submitter(&self) -> &S {
        &self.submitter
    }
}
