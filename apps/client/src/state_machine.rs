//! Interaction state for the upload surface.
//!
//! One enum replaces the independent "dragging / uploading / error / result"
//! flags a page would otherwise juggle, so combinations such as dragging while
//! uploading cannot be represented. At most one upload is in flight: entering
//! `Uploading` hands out an [`UploadTicket`] and only that ticket can complete it.

use tracing::{debug, warn};

use crate::models::ReviewResponse;
use crate::validator::{validate, CandidateFile};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    /// A drag is hovering. `covered` is the state shown before the drag
    /// started and comes back unchanged on drag-leave.
    Dragging { covered: Box<SubmissionState> },
    Uploading,
    Errored(String),
    Succeeded(Box<ReviewResponse>),
}

impl SubmissionState {
    pub fn is_uploading(&self) -> bool {
        matches!(self, SubmissionState::Uploading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SubmissionState::Errored(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&ReviewResponse> {
        match self {
            SubmissionState::Succeeded(response) => Some(response.as_ref()),
            _ => None,
        }
    }
}

/// Proof that the machine accepted a file and is waiting for its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTicket {
    pub attempt: u64,
    pub file: CandidateFile,
}

#[derive(Debug)]
pub struct SubmissionStateMachine {
    state: SubmissionState,
    attempts: u64,
    in_flight: Option<u64>,
}

impl Default for SubmissionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionStateMachine {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
            attempts: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// False while an upload is in flight; the select/drop trigger is disabled.
    pub fn accepts_input(&self) -> bool {
        !self.state.is_uploading()
    }

    pub fn drag_enter(&mut self) {
        match self.state {
            SubmissionState::Idle | SubmissionState::Errored(_) | SubmissionState::Succeeded(_) => {
                let covered = std::mem::replace(&mut self.state, SubmissionState::Idle);
                self.state = SubmissionState::Dragging {
                    covered: Box::new(covered),
                };
            }
            SubmissionState::Dragging { .. } | SubmissionState::Uploading => {}
        }
    }

    pub fn drag_leave(&mut self) {
        if let SubmissionState::Dragging { covered } = &mut self.state {
            let covered = std::mem::replace(covered.as_mut(), SubmissionState::Idle);
            self.state = covered;
        }
    }

    /// A file released over the drop area. Outside of a drag this behaves like
    /// [`select`](Self::select).
    pub fn drop_file(&mut self, file: CandidateFile) -> Option<UploadTicket> {
        self.begin(file, "drop")
    }

    /// A file chosen through the click-to-select control.
    pub fn select(&mut self, file: CandidateFile) -> Option<UploadTicket> {
        self.begin(file, "select")
    }

    fn begin(&mut self, file: CandidateFile, trigger: &str) -> Option<UploadTicket> {
        if self.state.is_uploading() {
            debug!("Ignoring {trigger} of {} while an upload is in flight", file.name);
            return None;
        }

        // Whatever the previous attempt showed is discarded from here on.
        match validate(file) {
            Err(e) => {
                debug!("Rejected {trigger}: {e}");
                self.state = SubmissionState::Errored(e.to_string());
                None
            }
            Ok(file) => {
                self.attempts += 1;
                self.in_flight = Some(self.attempts);
                self.state = SubmissionState::Uploading;
                Some(UploadTicket {
                    attempt: self.attempts,
                    file,
                })
            }
        }
    }

    pub fn succeed(&mut self, attempt: u64, response: ReviewResponse) {
        if self.settle(attempt) {
            self.state = SubmissionState::Succeeded(Box::new(response));
        }
    }

    pub fn fail(&mut self, attempt: u64, message: impl Into<String>) {
        if self.settle(attempt) {
            self.state = SubmissionState::Errored(message.into());
        }
    }

    fn settle(&mut self, attempt: u64) -> bool {
        if !self.state.is_uploading() || self.in_flight != Some(attempt) {
            warn!(
                "Dropping completion for attempt {attempt}; in flight: {:?}",
                self.in_flight
            );
            return false;
        }
        self.in_flight = None;
        true
    }
}
