//! Client core for submitting a paper to the review service and rendering the
//! scores and reviewer comments it returns.
//!
//! Flow: [`validator`] accepts or rejects a candidate file, the
//! [`state_machine`] enters `Uploading`, [`client`] performs the single
//! request, and [`presenter`] turns a success into rows. [`session`] wires them
//! together for an embedding page.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod presenter;
pub mod session;
pub mod state_machine;
pub mod validator;

pub use client::{ReviewService, ReviewServiceClient};
pub use config::{ApiBase, ClientConfig};
pub use errors::{SubmitError, ValidationError};
pub use models::{ApiErrorPayload, ErrorEnvelope, Review, ReviewResponse, ReviewResult, Score, Submission};
pub use presenter::{present, DisplayModel};
pub use session::{FileInput, ReviewSession, SessionView, Upload};
pub use state_machine::{SubmissionState, SubmissionStateMachine};
pub use validator::{validate, CandidateFile, FileSource};
