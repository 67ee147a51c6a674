/// Upload session, the part a page embeds. Drag/drop and click-to-select events
/// in, a render-ready [`SessionView`] out.
///
/// `ReviewSession` is a cheap handle: clones share one state machine, so the
/// page keeps calling [`view`](ReviewSession::view) while an [`Upload`] is
/// awaited elsewhere.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::ReviewService;
use crate::errors::SubmitError;
use crate::models::{ReviewResponse, Submission};
use crate::presenter::{present, DisplayModel};
use crate::state_machine::{SubmissionState, SubmissionStateMachine, UploadTicket};
use crate::validator::CandidateFile;

/// The file-selection control. Emptied after every use so picking the same
/// file again still counts as a new selection.
#[derive(Debug, Default)]
pub struct FileInput {
    value: Option<CandidateFile>,
}

impl FileInput {
    pub fn pick(&mut self, file: CandidateFile) {
        self.value = Some(file);
    }

    pub fn take(&mut self) -> Option<CandidateFile> {
        self.value.take()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    Idle,
    Dragging,
    Uploading,
    Error(String),
    Result {
        submission: Submission,
        display: DisplayModel,
    },
}

struct Inner {
    machine: SubmissionStateMachine,
    input: FileInput,
    /// Token of the attempt in flight, keyed by attempt number.
    cancel: Option<(u64, CancellationToken)>,
}

#[derive(Clone)]
pub struct ReviewSession {
    inner: Arc<Mutex<Inner>>,
    service: Arc<dyn ReviewService>,
}

impl ReviewSession {
    pub fn new(service: Arc<dyn ReviewService>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                machine: SubmissionStateMachine::new(),
                input: FileInput::default(),
                cancel: None,
            })),
            service,
        }
    }

    // Every critical section is a plain state update, so a poisoned lock
    // still holds a consistent machine.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().machine.state().clone()
    }

    pub fn is_trigger_enabled(&self) -> bool {
        self.lock().machine.accepts_input()
    }

    /// True while the file control holds a selection not yet submitted.
    pub fn has_picked_file(&self) -> bool {
        !self.lock().input.is_empty()
    }

    /// Token of the attempt in flight. Each accepted attempt gets a fresh one,
    /// so cancelling it never affects later uploads.
    pub fn current_cancellation_token(&self) -> Option<CancellationToken> {
        self.lock().cancel.as_ref().map(|(_, token)| token.clone())
    }

    pub fn drag_enter(&self) {
        self.lock().machine.drag_enter();
    }

    pub fn drag_leave(&self) {
        self.lock().machine.drag_leave();
    }

    /// The file control's change event. Replaces any earlier unsubmitted pick.
    pub fn pick_file(&self, file: CandidateFile) {
        self.lock().input.pick(file);
    }

    /// A file released over the drop area. `None` when the file was rejected
    /// or another upload is in flight.
    pub fn begin_drop(&self, file: CandidateFile) -> Option<Upload> {
        let mut inner = self.lock();
        let ticket = inner.machine.drop_file(file)?;
        Some(self.start(&mut inner, ticket))
    }

    /// Submits whatever the file control holds. The control is reset even
    /// when the trigger is ignored.
    pub fn begin_picked(&self) -> Option<Upload> {
        let mut inner = self.lock();
        let file = inner.input.take()?;
        let ticket = inner.machine.select(file)?;
        Some(self.start(&mut inner, ticket))
    }

    fn start(&self, inner: &mut Inner, ticket: UploadTicket) -> Upload {
        let cancel = CancellationToken::new();
        inner.cancel = Some((ticket.attempt, cancel.clone()));
        Upload {
            session: self.clone(),
            attempt: ticket.attempt,
            file: ticket.file,
            cancel,
            settled: false,
        }
    }

    pub async fn drop_file(&self, file: CandidateFile) {
        if let Some(upload) = self.begin_drop(file) {
            upload.run().await;
        }
    }

    /// Click-to-select in one step: pick, then submit.
    pub async fn choose_file(&self, file: CandidateFile) {
        self.pick_file(file);
        if let Some(upload) = self.begin_picked() {
            upload.run().await;
        }
    }

    pub fn view(&self) -> SessionView {
        match self.lock().machine.state() {
            SubmissionState::Idle => SessionView::Idle,
            SubmissionState::Dragging { .. } => SessionView::Dragging,
            SubmissionState::Uploading => SessionView::Uploading,
            SubmissionState::Errored(message) => SessionView::Error(message.clone()),
            SubmissionState::Succeeded(response) => SessionView::Result {
                submission: response.submission.clone(),
                display: present(&response.review_result),
            },
        }
    }
}

/// One accepted attempt. [`run`](Upload::run) performs the request and settles
/// the session. Dropping an unsettled upload cancels its token and settles the
/// session with the cancellation error, so it never stays `Uploading`.
#[must_use = "the session stays Uploading until the upload is run or dropped"]
pub struct Upload {
    session: ReviewSession,
    attempt: u64,
    file: CandidateFile,
    cancel: CancellationToken,
    settled: bool,
}

impl Upload {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn file(&self) -> &CandidateFile {
        &self.file
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub async fn run(mut self) {
        let outcome = self
            .session
            .service
            .submit_review(&self.file, &self.cancel)
            .await;
        self.settle(outcome);
    }

    fn settle(&mut self, outcome: Result<ReviewResponse, SubmitError>) {
        self.settled = true;
        let mut inner = self.session.lock();
        if matches!(inner.cancel, Some((attempt, _)) if attempt == self.attempt) {
            inner.cancel = None;
        }

        match outcome {
            Ok(response) => {
                info!(
                    "Review ready for {} ({})",
                    self.file.name, response.submission.submission_id
                );
                inner.machine.succeed(self.attempt, response);
            }
            Err(e) => {
                warn!("Review of {} failed: {e}", self.file.name);
                inner.machine.fail(self.attempt, e.user_message());
            }
        }
    }
}

impl Drop for Upload {
    fn drop(&mut self) {
        if !self.settled {
            warn!(
                "Upload of {} (attempt {}) dropped before it finished",
                self.file.name, self.attempt
            );
            self.cancel.cancel();
            self.settle(Err(SubmitError::Cancelled));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewResult, Score};
    use crate::validator::PDF_MEDIA_TYPE;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Answers every request with a fresh response. With `gated`, each request
    /// waits for one `gate.notify_one()` first.
    struct CountingService {
        calls: AtomicUsize,
        gated: bool,
        gate: Notify,
    }

    #[async_trait]
    impl ReviewService for CountingService {
        async fn submit_review(
            &self,
            file: &CandidateFile,
            cancel: &CancellationToken,
        ) -> Result<ReviewResponse, SubmitError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.gated {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(SubmitError::Cancelled),
                    _ = self.gate.notified() => {}
                }
            }
            Ok(ReviewResponse {
                submission: Submission {
                    submission_id: format!("sub_{n}"),
                    file_name: file.name.clone(),
                    file_size: file.size,
                    created_at: "2025-01-01T00:00:00Z".into(),
                    text_preview: String::new(),
                },
                review_result: ReviewResult {
                    review_result_id: format!("rev_{n}"),
                    submission_id: format!("sub_{n}"),
                    scores: vec![Score {
                        dimension: "novelty".into(),
                        value: 4.0,
                    }],
                    reviews: vec![],
                    generated_at: "2025-01-01T00:00:01Z".into(),
                },
            })
        }
    }

    fn service(gated: bool) -> Arc<CountingService> {
        Arc::new(CountingService {
            calls: AtomicUsize::new(0),
            gated,
            gate: Notify::new(),
        })
    }

    fn session() -> (ReviewSession, Arc<CountingService>) {
        let service = service(false);
        (ReviewSession::new(service.clone()), service)
    }

    fn gated_session() -> (ReviewSession, Arc<CountingService>) {
        let service = service(true);
        (ReviewSession::new(service.clone()), service)
    }

    fn pdf() -> CandidateFile {
        CandidateFile::from_bytes("paper.pdf", PDF_MEDIA_TYPE, &b"%PDF-1.4"[..])
    }

    const CANCELLED: &str = "The upload was cancelled.";

    #[tokio::test]
    async fn test_choose_file_resets_input() {
        let (session, service) = session();

        session.choose_file(pdf()).await;
        assert!(!session.has_picked_file());
        session.choose_file(pdf()).await;

        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
        match session.view() {
            SessionView::Result { submission, display } => {
                assert_eq!(submission.submission_id, "sub_2");
                assert_eq!(display.scores[0].value_text, "4.0 / 5.0");
            }
            other => panic!("expected result view, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_picked_file_waits_for_trigger() {
        let (session, service) = session();

        session.pick_file(pdf());
        assert!(session.has_picked_file());
        assert_eq!(session.view(), SessionView::Idle);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);

        let upload = session.begin_picked().unwrap();
        assert!(!session.has_picked_file());
        upload.run().await;
        assert!(matches!(session.view(), SessionView::Result { .. }));

        // Nothing picked: the trigger has nothing to send.
        assert!(session.begin_picked().is_none());
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_drop_never_calls_service() {
        let (session, service) = session();
        session.drag_enter();
        assert_eq!(session.view(), SessionView::Dragging);

        session
            .drop_file(CandidateFile::from_bytes("notes.txt", "text/plain", &b"hi"[..]))
            .await;

        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            session.view(),
            SessionView::Error("Only PDF files are supported.".into())
        );
    }

    #[tokio::test]
    async fn test_drag_over_result_keeps_result() {
        let (session, _) = session();
        session.choose_file(pdf()).await;
        let before = session.view();

        session.drag_enter();
        session.drag_leave();
        assert_eq!(session.view(), before);
    }

    #[tokio::test]
    async fn test_second_trigger_while_uploading_sends_nothing() {
        let (session, service) = gated_session();

        let upload = session.begin_drop(pdf()).unwrap();
        let running = tokio::spawn(upload.run());

        assert_eq!(session.view(), SessionView::Uploading);
        assert!(!session.is_trigger_enabled());

        session.choose_file(pdf()).await;
        session.drop_file(pdf()).await;
        session.drag_enter();
        assert!(!session.has_picked_file());
        assert_eq!(session.view(), SessionView::Uploading);

        service.gate.notify_one();
        running.await.unwrap();

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert!(session.is_trigger_enabled());
        assert!(matches!(session.view(), SessionView::Result { .. }));
    }

    #[tokio::test]
    async fn test_dropped_upload_does_not_leave_session_stuck() {
        let (session, service) = gated_session();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), session.choose_file(pdf())).await;
        assert!(abandoned.is_err());

        assert_eq!(session.view(), SessionView::Error(CANCELLED.into()));
        assert!(session.is_trigger_enabled());
        assert!(session.current_cancellation_token().is_none());

        service.gate.notify_one();
        session.choose_file(pdf()).await;

        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
        assert!(matches!(session.view(), SessionView::Result { .. }));
    }

    #[tokio::test]
    async fn test_unrun_upload_settles_on_drop() {
        let (session, service) = session();

        let upload = session.begin_drop(pdf()).unwrap();
        let token = upload.cancellation_token().clone();
        drop(upload);

        assert!(token.is_cancelled());
        assert_eq!(session.view(), SessionView::Error(CANCELLED.into()));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelling_one_attempt_spares_the_next() {
        let (session, service) = gated_session();

        let upload = session.begin_drop(pdf()).unwrap();
        let token = session.current_cancellation_token().unwrap();
        assert!(!token.is_cancelled());
        let running = tokio::spawn(upload.run());

        token.cancel();
        running.await.unwrap();
        assert_eq!(session.view(), SessionView::Error(CANCELLED.into()));
        assert!(session.current_cancellation_token().is_none());

        service.gate.notify_one();
        let next = session.begin_drop(pdf()).unwrap();
        assert!(!next.cancellation_token().is_cancelled());
        next.run().await;

        assert!(matches!(session.view(), SessionView::Result { .. }));
    }
}
