//! Reviews section of a property page
//!
//! Owns the loaded review list and at most one open review form. A submit
//! moves through `Idle -> Validating -> Submitting -> Idle`; a second submit
//! while one is in flight is refused.

use crate::models::{Review, ReviewSummary};
use crate::services::{Notifier, ReviewService};
use crate::workflow::form::{Author, FieldErrors, ReviewForm};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Submitting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Client-side checks failed; nothing was sent
    Invalid(FieldErrors),
    /// Another submission is still in flight
    Busy,
    /// No review form is open
    NoForm,
    Failed(String),
    Submitted(Review),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns the section to `Idle` however the submission ends
struct PhaseGuard<'a> {
    phase: &'a Mutex<SubmissionPhase>,
}

impl<'a> PhaseGuard<'a> {
    /// `None` unless the section was idle
    fn begin(phase: &'a Mutex<SubmissionPhase>) -> Option<Self> {
        let mut current = lock(phase);
        if *current != SubmissionPhase::Idle {
            return None;
        }
        *current = SubmissionPhase::Validating;
        Some(Self { phase })
    }

    fn advance(&self, next: SubmissionPhase) {
        debug!(?next, "review submission phase");
        *lock(self.phase) = next;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *lock(self.phase) = SubmissionPhase::Idle;
    }
}

pub struct ReviewsSection {
    property_id: i64,
    service: Arc<ReviewService>,
    notifier: Arc<dyn Notifier>,
    author: Author,
    summary: Mutex<ReviewSummary>,
    form: Mutex<Option<ReviewForm>>,
    phase: Mutex<SubmissionPhase>,
}

impl ReviewsSection {
    pub fn new(
        property_id: i64,
        service: Arc<ReviewService>,
        notifier: Arc<dyn Notifier>,
        author: Author,
    ) -> Self {
        Self {
            property_id,
            service,
            notifier,
            author,
            summary: Mutex::new(ReviewSummary::default()),
            form: Mutex::new(None),
            phase: Mutex::new(SubmissionPhase::Idle),
        }
    }

    /// Re-fetch the authoritative review list
    pub async fn load(&self) -> ReviewSummary {
        let summary = self.service.get_reviews_summary(self.property_id).await;
        *lock(&self.summary) = summary.clone();
        summary
    }

    pub fn summary(&self) -> ReviewSummary {
        lock(&self.summary).clone()
    }

    pub fn phase(&self) -> SubmissionPhase {
        *lock(&self.phase)
    }

    pub fn is_form_open(&self) -> bool {
        lock(&self.form).is_some()
    }

    /// Open a fresh form, or close the open one. Ignored mid-submission.
    pub fn toggle_form(&self) {
        // form before phase, as in `submit`
        let mut form = lock(&self.form);
        if self.phase() != SubmissionPhase::Idle {
            return;
        }
        *form = match form.take() {
            Some(_) => None,
            None => Some(ReviewForm::new(self.property_id)),
        };
    }

    /// Apply an edit to the open form; `None` when closed or mid-submission
    pub fn edit_form<R>(&self, edit: impl FnOnce(&mut ReviewForm) -> R) -> Option<R> {
        let mut form = lock(&self.form);
        if self.phase() != SubmissionPhase::Idle {
            return None;
        }
        form.as_mut().map(edit)
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (guard, draft) = {
            let mut form = lock(&self.form);
            let Some(guard) = PhaseGuard::begin(&self.phase) else {
                return SubmitOutcome::Busy;
            };
            let Some(form) = form.as_mut() else {
                return SubmitOutcome::NoForm;
            };
            if !form.validate() {
                debug!(property_id = self.property_id, "Review form has field errors");
                return SubmitOutcome::Invalid(form.errors().clone());
            }
            (guard, form.to_new_review(&self.author))
        };

        guard.advance(SubmissionPhase::Submitting);
        match self.service.create(&draft).await {
            Ok(review) => {
                info!(property_id = self.property_id, review_id = review.id, "Review submitted");
                self.notifier.success("Review submitted successfully!");
                *lock(&self.form) = None;
                // the create is acknowledged; refresh from the gateway
                self.load().await;
                SubmitOutcome::Submitted(review)
            }
            Err(e) => {
                let message = e.to_string();
                self.notifier.error(&message);
                SubmitOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::{Call, FakeGateway};
    use crate::gateway::{Envelope, Query, RecordGateway, RecordResult};
    use crate::services::notify::testing::RecordingNotifier;
    use crate::services::NoticeLevel;
    use crate::workflow::rating::Stars;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::sync::Notify;

    fn author() -> Author {
        Author {
            user_id: "u-9".to_string(),
            user_name: "Jo".to_string(),
            user_avatar: String::new(),
        }
    }

    fn review_record(id: i64, rating: i64) -> Value {
        json!({
            "Id": id,
            "property_id_c": 7,
            "rating_c": rating,
            "comment_c": "Bright rooms and friendly host",
            "date_c": "2024-07-01T08:00:00.000Z"
        })
    }

    fn section_with(gateway: Arc<dyn RecordGateway>) -> (Arc<ReviewsSection>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = Arc::new(ReviewService::new(gateway, notifier.clone()));
        let section = ReviewsSection::new(7, service, notifier.clone(), author());
        (Arc::new(section), notifier)
    }

    fn fill_valid(section: &ReviewsSection) {
        section.edit_form(|form| {
            form.select_rating(Stars::new(5).unwrap());
            form.set_comment("Bright rooms and friendly host");
        });
    }

    #[tokio::test]
    async fn test_submit_without_form() {
        let (section, _) = section_with(Arc::new(FakeGateway::new()));
        assert_eq!(section.submit().await, SubmitOutcome::NoForm);
        assert_eq!(section.phase(), SubmissionPhase::Idle);
    }

    #[tokio::test]
    async fn test_invalid_form_never_calls_gateway() {
        let gateway = Arc::new(FakeGateway::new());
        let (section, _) = section_with(gateway.clone());
        section.toggle_form();

        match section.submit().await {
            SubmitOutcome::Invalid(errors) => {
                assert!(errors.rating.is_some());
                assert!(errors.comment.is_some());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(gateway.call_count(), 0);
        assert_eq!(section.phase(), SubmissionPhase::Idle);
        assert!(section.is_form_open());
    }

    #[tokio::test]
    async fn test_success_refreshes_after_create() {
        let gateway = Arc::new(
            FakeGateway::new()
                .reply(Envelope::with_results(vec![RecordResult::ok(review_record(30, 5))]))
                .reply(Envelope::ok(json!([review_record(30, 5), review_record(12, 4)]))),
        );
        let (section, notifier) = section_with(gateway.clone());
        section.toggle_form();
        fill_valid(&section);

        match section.submit().await {
            SubmitOutcome::Submitted(review) => assert_eq!(review.id, 30),
            other => panic!("unexpected outcome {:?}", other),
        }

        let calls = gateway.calls();
        assert!(matches!(calls[0], Call::Create { .. }));
        assert!(matches!(calls[1], Call::Fetch { .. }));

        let summary = section.summary();
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.average_rating, 4.5);
        assert!(!section.is_form_open());
        assert_eq!(section.phase(), SubmissionPhase::Idle);
        assert_eq!(
            notifier.notices(),
            vec![(NoticeLevel::Success, "Review submitted successfully!".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_form_open() {
        let gateway = Arc::new(FakeGateway::new().reply(Envelope::failure("service unavailable")));
        let (section, notifier) = section_with(gateway.clone());
        section.toggle_form();
        fill_valid(&section);

        assert_eq!(
            section.submit().await,
            SubmitOutcome::Failed("service unavailable".to_string())
        );
        assert!(section.is_form_open());
        assert_eq!(gateway.call_count(), 1);
        assert!(notifier.errors().contains(&"service unavailable".to_string()));
        assert_eq!(section.phase(), SubmissionPhase::Idle);
    }

    /// Holds every create until released
    struct GatedGateway {
        inner: FakeGateway,
        release: Notify,
    }

    #[async_trait]
    impl RecordGateway for GatedGateway {
        async fn fetch_records(&self, table: &str, query: &Query) -> anyhow::Result<Envelope> {
            self.inner.fetch_records(table, query).await
        }

        async fn get_record_by_id(&self, table: &str, id: i64, fields: &[&str]) -> anyhow::Result<Envelope> {
            self.inner.get_record_by_id(table, id, fields).await
        }

        async fn create_record(&self, table: &str, records: Vec<Value>) -> anyhow::Result<Envelope> {
            self.release.notified().await;
            self.inner.create_record(table, records).await
        }

        async fn update_record(&self, table: &str, records: Vec<Value>) -> anyhow::Result<Envelope> {
            self.inner.update_record(table, records).await
        }

        async fn delete_record(&self, table: &str, ids: Vec<i64>) -> anyhow::Result<Envelope> {
            self.inner.delete_record(table, ids).await
        }
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_busy() {
        let gateway = Arc::new(GatedGateway {
            inner: FakeGateway::new()
                .reply(Envelope::with_results(vec![RecordResult::ok(review_record(31, 4))]))
                .reply(Envelope::ok(json!([review_record(31, 4)]))),
            release: Notify::new(),
        });
        let (section, _) = section_with(gateway.clone());
        section.toggle_form();
        fill_valid(&section);

        let in_flight = {
            let section = section.clone();
            tokio::spawn(async move { section.submit().await })
        };
        while section.phase() != SubmissionPhase::Submitting {
            tokio::task::yield_now().await;
        }

        assert_eq!(section.submit().await, SubmitOutcome::Busy);
        section.toggle_form();
        assert!(section.is_form_open());
        assert!(section
            .edit_form(|form| form.set_comment("Changed while sending"))
            .is_none());

        gateway.release.notify_one();
        let outcome = in_flight.await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
        assert_eq!(section.phase(), SubmissionPhase::Idle);
        assert_eq!(section.summary().total_count, 1);
    }
}
