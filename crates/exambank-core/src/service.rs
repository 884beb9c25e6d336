//! Service facade over composition, grading, and scoring.
//!
//! Every entry point verifies the caller first and fails closed: an identity
//! failure returns before the store is touched.

use std::sync::Arc;

use rand::Rng;

use crate::composer::{ComposedExam, Composer, ExamRequest};
use crate::error::ExamError;
use crate::grading::{grade, AnswerSubmission, GradedSubmission};
use crate::model::{AttemptMode, ExamAttempt, ExamMode, ExamType, Question};
use crate::scoring::{proficiency, ScoringConfig};
use crate::store::QuestionStore;
use crate::traits::{Caller, IdentityProvider};

pub struct ExamService {
    store: Arc<dyn QuestionStore>,
    composer: Composer,
    identity: Arc<dyn IdentityProvider>,
    scoring: ScoringConfig,
}

impl ExamService {
    pub fn new(
        store: Arc<dyn QuestionStore>,
        authored_closed: Vec<Question>,
        identity: Arc<dyn IdentityProvider>,
        scoring: ScoringConfig,
    ) -> Self {
        let composer = Composer::new(Arc::clone(&store), authored_closed);
        Self {
            store,
            composer,
            identity,
            scoring,
        }
    }

    fn verify(&self, token: &str) -> Result<Caller, ExamError> {
        let caller = self.identity.verify(token)?;
        tracing::debug!(caller_id = caller.id, "caller verified");
        Ok(caller)
    }

    /// Compose an exam for a verified caller.
    pub fn compose_exam<R: Rng>(
        &self,
        token: &str,
        request: &ExamRequest,
        rng: &mut R,
    ) -> Result<ComposedExam, ExamError> {
        self.verify(token)?;
        self.composer.compose(request, rng)
    }

    /// Grade a submission for a verified caller.
    pub fn grade_submission(
        &self,
        token: &str,
        answers: &[AnswerSubmission],
        mode: ExamMode,
        attempt_mode: AttemptMode,
    ) -> Result<GradedSubmission, ExamError> {
        self.verify(token)?;
        grade(answers, self.store.as_ref(), mode, attempt_mode, &self.scoring)
    }

    /// Recency-weighted proficiency over a caller's attempt history.
    pub fn proficiency(
        &self,
        token: &str,
        attempts: &[ExamAttempt],
        exam_type: ExamType,
    ) -> Result<Option<f64>, ExamError> {
        self.verify(token)?;
        Ok(proficiency(attempts, exam_type, &self.scoring))
    }
}
