//! Diagnosis session engine — the intake/clarification/estimation state
//! machine.
//!
//! Sessions are independent: each lives behind its own `Mutex`, so one
//! conversation's messages process strictly in arrival order while
//! unrelated sessions advance concurrently. The engine owns no resource
//! locks; abandoning a session mid-clarification is free.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use sb_catalog::CatalogSnapshot;
use sb_domain::{
    DiagnosisSession, RankedProblem, SessionStage, TranscriptEntry, TranscriptRole, VehicleMeta,
};

use crate::clarify::{QuestionGenerator, TemplateQuestionGenerator};
use crate::error::{EngineError, EngineResult};
use crate::matcher::ProblemMatcher;

/// Tunables for the clarification loop.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Size of the finalized shortlist.
    pub top_n: usize,
    /// Wider working set kept during clarification.
    pub working_set: usize,
    /// Maximum clarifying questions per session (K).
    pub max_questions: u8,
    /// The top-N must be identical across this many consecutive turns to
    /// count as converged.
    pub stable_turns: u8,
    /// How many candidates the question generator sees.
    pub question_context: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            working_set: 10,
            max_questions: 3,
            stable_turns: 2,
            question_context: 5,
        }
    }
}

/// What a session turn produced.
#[derive(Debug, Clone)]
pub enum SessionReply {
    /// Ask the customer one more clarifying question.
    Question {
        text: String,
        number: u8,
        total: u8,
    },
    /// The shortlist is finalized; hand it to the estimate aggregator.
    Finalized { problems: Vec<RankedProblem> },
    /// Intake could not identify anything; the customer should retry with
    /// more detail (fresh intake — this session is terminal).
    Failed { message: String },
}

/// Owns all live diagnosis sessions and advances them.
pub struct SessionEngine {
    matcher: Arc<dyn ProblemMatcher>,
    questions: Arc<dyn QuestionGenerator>,
    fallback: TemplateQuestionGenerator,
    config: SessionConfig,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<DiagnosisSession>>>>,
}

impl SessionEngine {
    pub fn new(
        matcher: Arc<dyn ProblemMatcher>,
        questions: Arc<dyn QuestionGenerator>,
        config: SessionConfig,
    ) -> Self {
        Self {
            matcher,
            questions,
            fallback: TemplateQuestionGenerator,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session from the first normalized customer message.
    pub async fn start(
        &self,
        customer_id: &str,
        vehicle: VehicleMeta,
        text: &str,
        snapshot: &CatalogSnapshot,
    ) -> (Uuid, SessionReply) {
        let mut session = DiagnosisSession::new(customer_id, vehicle);
        session.transcript.push(TranscriptEntry::customer(text));

        let reply = match self.matcher.rank(text, &session.vehicle, snapshot) {
            Err(EngineError::NoCandidatesFound) => {
                session.stage = SessionStage::Error;
                tracing::info!(session_id = %session.session_id, "intake found no candidates");
                SessionReply::Failed {
                    message: "Could not identify any potential problems. \
                              Please describe the symptoms in more detail."
                        .into(),
                }
            }
            Ok(ranked) => {
                session.candidates = ranked
                    .into_iter()
                    .take(self.config.working_set)
                    .collect();
                session.previous_top = Some(session.top_ids(self.config.top_n));
                session.stable_turns = 1;

                if session.stable_turns >= self.config.stable_turns
                    || self.config.max_questions == 0
                {
                    self.finalize(&mut session)
                } else {
                    self.ask(&mut session).await
                }
            }
            Err(err) => {
                session.stage = SessionStage::Error;
                tracing::error!(session_id = %session.session_id, error = %err, "intake failed");
                SessionReply::Failed {
                    message: "Diagnosis is temporarily unavailable. Please try again.".into(),
                }
            }
        };

        let session_id = session.session_id;
        tracing::info!(
            session_id = %session_id,
            stage = ?session.stage,
            candidates = session.candidates.len(),
            "session started"
        );
        self.sessions
            .write()
            .await
            .insert(session_id, Arc::new(Mutex::new(session)));
        (session_id, reply)
    }

    /// Advance a session with one clarification answer.
    pub async fn advance(
        &self,
        session_id: Uuid,
        answer: &str,
        snapshot: &CatalogSnapshot,
    ) -> EngineResult<SessionReply> {
        let handle = self.handle(session_id).await?;
        // One lock per session: messages process strictly in arrival order.
        let mut session = handle.lock().await;

        if session.stage.is_terminal() {
            return Err(EngineError::InvalidTransition {
                detail: format!(
                    "session is terminal at stage '{:?}'; start a fresh intake",
                    session.stage
                ),
            });
        }
        if session.stage != SessionStage::Clarification {
            return Err(EngineError::InvalidTransition {
                detail: "session has no pending question".into(),
            });
        }

        session.transcript.push(TranscriptEntry::customer(answer));
        self.rescore(&mut session, snapshot);

        let top = session.top_ids(self.config.top_n);
        if session.previous_top.as_deref() == Some(top.as_slice()) {
            session.stable_turns += 1;
        } else {
            session.stable_turns = 1;
        }
        session.previous_top = Some(top);

        let converged = session.stable_turns >= self.config.stable_turns;
        let exhausted = session.questions_asked >= self.config.max_questions;
        let reply = if converged || exhausted {
            tracing::info!(
                session_id = %session_id,
                converged,
                questions = session.questions_asked,
                "clarification finished"
            );
            self.finalize(&mut session)
        } else {
            self.ask(&mut session).await
        };
        Ok(reply)
    }

    /// One-shot ranking against the catalog, without session state.
    pub fn match_only(
        &self,
        text: &str,
        vehicle: &VehicleMeta,
        snapshot: &CatalogSnapshot,
    ) -> EngineResult<Vec<RankedProblem>> {
        self.matcher.rank(text, vehicle, snapshot)
    }

    /// A point-in-time copy of a session, for read-only views.
    pub async fn get(&self, session_id: Uuid) -> EngineResult<DiagnosisSession> {
        let handle = self.handle(session_id).await?;
        let session = handle.lock().await;
        Ok(session.clone())
    }

    /// The finalized shortlist of a session at `Estimation`.
    pub async fn finalized_problems(&self, session_id: Uuid) -> EngineResult<Vec<RankedProblem>> {
        let handle = self.handle(session_id).await?;
        let session = handle.lock().await;
        if session.stage != SessionStage::Estimation {
            return Err(EngineError::InvalidTransition {
                detail: format!(
                    "session is at stage '{:?}', not ready for estimation",
                    session.stage
                ),
            });
        }
        Ok(session.candidates.clone())
    }

    async fn handle(&self, session_id: Uuid) -> EngineResult<Arc<Mutex<DiagnosisSession>>> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(EngineError::SessionNotFound(session_id))
    }

    /// Re-rank the working candidate set against the full customer
    /// transcript. Candidates the re-score no longer surfaces keep their
    /// previous relative order at the tail.
    fn rescore(&self, session: &mut DiagnosisSession, snapshot: &CatalogSnapshot) {
        let combined: Vec<&str> = session
            .transcript
            .iter()
            .filter(|e| e.role == TranscriptRole::Customer)
            .map(|e| e.text.as_str())
            .collect();
        let combined = combined.join(" ");

        let Ok(ranked) = self.matcher.rank(&combined, &session.vehicle, snapshot) else {
            // The answer added nothing matchable; keep the current ranking.
            return;
        };

        let working: Vec<String> = session
            .candidates
            .iter()
            .map(|c| c.problem_id.clone())
            .collect();
        let mut next: Vec<RankedProblem> = ranked
            .into_iter()
            .filter(|r| working.contains(&r.problem_id))
            .collect();
        for old in &session.candidates {
            if !next.iter().any(|n| n.problem_id == old.problem_id) {
                next.push(old.clone());
            }
        }
        session.candidates = next;
    }

    async fn ask(&self, session: &mut DiagnosisSession) -> SessionReply {
        let number = session.questions_asked + 1;
        let context = &session.candidates
            [..session.candidates.len().min(self.config.question_context)];

        let text = match self
            .questions
            .generate(context, &session.transcript, number)
            .await
        {
            Some(q) => q,
            None => self
                .fallback
                .generate(context, &session.transcript, number)
                .await
                .unwrap_or_else(|| "Please describe the symptoms in more detail.".into()),
        };

        session.transcript.push(TranscriptEntry::assistant(&text));
        session.questions_asked = number;
        session.stage = SessionStage::Clarification;

        SessionReply::Question {
            text,
            number,
            total: self.config.max_questions,
        }
    }

    fn finalize(&self, session: &mut DiagnosisSession) -> SessionReply {
        session.candidates.truncate(self.config.top_n);
        session.stage = SessionStage::Estimation;
        SessionReply::Finalized {
            problems: session.candidates.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_catalog::sample;

    use crate::matcher::LexicalMatcher;

    fn vehicle() -> VehicleMeta {
        VehicleMeta {
            vehicle_id: "VEH_0001_1".into(),
            model: "Model A".into(),
            age_months: 12,
        }
    }

    fn engine() -> SessionEngine {
        SessionEngine::new(
            Arc::new(LexicalMatcher::default()),
            Arc::new(TemplateQuestionGenerator),
            SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn intake_asks_a_question() {
        let snapshot = sample::catalog();
        let (session_id, reply) = engine()
            .start("CUST_0001", vehicle(), "grinding noise when braking", &snapshot)
            .await;
        match reply {
            SessionReply::Question { number, total, .. } => {
                assert_eq!(number, 1);
                assert_eq!(total, 3);
            }
            other => panic!("expected a question, got {other:?}"),
        }
        assert!(!session_id.is_nil());
    }

    #[tokio::test]
    async fn intake_with_gibberish_fails_recoverably() {
        let snapshot = sample::catalog();
        let sessions = engine();
        let (session_id, reply) = sessions
            .start("CUST_0001", vehicle(), "zzz qqq xyzzy", &snapshot)
            .await;
        assert!(matches!(reply, SessionReply::Failed { .. }));

        let session = sessions.get(session_id).await.unwrap();
        assert_eq!(session.stage, SessionStage::Error);

        // Error is terminal; answers are rejected, a fresh intake works.
        let err = sessions.advance(session_id, "still broken", &snapshot).await;
        assert!(matches!(err, Err(EngineError::InvalidTransition { .. })));
        let (_, retry) = sessions
            .start("CUST_0001", vehicle(), "brake noise", &snapshot)
            .await;
        assert!(!matches!(retry, SessionReply::Failed { .. }));
    }

    #[tokio::test]
    async fn stable_answers_converge_to_estimation() {
        let snapshot = sample::catalog();
        let sessions = engine();
        let (session_id, _) = sessions
            .start("CUST_0001", vehicle(), "grinding noise when braking", &snapshot)
            .await;

        // An answer that reinforces the same problems keeps the top-3
        // stable, which converges after the second consecutive stable turn.
        let reply = sessions
            .advance(session_id, "grinding noise while braking at low speed", &snapshot)
            .await
            .unwrap();
        let reply = match reply {
            SessionReply::Finalized { problems } => {
                assert!(problems.len() <= 3);
                return;
            }
            other => other,
        };
        assert!(matches!(reply, SessionReply::Question { .. }));

        let reply = sessions
            .advance(session_id, "still the same grinding when braking", &snapshot)
            .await
            .unwrap();
        match reply {
            SessionReply::Finalized { problems } => {
                assert!(!problems.is_empty());
                assert!(problems.len() <= 3);
                assert_eq!(problems[0].problem_id, "SP001");
            }
            other => panic!("expected finalization, got {other:?}"),
        }

        let session = sessions.get(session_id).await.unwrap();
        assert_eq!(session.stage, SessionStage::Estimation);
    }

    #[tokio::test]
    async fn question_budget_forces_finalization() {
        let snapshot = sample::catalog();
        let sessions = engine();
        let (session_id, _) = sessions
            .start("CUST_0001", vehicle(), "noise from the car", &snapshot)
            .await;

        // Contradictory answers keep reshuffling the ranking; after K
        // questions the session must finalize anyway.
        let answers = [
            "vibration when braking at highway speed",
            "slow cranking and dim headlights in the morning",
            "burning smell and revs climbing",
            "knocking over bumps",
        ];
        let mut finalized = false;
        for answer in answers {
            match sessions.advance(session_id, answer, &snapshot).await {
                Ok(SessionReply::Finalized { problems }) => {
                    assert!(!problems.is_empty());
                    finalized = true;
                    break;
                }
                Ok(SessionReply::Question { number, .. }) => assert!(number <= 3),
                Ok(SessionReply::Failed { .. }) => panic!("unexpected failure"),
                Err(EngineError::InvalidTransition { .. }) => break,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert!(finalized);

        let session = sessions.get(session_id).await.unwrap();
        assert!(session.questions_asked <= 3);
    }

    #[tokio::test]
    async fn finalized_problems_requires_estimation_stage() {
        let snapshot = sample::catalog();
        let sessions = engine();
        let (session_id, _) = sessions
            .start("CUST_0001", vehicle(), "grinding noise when braking", &snapshot)
            .await;

        // Still in clarification.
        let err = sessions.finalized_problems(session_id).await;
        assert!(matches!(err, Err(EngineError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let snapshot = sample::catalog();
        let sessions = engine();
        let err = sessions.advance(Uuid::now_v7(), "answer", &snapshot).await;
        assert!(matches!(err, Err(EngineError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn concurrent_sessions_do_not_interfere() {
        let snapshot = sample::catalog();
        let sessions = Arc::new(engine());

        let mut ids = Vec::new();
        for i in 0..4 {
            let (session_id, _) = sessions
                .start(
                    &format!("CUST_{i:04}"),
                    vehicle(),
                    "grinding noise when braking",
                    &snapshot,
                )
                .await;
            ids.push(session_id);
        }

        let mut handles = Vec::new();
        for session_id in ids.clone() {
            let sessions = sessions.clone();
            let snapshot = snapshot.clone();
            handles.push(tokio::spawn(async move {
                sessions
                    .advance(session_id, "grinding when braking slowly", &snapshot)
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        // Every session advanced independently.
        for session_id in ids {
            let session = sessions.get(session_id).await.unwrap();
            assert!(session.questions_asked >= 1);
        }
    }
}
