//! Per-question state machine and the append-only conversation log.
//!
//! A turn moves `Pending → Retrieving → Composing → Answered | Failed`.
//! Retrieval may also go straight to `Failed`. Terminal turns are never
//! revisited; each new question appends a fresh turn.

use tracing::{info, warn};

use docqa_core::error::Result;
use docqa_core::types::RetrievedChunk;

use crate::composer::{AnswerComposer, Composition, Outcome, FALLBACK_ANSWER};
use crate::retriever::Retriever;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Pending,
    Retrieving,
    Composing,
    Answered,
    Failed,
}

impl TurnState {
    pub fn is_terminal(self) -> bool { matches!(self, TurnState::Answered | TurnState::Failed) }

    pub fn can_advance_to(self, next: TurnState) -> bool {
        use TurnState::*;
        matches!(
            (self, next),
            (Pending, Retrieving) | (Retrieving, Composing) | (Retrieving, Failed) | (Composing, Answered) | (Composing, Failed)
        )
    }
}

#[derive(Debug, Clone)]
pub struct ConversationTurn {
    question: String,
    state: TurnState,
    context: Vec<RetrievedChunk>,
    answer: Option<String>,
}

impl ConversationTurn {
    fn new(question: &str) -> Self {
        Self { question: question.to_string(), state: TurnState::Pending, context: Vec::new(), answer: None }
    }

    pub fn question(&self) -> &str { &self.question }
    pub fn state(&self) -> TurnState { self.state }
    pub fn context(&self) -> &[RetrievedChunk] { &self.context }
    pub fn answer(&self) -> Option<&str> { self.answer.as_deref() }

    fn advance(&mut self, next: TurnState) {
        debug_assert!(self.state.can_advance_to(next), "illegal transition {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn finish(&mut self, composition: Composition) {
        self.advance(match composition.outcome {
            Outcome::Answered => TurnState::Answered,
            Outcome::Failed => TurnState::Failed,
        });
        self.answer = Some(composition.answer);
    }
}

#[derive(Debug, Default)]
pub struct Session {
    turns: Vec<ConversationTurn>,
}

impl Session {
    pub fn new() -> Self { Self::default() }

    pub fn turns(&self) -> &[ConversationTurn] { &self.turns }
    pub fn len(&self) -> usize { self.turns.len() }
    pub fn is_empty(&self) -> bool { self.turns.is_empty() }

    /// Run one question through retrieval and composition.
    ///
    /// Query-encoding failures end the turn as `Failed` with the fallback
    /// answer. Structural errors (dimension mismatch, broken store) mark the
    /// turn `Failed` and are returned to the caller.
    pub async fn ask(
        &mut self,
        question: &str,
        retriever: &Retriever,
        composer: &AnswerComposer,
    ) -> Result<&ConversationTurn> {
        let mut turn = ConversationTurn::new(question);
        turn.advance(TurnState::Retrieving);

        match retriever.retrieve_hits(question, retriever.top_k()) {
            Ok(hits) => {
                if hits.is_empty() {
                    info!("no grounding context for question");
                }
                turn.context = hits;
                turn.advance(TurnState::Composing);
                let texts: Vec<String> = turn.context.iter().map(|h| h.chunk.text.clone()).collect();
                let composition = composer.compose(question, &texts).await;
                turn.finish(composition);
            }
            Err(e) if e.is_fatal() => {
                turn.advance(TurnState::Failed);
                turn.answer = Some(FALLBACK_ANSWER.to_string());
                self.turns.push(turn);
                return Err(e);
            }
            Err(e) => {
                warn!(error = %e, "retrieval failed");
                turn.advance(TurnState::Failed);
                turn.answer = Some(FALLBACK_ANSWER.to_string());
            }
        }

        self.turns.push(turn);
        let last = self.turns.len() - 1;
        Ok(&self.turns[last])
    }
}

#[cfg(test)]
mod tests {
    use super::TurnState::*;

    #[test]
    fn transitions() {
        assert!(Pending.can_advance_to(Retrieving));
        assert!(Retrieving.can_advance_to(Failed));
        assert!(Composing.can_advance_to(Answered));
        assert!(!Pending.can_advance_to(Composing));
        assert!(!Answered.can_advance_to(Retrieving));
        assert!(!Failed.can_advance_to(Pending));
        assert!(Answered.is_terminal() && Failed.is_terminal());
        assert!(!Composing.is_terminal());
    }
}
