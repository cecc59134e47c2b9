//! docqa-answer
//!
//! Query-time components: the `Retriever` over a loaded corpus, the
//! `AnswerComposer` that prompts an external `Generator`, and the `Session`
//! that drives one question at a time through both.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod composer;
pub mod generator;
pub mod retriever;
pub mod session;

pub use composer::{build_prompt, AnswerComposer, ComposerConfig, Composition, Outcome, FALLBACK_ANSWER, SYSTEM_PROMPT};
pub use generator::{GenerationError, GenerationRequest, Generator, InferenceClient};
pub use retriever::Retriever;
pub use session::{ConversationTurn, Session, TurnState};
