//! Market classification for the CrowdEdge agent
//!
//! An OpenAI-compatible chat model (Groq by default) reads one market at a
//! time and answers with a JSON trading signal. The answer is untrusted:
//! [`SignalValidator`] turns it into a [`edge_core::ValidatedSignal`] or
//! rejects it with an [`InvalidSignal`] reason.

pub mod classifier;
pub mod openai;
pub mod prompt;
pub mod validate;

pub use classifier::Classifier;
pub use openai::LlmClassifier;
pub use validate::{InvalidSignal, RawSignal, SchemaVersion, SignalValidator};
