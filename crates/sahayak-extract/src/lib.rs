//! LLM field extraction via an Ollama chat endpoint.
//!
//! Implements the session engine's `Extractor` seam: natural-language
//! answers plus a window of conversation history go in, a candidate field
//! map comes out. Any failure degrades to "no new data".

pub mod ollama;

pub use ollama::{ExtractError, OllamaExtractor};
