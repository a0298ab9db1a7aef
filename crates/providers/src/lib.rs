//! Inference backend implementations for quill.
//!
//! All providers implement the `quill_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
