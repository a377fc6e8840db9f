//! Resume parsing: extraction, model call, and deterministic post-processing.

pub mod classify;
pub mod dates;
pub mod extractor;
pub mod handlers;
pub mod intervals;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;
pub mod sanitize;
pub mod status;
