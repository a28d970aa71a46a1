//! Speech capability seam (speech-to-text, text-to-speech, pronunciation
//! feedback).
//!
//! # Responsibility
//! - Define the provider contract the core consumes.
//! - Compose providers into an ordered fallback chain.
//!
//! # Invariants
//! - The core only ever sees transcript strings and audio references;
//!   provider wire formats stay inside adapter implementations.
//! - Fallback order is explicit registry state, never implied by provider
//!   behavior.

pub mod feedback;
pub mod provider;
pub mod registry;
