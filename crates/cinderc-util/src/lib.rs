//! cinderc-util - Core Utilities and Foundation Types
//!
//! This crate provides the fundamental types shared by every phase of the
//! cinderc compiler: typed index vectors (the backbone of all arena-style
//! storage in the compiler) and the fatal error model.
//!
//! # Module Structure
//!
//! - [`index_vec`] - `Idx` trait, `IndexVec`, and the `define_idx!` macro
//! - [`fatal`] - unrecoverable error conditions and their `Result` alias
//!
//! # Design Principles
//!
//! 1. ZERO-COST ABSTRACTIONS
//!    Typed indices compile down to plain `u32` arithmetic; the index type
//!    exists only at compile time.
//!
//! 2. TYPE SAFETY
//!    Indices from different arenas cannot be mixed up: a `SymbolId` does
//!    not index a string arena, and the compiler enforces it.

pub mod fatal;
pub mod index_vec;

pub use fatal::{Fatal, FatalResult};
pub use index_vec::{Idx, IndexVec};
