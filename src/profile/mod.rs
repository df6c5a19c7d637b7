// src/profile/mod.rs

//! Compiling export profiles into executable rules.
//!
//! - `filter`: source predicate (scope, extensions, built-in and user filters).
//! - `size`: size rules folded into a [`SizeAdjustment`].
//! - `compiled`: [`RuntimeExportProfile`] and the swappable [`RuleSet`].

pub mod compiled;
pub mod filter;
pub mod size;

pub use compiled::{RuleSet, RuntimeExportProfile, known_extensions};
pub use filter::{CompiledFilter, KnownExtensions, SourcePredicate, compile_source_predicate};
pub use size::{Size, SizeAdjustment, SizeStep, SizeTransform};
