//! Crate root: public surface, core aliases, and translation-unit-wide
//! invariants.
//!
//! This module is the **single canonical entry-point** for downstream users of
//! the library. It centralizes the shared error aggregate, the small index
//! newtypes, and re-exports the submodules that implement the dependence
//! analysis and unimodular-transformation pipeline described by the design
//! document.
//!
//! ## Invariants
//!
//! - **Exact arithmetic.** Every decision that affects whether a nest is
//!   parallelizable is made with arbitrary-precision integers
//!   ([`num_bigint::BigInt`]) or normalized exact rationals
//!   ([`rational::Rational`]). Floating point appears nowhere in this crate
//!   except inside the rewriter's emitted `ceil`/`floor` literal expressions,
//!   which are text for the downstream pretty-printer, not values this crate
//!   computes with.
//! - **Single-threaded, synchronous.** Every analysis entry point returns
//!   synchronously with either a finished artifact or a typed error. There
//!   are no suspension points and no shared mutable state between function
//!   analyses (see [`driver`]).
//! - **Source order.** Nests are processed, and diagnostics are emitted, in
//!   the order outermost `for` loops are encountered during traversal.
//!
//! These invariants are enforced by construction across the submodules; a
//! violation is either a typed [`diagnostics::AnalysisError`] (recoverable,
//! per-nest) or a panic (a numeric-kernel shape invariant, treated as a
//! program bug per the error-handling design).

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

/// Exact rational arithmetic (normalized numerator/denominator pairs).
pub mod rational;
/// Exact-integer and exact-rational dense matrices; Hermite/Smith reductions.
pub mod matrix;
/// Integer solutions of linear Diophantine equations and systems.
pub mod diophantine;
/// Fourier–Motzkin elimination: real feasibility, bound extraction, integer enumeration.
pub mod fourier_motzkin;
/// Source AST provider traits — the consumed boundary (§6, external interfaces).
pub mod ast;
/// Affine intermediate representation: linear forms, subscripts, loop headers, perfect nests.
pub mod affine_ir;
/// Front-end lowering: scope tree, array-like identifiers, candidate-nest collector.
pub mod frontend;
/// Converts affine IR into integer matrix/vector form for the analyzer.
pub mod dependence_model;
/// General and uniform dependence tests; produces dependence records.
pub mod dependence;
/// Chooses and realizes a unimodular transformation (outer-par / inner-par / none).
pub mod planner;
/// Substitutes new index variables and rewrites bounds after transformation.
pub mod rewriter;
/// Emits the device-invocation block and kernel body shape.
pub mod codegen;
/// Crate-wide error taxonomy and the `"<file>(<line>): info: <message>"` diagnostic format.
pub mod diagnostics;
/// Per-translation-unit orchestration: walks functions, drives each nest through the pipeline.
pub mod driver;

pub use diagnostics::AnalysisError;
pub use driver::{AnalysisConfig, Driver};

/// Index of a loop nesting level `0..depth-1`, outermost first.
///
/// Centralized here (rather than duplicated per module) so call sites agree
/// on what "level" means; re-exported from [`affine_ir`] to avoid two
/// definitions.
pub use affine_ir::LoopLevel;
