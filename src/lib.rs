// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Cgp: Cartesian genetic programming expressions for embedding hosts.
//!
//! This crate provides a CGP expression engine designed for:
//! - Deterministic, seed-reproducible program construction
//! - Numeric and symbolic evaluation of the same chromosome
//! - A flat, C-callable surface for WASM/JS and native hosts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │      C ABI boundary (ffi)           │
//! ├─────────────────────────────────────┤
//! │  Fitting (algorithms)               │
//! ├─────────────────────────────────────┤
//! │  Expression engine (expression)     │
//! ├─────────────────────────────────────┤
//! │  Kernel basis (kernel)              │
//! └─────────────────────────────────────┘
//! ```

pub mod algorithms;
pub mod expression;
pub mod ffi;
pub mod kernel;

// Re-export key types at crate root for convenience
pub use expression::{Expression, ExpressionError};
pub use kernel::{Kernel, KernelError, KernelSet};
