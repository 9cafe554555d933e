//! Cartesian genetic programming expressions.
//!
//! An expression is a fixed grid of nodes (`rows` x `columns`), each
//! computing one kernel over `arity` connections into earlier columns or
//! the program inputs. The whole program is encoded as a flat chromosome
//! of unsigned genes:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ node 0        node 1        ...   outputs    │
//! │ [f c1..ca]    [f c1..ca]    ...   [o1..om]   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Every gene has structural lower/upper bounds derived from the grid
//! shape and the levels-back constraint; a chromosome is valid iff every
//! gene is within its bounds. Only the nodes reachable from the output
//! genes (the active nodes) participate in evaluation.

mod eval;
mod loss;
mod mutation;
mod persistence;
mod program;

pub use persistence::{load_expression, save_expression};
pub use program::{Expression, ExpressionError};
