//! This library implements concolic tracing for host Rust programs: the
//! host runs concretely, and every value, branch decision and memory access
//! it routes through the library is recorded symbolically so that the
//! feasibility of _other_ paths can be asked about afterwards. It is a
//! _record-and-query_ library.
//!
//! Note that this library is not a symbolic-execution engine in its own
//! right; the host program supplies the execution, and the library supplies
//! the record of it.
//!
//! # How it Works
//!
//! From a very high level, a tracing run proceeds as follows:
//!
//! 1. The host allocates its interesting values through a
//!    [`tracer::Tracer`], receiving typed [`value::sym::Sym`] handles.
//!    Arithmetic on the handles computes concretely while growing a
//!    [`value::ReadInstruction`] graph that records how each result was
//!    read.
//! 2. At each conditional the host consults [`tracer::Tracer::branch`],
//!    which records the guard in the form the execution took it and hands
//!    back the concrete decision for the host's own `if`. Loops run under an
//!    [`unwind::Unwinder`], which bounds them and folds their effects into
//!    per-variable summaries.
//! 3. Reads and writes of traced memory go through
//!    [`tracer::Tracer::read_from`] and [`tracer::Tracer::write_to`]
//!    against [`memory::Address`] may-alias sets, filing [`event::Event`]s
//!    into the pointer-indexed [`event::EventRelation`].
//! 4. The recorded guards can be rendered as text, packaged into a
//!    serialisable [`report::TraceReport`], or asserted into a
//!    [`solver::Solver`] to ask whether a different path through the same
//!    program is feasible. The bundled back-end is
//!    [`solver::ground::GroundSolver`].
//!
//! # Basic Usage
//!
//! For the most basic usage of the library, it is sufficient to construct a
//! `Tracer`, route a branch through it, and hand the flipped guard to a
//! solver.
//!
//! ```
//! use concolic_tracer::{
//!     solver::{ground::GroundSolver, Satisfiability, Solver},
//!     tracer::Tracer,
//!     value::sym::Sym,
//! };
//!
//! let mut tracer = Tracer::default();
//! let x = tracer.fresh_symbolic(3);
//!
//! // Host control flow runs concretely; the tracer records the guard in
//! // the form the execution took it.
//! if tracer.branch(&x.sym().lt(&Sym::from(8))) {
//!     // The traced program's then-arm would run here.
//! }
//!
//! let mut rendered = String::new();
//! tracer.write_path_constraints(&mut rendered).unwrap();
//! assert_eq!(rendered, "([Var_0:3]<8)\n");
//!
//! // Ask whether the untaken side of the branch is reachable.
//! let mut solver = GroundSolver::default();
//! let flipped = !x.sym().lt(&Sym::from(8));
//! let term = solver.term_of(flipped.read()).unwrap();
//! solver.add(term).unwrap();
//! assert_eq!(solver.check(), Satisfiability::Sat);
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod constant;
pub mod data;
pub mod error;
pub mod eval;
pub mod event;
pub mod memory;
pub mod path;
pub mod registry;
pub mod report;
pub mod solver;
pub mod tracer;
pub mod unwind;
pub mod value;

// Re-exports to provide the library interface.
pub use report::TraceReport;
pub use tracer::{reset_tracer, with_tracer, Tracer};
