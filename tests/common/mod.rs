//! This module contains common utilities for simplifying the writing of
//! integration tests for this library.

#![cfg(test)]

use concolic_tracer::{solver::Solver, tracer::Tracer, value::SharedRead};

/// Renders the constraints recorded by `tracer` into a string, one guard
/// per line in the canonical printer format.
#[allow(unused)] // It is actually
pub fn rendered_constraints(tracer: &Tracer) -> String {
    let mut rendered = String::new();
    tracer
        .write_path_constraints(&mut rendered)
        .expect("Writing into a string cannot fail");

    rendered
}

/// Asserts every read in `reads` into `solver`, in order.
#[allow(unused)] // It is actually
pub fn assert_reads(
    solver: &mut impl Solver,
    reads: impl IntoIterator<Item = SharedRead>,
) -> anyhow::Result<()> {
    for read in reads {
        let term = solver.term_of(&read)?;
        solver.add(term)?;
    }

    Ok(())
}
