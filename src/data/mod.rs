//! This module contains custom data structures used in the implementation of
//! the tracer.

pub mod combine;
pub mod vector_map;
