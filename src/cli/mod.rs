//! The calculator front-end: a thin consumer of [`crate::Coordinator`], kept
//! deliberately minimal since the operator-overloaded value wrapper itself is
//! out of scope (see SPEC_FULL.md §1).

pub mod repl;
