//! Property-based tests for arrival-order independence

mod interleaving;
