//! Property-based tests for the IR model.
//!
//! Uses proptest to verify invariants across wide input spaces.

#[cfg(test)]
mod shape_props;
