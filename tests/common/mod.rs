//! Common utilities for integration tests

pub mod test_helpers;

pub use test_helpers::{assert_vectors_close, relative_error, uniform_string};
