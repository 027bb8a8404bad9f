//! Unit test suite
