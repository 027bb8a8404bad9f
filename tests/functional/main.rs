//! Functional test suite

mod analyze_test;
