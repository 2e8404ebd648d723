//! Process module tests.

mod child_test;
