//! Watcher module tests.

mod scenario_test;
