//! Shared fixtures for client tests.

mod fake_helper;

pub use fake_helper::{Exchange, FakeHelper, Script};
