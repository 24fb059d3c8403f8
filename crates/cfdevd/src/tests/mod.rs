//! Test suites for the privileged helper.

mod support;
