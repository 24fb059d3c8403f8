//! Behavioural tests for the helper client.

mod support;
