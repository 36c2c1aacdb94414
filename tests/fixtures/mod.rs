//! Test Fixtures Module
//!
//! Programmatically generated audio and session settings shared by the
//! integration tests.

// Not every test binary uses every fixture
#![allow(dead_code)]

pub mod audio_fixtures;

pub use audio_fixtures::*;
