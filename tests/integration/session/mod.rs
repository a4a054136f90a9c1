//! Integration tests for session functionality
//!
//! These tests validate that EncodeSession and EncodeSessionBuilder drive
//! sources, codecs and the container writer correctly.

mod test_encode_session;
mod test_graceful_shutdown;
