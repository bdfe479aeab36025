//! Offline simulator: drives a full-screen navigation session against the mock
//! engine and replays the route as if the device were driving it.

pub mod config;
pub mod scenario;
