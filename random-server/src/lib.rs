//! Random service front end: configuration, a service facade over
//! `random-core`, plain-text HTTP routes and a JSON-RPC binding.

pub mod config;
pub mod http;
pub mod rpc;
pub mod service;
