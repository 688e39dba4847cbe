//! Integration tests for circuit
//!
//! These tests drive a coach and one or more athletes through a real store.

#[path = "../common/mod.rs"]
pub mod common;

pub mod relay_flow;
pub mod replication_flow;
pub mod subscription_flow;
