//! WebSocket sessions against the classification service.
//!
//! `protocol` defines the wire types, `classify` drives a one-shot
//! classification request through its state machine, and `status` follows
//! the admin job-queue feed with an injected reconnect policy.

pub mod classify;
pub mod protocol;
pub mod reconnect;
pub mod status;
