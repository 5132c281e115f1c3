//! # Ports Layer
//!
//! - `inbound`: the validation API offered to the transport
//! - `outbound`: credential store, clock and observer the pipeline depends on

pub mod inbound;
pub mod outbound;
