//! # Service Container
//!
//! Holds the gateway's long-lived services and hands out event handlers.
//!
//! - Configuration is validated before anything is built
//! - Credentials are loaded once at startup
//! - Statistics are shared by the validator and every worker

pub mod config;
pub mod services;

pub use config::{ConfigError, GatewayConfig, IngressConfig, RetryConfig};
pub use services::{ContainerError, GatewayContainer, GatewayValidator};
