//! Adapters for external capabilities behind the domain ports.

pub mod roles;
