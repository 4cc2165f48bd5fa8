//! Versioned action dispatch.
//!
//! The registry maps action names to handlers, optionally tagged with
//! `(min_version, alias)` pairs so an action can be renamed without
//! breaking clients that speak an older protocol version. The
//! dispatcher resolves one request envelope against the registry,
//! invokes the matched handler, and shapes the reply envelope.

pub mod dispatch;
pub mod registry;
pub mod service;

pub use dispatch::Dispatcher;
pub use registry::{ensure_no_params, from_params, Params, Registry, RegistryBuilder};
pub use service::ApiService;

/// Version of the action protocol spoken by this endpoint.
pub const API_VERSION: u32 = 6;
