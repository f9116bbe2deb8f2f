//! # dossier-server: authentication and request handling for Dossier
//!
//! This crate sits between a transport and the profile use cases. Each
//! request passes through the [`AuthenticationGate`], which turns an
//! optional bearer token into an optional [`Principal`](dossier_rbac::Principal),
//! and is then routed by the [`ProfileRequestHandler`] to the
//! [`ProfileAccessService`](dossier::ProfileAccessService), which decides
//! what the caller may do.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          dossier-server                          │
//! │  ┌──────────────┐   ┌──────────────────┐   ┌──────────────────┐  │
//! │  │ InboundReq   │ → │ AuthenticationGate│ → │ ProfileRequest-  │  │
//! │  │ (HTTP text)  │   │ verify + resolve  │   │ Handler (routes) │  │
//! │  └──────────────┘   └──────────────────┘   └────────┬─────────┘  │
//! │                                                     ↓            │
//! │                                      ProfileAccessService (RBAC) │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate never rejects a request. A missing, malformed, forged or
//! expired token leaves the caller anonymous, and routes that need a
//! principal answer 401.
//!
//! ## Usage
//!
//! ```ignore
//! use dossier_config::DossierConfig;
//! use dossier_server::ProfileRequestHandler;
//! use dossier_store::MemoryStore;
//! use std::sync::Arc;
//!
//! let config = DossierConfig::load()?;
//! let store = Arc::new(MemoryStore::new());
//! let handler = ProfileRequestHandler::from_config(&config, store.clone(), store)?;
//! let response = handler.handle_raw("GET /profiles/me HTTP/1.1\r\n\r\n");
//! ```

pub mod auth;
mod error;
pub mod gate;
mod handler;
pub mod http;
pub mod resolver;

pub use auth::{Claims, JwtConfig, TokenError, TokenVerifier};
pub use error::{ServerError, ServerResult};
pub use gate::{AnonymousReason, AuthenticationGate, BypassRules, GateOutcome};
pub use handler::ProfileRequestHandler;
pub use http::{HttpResponse, InboundRequest, Method};
pub use resolver::{PrincipalResolver, ResolveError};
