//! Per-request authentication gate.
//!
//! The gate turns an inbound request into `Option<Principal>`. It never
//! rejects a request itself: a missing, non-bearer, invalid or expired
//! token, or a subject that does not resolve, all yield an anonymous
//! caller, and the permission checks downstream deny whatever needed a
//! principal.

use dossier_config::GateConfig;
use dossier_rbac::Principal;
use dossier_store::UserStore;
use tracing::{debug, warn};

use crate::auth::{TokenError, TokenVerifier};
use crate::http::{InboundRequest, Method};
use crate::resolver::{PrincipalResolver, ResolveError};

const BEARER_PREFIX: &str = "Bearer ";

/// Requests exempt from authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BypassRules {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl BypassRules {
    pub fn new(
        exact: impl IntoIterator<Item = impl Into<String>>,
        prefixes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            exact: exact.into_iter().map(Into::into).collect(),
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Login and registration paths plus documentation prefixes.
    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(
            [config.login_path.clone(), config.register_path.clone()],
            config.public_prefixes.clone(),
        )
    }

    /// Whether the request skips authentication entirely.
    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        *method == Method::Options
            || self.exact.iter().any(|p| p == path)
            || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

impl Default for BypassRules {
    fn default() -> Self {
        Self::from_config(&GateConfig::default())
    }
}

/// Why a request proceeds without a principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnonymousReason {
    /// Route is exempt from authentication.
    PublicRoute,
    MissingHeader,
    /// `Authorization` is present but not `Bearer <token>`.
    NotBearer,
    TokenRejected(TokenError),
    SubjectUnresolved(ResolveError),
}

/// Result of running the gate on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Authenticated(Principal),
    Anonymous(AnonymousReason),
}

impl GateOutcome {
    pub fn into_principal(self) -> Option<Principal> {
        match self {
            GateOutcome::Authenticated(principal) => Some(principal),
            GateOutcome::Anonymous(_) => None,
        }
    }
}

/// Authenticates requests: bypass check, token verification, principal
/// resolution.
pub struct AuthenticationGate<U> {
    verifier: TokenVerifier,
    resolver: PrincipalResolver<U>,
    bypass: BypassRules,
}

impl<U: UserStore> AuthenticationGate<U> {
    pub fn new(
        verifier: TokenVerifier,
        resolver: PrincipalResolver<U>,
        bypass: BypassRules,
    ) -> Self {
        Self {
            verifier,
            resolver,
            bypass,
        }
    }

    pub fn bypass(&self) -> &BypassRules {
        &self.bypass
    }

    /// Returns the request's principal, or `None` for an anonymous caller.
    pub fn authenticate(&self, request: &InboundRequest) -> Option<Principal> {
        self.evaluate(request).into_principal()
    }

    /// Runs the gate and reports why a request ended up anonymous.
    pub fn evaluate(&self, request: &InboundRequest) -> GateOutcome {
        let outcome = self.run(request);
        match &outcome {
            GateOutcome::Authenticated(principal) => {
                debug!(subject = %principal.subject_id(), "Request authenticated");
            }
            GateOutcome::Anonymous(AnonymousReason::PublicRoute) => {
                debug!(path = %request.path, "Public route; authentication skipped");
            }
            GateOutcome::Anonymous(
                reason @ (AnonymousReason::MissingHeader | AnonymousReason::NotBearer),
            ) => {
                debug!(?reason, "No bearer token; continuing anonymously");
            }
            GateOutcome::Anonymous(AnonymousReason::TokenRejected(err)) => {
                warn!(error = %err, "Bearer token rejected; continuing anonymously");
            }
            GateOutcome::Anonymous(AnonymousReason::SubjectUnresolved(err)) => {
                warn!(error = %err, "Token subject unresolved; continuing anonymously");
            }
        }
        outcome
    }

    fn run(&self, request: &InboundRequest) -> GateOutcome {
        if self.bypass.is_public(&request.method, &request.path) {
            return GateOutcome::Anonymous(AnonymousReason::PublicRoute);
        }

        let Some(header) = request.header("Authorization") else {
            return GateOutcome::Anonymous(AnonymousReason::MissingHeader);
        };
        let Some(token) = header.strip_prefix(BEARER_PREFIX) else {
            return GateOutcome::Anonymous(AnonymousReason::NotBearer);
        };

        let subject = match self.verifier.verify(token.trim()) {
            Ok(subject) => subject,
            Err(err) => return GateOutcome::Anonymous(AnonymousReason::TokenRejected(err)),
        };

        match self.resolver.resolve(&subject) {
            Ok(principal) => GateOutcome::Authenticated(principal),
            Err(err) => GateOutcome::Anonymous(AnonymousReason::SubjectUnresolved(err)),
        }
    }
}
