//! Request handler that routes profile requests to the access service.

use dossier::{PageLimits, ProfileAccessService, SearchCriteria};
use dossier_config::DossierConfig;
use dossier_rbac::Principal;
use dossier_store::{PageRequest, ProfileStore, SortOrder, UserStore};
use dossier_types::{NewProfile, ProfileId, ProfilePatch, UserId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::auth::JwtConfig;
use crate::error::{ServerError, ServerResult};
use crate::gate::{AuthenticationGate, BypassRules};
use crate::http::{HttpResponse, InboundRequest, Method};
use crate::resolver::PrincipalResolver;

/// A matched profile route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    /// `/profiles`
    Collection,
    /// `/profiles/me`
    Own,
    /// `/profiles/me/exists`
    OwnExists,
    /// `/profiles/owner/{userId}`
    ByOwner(UserId),
    /// `/profiles/{id}`
    ById(ProfileId),
}

impl Route {
    fn parse(path: &str) -> ServerResult<Self> {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            ["profiles"] => Ok(Route::Collection),
            ["profiles", "me"] => Ok(Route::Own),
            ["profiles", "me", "exists"] => Ok(Route::OwnExists),
            ["profiles", "owner", raw] => raw
                .parse()
                .map(Route::ByOwner)
                .map_err(|_| ServerError::BadRequest(format!("invalid user id: {raw:?}"))),
            ["profiles", raw] => raw
                .parse()
                .map(Route::ById)
                .map_err(|_| ServerError::BadRequest(format!("invalid profile id: {raw:?}"))),
            _ => Err(ServerError::RouteNotFound(path.to_string())),
        }
    }
}

/// Query parameters accepted by `GET /profiles`.
#[derive(Debug, Default)]
struct CollectionQuery {
    criteria: SearchCriteria,
    /// Whether any search parameter was supplied; otherwise the request is a
    /// plain listing.
    is_search: bool,
    page: Option<u32>,
    size: Option<u32>,
    sort: Vec<SortOrder>,
}

impl CollectionQuery {
    fn parse(request: &InboundRequest) -> ServerResult<Self> {
        let mut query = Self::default();

        for (name, value) in request.query_pairs() {
            match name.as_str() {
                "search" | "searchTerm" => {
                    query.criteria.free_text = Some(value);
                    query.is_search = true;
                }
                "address" => {
                    query.criteria.address = Some(value);
                    query.is_search = true;
                }
                "minAge" => {
                    query.criteria.min_age = Some(parse_number(&name, &value)?);
                    query.is_search = true;
                }
                "maxAge" => {
                    query.criteria.max_age = Some(parse_number(&name, &value)?);
                    query.is_search = true;
                }
                "page" => query.page = Some(parse_number(&name, &value)?),
                "size" => query.size = Some(parse_number(&name, &value)?),
                "sort" => query.sort.push(value.parse().map_err(ServerError::BadRequest)?),
                _ => debug!(param = %name, "Ignoring unknown query parameter"),
            }
        }

        Ok(query)
    }

    fn page_request(&self, limits: PageLimits) -> PageRequest {
        self.sort
            .iter()
            .fold(limits.request(self.page, self.size), |request, order| {
                request.with_sort(*order)
            })
    }
}

fn parse_number(name: &str, value: &str) -> ServerResult<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("{name} must be a non-negative integer")))
}

fn parse_body<T: DeserializeOwned>(request: &InboundRequest) -> ServerResult<T> {
    serde_json::from_str(&request.body)
        .map_err(|e| ServerError::BadRequest(format!("invalid request body: {e}")))
}

fn json_response(status: u16, body: &impl Serialize) -> ServerResult<HttpResponse> {
    Ok(HttpResponse::json(status, serde_json::to_string(body)?))
}

fn error_response(error: &ServerError, authenticated: bool) -> HttpResponse {
    let status = error.status(authenticated);
    let body = json!({
        "status": status,
        "error": error.public_message(),
    });
    HttpResponse::json(status, body.to_string())
}

/// Handles requests by authenticating them and routing them to the profile
/// use cases.
pub struct ProfileRequestHandler<S, U> {
    gate: AuthenticationGate<U>,
    service: ProfileAccessService<S>,
}

impl<S: ProfileStore, U: UserStore> ProfileRequestHandler<S, U> {
    pub fn new(gate: AuthenticationGate<U>, service: ProfileAccessService<S>) -> Self {
        Self { gate, service }
    }

    /// Wires the gate and the service from validated configuration.
    pub fn from_config(config: &DossierConfig, profiles: S, users: U) -> ServerResult<Self> {
        config.validate()?;

        let jwt = JwtConfig::from_auth_config(&config.auth)?;
        let gate = AuthenticationGate::new(
            jwt.verifier(),
            PrincipalResolver::new(users),
            BypassRules::from_config(&config.gate),
        );
        let service = ProfileAccessService::new(profiles).with_limits(PageLimits {
            default_size: config.pagination.default_page_size,
            max_size: config.pagination.max_page_size,
        });

        info!(
            issuer = ?config.auth.issuer,
            max_page_size = config.pagination.max_page_size,
            "Profile request handler configured"
        );
        Ok(Self::new(gate, service))
    }

    pub fn gate(&self) -> &AuthenticationGate<U> {
        &self.gate
    }

    pub fn service(&self) -> &ProfileAccessService<S> {
        &self.service
    }

    /// Parses raw request text, handles it, and frames the response.
    pub fn handle_raw(&self, raw: &str) -> String {
        match InboundRequest::parse(raw) {
            Ok(request) => self.handle(&request).to_http(),
            Err(e) => {
                debug!(error = %e, "Rejecting unparseable request");
                error_response(&e, false).to_http()
            }
        }
    }

    /// Handles a request and returns a response.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub fn handle(&self, request: &InboundRequest) -> HttpResponse {
        let principal = self.gate.authenticate(request);

        match self.handle_inner(request, principal.as_ref()) {
            Ok(response) => response,
            Err(e) => {
                let response = error_response(&e, principal.is_some());
                if response.status >= 500 {
                    error!(error = %e, status = response.status, "Request failed");
                } else {
                    debug!(error = %e, status = response.status, "Request refused");
                }
                response
            }
        }
    }

    fn handle_inner(
        &self,
        request: &InboundRequest,
        principal: Option<&Principal>,
    ) -> ServerResult<HttpResponse> {
        if request.method == Method::Options {
            return Ok(HttpResponse::no_content());
        }

        let route = Route::parse(&request.path)?;
        let service = &self.service;

        match (route, &request.method) {
            (Route::Collection, Method::Post) => {
                let fields: NewProfile = parse_body(request)?;
                json_response(201, &service.create(principal, fields)?)
            }
            (Route::Collection, Method::Get) => {
                let query = CollectionQuery::parse(request)?;
                let page = query.page_request(service.limits());
                let result = if query.is_search {
                    service.search(principal, &query.criteria, page)?
                } else {
                    service.list_all(principal, page)?
                };
                json_response(200, &result)
            }

            (Route::Own, Method::Get) => json_response(200, &service.get_own(principal)?),
            (Route::Own, Method::Put) => {
                let patch: ProfilePatch = parse_body(request)?;
                json_response(200, &service.update_own(principal, patch)?)
            }
            (Route::Own, Method::Delete) => {
                service.delete_own(principal)?;
                Ok(HttpResponse::no_content())
            }
            (Route::OwnExists, Method::Get) => {
                json_response(200, &json!({ "exists": service.has_profile(principal)? }))
            }

            (Route::ByOwner(user_id), Method::Get) => {
                json_response(200, &service.get_by_owner(principal, user_id)?)
            }

            (Route::ById(id), Method::Get) => json_response(200, &service.get_by_id(principal, id)?),
            (Route::ById(id), Method::Put) => {
                let patch: ProfilePatch = parse_body(request)?;
                json_response(200, &service.update_by_id(principal, id, patch)?)
            }
            (Route::ById(id), Method::Delete) => {
                service.delete_by_id(principal, id)?;
                Ok(HttpResponse::no_content())
            }

            (_, method) => Err(ServerError::MethodNotAllowed {
                method: method.to_string(),
                path: request.path.clone(),
            }),
        }
    }
}
