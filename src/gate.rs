use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::GateConfig;

/// RouteClass
///
/// Outcome of classifying a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// No session required.
    Public,
    /// A session cookie must be present.
    Protected,
}

/// Admission
///
/// The gate's decision for a single request. `Redirect` is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Proceed,
    Redirect(String),
}

/// AdmissionGate
///
/// Session-presence check that runs in front of every route. The gate is a pure
/// function of its `GateConfig`, the request path and (for protected paths only)
/// the request cookies. It performs no I/O and holds no mutable state, so a
/// single instance is shared by every in-flight request.
///
/// The gate only checks that a session token is *present*. Decoding, signature
/// and expiry checks belong to `auth::resolve_identity`, which handlers call.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    config: Arc<GateConfig>,
}

impl AdmissionGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config: Arc::new(config.normalized()),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// classify
    ///
    /// Maps a request path (no query string, no host) to a `RouteClass`.
    /// Rules are evaluated in priority order and the first match wins:
    ///
    /// 1. API namespace.
    /// 2. Asset namespace and favicon.
    /// 3. Root, listed public pages and anything nested under them.
    /// 4. The literal login and special access paths.
    /// 5. Everything else is protected.
    pub fn classify(&self, path: &str) -> RouteClass {
        let config = &*self.config;

        if is_under(path, &config.api_prefix) {
            return RouteClass::Public;
        }

        if is_under(path, &config.asset_prefix) || is_favicon(path, &config.favicon_path) {
            return RouteClass::Public;
        }

        if path == "/" || config.public_pages.iter().any(|page| is_under(path, page)) {
            return RouteClass::Public;
        }

        if path == config.login_path || path == config.special_access_path {
            return RouteClass::Public;
        }

        RouteClass::Protected
    }

    /// admit
    ///
    /// Runs the classifier, then for protected paths only checks that the session
    /// cookie is present and non-empty. Cookies on public paths are never read.
    pub fn admit(&self, path: &str, headers: &HeaderMap) -> Admission {
        if self.classify(path) == RouteClass::Public {
            return Admission::Proceed;
        }

        match read_cookie(headers, &self.config.cookie_name) {
            Some(token) if !token.is_empty() => Admission::Proceed,
            _ => Admission::Redirect(self.config.login_path.clone()),
        }
    }
}

/// is_under
///
/// True when `path` equals `prefix` or continues with a `/` after it.
/// An empty prefix never matches, so a blank config value cannot make every route public.
fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// is_favicon
///
/// Plain `starts_with`, but guarded like `is_under`: a blank favicon path matches nothing.
fn is_favicon(path: &str, favicon_path: &str) -> bool {
    !favicon_path.is_empty() && path.starts_with(favicon_path)
}

/// read_cookie
///
/// Looks up a cookie by exact name across every `Cookie` header on the request.
/// The first matching pair wins. Pairs are split on raw bytes so a non-UTF-8
/// neighbour (e.g. `name=José`) only hides itself, never the whole header.
/// Malformed pairs (no `=`) are skipped and RFC 6265 double quotes are stripped,
/// so `name=""` reads as an empty value.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .flat_map(|value| value.as_bytes().split(|&byte| byte == b';'))
        .filter_map(|pair| {
            let eq = pair.iter().position(|&byte| byte == b'=')?;
            Some((&pair[..eq], &pair[eq + 1..]))
        })
        .find(|(key, _)| key.trim_ascii() == name.as_bytes())
        .and_then(|(_, value)| std::str::from_utf8(value.trim_ascii()).ok())
        .map(unquote)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

/// admission_middleware
///
/// Axum adapter around `AdmissionGate::admit`. It is layered over the whole router,
/// so unmatched paths are gated too. A redirect is a bare `302 Found` pointing at the
/// login path with no query parameters attached.
pub async fn admission_middleware(
    State(gate): State<AdmissionGate>,
    request: Request,
    next: Next,
) -> Response {
    match gate.admit(request.uri().path(), request.headers()) {
        Admission::Proceed => next.run(request).await,
        Admission::Redirect(target) => {
            tracing::debug!(path = %request.uri().path(), %target, "no session cookie, redirecting");
            redirect_found(&target)
        }
    }
}

fn redirect_found(target: &str) -> Response {
    match HeaderValue::from_str(target) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(_) => {
            tracing::error!(%target, "login path is not a valid Location header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
