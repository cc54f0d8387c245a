//! Client identification utilities
//!
//! Request metadata recorded with refresh tokens and used as the anonymous
//! viewer key / rate-limit key.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

/// Longest user-agent string kept for storage.
const MAX_USER_AGENT_LEN: usize = 512;

/// Metadata about the calling client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub device: String,
}

/// Reverse proxies whose `X-Forwarded-For` entries are honoured. The default
/// trusts nobody, so the socket peer is the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedProxies(Vec<IpAddr>);

impl TrustedProxies {
    pub fn new(proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        Self(proxies.into_iter().collect())
    }

    pub fn is_trusted(&self, ip: IpAddr) -> bool {
        self.0.contains(&ip)
    }
}

impl ClientMetadata {
    pub fn from_headers(
        headers: &HeaderMap,
        direct_ip: Option<IpAddr>,
        trusted: &TrustedProxies,
    ) -> Self {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect::<String>());
        let device = describe_device(user_agent.as_deref()).to_string();

        Self {
            ip: extract_client_ip(headers, direct_ip, trusted),
            user_agent,
            device,
        }
    }

    /// Get IP as string (for database storage)
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }

    /// Stable key for per-client bookkeeping. Clients without a known IP share
    /// one bucket.
    pub fn client_key(&self) -> String {
        self.ip_string().unwrap_or_else(|| "unknown".to_string())
    }
}

/// Reads the socket address from `ConnectInfo` when the server provides it,
/// and the proxy allow-list from a `TrustedProxies` extension.
impl<S> FromRequestParts<S> for ClientMetadata
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());
        let trusted = parts
            .extensions
            .get::<TrustedProxies>()
            .cloned()
            .unwrap_or_default();
        Ok(Self::from_headers(&parts.headers, direct_ip, &trusted))
    }
}

/// Coarse device class derived from the User-Agent.
pub fn describe_device(user_agent: Option<&str>) -> &'static str {
    let Some(ua) = user_agent else {
        return "unknown";
    };
    let ua = ua.to_ascii_lowercase();
    if ua.contains("ipad") || ua.contains("tablet") {
        "tablet"
    } else if ua.contains("mobile") || ua.contains("android") || ua.contains("iphone") {
        "mobile"
    } else if ua.contains("curl") || ua.contains("bot") || ua.contains("http") {
        "client"
    } else {
        "desktop"
    }
}

/// Extract client IP address
///
/// Starts at the socket peer and walks `X-Forwarded-For` right to left for as
/// long as the current hop is a trusted proxy. Without a peer the header is
/// ignored.
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trusted: &TrustedProxies,
) -> Option<IpAddr> {
    let mut client = direct_ip?;
    let hops = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .collect::<Vec<_>>();

    for hop in hops.iter().rev() {
        if !trusted.is_trusted(client) {
            break;
        }
        match hop.trim().parse::<IpAddr>() {
            Ok(ip) => client = ip,
            Err(_) => break,
        }
    }
    Some(client)
}
