use actix_session::{Session, SessionExt};
use actix_web::{dev, guard, FromRequest, HttpRequest};
use serde::Serialize;
use std::future::{ready, Ready};

pub const ADMIN_ROLE: &str = "admin";

/// The logged-in administrator, read from the cookie session.
#[derive(Serialize)]
pub struct AuthenticatedAdmin {
    pub email: String,
    pub role: String,
}

impl FromRequest for AuthenticatedAdmin {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let session = req.get_session();
        match (session.get::<String>("email"), session.get::<String>("role")) {
            (Ok(Some(email)), Ok(Some(role))) if role == ADMIN_ROLE => ready(Ok(AuthenticatedAdmin { email, role })),
            _ => ready(Err(actix_web::error::ErrorUnauthorized("Not logged in."))),
        }
    }
}

pub fn admin_guard(session: &Session) -> bool {
    session.get::<String>("role").unwrap_or(None).as_deref() == Some(ADMIN_ROLE)
}

/// `allowed` is `*` or a comma-separated list of addresses.
pub fn is_ip_allowed(allowed: &str, request_ip: Option<&str>) -> bool {
    if allowed.trim() == "*" {
        return true;
    }
    match request_ip {
        Some(ip) => in_list(allowed, ip),
        None => false,
    }
}

fn in_list(list: &str, ip: &str) -> bool {
    list.split(',').any(|candidate| candidate.trim() == ip)
}

/// Client address. `X-Forwarded-For` is only believed when the direct peer is
/// one of `trusted_proxies`; the client is then the right-most hop that is not
/// itself a trusted proxy.
pub fn client_ip(peer: Option<&str>, forwarded_for: Option<&str>, trusted_proxies: &str) -> Option<String> {
    let peer = peer?;
    if !in_list(trusted_proxies, peer) {
        return Some(peer.to_string());
    }

    let hops: Vec<&str> = forwarded_for
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .collect();
    let client = hops
        .iter()
        .rev()
        .find(|hop| !in_list(trusted_proxies, hop))
        .or_else(|| hops.first())
        .copied()
        .unwrap_or(peer);
    Some(client.to_string())
}

pub fn request_ip(ctx: &guard::GuardContext, trusted_proxies: &str) -> Option<String> {
    let peer = ctx.head().peer_addr.map(|addr| addr.ip().to_string());
    let forwarded_for = ctx.head().headers().get("X-Forwarded-For").and_then(|v| v.to_str().ok());
    client_ip(peer.as_deref(), forwarded_for, trusted_proxies)
}

/// Admin routes only match for clients on the allow-list; everyone else gets a 404.
pub fn ip_guard(allowed: String, trusted_proxies: String) -> impl guard::Guard {
    guard::fn_guard(move |ctx| {
        let ip = request_ip(ctx, &trusted_proxies);
        let is_allowed = is_ip_allowed(&allowed, ip.as_deref());
        if !is_allowed {
            match ip {
                Some(ip) => log::warn!("Blocked admin request from unauthorized IP: {}", ip),
                None => log::warn!("Could not determine peer IP address for admin request."),
            }
        }
        is_allowed
    })
}
