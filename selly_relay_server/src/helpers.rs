use std::{
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

use actix_web::HttpRequest;
use log::{debug, trace};
use regex::Regex;

/// Get the remote IP address from the request. It uses 3 sources to determine the IP address, in decreasing order
/// of preference:
/// 1. The first entry of the `X-Forwarded-For` header, iif `use_x_forwarded_for` is set to true in the configuration.
/// 2. The `for=` entry of the `Forwarded` header, iif `use_forwarded` is set to true in the configuration.
/// 3. The peer address of the connection.
///
/// The port is always discarded, so that one client maps to one address however many connections it opens.
pub fn get_remote_ip(req: &HttpRequest, use_x_forwarded_for: bool, use_forwarded: bool) -> Option<IpAddr> {
    let mut result = None;
    if use_x_forwarded_for {
        trace!("Checking X-Forwarded-For header");
        result = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(parse_ip);
        if let Some(ip) = result {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
        }
    }
    if use_forwarded && result.is_none() {
        trace!("Checking Forwarded header");
        result = Regex::new(r#"for=(?P<ip>[^;,]+)"#).ok().and_then(|re| {
            req.headers()
                .get("Forwarded")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| re.captures(v))
                .and_then(|caps| caps.name("ip"))
                .and_then(|m| parse_ip(m.as_str()))
        });
        if let Some(ip) = result {
            debug!("Using Forwarded header for remote address: {ip}");
        }
    }
    result.or_else(|| {
        let peer_addr = req.peer_addr().map(|a| a.ip());
        trace!("Using Peer address for remote address: {:?}", peer_addr);
        peer_addr
    })
}

/// Accepts `1.2.3.4`, `1.2.3.4:80`, `"[2001:db8::1]:4711"` and the like.
fn parse_ip(s: &str) -> Option<IpAddr> {
    let s = s.trim().trim_matches('"');
    if let Ok(addr) = SocketAddr::from_str(s) {
        return Some(addr.ip());
    }
    let s = s.trim_start_matches('[');
    IpAddr::from_str(s.split(']').next().unwrap_or(s)).ok()
}

#[cfg(test)]
mod test {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use actix_web::test::TestRequest;

    use super::get_remote_ip;

    fn peer() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 7)), 51234)
    }

    #[test]
    fn peer_address_without_port() {
        let req = TestRequest::default().peer_addr(peer()).to_http_request();
        assert_eq!(get_remote_ip(&req, false, false), Some("198.51.100.7".parse().unwrap()));
    }

    #[test]
    fn no_address_at_all() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(get_remote_ip(&req, true, true), None);
    }

    #[test]
    fn forwarded_headers_only_when_enabled() {
        let req = TestRequest::default()
            .peer_addr(peer())
            .insert_header(("X-Forwarded-For", "203.0.113.5, 10.0.0.1"))
            .insert_header(("Forwarded", "for=\"[2001:db8::1]:4711\";proto=https"))
            .to_http_request();
        assert_eq!(get_remote_ip(&req, false, false), Some("198.51.100.7".parse().unwrap()));
        assert_eq!(get_remote_ip(&req, true, false), Some("203.0.113.5".parse().unwrap()));
        assert_eq!(get_remote_ip(&req, false, true), Some("2001:db8::1".parse().unwrap()));
        assert_eq!(get_remote_ip(&req, true, true), Some("203.0.113.5".parse().unwrap()));
    }

    #[test]
    fn garbage_forwarded_header_falls_back_to_peer() {
        let req = TestRequest::default()
            .peer_addr(peer())
            .insert_header(("X-Forwarded-For", "unknown"))
            .to_http_request();
        assert_eq!(get_remote_ip(&req, true, false), Some("198.51.100.7".parse().unwrap()));
        let req = TestRequest::default().insert_header(("Forwarded", "for=192.0.2.60:4711")).to_http_request();
        assert_eq!(get_remote_ip(&req, false, true), Some("192.0.2.60".parse().unwrap()));
    }
}
