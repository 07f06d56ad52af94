//! IP 地址处理工具
//!
//! - 输入校验：仅接受语法合法的 IPv4 / IPv6
//! - 调用方 IP 推断：X-Real-IP → X-Forwarded-For → 连接地址

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::trace;

use crate::errors::{GeolocatorError, Result};

pub const INVALID_IP_MESSAGE: &str = "invalid ip address";
pub const UNKNOWN_CALLER_MESSAGE: &str = "unable to determine client ip address";

const X_REAL_IP: &str = "x-real-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// 校验 IP 字符串
///
/// 不做任何规范化，返回值只用于判断；缓存 key 仍使用原始字符串。
pub fn validate_ip(ip: &str) -> Result<IpAddr> {
    ip.parse::<IpAddr>()
        .map_err(|_| GeolocatorError::validation(INVALID_IP_MESSAGE))
}

/// 从 HttpRequest 推断调用方 IP
pub fn extract_caller_ip(req: &HttpRequest) -> Option<String> {
    extract_caller_ip_from_parts(req.headers(), req.peer_addr())
}

/// 按优先级推断调用方 IP
///
/// 1. `X-Real-IP`（反向代理设置）
/// 2. `X-Forwarded-For` 第一项（原始客户端）
/// 3. 连接地址，去掉端口
pub fn extract_caller_ip_from_parts(
    headers: &HeaderMap,
    peer_addr: Option<SocketAddr>,
) -> Option<String> {
    if let Some(ip) = header_value(headers, X_REAL_IP) {
        trace!("Caller IP from X-Real-IP: {}", ip);
        return Some(ip);
    }

    if let Some(ip) = header_value(headers, X_FORWARDED_FOR)
        .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
    {
        trace!("Caller IP from X-Forwarded-For: {}", ip);
        return Some(ip);
    }

    peer_addr.map(|addr| addr.ip().to_string())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        map
    }

    fn peer() -> Option<SocketAddr> {
        Some("203.0.113.7:54321".parse().unwrap())
    }

    #[test]
    fn test_validate_accepts_ipv4_and_ipv6() {
        for ip in [
            "8.8.8.8",
            "0.0.0.0",
            "255.255.255.255",
            "::1",
            "::",
            "2001:4860:4860::8888",
            "2001:DB8::1",
            "::ffff:192.0.2.1",
        ] {
            assert!(validate_ip(ip).is_ok(), "{} should be valid", ip);
        }
    }

    #[test]
    fn test_validate_rejects_everything_else() {
        for ip in [
            "",
            "not-an-ip",
            "localhost",
            "example.com",
            "256.1.1.1",
            "1.2.3",
            "1.2.3.4.5",
            " 8.8.8.8",
            "8.8.8.8:80",
            "[::1]",
            "2001:db8:::1",
        ] {
            let err = validate_ip(ip).unwrap_err();
            assert_eq!(err.message(), INVALID_IP_MESSAGE, "{:?} should be invalid", ip);
        }
    }

    #[test]
    fn test_real_ip_wins() {
        let h = headers(&[
            ("x-real-ip", "198.51.100.1"),
            ("x-forwarded-for", "192.0.2.1, 10.0.0.1"),
        ]);
        assert_eq!(
            extract_caller_ip_from_parts(&h, peer()),
            Some("198.51.100.1".to_string())
        );
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let h = headers(&[("x-forwarded-for", " 192.0.2.1 , 10.0.0.1")]);
        assert_eq!(
            extract_caller_ip_from_parts(&h, peer()),
            Some("192.0.2.1".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_peer_without_port() {
        assert_eq!(
            extract_caller_ip_from_parts(&HeaderMap::new(), peer()),
            Some("203.0.113.7".to_string())
        );

        let v6: SocketAddr = "[2001:db8::5]:443".parse().unwrap();
        assert_eq!(
            extract_caller_ip_from_parts(&HeaderMap::new(), Some(v6)),
            Some("2001:db8::5".to_string())
        );
    }

    #[test]
    fn test_empty_headers_are_skipped() {
        let h = headers(&[("x-real-ip", ""), ("x-forwarded-for", " , 10.0.0.1")]);
        assert_eq!(
            extract_caller_ip_from_parts(&h, peer()),
            Some("203.0.113.7".to_string())
        );
    }

    #[test]
    fn test_nothing_available() {
        assert_eq!(extract_caller_ip_from_parts(&HeaderMap::new(), None), None);
    }
}
