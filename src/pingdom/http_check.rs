//! HTTP check descriptors
//!
//! Turns the loosely formatted `url` of an HttpCheck (`example.com`,
//! `user:pw@example.com:8080/health?full=1`, `https://...`) into the strictly
//! validated structure the Pingdom API works with.
//!
//! Addresses without an `http://` or `https://` prefix are treated as plain
//! HTTP. The root path `/` and "no path" both normalize to an empty path.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

/// Bytes left as-is when a request path is escaped
const PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

/// Check interval used for every descriptor (Pingdom resolution, in minutes)
pub const DEFAULT_RESOLUTION: u32 = 5;

/// Resolutions accepted by the Pingdom API
const ALLOWED_RESOLUTIONS: [u32; 5] = [1, 5, 15, 30, 60];

/// Reasons an HttpCheck spec cannot be turned into a [`CheckDescriptor`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the name should not be empty string")]
    EmptyName,

    #[error("the url should not be empty string")]
    EmptyAddress,

    #[error("the url should define at least a host")]
    NoHost,

    #[error("the port is invalid")]
    InvalidPort,

    #[error("the url is malformed: {0}")]
    MalformedAddress(String),

    #[error("the check is invalid: {0}")]
    InvalidDescriptor(String),
}

/// Normalized description of a Pingdom HTTP check
///
/// Built fresh from the resource spec on every reconciliation and never
/// persisted; only the id Pingdom assigns to it ends up in the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDescriptor {
    /// Display name of the check in Pingdom
    pub name: String,
    /// Whether the check connects over TLS
    pub encryption: bool,
    /// Target host name or IP literal (without brackets)
    pub host: String,
    /// Explicit target port, `None` for the scheme default
    pub port: Option<u16>,
    /// Request path including the query string, empty for `/`
    pub path: String,
    pub username: String,
    pub password: String,
    /// Check interval in Pingdom resolution units
    pub resolution: u32,
}

impl CheckDescriptor {
    /// Apply the same rules Pingdom applies to an HTTP check
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::InvalidDescriptor(
                "name must be a non-empty string".to_string(),
            ));
        }
        if self.host.is_empty() {
            return Err(ValidationError::InvalidDescriptor(
                "host must be a non-empty string".to_string(),
            ));
        }
        if self.port == Some(0) {
            return Err(ValidationError::InvalidDescriptor(
                "port must be between 1 and 65535".to_string(),
            ));
        }
        if !ALLOWED_RESOLUTIONS.contains(&self.resolution) {
            return Err(ValidationError::InvalidDescriptor(format!(
                "resolution {} is not one of {:?}",
                self.resolution, ALLOWED_RESOLUTIONS
            )));
        }
        Ok(())
    }

    /// Port the check targets, falling back to the scheme default
    pub fn effective_port(&self) -> u16 {
        match (self.port, self.encryption) {
            (Some(port), _) => port,
            (None, true) => 443,
            (None, false) => 80,
        }
    }
}

/// Build a validated [`CheckDescriptor`] from a check name and a raw URL
pub fn normalize(name: &str, raw_url: &str) -> Result<CheckDescriptor, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if raw_url.is_empty() {
        return Err(ValidationError::EmptyAddress);
    }

    let url = ParsedUrl::parse(raw_url)?;
    let port = parse_port(url.port)?;

    let (username, password) = match url.userinfo {
        Some(userinfo) => match userinfo.split_once(':') {
            Some((user, pass)) => (
                decode_credential(user)?,
                decode_credential(pass)?,
            ),
            None => (decode_credential(userinfo)?, String::new()),
        },
        None => (String::new(), String::new()),
    };

    let descriptor = CheckDescriptor {
        name: name.to_string(),
        encryption: url.scheme == "https",
        host: url.host.to_string(),
        port,
        path: url.request_uri()?,
        username,
        password,
        resolution: DEFAULT_RESOLUTION,
    };

    descriptor.validate()?;
    Ok(descriptor)
}

/// Borrowed pieces of an absolute http(s) URL
#[derive(Debug)]
struct ParsedUrl<'a> {
    scheme: &'static str,
    userinfo: Option<&'a str>,
    host: &'a str,
    port: Option<&'a str>,
    path: &'a str,
    query: &'a str,
}

impl<'a> ParsedUrl<'a> {
    fn parse(raw: &'a str) -> Result<Self, ValidationError> {
        let (scheme, rest) = if let Some(rest) = raw.strip_prefix("https://") {
            ("https", rest)
        } else if let Some(rest) = raw.strip_prefix("http://") {
            ("http", rest)
        } else {
            ("http", raw)
        };

        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (before_query, query) = rest.split_once('?').unwrap_or((rest, ""));

        let (mut authority, mut path) = split_authority(before_query);
        if authority.is_empty() && !path.is_empty() {
            // "http:///example.com/a" leaves the host at the start of the path
            (authority, path) = split_authority(path.trim_start_matches('/'));
        }

        let (userinfo, host_port) = match authority.rsplit_once('@') {
            Some((userinfo, host_port)) => (Some(userinfo), host_port),
            None => (None, authority),
        };

        let (host, port) = split_host_port(host_port)?;
        if host.is_empty() {
            return Err(ValidationError::NoHost);
        }
        if host.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::MalformedAddress(format!(
                "invalid character in host {:?}",
                host
            )));
        }

        Ok(Self {
            scheme,
            userinfo,
            host,
            port,
            path,
            query,
        })
    }

    /// Path plus query as sent in the request line, empty for the root path
    fn request_uri(&self) -> Result<String, ValidationError> {
        let mut uri = if self.path.is_empty() {
            "/".to_string()
        } else {
            escape_path(self.path)?
        };
        if !self.query.is_empty() {
            uri.push('?');
            uri.push_str(self.query);
        }
        if uri == "/" {
            uri.clear();
        }
        Ok(uri)
    }
}

fn split_authority(s: &str) -> (&str, &str) {
    match s.find('/') {
        Some(idx) => s.split_at(idx),
        None => (s, ""),
    }
}

fn split_host_port(host_port: &str) -> Result<(&str, Option<&str>), ValidationError> {
    if let Some(bracketed) = host_port.strip_prefix('[') {
        let (host, after) = bracketed.split_once(']').ok_or_else(|| {
            ValidationError::MalformedAddress(format!("missing ']' in host {:?}", host_port))
        })?;
        if after.is_empty() {
            return Ok((host, None));
        }
        return match after.strip_prefix(':') {
            Some(port) => Ok((host, Some(port))),
            None => Err(ValidationError::InvalidPort),
        };
    }

    Ok(match host_port.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (host_port, None),
    })
}

fn parse_port(port: Option<&str>) -> Result<Option<u16>, ValidationError> {
    let port = match port {
        None | Some("") => return Ok(None),
        Some(port) => port,
    };

    if !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidPort);
    }
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(ValidationError::InvalidPort),
        Ok(port) => Ok(Some(port)),
    }
}

fn has_valid_escapes(s: &str) -> bool {
    s.split('%').skip(1).all(|rest| {
        rest.len() >= 2 && rest.as_bytes()[..2].iter().all(u8::is_ascii_hexdigit)
    })
}

fn decode_credential(s: &str) -> Result<String, ValidationError> {
    let malformed =
        || ValidationError::MalformedAddress("invalid percent-encoding in credentials".to_string());

    if !has_valid_escapes(s) {
        return Err(malformed());
    }
    percent_decode_str(s)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| malformed())
}

/// Escape a request path the way it goes on the wire.
///
/// A path that is already validly encoded is kept verbatim. Anything else is
/// decoded and re-encoded, so `/a b` becomes `/a%20b`.
fn escape_path(path: &str) -> Result<String, ValidationError> {
    if !has_valid_escapes(path) {
        return Err(ValidationError::MalformedAddress(format!(
            "invalid percent-encoding in path {:?}",
            path
        )));
    }

    let verbatim = path
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b"-_.~!$&'()*+,;=:@[]/%".contains(&b));
    if verbatim {
        return Ok(path.to_string());
    }

    let decoded: Vec<u8> = percent_decode_str(path).collect();
    Ok(percent_encode(&decoded, PATH).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(host: &str) -> CheckDescriptor {
        CheckDescriptor {
            name: "example".to_string(),
            encryption: false,
            host: host.to_string(),
            port: None,
            path: String::new(),
            username: String::new(),
            password: String::new(),
            resolution: DEFAULT_RESOLUTION,
        }
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(
            normalize("", "https://www.example.com"),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn test_empty_url() {
        assert_eq!(normalize("example", ""), Err(ValidationError::EmptyAddress));
    }

    #[test]
    fn test_no_host() {
        assert_eq!(normalize("example", "http://"), Err(ValidationError::NoHost));
        assert_eq!(normalize("example", "https://"), Err(ValidationError::NoHost));
        assert_eq!(
            normalize("example", "http://user:pw@"),
            Err(ValidationError::NoHost)
        );
        assert_eq!(normalize("example", "http:///"), Err(ValidationError::NoHost));
    }

    #[test]
    fn test_no_scheme() {
        assert_eq!(normalize("example", "example.com"), Ok(check("example.com")));
    }

    #[test]
    fn test_encrypted() {
        let expected = CheckDescriptor {
            encryption: true,
            ..check("example.com")
        };
        assert_eq!(normalize("example", "https://example.com"), Ok(expected));
    }

    #[test]
    fn test_custom_port() {
        let expected = CheckDescriptor {
            port: Some(8080),
            ..check("example.com")
        };
        assert_eq!(normalize("example", "example.com:8080"), Ok(expected));
    }

    #[test]
    fn test_invalid_ports() {
        for url in [
            "example.com:808a",
            "example.com:65536",
            "example.com:-1",
            "example.com:0",
            "example.com:+80",
            "example.com:99999999999999999999",
        ] {
            assert_eq!(
                normalize("example", url),
                Err(ValidationError::InvalidPort),
                "{}",
                url
            );
        }
    }

    #[test]
    fn test_empty_port_means_default() {
        assert_eq!(normalize("example", "example.com:"), Ok(check("example.com")));
    }

    #[test]
    fn test_with_user() {
        let expected = CheckDescriptor {
            username: "user".to_string(),
            ..check("example.com")
        };
        assert_eq!(normalize("example", "user@example.com"), Ok(expected));
    }

    #[test]
    fn test_with_password_only() {
        let expected = CheckDescriptor {
            password: "pw".to_string(),
            ..check("example.com")
        };
        assert_eq!(normalize("example", ":pw@example.com"), Ok(expected));
    }

    #[test]
    fn test_with_user_and_password() {
        let expected = CheckDescriptor {
            username: "user".to_string(),
            password: "pw".to_string(),
            ..check("example.com")
        };
        assert_eq!(normalize("example", "user:pw@example.com"), Ok(expected));
    }

    #[test]
    fn test_percent_encoded_credentials() {
        let descriptor = normalize("example", "us%40er:p%3Aw@example.com").unwrap();
        assert_eq!(descriptor.username, "us@er");
        assert_eq!(descriptor.password, "p:w");

        assert!(matches!(
            normalize("example", "user:p%zz@example.com"),
            Err(ValidationError::MalformedAddress(_))
        ));
    }

    #[test]
    fn test_simple_path() {
        let expected = CheckDescriptor {
            path: "/a/path".to_string(),
            ..check("example.com")
        };
        assert_eq!(normalize("example", "example.com/a/path"), Ok(expected));
    }

    #[test]
    fn test_path_with_query() {
        let expected = CheckDescriptor {
            path: "/a/path?q=uery&key=value".to_string(),
            ..check("example.com")
        };
        assert_eq!(
            normalize("example", "example.com/a/path?q=uery&key=value"),
            Ok(expected)
        );
    }

    #[test]
    fn test_root_path_is_empty() {
        assert_eq!(normalize("example", "example.com/"), Ok(check("example.com")));
        assert_eq!(
            normalize("example", "http://example.com/#top"),
            Ok(check("example.com"))
        );
    }

    #[test]
    fn test_path_is_escaped() {
        let descriptor = normalize("example", "example.com/a b?x=1 2").unwrap();
        assert_eq!(descriptor.path, "/a%20b?x=1 2");

        let descriptor = normalize("example", "example.com/caf\u{e9}/%41").unwrap();
        assert_eq!(descriptor.path, "/caf%C3%A9/A");
    }

    #[test]
    fn test_encoded_path_is_kept() {
        let descriptor = normalize("example", "example.com/a%20b/(v1)").unwrap();
        assert_eq!(descriptor.path, "/a%20b/(v1)");
    }

    #[test]
    fn test_bad_escape_in_path() {
        assert!(matches!(
            normalize("example", "example.com/a%2"),
            Err(ValidationError::MalformedAddress(_))
        ));
    }

    #[test]
    fn test_query_without_path() {
        let descriptor = normalize("example", "example.com?ping=1").unwrap();
        assert_eq!(descriptor.host, "example.com");
        assert_eq!(descriptor.path, "/?ping=1");
    }

    #[test]
    fn test_fragment_is_dropped() {
        let descriptor = normalize("example", "example.com/a/path#section").unwrap();
        assert_eq!(descriptor.path, "/a/path");
    }

    #[test]
    fn test_host_recovered_from_path() {
        let expected = CheckDescriptor {
            path: "/status".to_string(),
            ..check("example.com")
        };
        assert_eq!(normalize("example", "http:///example.com/status"), Ok(expected));
    }

    #[test]
    fn test_ipv6_host() {
        let descriptor = normalize("example", "[::1]:8080/health").unwrap();
        assert_eq!(descriptor.host, "::1");
        assert_eq!(descriptor.port, Some(8080));
        assert_eq!(descriptor.path, "/health");

        assert_eq!(
            normalize("example", "[::1]x"),
            Err(ValidationError::InvalidPort)
        );
        assert!(matches!(
            normalize("example", "[::1"),
            Err(ValidationError::MalformedAddress(_))
        ));
    }

    #[test]
    fn test_whitespace_in_host() {
        assert!(matches!(
            normalize("example", "exa mple.com"),
            Err(ValidationError::MalformedAddress(_))
        ));
    }

    #[test]
    fn test_complex_url() {
        let expected = CheckDescriptor {
            encryption: true,
            path: "/a/path?q=uery&key=value".to_string(),
            username: "user".to_string(),
            password: "pw".to_string(),
            ..check("www.example.com")
        };
        assert_eq!(
            normalize(
                "example",
                "https://user:pw@www.example.com/a/path?q=uery&key=value"
            ),
            Ok(expected)
        );
    }

    #[test]
    fn test_validate_rejects_unknown_resolution() {
        let descriptor = CheckDescriptor {
            resolution: 7,
            ..check("example.com")
        };
        assert!(matches!(
            descriptor.validate(),
            Err(ValidationError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_effective_port() {
        assert_eq!(check("example.com").effective_port(), 80);
        let tls = CheckDescriptor {
            encryption: true,
            ..check("example.com")
        };
        assert_eq!(tls.effective_port(), 443);
        let custom = CheckDescriptor {
            port: Some(8443),
            ..tls
        };
        assert_eq!(custom.effective_port(), 8443);
    }
}
