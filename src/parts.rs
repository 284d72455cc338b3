use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, ErrorKind, Result};

/// Structural decomposition of a URL reference.
///
/// Every scalar field is optional and an absent field is distinct from an
/// empty one. Path segments and query items keep their text verbatim: no
/// percent-decoding, no normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlParts {
    pub scheme: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// `/`-separated path segments. An empty path has no segments; a
    /// rooted path starts with an empty segment.
    pub segments: Vec<String>,
    /// `None` when the reference has no `?`; `Some(vec![])` for a bare `?`.
    pub query: Option<Vec<QueryItem>>,
    pub fragment: Option<String>,
}

impl UrlParts {
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = Self::default();
        let rest = match s.split_once('#') {
            Some((rest, fragment)) => {
                parts.fragment = Some(fragment.to_string());
                rest
            }
            None => s,
        };
        let rest = match rest.split_once('?') {
            Some((rest, query)) => {
                parts.query = Some(parse_query(query));
                rest
            }
            None => rest,
        };
        let rest = match split_scheme(rest) {
            Some((scheme, rest)) => {
                parts.scheme = Some(scheme.to_string());
                rest
            }
            None => rest,
        };
        let path = match rest.strip_prefix("//") {
            Some(rest) => {
                let (authority, path) = match rest.find('/') {
                    Some(i) => (&rest[..i], &rest[i..]),
                    None => (rest, ""),
                };
                parse_authority(s, authority, &mut parts)?;
                path
            }
            None => rest,
        };
        if !path.is_empty() {
            parts.segments = path.split('/').map(str::to_string).collect();
        }
        Ok(parts)
    }

    /// Query items, or an empty slice when the reference has no query.
    pub fn query_items(&self) -> &[QueryItem] {
        self.query.as_deref().unwrap_or(&[])
    }

    /// Recomposes the URL string.
    ///
    /// Fails with `InvalidUrl` when the fields cannot form a reference that
    /// parses back to the same structure.
    pub fn compose(&self) -> Result<String> {
        self.validate()?;
        let mut out = String::new();
        if let Some(scheme) = &self.scheme {
            out.push_str(scheme);
            out.push(':');
        }
        if self.has_authority() {
            out.push_str("//");
            if self.user.is_some() || self.password.is_some() {
                if let Some(user) = &self.user {
                    out.push_str(user);
                }
                if let Some(password) = &self.password {
                    out.push(':');
                    out.push_str(password);
                }
                out.push('@');
            }
            if let Some(host) = &self.host {
                out.push_str(host);
            }
            if let Some(port) = self.port {
                out.push(':');
                out.push_str(&port.to_string());
            }
        }
        out.push_str(&self.segments.join("/"));
        if let Some(items) = &self.query {
            out.push('?');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push('&');
                }
                out.push_str(&item.to_string());
            }
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        Ok(out)
    }

    fn has_authority(&self) -> bool {
        self.user.is_some() || self.password.is_some() || self.host.is_some() || self.port.is_some()
    }

    fn validate(&self) -> Result<()> {
        if let Some(scheme) = &self.scheme {
            let mut chars = scheme.chars();
            if !chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                || !chars.all(is_scheme_char)
            {
                return Err(Error::new(scheme, ErrorKind::InvalidUrl));
            }
        }
        for value in [&self.user, &self.password, &self.host].into_iter().flatten() {
            check(value, &['@', '/', '?', '#'])?;
        }
        // a colon would shift the user/password or host/port boundary
        if let Some(user) = &self.user {
            check(user, &[':'])?;
        }
        if let Some(host) = &self.host {
            if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
                return Err(Error::new(host, ErrorKind::InvalidUrl));
            }
        }
        for segment in &self.segments {
            check(segment, &['/', '?', '#'])?;
        }
        for item in self.query_items() {
            check(&item.name, &['&', '#', '='])?;
            if let Some(value) = &item.value {
                check(value, &['&', '#'])?;
            }
        }
        if let Some(fragment) = &self.fragment {
            check(fragment, &['#'])?;
        }
        if self.has_authority() {
            // with an authority the path must be rooted or empty
            if let Some(first) = self.segments.first() {
                if !first.is_empty() {
                    return Err(Error::new(first, ErrorKind::InvalidUrl));
                }
            }
        } else {
            // a rootless `//…` path would read back as an authority
            if self.segments.len() >= 2
                && self.segments[0].is_empty()
                && self.segments[1].is_empty()
            {
                return Err(Error::new("//", ErrorKind::InvalidUrl));
            }
            // a leading `segment:` would read back as a scheme
            if self.scheme.is_none() {
                if let Some(first) = self.segments.first() {
                    if split_scheme(first).is_some() {
                        return Err(Error::new(first, ErrorKind::InvalidUrl));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Single query item: `name` or `name=value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryItem {
    pub name: String,
    pub value: Option<String>,
}

impl QueryItem {
    pub fn new(name: &str, value: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            value: value.map(str::to_string),
        }
    }
}

impl fmt::Display for QueryItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}

fn split_scheme(s: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = s.split_once(':')?;
    let mut chars = scheme.chars();
    if chars.next().is_some_and(|c| c.is_ascii_alphabetic()) && chars.all(is_scheme_char) {
        Some((scheme, rest))
    } else {
        None
    }
}

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

fn parse_authority(source: &str, authority: &str, parts: &mut UrlParts) -> Result<()> {
    let hostport = match authority.rsplit_once('@') {
        Some((userinfo, hostport)) => {
            match userinfo.split_once(':') {
                Some((user, password)) => {
                    parts.user = Some(user.to_string());
                    parts.password = Some(password.to_string());
                }
                None => parts.user = Some(userinfo.to_string()),
            }
            hostport
        }
        None => authority,
    };
    // a port colon can only follow a bracketed IPv6 host
    let bracket = hostport.rfind(']').map_or(0, |i| i + 1);
    let (host, port) = match hostport[bracket..].split_once(':') {
        Some((h, port)) => (&hostport[..bracket + h.len()], Some(port)),
        None => (hostport, None),
    };
    parts.host = Some(host.to_string());
    if let Some(port) = port.filter(|p| !p.is_empty()) {
        match port.parse() {
            Ok(port) => parts.port = Some(port),
            Err(_) => return Err(Error::new(source, ErrorKind::InvalidUrl)),
        }
    }
    Ok(())
}

fn parse_query(query: &str) -> Vec<QueryItem> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => QueryItem::new(name, Some(value)),
            None => QueryItem::new(pair, None),
        })
        .collect()
}

fn check(value: &str, forbidden: &[char]) -> Result<()> {
    if value.contains(forbidden) {
        return Err(Error::new(value, ErrorKind::InvalidUrl));
    }
    Ok(())
}
