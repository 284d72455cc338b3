//! Bidirectional URL pattern matching and expansion.
//!
//! A [`UrlPattern`] is an ordinary URL whose path segments and
//! query-parameter names may carry the `:` capture prefix.
//! [`UrlPattern::captures`] matches a concrete URL against the pattern and
//! extracts the captured values; [`UrlPattern::expand`] is the inverse,
//! substituting supplied values to produce a concrete URL.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use parse_display::Display;

mod params;
mod parts;

pub use params::{ParamMap, Params};
pub use parts::{QueryItem, UrlParts};

/// URL template whose path segments and query-parameter names may carry
/// the `:` capture prefix.
#[derive(Clone)]
pub struct UrlPattern {
    source: String,
    parts: UrlParts,
}

impl fmt::Debug for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.source)
    }
}
impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl UrlPattern {
    pub fn new(s: &str) -> Result<Self> {
        Ok(Self {
            source: s.to_string(),
            parts: UrlParts::parse(s)?,
        })
    }

    /// Structural view of the pattern.
    pub fn parts(&self) -> &UrlParts {
        &self.parts
    }

    /// Matches `candidate` against the pattern, extracting captured values.
    ///
    /// Scalar components named by the pattern must agree, paths must agree
    /// segment by segment, and the pattern's query items must be satisfied
    /// by the candidate's (a subset relation: extra candidate items are
    /// fine). Binding the same capture token twice is an error, not an
    /// overwrite.
    pub fn captures(&self, candidate: &str) -> Result<ParamMap> {
        self.captures_url(&UrlParts::parse(candidate)?)
    }

    /// [`captures`](Self::captures) over an already decomposed candidate.
    pub fn captures_url(&self, candidate: &UrlParts) -> Result<ParamMap> {
        match_components(&self.source, &self.parts, candidate)?;
        let mut map = ParamMap::new();
        match_path(&self.source, &self.parts.segments, &candidate.segments, &mut map)?;
        match_query(
            &self.source,
            self.parts.query_items(),
            candidate.query_items(),
            &mut map,
        )?;
        Ok(map)
    }

    /// Produces a concrete URL by substituting `params` into the pattern.
    ///
    /// Path captures and valued query captures are required; a query
    /// capture with no value in the pattern is omitted from the output
    /// when `params` does not supply it.
    pub fn expand(&self, mut params: impl Params) -> Result<String> {
        let mut out = self.parts.clone();
        out.segments = expand_path(&self.source, &self.parts.segments, &mut params)?;
        out.query = match &self.parts.query {
            Some(items) => Some(expand_query(&self.source, items, &mut params)?),
            None => None,
        };
        out.compose()
    }

    /// Capture tokens declared by the pattern, path captures first.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        let path = self
            .parts
            .segments
            .iter()
            .map(String::as_str)
            .filter(|s| capture_name(s).is_some());
        let query = self
            .parts
            .query_items()
            .iter()
            .map(|item| item.name.as_str())
            .filter(|s| capture_name(s).is_some());
        path.chain(query)
    }

    pub fn find_param_name(&self, token: &str) -> Option<usize> {
        self.param_names().position(|name| name == token)
    }
}

/// Scalar URL components, in match order.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
#[display(style = "lowercase")]
pub enum Component {
    Scheme,
    Host,
    User,
    Password,
    Port,
    Fragment,
}

const COMPONENTS: [Component; 6] = [
    Component::Scheme,
    Component::Host,
    Component::User,
    Component::Password,
    Component::Port,
    Component::Fragment,
];

fn component_value<'a>(parts: &'a UrlParts, component: Component) -> Option<Cow<'a, str>> {
    match component {
        Component::Scheme => parts.scheme.as_deref().map(Cow::Borrowed),
        Component::Host => parts.host.as_deref().map(Cow::Borrowed),
        Component::User => parts.user.as_deref().map(Cow::Borrowed),
        Component::Password => parts.password.as_deref().map(Cow::Borrowed),
        Component::Port => parts.port.map(|port| Cow::Owned(port.to_string())),
        Component::Fragment => parts.fragment.as_deref().map(Cow::Borrowed),
    }
}

fn match_components(source: &str, pattern: &UrlParts, candidate: &UrlParts) -> Result<()> {
    for component in COMPONENTS {
        let Some(expected) = component_value(pattern, component) else {
            continue;
        };
        if component_value(candidate, component).as_deref() != Some(expected.as_ref()) {
            return Err(Error::new(source, ErrorKind::ComponentMismatch(component)));
        }
    }
    Ok(())
}

fn match_path(
    source: &str,
    pattern: &[String],
    candidate: &[String],
    map: &mut ParamMap,
) -> Result<()> {
    if pattern.len() != candidate.len() {
        return Err(Error::new(source, ErrorKind::PathLengthMismatch));
    }
    for (segment, value) in pattern.iter().zip(candidate) {
        if capture_name(segment).is_some() {
            bind(source, map, segment, value)?;
        }
    }
    for (segment, value) in pattern.iter().zip(candidate) {
        let filled = map.get(segment).unwrap_or(segment.as_str());
        if filled != value.as_str() {
            return Err(Error::new(source, ErrorKind::PathMismatch));
        }
    }
    Ok(())
}

fn match_query(
    source: &str,
    pattern: &[QueryItem],
    candidate: &[QueryItem],
    map: &mut ParamMap,
) -> Result<()> {
    // last write wins when the candidate repeats a name
    let mut lookup = BTreeMap::new();
    for item in candidate {
        lookup.insert(item.name.as_str(), item.value.as_deref());
    }
    let mut required = Vec::new();
    for item in pattern {
        match capture_name(&item.name) {
            Some(name) => {
                let bound = lookup.get(name).copied().flatten();
                if let Some(value) = bound {
                    bind(source, map, &item.name, value)?;
                }
                if item.value.is_some() {
                    push_unique(
                        &mut required,
                        QueryItem::new(name, bound.or(item.value.as_deref())),
                    );
                }
            }
            None => push_unique(&mut required, item.clone()),
        }
    }
    let missing: Vec<QueryItem> = required
        .into_iter()
        .filter(|item| !candidate.contains(item))
        .collect();
    if !missing.is_empty() {
        return Err(Error::new(source, ErrorKind::MissingQueryItems(missing)));
    }
    Ok(())
}

fn expand_path(source: &str, pattern: &[String], params: &mut impl Params) -> Result<Vec<String>> {
    let mut segments = Vec::with_capacity(pattern.len());
    for segment in pattern {
        if capture_name(segment).is_some() {
            match params.param(segment) {
                Some(value) => segments.push(value.into_owned()),
                None => {
                    return Err(Error::new(
                        source,
                        ErrorKind::MissingParameter(segment.clone()),
                    ));
                }
            }
        } else {
            segments.push(segment.clone());
        }
    }
    Ok(segments)
}

fn expand_query(
    source: &str,
    pattern: &[QueryItem],
    params: &mut impl Params,
) -> Result<Vec<QueryItem>> {
    let mut items = Vec::with_capacity(pattern.len());
    for item in pattern {
        match capture_name(&item.name) {
            Some(name) => match params.param(&item.name) {
                Some(value) => items.push(QueryItem::new(name, Some(value.as_ref()))),
                None if item.value.is_none() => {}
                None => {
                    return Err(Error::new(
                        source,
                        ErrorKind::MissingParameter(item.name.clone()),
                    ));
                }
            },
            None => items.push(item.clone()),
        }
    }
    Ok(items)
}

fn capture_name(s: &str) -> Option<&str> {
    s.strip_prefix(':')
}

fn bind(source: &str, map: &mut ParamMap, token: &str, value: &str) -> Result<()> {
    if map.contains(token) {
        return Err(Error::new(
            source,
            ErrorKind::DuplicateParameter(token.to_string()),
        ));
    }
    map.insert(token, value);
    Ok(())
}

fn push_unique(items: &mut Vec<QueryItem>, item: QueryItem) {
    if !items.contains(&item) {
        items.push(item);
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a match or an expansion failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A scalar component named by the pattern differs from the candidate's.
    ComponentMismatch(Component),
    PathLengthMismatch,
    PathMismatch,
    /// Two capture sites in one pattern would bind the same token.
    DuplicateParameter(String),
    /// Literal or required query constraints the candidate does not
    /// satisfy, all of them.
    MissingQueryItems(Vec<QueryItem>),
    /// Expansion needs a value the parameter map does not supply.
    MissingParameter(String),
    /// The URL could not be decomposed, or recomposition would not parse
    /// back to the same structure.
    InvalidUrl,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ComponentMismatch(component) => write!(f, "component mismatch ({component})"),
            Self::PathLengthMismatch => write!(f, "path length mismatch"),
            Self::PathMismatch => write!(f, "path mismatch"),
            Self::DuplicateParameter(token) => write!(f, "duplicate parameter `{token}`"),
            Self::MissingQueryItems(items) => {
                write!(f, "missing query items `")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str("&")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("`")
            }
            Self::MissingParameter(token) => write!(f, "missing parameter `{token}`"),
            Self::InvalidUrl => f.write_str("invalid url"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Error {
    source: String,
    kind: ErrorKind,
}

impl Error {
    pub(crate) fn new(source: &str, kind: ErrorKind) -> Self {
        Self {
            source: source.to_string(),
            kind,
        }
    }
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (\"{}\")", self.kind, self.source)
    }
}

impl std::error::Error for Error {}
