use std::cmp::Eq;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};

/// Value source for [`UrlPattern::expand`](crate::UrlPattern::expand),
/// keyed by capture token (the `:`-prefixed name).
pub trait Params {
    fn param(&mut self, token: &str) -> Option<Cow<'_, str>>;
}

impl Params for () {
    fn param(&mut self, _token: &str) -> Option<Cow<'_, str>> {
        None
    }
}

impl Params for &ParamMap {
    fn param(&mut self, token: &str) -> Option<Cow<'_, str>> {
        self.get(token).map(Cow::Borrowed)
    }
}

impl<K> Params for &HashMap<K, &str>
where
    K: std::borrow::Borrow<str> + Hash + Eq,
{
    fn param(&mut self, token: &str) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.get(token)?))
    }
}

impl<K> Params for &HashMap<K, String>
where
    K: std::borrow::Borrow<str> + Hash + Eq,
{
    fn param(&mut self, token: &str) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.get(token)?))
    }
}

impl<K> Params for &HashMap<K, &dyn fmt::Display>
where
    K: std::borrow::Borrow<str> + Hash + Eq,
{
    fn param(&mut self, token: &str) -> Option<Cow<'_, str>> {
        Some(self.get(token)?.to_string().into())
    }
}

impl<K> Params for &BTreeMap<K, &str>
where
    K: std::borrow::Borrow<str> + Ord,
{
    fn param(&mut self, token: &str) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.get(token)?))
    }
}

impl<K> Params for &BTreeMap<K, String>
where
    K: std::borrow::Borrow<str> + Ord,
{
    fn param(&mut self, token: &str) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.get(token)?))
    }
}

impl<K> Params for &BTreeMap<K, &dyn fmt::Display>
where
    K: std::borrow::Borrow<str> + Ord,
{
    fn param(&mut self, token: &str) -> Option<Cow<'_, str>> {
        Some(self.get(token)?.to_string().into())
    }
}

/// Parameter values captured by a match, keyed by capture token.
///
/// Keys are unique; a match that would bind the same key twice fails
/// instead of overwriting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamMap(BTreeMap<String, String>);

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }
    /// Inserts a value, returning the one previously bound to `token`.
    pub fn insert(&mut self, token: &str, value: &str) -> Option<String> {
        self.0.insert(token.to_string(), value.to_string())
    }
    pub fn get(&self, token: &str) -> Option<&str> {
        self.0.get(token).map(String::as_str)
    }
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains_key(token)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Iterates entries in token order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ParamMap {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl FromIterator<(String, String)> for ParamMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(String, String)> for ParamMap {
    fn extend<T: IntoIterator<Item = (String, String)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ParamMap {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
