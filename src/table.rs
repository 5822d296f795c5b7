//! Verbs, handler targets and the ordered action tables every definition is
//! compiled from.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RouteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Verb {
    /// Every verb the router accepts, in the order fallback routes list them.
    pub const ALL: [Verb; 7] = [
        Verb::Get,
        Verb::Head,
        Verb::Post,
        Verb::Put,
        Verb::Patch,
        Verb::Delete,
        Verb::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Head => "HEAD",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RouteError::UnknownVerb(s.to_string()))
    }
}

/// The verb entry of one action: a plain route or a "match any of" route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Methods {
    One(Verb),
    Any(Vec<Verb>),
}

impl From<Verb> for Methods {
    fn from(verb: Verb) -> Self {
        Methods::One(verb)
    }
}

impl From<Vec<Verb>> for Methods {
    fn from(verbs: Vec<Verb>) -> Self {
        Methods::Any(verbs)
    }
}

impl<const N: usize> From<[Verb; N]> for Methods {
    fn from(verbs: [Verb; N]) -> Self {
        Methods::Any(verbs.to_vec())
    }
}

/// `controller@action`: what a registered route dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerTarget {
    pub controller: String,
    pub action: String,
}

impl HandlerTarget {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for HandlerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.controller, self.action)
    }
}

/// Insertion-ordered action -> value table.
///
/// Iteration order is registration order, so it is never sorted or hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTable<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for ActionTable<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> ActionTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ActionTable::insert`].
    pub fn with(mut self, action: impl Into<String>, value: impl Into<V>) -> Self {
        self.insert(action, value.into());
        self
    }

    /// Replaces the value of an existing action in place, or appends a new one.
    pub fn insert(&mut self, action: impl Into<String>, value: V) {
        let action = action.into();
        match self.entries.iter_mut().find(|(k, _)| *k == action) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((action, value)),
        }
    }

    pub fn get(&self, action: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k == action)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Left-base, right-override merge: keys of `overrides` already present in
    /// `self` keep their position and take the new value, the rest are appended
    /// in their own order.
    pub fn merge(mut self, overrides: ActionTable<V>) -> Self {
        for (action, value) in overrides.entries {
            self.insert(action, value);
        }
        self
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for ActionTable<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = ActionTable::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

impl<V> IntoIterator for ActionTable<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
