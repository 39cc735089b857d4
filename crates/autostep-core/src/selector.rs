//! Selector routing: static selectors, value-keyed selector tables and the
//! `if`/`then`/`else` guard that swaps them.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::args::ArgumentContext;
use crate::template;

/// Reserved selector-table key used when no other key matched.
pub const DEFAULT_KEY: &str = "default";

// ---------------------------------------------------------------------------
// SelectorTable
// ---------------------------------------------------------------------------

/// Ordered `substring → selector` table. Entries keep their document order,
/// which decides which match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorTable {
    entries: Vec<(String, String)>,
}

impl SelectorTable {
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn default_selector(&self) -> Option<&str> {
        self.get(DEFAULT_KEY)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The selector of the last entry whose key is a substring of `value`.
    pub fn last_match(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| value.contains(k.as_str()))
            .map(|(_, v)| v.as_str())
    }

    /// Last substring match, falling back to the `default` entry.
    pub fn route(&self, value: &str) -> Option<&str> {
        self.last_match(value).or_else(|| self.default_selector())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for SelectorTable {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SelectorTable {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = SelectorTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of substring to selector")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    entries.push((k, v));
                }
                Ok(SelectorTable { entries })
            }
        }

        d.deserialize_map(TableVisitor)
    }
}

// ---------------------------------------------------------------------------
// SelectorSpec
// ---------------------------------------------------------------------------

/// The target of a `then`/`else` branch: one selector or a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSpec {
    Single(String),
    Table(SelectorTable),
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

/// One `{this, eq}` pair of an `if` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guard {
    /// Templated field, e.g. `{{product.color}}`.
    #[serde(rename = "this")]
    pub field: String,
    /// `|`-separated tokens; any token contained in the field passes.
    #[serde(rename = "eq")]
    pub expected: String,
}

impl Guard {
    pub fn new(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
        }
    }

    pub fn passes(&self, ctx: &ArgumentContext) -> bool {
        let resolved = template::resolve(&self.field, ctx);
        self.expected
            .split('|')
            .map(str::trim)
            .any(|token| resolved.contains(token))
    }
}

/// All guards must pass.
pub fn guards_pass(guards: &[Guard], ctx: &ArgumentContext) -> bool {
    guards.iter().all(|g| g.passes(ctx))
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Result of routing an action's selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// Resolved selector; `None` when nothing applied or it resolved empty.
    Selector(Option<String>),
    /// The guard failed and no `else` branch exists.
    GuardFailed,
}

/// Selector sources of one action, borrowed for routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorSources<'a> {
    pub selector: Option<&'a str>,
    pub selectors: Option<&'a SelectorTable>,
    pub guards: &'a [Guard],
    pub then: Option<&'a SelectorSpec>,
    pub otherwise: Option<&'a SelectorSpec>,
}

/// Pick the selector for an action whose value resolved to `value`.
///
/// A guard replaces the base selector or table with its `then`/`else`
/// branch. A table is consulted only for a non-empty textual value; the last
/// key contained in the value wins, then `default`, unless a selector was
/// already chosen. The final selector is template-resolved.
pub fn route(
    sources: SelectorSources<'_>,
    value: Option<&str>,
    ctx: &ArgumentContext,
) -> Routed {
    let mut selector = sources.selector;
    let mut table = sources.selectors;

    if !sources.guards.is_empty() {
        let passed = guards_pass(sources.guards, ctx);
        let branch = if passed {
            sources.then
        } else {
            match sources.otherwise {
                Some(b) => Some(b),
                None => return Routed::GuardFailed,
            }
        };
        match branch {
            Some(SelectorSpec::Single(s)) => selector = Some(s.as_str()),
            Some(SelectorSpec::Table(t)) => table = Some(t),
            None => {}
        }
    }

    if let (Some(value), Some(table)) = (value.filter(|v| !v.is_empty()), table) {
        if let Some(hit) = table.last_match(value) {
            selector = Some(hit);
        }
        if selector.map_or(true, str::is_empty) {
            selector = table.default_selector();
        }
    }

    let resolved = selector
        .map(|s| template::resolve(s, ctx))
        .filter(|s| !s.is_empty());
    Routed::Selector(resolved)
}
