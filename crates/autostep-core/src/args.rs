//! Argument context: the flat `name → string` mapping scripts are resolved
//! against, and the product record that feeds part of it.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// ArgumentContext
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentContext(BTreeMap<String, String>);

impl ArgumentContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the three layers of a job's context. Later layers win:
    /// process parameters, then the job's own arguments, then the product
    /// record flattened under `product.`.
    pub fn layered(
        parameters: &BTreeMap<String, String>,
        job_args: &BTreeMap<String, String>,
        product: &Product,
    ) -> Self {
        let mut ctx = Self::default();
        ctx.extend(parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
        ctx.extend(job_args.iter().map(|(k, v)| (k.clone(), v.clone())));
        ctx.extend(flatten_product(product));
        ctx
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// True when `key` is bound to a non-empty value.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Extend<(String, String)> for ArgumentContext {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<(String, String)> for ArgumentContext {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// One value of a product record. Dates travel as strings and are kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductField {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<ProductField>),
    Node(BTreeMap<String, ProductField>),
}

pub type Product = BTreeMap<String, ProductField>;

/// Flatten a product record into `product.<path>` keys. Nested records and
/// lists recurse (list items are keyed by index); nulls produce no key.
pub fn flatten_product(product: &Product) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (key, field) in product {
        flatten_into(&format!("product.{key}"), field, &mut out);
    }
    out
}

fn flatten_into(prefix: &str, field: &ProductField, out: &mut BTreeMap<String, String>) {
    match field {
        ProductField::Null => {}
        ProductField::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        ProductField::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        ProductField::Text(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        ProductField::List(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(&format!("{prefix}.{i}"), item, out);
            }
        }
        ProductField::Node(children) => {
            for (key, child) in children {
                flatten_into(&format!("{prefix}.{key}"), child, out);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Deserialize a `name → scalar` map, stringifying numbers and booleans.
/// Remote sources are loose about argument types; the context is not.
pub(crate) fn deserialize_string_map<'de, D>(d: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(d)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| {
            let s = match v {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            Some((k, s))
        })
        .collect())
}
