//! `{{ key }}` placeholder substitution.
//!
//! A placeholder may list fallbacks separated by `|`: `{{ nickname | name }}`
//! resolves to the first alternative with a non-empty value in the argument
//! context. When no alternative resolves, [`MISSING`] is substituted.
//! Substitution is a single left-to-right pass; substituted values are never
//! re-scanned.

use crate::args::ArgumentContext;

/// Text substituted for a placeholder none of whose alternatives resolve.
pub const MISSING: &str = "N/A";

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

pub fn resolve(template: &str, ctx: &ArgumentContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(lookup(&after_open[..end], ctx));
        rest = &after_open[end + CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

fn lookup<'a>(key: &str, ctx: &'a ArgumentContext) -> &'a str {
    key.split('|')
        .map(str::trim)
        .find_map(|alt| ctx.get(alt).filter(|v| !v.is_empty()))
        .unwrap_or(MISSING)
}
