use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::action::{Action, ActionKind};
use crate::config::{ConfigWarning, WarnLevel};
use crate::error::{AutostepError, Result};
use crate::script::Script;

/// A named collection of scripts sharing a base URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "url")]
    pub base_url: String,
    /// Cookie-consent button clicked after every navigation, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
    #[serde(default)]
    pub scripts: BTreeMap<String, Script>,
}

impl Site {
    pub fn script(&self, name: &str) -> Result<&Script> {
        self.scripts
            .get(name)
            .ok_or_else(|| AutostepError::ScriptNotFound {
                site: self.name.clone(),
                script: name.to_string(),
            })
    }

    /// Decode a site definition; `.json` files are read as JSON, anything
    /// else as YAML. A missing `name` defaults to the file stem.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut site: Site = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&data)?,
            _ => serde_yaml::from_str(&data)?,
        };
        if site.name.is_empty() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                site.name = stem.to_string();
            }
        }
        Ok(site)
    }

    /// Problems a run would hit that decoding does not catch.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.base_url.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("site '{}' has no url", self.name),
            });
        }

        for (name, script) in &self.scripts {
            if let Some(condition) = &script.condition {
                if !self.scripts.contains_key(&condition.else_script) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!(
                            "script '{}': condition else script '{}' does not exist",
                            name, condition.else_script
                        ),
                    });
                }
                if &condition.else_script == name {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!("script '{}': condition else script is itself", name),
                    });
                }
            }
            if script.actions.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("script '{}' has no actions", name),
                });
            }
            check_actions(name, &script.actions, &mut warnings);
        }

        warnings
    }
}

fn check_actions(script: &str, actions: &[Action], warnings: &mut Vec<ConfigWarning>) {
    for (i, action) in actions.iter().enumerate() {
        let has_source = action.selector.is_some()
            || action.selectors.is_some()
            || action.then.is_some()
            || action.otherwise.is_some();
        if action.kind.requires_selector() && !has_source {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "script '{}': action {} ({}) has no selector",
                    script,
                    i,
                    action.kind.name()
                ),
            });
        }
        if action.selectors.as_ref().is_some_and(|t| t.is_empty()) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("script '{}': action {} has an empty selector table", script, i),
            });
        }
        if let ActionKind::For { body } = &action.kind {
            if action.value.is_none() && action.selector.is_none() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!(
                        "script '{}': for action {} has neither a count nor a selector",
                        script, i
                    ),
                });
            }
            check_actions(script, body, warnings);
        }
    }
}
