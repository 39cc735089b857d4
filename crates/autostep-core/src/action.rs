//! Action nodes: one executable step of a script.
//!
//! Every page failure is caught here and turned into an [`Outcome`]. A hard
//! failure closes the page before returning [`Outcome::Abort`]; that is the
//! only place the interpreter releases a page on its own.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::args::ArgumentContext;
use crate::driver::Page;
use crate::env::ExecEnv;
use crate::selector::{self, Guard, Routed, SelectorSources, SelectorSpec, SelectorTable};
use crate::template;

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// One step of a script as written in a site definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<SelectorTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ActionValue>,
    #[serde(rename = "if", default, skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<Guard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<SelectorSpec>,
    #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<SelectorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(rename = "continue", default)]
    pub continue_on_failure: bool,
    #[serde(default)]
    pub relaunch: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    Input,
    Wait,
    Human {
        #[serde(default)]
        text: String,
    },
    Upload,
    Return,
    For {
        #[serde(rename = "for", default)]
        body: Vec<Action>,
    },
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Input => "input",
            ActionKind::Wait => "wait",
            ActionKind::Human { .. } => "human",
            ActionKind::Upload => "upload",
            ActionKind::Return => "return",
            ActionKind::For { .. } => "for",
        }
    }

    pub fn requires_selector(&self) -> bool {
        matches!(self, ActionKind::Click | ActionKind::Input | ActionKind::Upload)
    }
}

/// A literal `value`: text is templated, numbers are used as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionValue {
    Number(serde_json::Number),
    Text(String),
}

impl ActionValue {
    fn resolve(&self, ctx: &ArgumentContext) -> ActionValue {
        match self {
            ActionValue::Text(t) => ActionValue::Text(template::resolve(t, ctx)),
            other => other.clone(),
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            ActionValue::Text(t) => Some(t),
            ActionValue::Number(_) => None,
        }
    }

    fn to_text(&self) -> String {
        match self {
            ActionValue::Text(t) => t.clone(),
            ActionValue::Number(n) => n.to_string(),
        }
    }

    /// Milliseconds for `wait`.
    fn as_millis(&self) -> Option<u64> {
        match self {
            ActionValue::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            ActionValue::Text(t) => {
                let t = t.trim();
                t.parse::<u64>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64))
            }
        }
    }

    /// Explicit repeat count for `for`; zero or unparseable is "not given".
    fn as_count(&self) -> Option<u64> {
        self.as_millis().filter(|n| *n > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    #[serde(flatten)]
    pub check: ValidationCheck,
    /// Treat a failed check as a skip.
    #[serde(rename = "continue", default)]
    pub continue_on_failure: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationCheck {
    /// Some frame URL must contain `value`.
    Iframe { value: String },
    /// The element's `checked` property must equal `value`.
    Input { value: CheckedValue },
}

/// Expected `checked` state, written either as a bool or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckedValue {
    Bool(bool),
    Text(String),
}

impl CheckedValue {
    fn normalized(&self) -> String {
        match self {
            CheckedValue::Bool(b) => b.to_string(),
            CheckedValue::Text(t) => t.trim().to_ascii_lowercase(),
        }
    }

    /// Compare against a property read from the page. A missing property
    /// counts as `false`.
    fn matches(&self, actual: &serde_json::Value) -> bool {
        let actual = match actual {
            serde_json::Value::Null => "false".to_string(),
            serde_json::Value::String(s) => s.trim().to_ascii_lowercase(),
            other => other.to_string(),
        };
        self.normalized() == actual
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Result code of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Proceed,
    Skip,
    Abort,
}

impl Outcome {
    pub fn code(self) -> i8 {
        match self {
            Outcome::Proceed => 1,
            Outcome::Skip => 0,
            Outcome::Abort => -1,
        }
    }
}

/// Everything an action needs while it runs.
pub struct ActionCx<'a> {
    pub args: &'a ArgumentContext,
    pub page: &'a dyn Page,
    pub env: &'a ExecEnv,
    pub site: &'a str,
    pub script: &'a str,
}

/// Why an action did not get to (or through) its effect.
enum Failure {
    /// A `validation` check did not hold.
    Mismatch(String),
    Other(String),
}

impl Action {
    fn sources(&self) -> SelectorSources<'_> {
        SelectorSources {
            selector: self.selector.as_deref(),
            selectors: self.selectors.as_ref(),
            guards: &self.guards,
            then: self.then.as_ref(),
            otherwise: self.otherwise.as_ref(),
        }
    }

    /// `relaunch` only applies to actions with a direct effect, not to `for`.
    pub fn relaunches(&self) -> bool {
        self.relaunch && !matches!(self.kind, ActionKind::For { .. })
    }

    /// Run the action against `cx.page`.
    pub fn run<'a>(&'a self, cx: &'a ActionCx<'a>) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let kind = self.kind.name();
            let value = self.value.as_ref().map(|v| v.resolve(cx.args));

            let text_value = value.as_ref().and_then(ActionValue::as_text);
            let selector = match selector::route(self.sources(), text_value, cx.args) {
                Routed::Selector(s) => s,
                Routed::GuardFailed => {
                    return self
                        .fail(cx, Failure::Other("guard failed and no else branch".into()))
                        .await
                }
            };

            debug!(
                site = cx.site,
                script = cx.script,
                action = kind,
                selector = selector.as_deref().unwrap_or(""),
                "running action"
            );

            if let Err(failure) = self.validate(selector.as_deref(), cx).await {
                return self.fail(cx, failure).await;
            }

            match self.perform(selector.as_deref(), value.as_ref(), cx).await {
                Ok(outcome) => outcome,
                Err(failure) => self.fail(cx, failure).await,
            }
        })
    }

    async fn validate(&self, selector: Option<&str>, cx: &ActionCx<'_>) -> Result<(), Failure> {
        let Some(selector) = selector else {
            if self.kind.requires_selector() {
                return Err(Failure::Other("no selector".into()));
            }
            return Ok(());
        };

        cx.page
            .wait_for_selector(selector, cx.env.timeouts.selector)
            .await
            .map_err(|e| Failure::Other(e.to_string()))?;

        let Some(validation) = &self.validation else {
            return Ok(());
        };
        match &validation.check {
            ValidationCheck::Iframe { value } => {
                let frames = cx
                    .page
                    .frame_urls()
                    .await
                    .map_err(|e| Failure::Other(e.to_string()))?;
                if !frames.iter().any(|url| url.contains(value.as_str())) {
                    return Err(Failure::Mismatch(format!("no frame matching '{value}'")));
                }
            }
            ValidationCheck::Input { value } => {
                let checked = cx
                    .page
                    .property(selector, "checked")
                    .await
                    .map_err(|e| Failure::Other(e.to_string()))?;
                if !value.matches(&checked) {
                    return Err(Failure::Mismatch(format!(
                        "checked is not {}",
                        value.normalized()
                    )));
                }
            }
        }
        Ok(())
    }

    async fn perform(
        &self,
        selector: Option<&str>,
        value: Option<&ActionValue>,
        cx: &ActionCx<'_>,
    ) -> Result<Outcome, Failure> {
        let required = || selector.ok_or_else(|| Failure::Other("no selector".into()));
        let driver = |e: crate::driver::DriverError| Failure::Other(e.to_string());

        match &self.kind {
            ActionKind::Click => {
                cx.page.click(required()?).await.map_err(driver)?;
            }
            ActionKind::Input => {
                let selector = required()?;
                let text = value.map(ActionValue::to_text).unwrap_or_default();
                cx.page.click(selector).await.map_err(driver)?;
                cx.page
                    .type_text(&text, cx.env.timeouts.type_delay)
                    .await
                    .map_err(driver)?;
            }
            ActionKind::Wait => {
                let millis = match value.map(|v| (v, v.as_millis())) {
                    Some((_, Some(ms))) => ms,
                    Some((v, None)) => {
                        warn!(value = %v.to_text(), "wait value is not a number of milliseconds");
                        0
                    }
                    None => 0,
                };
                tokio::time::sleep(Duration::from_millis(millis)).await;
            }
            ActionKind::Human { text } => {
                info!(site = cx.site, script = cx.script, "waiting for operator");
                cx.env
                    .gate
                    .request(cx.site, cx.script, text)
                    .await
                    .map_err(|e| Failure::Other(e.to_string()))?;
            }
            ActionKind::Upload => {
                let selector = required()?;
                let Some(asset) = value.map(ActionValue::to_text).filter(|a| !a.is_empty()) else {
                    return Err(Failure::Other("upload without an asset path".into()));
                };
                let path = match cx.env.assets.ensure(&asset).await {
                    Ok(path) => path,
                    Err(e) => {
                        warn!(asset = %asset, error = %e, "asset unavailable, skipping upload");
                        return Ok(Outcome::Skip);
                    }
                };
                cx.page.upload_file(selector, &path).await.map_err(driver)?;
            }
            ActionKind::Return => {}
            ActionKind::For { body } => {
                let count = match (value.and_then(ActionValue::as_count), selector) {
                    (Some(n), _) => n,
                    (None, Some(selector)) => cx
                        .page
                        .property(selector, "childElementCount")
                        .await
                        .map_err(driver)?
                        .as_u64()
                        .unwrap_or(0),
                    (None, None) => return Err(Failure::Other("for without count or selector".into())),
                };
                debug!(count, steps = body.len(), "looping");
                for _ in 0..count {
                    for child in body {
                        if child.run(cx).await == Outcome::Abort {
                            return Ok(Outcome::Abort);
                        }
                    }
                }
            }
        }
        Ok(Outcome::Proceed)
    }

    /// Downgrade a failure to a skip when allowed, otherwise close the page.
    async fn fail(&self, cx: &ActionCx<'_>, failure: Failure) -> Outcome {
        let (reason, escaped) = match failure {
            Failure::Mismatch(r) => {
                let escaped = self.continue_on_failure
                    || self.validation.as_ref().is_some_and(|v| v.continue_on_failure);
                (r, escaped)
            }
            Failure::Other(r) => (r, self.continue_on_failure),
        };

        if escaped {
            debug!(site = cx.site, script = cx.script, action = self.kind.name(), %reason, "action skipped");
            return Outcome::Skip;
        }

        warn!(site = cx.site, script = cx.script, action = self.kind.name(), %reason, "action aborted script");
        if let Err(e) = cx.page.close().await {
            debug!(error = %e, "closing page after abort");
        }
        Outcome::Abort
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetStore;
    use crate::human::ConfirmationGate;
    use crate::testing::{FakeBrowser, FakePage, PageCall};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn env_with(page: &FakePage, assets: AssetStore) -> ExecEnv {
        ExecEnv::new(
            Arc::new(FakeBrowser::new(page.clone())),
            Arc::new(ConfirmationGate::default()),
            Arc::new(assets),
        )
    }

    fn env(page: &FakePage) -> ExecEnv {
        env_with(page, AssetStore::new("/nonexistent", None))
    }

    fn action(yaml: &str) -> Action {
        serde_yaml::from_str(yaml).unwrap()
    }

    async fn run(a: &Action, page: &FakePage, env: &ExecEnv, args: &ArgumentContext) -> Outcome {
        let cx = ActionCx {
            args,
            page,
            env,
            site: "demo",
            script: "test",
        };
        a.run(&cx).await
    }

    #[test]
    fn decodes_variants() {
        let a = action("type: human\ntext: solve the captcha");
        assert_eq!(a.kind, ActionKind::Human { text: "solve the captcha".into() });

        let a = action("type: for\nvalue: 2\nfor:\n  - type: click\n    selector: '#x'\n");
        match a.kind {
            ActionKind::For { body } => assert_eq!(body.len(), 1),
            other => panic!("expected for, got {other:?}"),
        }
        assert_eq!(a.value, Some(ActionValue::Number(2.into())));
    }

    #[test]
    fn unknown_type_is_decode_error() {
        assert!(serde_yaml::from_str::<Action>("type: hover\nselector: a").is_err());
    }

    #[test]
    fn decodes_validation_and_flags() {
        let a = action(
            "type: click\nselector: '#ok'\ncontinue: true\nrelaunch: true\nvalidation:\n  type: iframe\n  value: captcha\n  continue: true\n",
        );
        assert!(a.continue_on_failure);
        assert!(a.relaunches());
        let v = a.validation.unwrap();
        assert_eq!(v.check, ValidationCheck::Iframe { value: "captcha".into() });
        assert!(v.continue_on_failure);
    }

    #[test]
    fn input_validation_value_accepts_text_or_bool() {
        let quoted = action("type: click\nselector: '#terms'\nvalidation:\n  type: input\n  value: \"true\"\n");
        let bare = action("type: click\nselector: '#terms'\nvalidation:\n  type: input\n  value: true\n");
        assert_eq!(
            quoted.validation.unwrap().check,
            ValidationCheck::Input { value: CheckedValue::Text("true".into()) }
        );
        assert_eq!(
            bare.validation.unwrap().check,
            ValidationCheck::Input { value: CheckedValue::Bool(true) }
        );
    }

    #[test]
    fn for_loops_never_relaunch() {
        let a = action("type: for\nvalue: 2\nrelaunch: true\nfor:\n  - type: wait\n");
        assert!(a.relaunch);
        assert!(!a.relaunches());
    }

    #[tokio::test]
    async fn click_without_selector_aborts_and_closes() {
        let page = FakePage::new();
        let env = env(&page);
        let out = run(&action("type: click"), &page, &env, &ArgumentContext::new()).await;
        assert_eq!(out, Outcome::Abort);
        assert_eq!(out.code(), -1);
        assert!(page.is_closed());
    }

    #[tokio::test]
    async fn missing_selector_with_continue_skips() {
        let page = FakePage::new();
        let env = env(&page);
        let a = action("type: click\nselector: '#never'\ncontinue: true");
        let out = run(&a, &page, &env, &ArgumentContext::new()).await;
        assert_eq!(out, Outcome::Skip);
        assert!(!page.is_closed());
        assert!(!page.calls().contains(&PageCall::Click("#never".into())));
    }

    #[tokio::test]
    async fn input_clicks_then_types_resolved_value() {
        let page = FakePage::new().with_selector("#user");
        let env = env(&page);
        let mut args = ArgumentContext::new();
        args.insert("user", "alice");
        let a = action("type: input\nselector: '#user'\nvalue: '{{user}}'");
        assert_eq!(run(&a, &page, &env, &args).await, Outcome::Proceed);
        assert_eq!(
            page.effects(),
            vec![PageCall::Click("#user".into()), PageCall::Type("alice".into())]
        );
    }

    #[tokio::test]
    async fn selector_table_routes_click() {
        let page = FakePage::new().with_selector("#s1").with_selector("#s2");
        let env = env(&page);
        let mut args = ArgumentContext::new();
        args.insert("product.title", "iphone 12");
        let a = action(
            "type: click\nvalue: '{{product.title}}'\nselectors:\n  iphone: '#s1'\n  default: '#s2'\n",
        );
        assert_eq!(run(&a, &page, &env, &args).await, Outcome::Proceed);
        assert_eq!(page.effects(), vec![PageCall::Click("#s1".into())]);
    }

    #[tokio::test]
    async fn failed_guard_without_else_uses_continue_flag() {
        let page = FakePage::new().with_selector("#red");
        let env = env(&page);
        let mut args = ArgumentContext::new();
        args.insert("color", "green");

        let skip = action("type: click\nif:\n  - this: '{{color}}'\n    eq: red\nthen: '#red'\ncontinue: true");
        assert_eq!(run(&skip, &page, &env, &args).await, Outcome::Skip);
        assert!(!page.is_closed());

        let abort = action("type: click\nif:\n  - this: '{{color}}'\n    eq: red\nthen: '#red'");
        assert_eq!(run(&abort, &page, &env, &args).await, Outcome::Abort);
        assert!(page.is_closed());
    }

    #[tokio::test]
    async fn iframe_validation_continue_only_covers_mismatch() {
        let page = FakePage::new()
            .with_selector("#pay")
            .with_frame("https://shop.example/checkout");
        let env = env(&page);
        let a = action("type: click\nselector: '#pay'\nvalidation:\n  type: iframe\n  value: captcha\n  continue: true\n");
        assert_eq!(run(&a, &page, &env, &ArgumentContext::new()).await, Outcome::Skip);

        let absent = action("type: click\nselector: '#gone'\nvalidation:\n  type: iframe\n  value: captcha\n  continue: true\n");
        assert_eq!(run(&absent, &page, &env, &ArgumentContext::new()).await, Outcome::Abort);
    }

    #[tokio::test]
    async fn iframe_validation_passes_when_frame_present() {
        let page = FakePage::new()
            .with_selector("#pay")
            .with_frame("https://captcha.example/challenge");
        let env = env(&page);
        let a = action("type: click\nselector: '#pay'\nvalidation:\n  type: iframe\n  value: captcha\n");
        assert_eq!(run(&a, &page, &env, &ArgumentContext::new()).await, Outcome::Proceed);
        assert!(page.calls().contains(&PageCall::Click("#pay".into())));
    }

    #[tokio::test]
    async fn input_validation_compares_checked_state() {
        let page = FakePage::new()
            .with_selector("#terms")
            .with_property("#terms", "checked", serde_json::json!(false));
        let env = env(&page);
        let ok = action("type: click\nselector: '#terms'\nvalidation:\n  type: input\n  value: false\n");
        assert_eq!(run(&ok, &page, &env, &ArgumentContext::new()).await, Outcome::Proceed);

        let bad = action("type: click\nselector: '#terms'\nvalidation:\n  type: input\n  value: true\n");
        assert_eq!(run(&bad, &page, &env, &ArgumentContext::new()).await, Outcome::Abort);
        assert!(page.is_closed());
    }

    #[tokio::test]
    async fn input_validation_normalizes_text_values() {
        let page = FakePage::new()
            .with_selector("#terms")
            .with_property("#terms", "checked", serde_json::json!(true));
        let env = env(&page);
        let ok = action("type: click\nselector: '#terms'\nvalidation:\n  type: input\n  value: \" True \"\n");
        assert_eq!(run(&ok, &page, &env, &ArgumentContext::new()).await, Outcome::Proceed);

        let bad = action("type: click\nselector: '#terms'\nvalidation:\n  type: input\n  value: \"false\"\n");
        assert_eq!(run(&bad, &page, &env, &ArgumentContext::new()).await, Outcome::Abort);
    }

    #[tokio::test]
    async fn for_uses_child_count_when_value_is_zero() {
        let page = FakePage::new()
            .with_selector("#list")
            .with_selector("#item")
            .with_property("#list", "childElementCount", serde_json::json!(3));
        let env = env(&page);
        let a = action("type: for\nselector: '#list'\nvalue: 0\nfor:\n  - type: click\n    selector: '#item'\n");
        assert_eq!(run(&a, &page, &env, &ArgumentContext::new()).await, Outcome::Proceed);
        let clicks = page.effects().into_iter().filter(|c| *c == PageCall::Click("#item".into())).count();
        assert_eq!(clicks, 3);
    }

    #[tokio::test]
    async fn for_value_overrides_child_count() {
        let page = FakePage::new()
            .with_selector("#list")
            .with_selector("#item")
            .with_property("#list", "childElementCount", serde_json::json!(5));
        let env = env(&page);
        let a = action("type: for\nselector: '#list'\nvalue: 2\nfor:\n  - type: click\n    selector: '#item'\n");
        assert_eq!(run(&a, &page, &env, &ArgumentContext::new()).await, Outcome::Proceed);
        let clicks = page.effects().into_iter().filter(|c| *c == PageCall::Click("#item".into())).count();
        assert_eq!(clicks, 2);
    }

    #[tokio::test]
    async fn nested_abort_stops_loop() {
        let page = FakePage::new();
        let env = env(&page);
        let a = action("type: for\nvalue: 4\nfor:\n  - type: click\n    selector: '#missing'\n");
        assert_eq!(run(&a, &page, &env, &ArgumentContext::new()).await, Outcome::Abort);
        let waits = page.calls().into_iter().filter(|c| matches!(c, PageCall::WaitFor(_))).count();
        assert_eq!(waits, 1);
    }

    #[tokio::test]
    async fn upload_fetch_failure_skips() {
        let page = FakePage::new().with_selector("input[type=file]");
        let env = env(&page);
        let a = action("type: upload\nselector: 'input[type=file]'\nvalue: /images/a.jpg");
        assert_eq!(run(&a, &page, &env, &ArgumentContext::new()).await, Outcome::Skip);
        assert!(!page.is_closed());
    }

    #[tokio::test]
    async fn upload_attaches_cached_asset() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/a.jpg"), b"jpg").unwrap();
        let page = FakePage::new().with_selector("#file");
        let env = env_with(&page, AssetStore::new(dir.path(), None));
        let a = action("type: upload\nselector: '#file'\nvalue: '{{img}}'");
        let mut args = ArgumentContext::new();
        args.insert("img", "/images/a.jpg");
        assert_eq!(run(&a, &page, &env, &args).await, Outcome::Proceed);
        assert_eq!(
            page.effects(),
            vec![PageCall::Upload("#file".into(), dir.path().join("images/a.jpg"))]
        );
    }

    #[tokio::test]
    async fn wait_and_return_touch_nothing() {
        let page = FakePage::new();
        let env = env(&page);
        assert_eq!(run(&action("type: wait\nvalue: 1"), &page, &env, &ArgumentContext::new()).await, Outcome::Proceed);
        assert_eq!(run(&action("type: wait\nvalue: soon"), &page, &env, &ArgumentContext::new()).await, Outcome::Proceed);
        assert_eq!(run(&action("type: return"), &page, &env, &ArgumentContext::new()).await, Outcome::Proceed);
        assert!(page.calls().is_empty());
    }

    #[tokio::test]
    async fn human_waits_for_acknowledgement() {
        let page = FakePage::new();
        let env = env(&page);
        let gate = env.gate.clone();
        let a = action("type: human\ntext: confirm the payment");

        let waiter = tokio::spawn(async move { run(&a, &page, &env, &ArgumentContext::new()).await });
        while gate.pending().is_none() {
            tokio::task::yield_now().await;
        }
        assert_eq!(gate.pending().unwrap().message, "confirm the payment");
        assert!(gate.acknowledge());
        assert_eq!(waiter.await.unwrap(), Outcome::Proceed);
    }
}
