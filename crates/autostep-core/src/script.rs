//! Scripts: an ordered action list bound to one page of a site.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::action::{Action, ActionCx, Outcome};
use crate::args::{deserialize_string_map, ArgumentContext};
use crate::driver::{Page, PageBox};
use crate::env::ExecEnv;
use crate::error::{AutostepError, Result};
use crate::site::Site;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Absolute URL, or a path joined onto the site's base URL.
    pub page: String,
    /// Declared arguments and their defaults; an empty default is required.
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub args: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Keep the page open after the last action without reporting success.
    #[serde(default)]
    pub debug: bool,
}

/// Entry guard checked after navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub selector: String,
    #[serde(rename = "type", default)]
    pub polarity: Polarity,
    #[serde(rename = "action", default, skip_serializing_if = "Option::is_none")]
    pub on_found: Option<ConditionAction>,
    /// Script of the same site run when the condition does not hold.
    #[serde(rename = "else")]
    pub else_script: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Exists,
    #[default]
    NotExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionAction {
    Click,
}

impl Condition {
    fn holds(&self, found: bool) -> bool {
        match self.polarity {
            Polarity::Exists => found,
            Polarity::NotExists => !found,
        }
    }
}

/// How a script run ended.
pub enum ScriptOutcome {
    /// Every action ran; the page is handed back for reuse.
    Completed(PageBox),
    /// A debug script finished. The page stays open but the run is not a
    /// success.
    Held(PageBox),
    /// An action aborted; the page has been closed.
    Aborted,
}

impl ScriptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScriptOutcome::Completed(_))
    }

    pub fn into_page(self) -> Option<PageBox> {
        match self {
            ScriptOutcome::Completed(p) | ScriptOutcome::Held(p) => Some(p),
            ScriptOutcome::Aborted => None,
        }
    }
}

impl fmt::Debug for ScriptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptOutcome::Completed(_) => f.write_str("Completed(..)"),
            ScriptOutcome::Held(_) => f.write_str("Held(..)"),
            ScriptOutcome::Aborted => f.write_str("Aborted"),
        }
    }
}

impl Script {
    /// Fill declared defaults into a copy of `ctx`. A declared argument with
    /// an empty default must already be bound to a non-empty value.
    pub fn complete_args(&self, ctx: &ArgumentContext) -> Result<ArgumentContext> {
        let mut out = ctx.clone();
        for (name, default) in &self.args {
            if out.is_set(name) {
                continue;
            }
            if default.is_empty() {
                return Err(AutostepError::MissingArgument(name.clone()));
            }
            out.insert(name.clone(), default.clone());
        }
        Ok(out)
    }

    pub fn target_url(&self, base_url: &str) -> String {
        if self.page.contains("://") {
            self.page.clone()
        } else {
            format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                self.page.trim_start_matches('/')
            )
        }
    }
}

/// Run script `name` of `site`, on `page` if given or on a fresh page.
///
/// A failed condition runs the `else` script on the same page and retries
/// from navigation. Else scripts nested under this run spend from the same
/// budget, so at most `env.max_condition_retries` else runs happen before
/// the run fails. An action flagged `relaunch` restarts the script from
/// navigation once it succeeds.
pub fn run_script<'a>(
    site: &'a Site,
    name: &'a str,
    args: &'a ArgumentContext,
    page: Option<PageBox>,
    env: &'a ExecEnv,
) -> BoxFuture<'a, Result<ScriptOutcome>> {
    Box::pin(async move {
        let mut spent = 0u32;
        run_with_budget(site, name, args, page, env, &mut spent).await
    })
}

fn run_with_budget<'a>(
    site: &'a Site,
    name: &'a str,
    args: &'a ArgumentContext,
    page: Option<PageBox>,
    env: &'a ExecEnv,
    spent: &'a mut u32,
) -> BoxFuture<'a, Result<ScriptOutcome>> {
    Box::pin(async move {
        let prepared = site
            .script(name)
            .and_then(|script| Ok((script, script.complete_args(args)?)));
        let (script, args) = match prepared {
            Ok(p) => p,
            Err(e) => {
                if let Some(page) = page {
                    close_quietly(page.as_ref()).await;
                }
                return Err(e);
            }
        };

        let mut page = match page {
            Some(p) => p,
            None => env.browser.new_page().await?,
        };
        let target = script.target_url(&site.base_url);

        'launch: loop {
            let current = page.url().await.unwrap_or_default();
            if current.contains(&target) {
                debug!(site = %site.name, script = name, url = %target, "already on page");
            } else if let Err(e) = page.navigate(&target).await {
                close_quietly(page.as_ref()).await;
                return Err(e.into());
            }

            if let Some(cookies) = site.cookies.as_deref().filter(|c| !c.is_empty()) {
                accept_cookies(page.as_ref(), cookies, env).await;
            }

            if let Some(condition) = &script.condition {
                let found = page
                    .wait_for_selector(&condition.selector, env.timeouts.selector)
                    .await
                    .is_ok();
                if !condition.holds(found) {
                    if *spent >= env.max_condition_retries {
                        close_quietly(page.as_ref()).await;
                        return Err(AutostepError::ConditionLoopExceeded {
                            script: name.to_string(),
                            retries: env.max_condition_retries,
                        });
                    }
                    *spent += 1;

                    if found && condition.on_found == Some(ConditionAction::Click) {
                        if let Err(e) = page.click(&condition.selector).await {
                            debug!(selector = %condition.selector, error = %e, "condition click failed");
                        }
                    }

                    info!(
                        site = %site.name,
                        script = name,
                        else_script = %condition.else_script,
                        attempt = *spent,
                        "condition not met, running else script"
                    );
                    let failed = || AutostepError::ElseScriptFailed {
                        site: site.name.clone(),
                        script: name.to_string(),
                    };
                    let nested = run_with_budget(
                        site,
                        &condition.else_script,
                        &args,
                        Some(page),
                        env,
                        &mut *spent,
                    );
                    match nested.await? {
                        ScriptOutcome::Completed(p) => {
                            page = p;
                            continue 'launch;
                        }
                        ScriptOutcome::Held(p) => {
                            close_quietly(p.as_ref()).await;
                            return Err(failed());
                        }
                        ScriptOutcome::Aborted => return Err(failed()),
                    }
                }
            }

            let relaunch = {
                let cx = ActionCx {
                    args: &args,
                    page: page.as_ref(),
                    env,
                    site: &site.name,
                    script: name,
                };
                let mut relaunch = false;
                for action in &script.actions {
                    match action.run(&cx).await {
                        Outcome::Abort => {
                            warn!(site = %site.name, script = name, "script aborted");
                            return Ok(ScriptOutcome::Aborted);
                        }
                        Outcome::Proceed if action.relaunches() => {
                            relaunch = true;
                            break;
                        }
                        Outcome::Proceed | Outcome::Skip => {}
                    }
                }
                relaunch
            };

            if relaunch {
                info!(site = %site.name, script = name, "relaunching script");
                *spent = 0;
                continue 'launch;
            }
            break;
        }

        if script.debug {
            info!(site = %site.name, script = name, "debug script finished, holding page");
            return Ok(ScriptOutcome::Held(page));
        }
        Ok(ScriptOutcome::Completed(page))
    })
}

/// Best-effort dismissal of the cookie banner.
async fn accept_cookies(page: &dyn Page, selector: &str, env: &ExecEnv) {
    let accepted = async {
        page.wait_for_selector(selector, env.timeouts.cookie).await?;
        page.click(selector).await?;
        tokio::time::sleep(env.timeouts.cookie_settle).await;
        Ok::<_, crate::driver::DriverError>(())
    };
    match accepted.await {
        Ok(()) => debug!(selector, "cookies accepted"),
        Err(e) => debug!(selector, error = %e, "no cookie banner"),
    }
}

async fn close_quietly(page: &dyn Page) {
    if let Err(e) = page.close().await {
        debug!(error = %e, "closing page");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetStore;
    use crate::env::Timeouts;
    use crate::human::ConfirmationGate;
    use crate::testing::{FakeBrowser, FakePage, PageCall};
    use std::sync::Arc;
    use std::time::Duration;

    const SITE: &str = r##"
name: demo
title: Demo shop
url: https://demo.example/
cookies: "#accept"
scripts:
  login:
    page: /login
    args:
      user: ""
      password: default
    actions:
      - type: input
        selector: "#user"
        value: "{{user}}"
  publish:
    page: /new
    condition:
      selector: "#login-button"
      type: notexists
      action: click
      else: login
    actions:
      - type: click
        selector: "#submit"
  stuck:
    page: /new
    condition:
      selector: "#login-button"
      else: noop
    actions: []
  noop:
    page: /new
    actions: []
  relaunch:
    page: https://other.example/flow
    actions:
      - type: click
        selector: "#again"
        relaunch: true
  inspect:
    page: /debug
    debug: true
    actions: []
  selfloop:
    page: /new
    condition:
      selector: "#login-button"
      else: selfloop
  ping:
    page: /new
    condition:
      selector: "#login-button"
      else: pong
  pong:
    page: /new
    condition:
      selector: "#login-button"
      else: ping
  edit:
    page: /edit
    condition:
      selector: "#editor"
      type: exists
      else: open-editor
    actions:
      - type: click
        selector: "#save"
  open-editor:
    page: /edit
    actions:
      - type: click
        selector: "#new-post"
"##;

    fn site() -> Site {
        serde_yaml::from_str(SITE).unwrap()
    }

    fn env(browser: Arc<FakeBrowser>) -> ExecEnv {
        ExecEnv::new(
            browser,
            Arc::new(ConfirmationGate::default()),
            Arc::new(AssetStore::new("/nonexistent", None)),
        )
        .with_timeouts(Timeouts {
            cookie_settle: Duration::ZERO,
            ..Timeouts::default()
        })
    }

    fn args(pairs: &[(&str, &str)]) -> ArgumentContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn complete_args_fills_defaults() {
        let site = site();
        let script = site.script("login").unwrap();
        let ctx = script.complete_args(&args(&[("user", "a")])).unwrap();
        assert_eq!(ctx.get("password"), Some("default"));
        assert_eq!(ctx.get("user"), Some("a"));
    }

    #[test]
    fn complete_args_requires_empty_defaults() {
        let site = site();
        let script = site.script("login").unwrap();
        let err = script.complete_args(&args(&[("user", "")])).unwrap_err();
        assert!(matches!(err, AutostepError::MissingArgument(ref n) if n == "user"));
        assert!(err.is_configuration());
    }

    #[test]
    fn target_url_joins_relative_pages() {
        let site = site();
        assert_eq!(
            site.script("login").unwrap().target_url(&site.base_url),
            "https://demo.example/login"
        );
        assert_eq!(
            site.script("relaunch").unwrap().target_url(&site.base_url),
            "https://other.example/flow"
        );
    }

    #[tokio::test]
    async fn login_binds_defaults_and_types_user() {
        let page = FakePage::new().with_selector("#user");
        let browser = Arc::new(FakeBrowser::new(page.clone()));
        let env = env(browser.clone());
        let site = site();

        let out = run_script(&site, "login", &args(&[("user", "a")]), None, &env)
            .await
            .unwrap();
        assert!(out.is_success());
        assert_eq!(browser.opened(), 1);
        assert_eq!(
            page.effects(),
            vec![
                PageCall::Navigate("https://demo.example/login".into()),
                PageCall::Click("#user".into()),
                PageCall::Type("a".into()),
            ]
        );
    }

    #[tokio::test]
    async fn second_run_on_same_page_skips_navigation() {
        let page = FakePage::new().with_selector("#user");
        let env = env(Arc::new(FakeBrowser::new(page.clone())));
        let site = site();
        let ctx = args(&[("user", "a")]);

        let first = run_script(&site, "login", &ctx, None, &env).await.unwrap();
        let reused = first.into_page().unwrap();
        let before = page.effects().len();
        run_script(&site, "login", &ctx, Some(reused), &env).await.unwrap();

        let second: Vec<_> = page.effects().into_iter().skip(before).collect();
        assert_eq!(
            second,
            vec![PageCall::Click("#user".into()), PageCall::Type("a".into())]
        );
    }

    #[tokio::test]
    async fn missing_argument_closes_given_page() {
        let page = FakePage::new();
        let env = env(Arc::new(FakeBrowser::new(page.clone())));
        let site = site();
        let err = run_script(&site, "login", &ArgumentContext::new(), Some(page.boxed()), &env)
            .await
            .unwrap_err();
        assert!(matches!(err, AutostepError::MissingArgument(_)));
        assert!(page.is_closed());
    }

    #[tokio::test]
    async fn unknown_script_is_an_error() {
        let env = env(Arc::new(FakeBrowser::default()));
        let site = site();
        let err = run_script(&site, "nope", &ArgumentContext::new(), None, &env)
            .await
            .unwrap_err();
        assert!(matches!(err, AutostepError::ScriptNotFound { .. }));
    }

    #[tokio::test]
    async fn cookie_banner_is_clicked_when_present() {
        let page = FakePage::new().with_selector("#accept").with_selector("#user");
        let env = env(Arc::new(FakeBrowser::new(page.clone())));
        let site = site();
        run_script(&site, "login", &args(&[("user", "a")]), None, &env)
            .await
            .unwrap();
        assert!(page.effects().contains(&PageCall::Click("#accept".into())));
    }

    #[tokio::test]
    async fn unmet_condition_runs_else_then_retries() {
        // Logging in (clicking the user field) hides the login button.
        let page = FakePage::new()
            .with_selector("#login-button")
            .with_selector("#user")
            .with_selector("#submit")
            .click_hides("#user", "#login-button");
        let env = env(Arc::new(FakeBrowser::new(page.clone())));
        let site = site();

        let out = run_script(&site, "publish", &args(&[("user", "a")]), None, &env)
            .await
            .unwrap();
        assert!(out.is_success());
        assert_eq!(
            page.effects(),
            vec![
                PageCall::Navigate("https://demo.example/new".into()),
                PageCall::Click("#login-button".into()),
                PageCall::Navigate("https://demo.example/login".into()),
                PageCall::Click("#user".into()),
                PageCall::Type("a".into()),
                PageCall::Navigate("https://demo.example/new".into()),
                PageCall::Click("#submit".into()),
            ]
        );
    }

    #[tokio::test]
    async fn condition_loop_is_bounded() {
        let page = FakePage::new().with_selector("#login-button");
        let env = env(Arc::new(FakeBrowser::new(page.clone()))).with_max_condition_retries(2);
        let site = site();
        let err = run_script(&site, "stuck", &ArgumentContext::new(), None, &env)
            .await
            .unwrap_err();
        assert!(matches!(err, AutostepError::ConditionLoopExceeded { retries: 2, .. }));
        assert!(page.is_closed());
    }

    #[tokio::test]
    async fn self_referencing_else_spends_one_budget() {
        let page = FakePage::new().with_selector("#login-button");
        let env = env(Arc::new(FakeBrowser::new(page.clone()))).with_max_condition_retries(3);
        let site = site();
        let args = ArgumentContext::new();
        let run = run_script(&site, "selfloop", &args, None, &env);
        let err = tokio::time::timeout(Duration::from_secs(3), run)
            .await
            .expect("bounded")
            .unwrap_err();
        assert!(matches!(err, AutostepError::ConditionLoopExceeded { retries: 3, .. }));
        assert!(page.is_closed());
        let navigations = page
            .calls()
            .iter()
            .filter(|c| matches!(c, PageCall::Navigate(_)))
            .count();
        assert_eq!(navigations, 1);
    }

    #[tokio::test]
    async fn mutually_referencing_else_scripts_are_bounded() {
        let page = FakePage::new().with_selector("#login-button");
        let env = env(Arc::new(FakeBrowser::new(page.clone()))).with_max_condition_retries(3);
        let site = site();
        let args = ArgumentContext::new();
        let run = run_script(&site, "ping", &args, None, &env);
        let err = tokio::time::timeout(Duration::from_secs(3), run)
            .await
            .expect("bounded")
            .unwrap_err();
        assert!(matches!(err, AutostepError::ConditionLoopExceeded { retries: 3, .. }));
        let waits = page
            .calls()
            .iter()
            .filter(|c| **c == PageCall::WaitFor("#login-button".into()))
            .count();
        assert_eq!(waits, 4);
    }

    #[tokio::test]
    async fn missing_required_selector_runs_else_then_retries() {
        let page = FakePage::new()
            .with_selector("#new-post")
            .with_selector("#save")
            .click_reveals("#new-post", "#editor");
        let env = env(Arc::new(FakeBrowser::new(page.clone())));
        let site = site();

        let out = run_script(&site, "edit", &ArgumentContext::new(), None, &env)
            .await
            .unwrap();
        assert!(out.is_success());
        assert_eq!(
            page.effects(),
            vec![
                PageCall::Navigate("https://demo.example/edit".into()),
                PageCall::Click("#new-post".into()),
                PageCall::Click("#save".into()),
            ]
        );
        let editor_checks = page
            .calls()
            .iter()
            .filter(|c| **c == PageCall::WaitFor("#editor".into()))
            .count();
        assert_eq!(editor_checks, 2);
    }

    #[tokio::test]
    async fn relaunch_restarts_from_the_top() {
        // The first click hides the button, so the relaunched pass aborts.
        let page = FakePage::new()
            .with_selector("#again")
            .click_hides("#again", "#again");
        let env = env(Arc::new(FakeBrowser::new(page.clone())));
        let site = site();

        let out = run_script(&site, "relaunch", &ArgumentContext::new(), None, &env)
            .await
            .unwrap();
        assert!(matches!(out, ScriptOutcome::Aborted));
        assert!(page.is_closed());

        let calls = page.calls();
        let navigations = calls.iter().filter(|c| matches!(c, PageCall::Navigate(_))).count();
        let waits = calls.iter().filter(|c| **c == PageCall::WaitFor("#again".into())).count();
        assert_eq!(navigations, 1);
        assert_eq!(waits, 2);
    }

    #[tokio::test]
    async fn debug_script_holds_page() {
        let page = FakePage::new();
        let env = env(Arc::new(FakeBrowser::new(page.clone())));
        let site = site();
        let out = run_script(&site, "inspect", &ArgumentContext::new(), None, &env)
            .await
            .unwrap();
        assert!(matches!(out, ScriptOutcome::Held(_)));
        assert!(!out.is_success());
        assert!(!page.is_closed());
    }
}
