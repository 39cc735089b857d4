use anyhow::anyhow;
use std::path::Path;

use crate::output::print_json;
use crate::setup;

/// POST the acknowledgment to a running `autostep serve`.
pub fn run(root: &Path, url: Option<&str>, json: bool) -> anyhow::Result<()> {
    let base = match url {
        Some(u) => u.trim_end_matches('/').to_string(),
        None => {
            let config = setup::load_config(root)?;
            format!("http://localhost:{}", config.server.port)
        }
    };
    let endpoint = format!("{base}/api/human/continue");

    let body: serde_json::Value = match ureq::post(&endpoint).call() {
        Ok(resp) => resp.into_json()?,
        Err(ureq::Error::Status(409, _)) => {
            return Err(anyhow!("no confirmation is pending"));
        }
        Err(ureq::Error::Status(code, resp)) => {
            let text = resp.into_string().unwrap_or_default();
            return Err(anyhow!("server returned {code}: {text}"));
        }
        Err(e) => return Err(anyhow!("cannot reach {base}: {e}")),
    };

    if json {
        print_json(&body)?;
    } else {
        let message = body["confirmation"]["message"].as_str().unwrap_or("");
        println!("continued: {message}");
    }
    Ok(())
}
