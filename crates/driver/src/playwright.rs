//! Playwright browser backend
//!
//! A single long-lived `node` process runs an embedded bridge script that
//! owns one browser page. Requests and responses are exchanged as one JSON
//! object per line over the child's stdin/stdout.

use std::path::PathBuf;
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::error::{DriverError, DriverResult};
use crate::surface::{SurfaceFactory, UiSurface};

const BRIDGE_SCRIPT: &str = r#"
const readline = require('readline');
const playwright = require('playwright');

const config = JSON.parse(process.env.BOOKING_BRIDGE_CONFIG);
const send = (message) => process.stdout.write(JSON.stringify(message) + '\n');

(async () => {
  const browser = await playwright[config.browser].launch({ headless: config.headless });
  const context = await browser.newContext({
    baseURL: config.baseUrl,
    viewport: { width: config.viewportWidth, height: config.viewportHeight },
  });
  context.setDefaultTimeout(config.actionTimeoutMs);
  context.setDefaultNavigationTimeout(config.navigationTimeoutMs);
  const page = await context.newPage();

  const byTestId = (id) => page.getByTestId(id);
  const byPrefix = (prefix) => page.locator(`[data-testid^="${prefix}"]`);

  const handlers = {
    goto: async ({ path }) => {
      await page.goto(path);
      await page.waitForLoadState('networkidle');
      return null;
    },
    url: async () => page.url(),
    count: async ({ prefix }) => byPrefix(prefix).count(),
    first: async ({ prefix }) => {
      const all = byPrefix(prefix);
      if ((await all.count()) === 0) return null;
      return all.first().getAttribute('data-testid');
    },
    visible: async ({ testId }) => byTestId(testId).isVisible(),
    enabled: async ({ testId }) => byTestId(testId).isEnabled(),
    readOnly: async ({ testId }) => (await byTestId(testId).getAttribute('readonly')) !== null,
    click: async ({ testId }) => { await byTestId(testId).click(); return null; },
    fill: async ({ testId, value }) => { await byTestId(testId).fill(value); return null; },
    text: async ({ testId }) => byTestId(testId).textContent(),
    value: async ({ testId }) => byTestId(testId).inputValue(),
    close: async () => { await browser.close(); return null; },
  };

  send({ ready: true });

  const lines = readline.createInterface({ input: process.stdin });
  for await (const line of lines) {
    if (!line.trim()) continue;
    let request;
    try {
      request = JSON.parse(line);
    } catch (error) {
      send({ id: null, ok: false, error: `malformed request: ${error.message}` });
      continue;
    }
    const handler = handlers[request.op];
    if (!handler) {
      send({ id: request.id, ok: false, error: `unknown op: ${request.op}` });
      continue;
    }
    try {
      const value = await handler(request);
      send({ id: request.id, ok: true, value });
      if (request.op === 'close') process.exit(0);
    } catch (error) {
      send({ id: request.id, ok: false, error: error.message });
    }
  }
  await browser.close();
})().catch((error) => {
  send({ ready: false, error: error.message });
  process.exit(1);
});
"#;

/// Browser engine driven by Playwright
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(DriverError::Config(format!("unknown browser: {}", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub action_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    /// Directory whose `node_modules` provides the `playwright` package
    pub node_project_dir: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout_ms: 15_000,
            navigation_timeout_ms: 30_000,
            node_project_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BridgeReady {
    ready: bool,
    #[serde(default)]
    error: Option<String>,
}

/// One browser page driven through the node bridge
pub struct PlaywrightSurface {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    request_timeout: Duration,
    closed: bool,
    // Keeps the bridge script on disk for the lifetime of the process
    _script_dir: tempfile::TempDir,
}

impl PlaywrightSurface {
    /// Launch the bridge and open a page against `base_url`
    pub async fn launch(base_url: &str, config: &PlaywrightConfig) -> DriverResult<Self> {
        Self::check_playwright_installed(config).await?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("booking-bridge.js");
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        let bridge_config = json!({
            "baseUrl": base_url,
            "browser": config.browser.as_str(),
            "headless": config.headless,
            "viewportWidth": config.viewport_width,
            "viewportHeight": config.viewport_height,
            "actionTimeoutMs": config.action_timeout_ms,
            "navigationTimeoutMs": config.navigation_timeout_ms,
        });

        info!(
            "Launching {} via Playwright bridge (headless: {})",
            config.browser.as_str(),
            config.headless
        );

        // The script lives outside the project, so module resolution needs NODE_PATH
        let project_dir = std::fs::canonicalize(&config.node_project_dir)?;
        let mut child = Command::new("node")
            .arg(&script_path)
            .current_dir(&project_dir)
            .env("BOOKING_BRIDGE_CONFIG", bridge_config.to_string())
            .env("NODE_PATH", project_dir.join("node_modules"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DriverError::Bridge(format!("failed to spawn node: {}", e)))?;

        let stdin = child.stdin.take().ok_or(DriverError::BridgeClosed)?;
        let stdout = child.stdout.take().ok_or(DriverError::BridgeClosed)?;

        let mut surface = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
            // The bridge answers within Playwright's own timeouts; leave headroom
            request_timeout: Duration::from_millis(
                config.action_timeout_ms.max(config.navigation_timeout_ms).saturating_add(5_000),
            ),
            closed: false,
            _script_dir: script_dir,
        };

        surface.wait_ready(Duration::from_millis(config.navigation_timeout_ms)).await?;
        Ok(surface)
    }

    /// Check if Playwright is installed
    async fn check_playwright_installed(config: &PlaywrightConfig) -> DriverResult<()> {
        let status = Command::new("npx")
            .args(["playwright", "--version"])
            .current_dir(&config.node_project_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(DriverError::BridgeNotFound),
        }
    }

    async fn wait_ready(&mut self, within: Duration) -> DriverResult<()> {
        let line = tokio::time::timeout(within, self.stdout.next_line())
            .await
            .map_err(|_| DriverError::Bridge("browser did not start in time".to_string()))??
            .ok_or(DriverError::BridgeClosed)?;

        let ready: BridgeReady = serde_json::from_str(&line)?;
        if !ready.ready {
            return Err(DriverError::Bridge(
                ready.error.unwrap_or_else(|| "browser failed to start".to_string()),
            ));
        }
        debug!("Playwright bridge ready");
        Ok(())
    }

    /// Send one request and wait for its response
    async fn call(&mut self, op: &str, mut args: Value) -> DriverResult<Value> {
        if self.closed {
            return Err(DriverError::BridgeClosed);
        }

        self.next_id += 1;
        let id = self.next_id;
        args["id"] = json!(id);
        args["op"] = json!(op);

        let mut line = serde_json::to_string(&args)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        let timeout = self.request_timeout;
        tokio::time::timeout(timeout, self.read_response(id))
            .await
            .map_err(|_| DriverError::Bridge(format!("'{}' got no answer within {:?}", op, timeout)))?
    }

    async fn read_response(&mut self, id: u64) -> DriverResult<Value> {
        loop {
            let line = self
                .stdout
                .next_line()
                .await?
                .ok_or(DriverError::BridgeClosed)?;

            let response: BridgeResponse = match serde_json::from_str(&line) {
                Ok(response) => response,
                Err(_) => {
                    debug!("bridge: {}", line);
                    continue;
                }
            };

            if response.id != Some(id) {
                warn!("Discarding out-of-order bridge response {:?}", response.id);
                continue;
            }

            return if response.ok {
                Ok(response.value)
            } else {
                Err(DriverError::Bridge(
                    response.error.unwrap_or_else(|| "unknown bridge error".to_string()),
                ))
            };
        }
    }

    /// Graceful shutdown first, then force
    fn terminate(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
            }
        }

        let _ = self.child.start_kill();
    }
}

fn as_bool(value: Value, op: &str) -> DriverResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| DriverError::Bridge(format!("'{}' returned {} instead of a boolean", op, value)))
}

fn as_opt_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

#[async_trait]
impl UiSurface for PlaywrightSurface {
    async fn goto(&mut self, path: &str) -> DriverResult<()> {
        self.call("goto", json!({ "path": path })).await?;
        Ok(())
    }

    async fn current_url(&mut self) -> DriverResult<String> {
        let value = self.call("url", json!({})).await?;
        as_opt_string(value).ok_or_else(|| DriverError::Bridge("page has no URL".to_string()))
    }

    async fn count_prefixed(&mut self, prefix: &str) -> DriverResult<usize> {
        let value = self.call("count", json!({ "prefix": prefix })).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| DriverError::Bridge(format!("'count' returned {}", value)))
    }

    async fn first_prefixed(&mut self, prefix: &str) -> DriverResult<Option<String>> {
        let value = self.call("first", json!({ "prefix": prefix })).await?;
        Ok(as_opt_string(value))
    }

    async fn is_visible(&mut self, test_id: &str) -> DriverResult<bool> {
        let value = self.call("visible", json!({ "testId": test_id })).await?;
        as_bool(value, "visible")
    }

    async fn is_enabled(&mut self, test_id: &str) -> DriverResult<bool> {
        let value = self.call("enabled", json!({ "testId": test_id })).await?;
        as_bool(value, "enabled")
    }

    async fn is_read_only(&mut self, test_id: &str) -> DriverResult<bool> {
        let value = self.call("readOnly", json!({ "testId": test_id })).await?;
        as_bool(value, "readOnly")
    }

    async fn click(&mut self, test_id: &str) -> DriverResult<()> {
        self.call("click", json!({ "testId": test_id })).await?;
        Ok(())
    }

    async fn fill(&mut self, test_id: &str, value: &str) -> DriverResult<()> {
        self.call("fill", json!({ "testId": test_id, "value": value })).await?;
        Ok(())
    }

    async fn text_content(&mut self, test_id: &str) -> DriverResult<Option<String>> {
        let value = self.call("text", json!({ "testId": test_id })).await?;
        Ok(as_opt_string(value))
    }

    async fn input_value(&mut self, test_id: &str) -> DriverResult<String> {
        let value = self.call("value", json!({ "testId": test_id })).await?;
        Ok(as_opt_string(value).unwrap_or_default())
    }

    async fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        let result = self.call("close", json!({})).await;
        self.closed = true;

        match tokio::time::timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(Ok(status)) => debug!("Playwright bridge exited with {}", status),
            _ => {
                warn!("Playwright bridge did not exit, terminating");
                self.terminate();
            }
        }
        result.map(|_| ())
    }
}

impl Drop for PlaywrightSurface {
    fn drop(&mut self) {
        if !self.closed {
            self.terminate();
        }
    }
}

/// Launches a fresh browser page per run
#[derive(Debug, Clone)]
pub struct PlaywrightFactory {
    pub base_url: String,
    pub config: PlaywrightConfig,
}

impl PlaywrightFactory {
    pub fn new(base_url: impl Into<String>, config: PlaywrightConfig) -> Self {
        Self {
            base_url: base_url.into(),
            config,
        }
    }
}

#[async_trait]
impl SurfaceFactory for PlaywrightFactory {
    type Surface = PlaywrightSurface;

    async fn open(&self) -> DriverResult<PlaywrightSurface> {
        PlaywrightSurface::launch(&self.base_url, &self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_from_str() {
        assert_eq!("firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!("Chrome".parse::<Browser>().unwrap(), Browser::Chromium);
        assert!("lynx".parse::<Browser>().is_err());
    }

    #[test]
    fn test_bridge_response_parsing() {
        let ok: BridgeResponse = serde_json::from_str(r#"{"id":3,"ok":true,"value":2}"#).unwrap();
        assert_eq!(ok.id, Some(3));
        assert_eq!(ok.value, json!(2));

        let err: BridgeResponse =
            serde_json::from_str(r#"{"id":4,"ok":false,"error":"Timeout 15000ms exceeded"}"#).unwrap();
        assert!(!err.ok);
        assert_eq!(err.error.as_deref(), Some("Timeout 15000ms exceeded"));
    }

    #[test]
    fn test_bridge_script_covers_every_op() {
        for op in [
            "goto", "url", "count", "first", "visible", "enabled", "readOnly", "click", "fill",
            "text", "value", "close",
        ] {
            assert!(BRIDGE_SCRIPT.contains(&format!("{}: async", op)), "missing handler {}", op);
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = PlaywrightConfig::default();
        assert_eq!(config.action_timeout_ms, 15_000);
        assert_eq!(config.navigation_timeout_ms, 30_000);
        assert!(config.headless);
    }
}
