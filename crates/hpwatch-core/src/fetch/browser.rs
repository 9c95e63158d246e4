//! Headless-browser hit point fetcher.
//!
//! Every fetch launches its own Chrome process with a throwaway profile,
//! emulates a phone, loads the character sheet and polls until both HP
//! nodes are visible.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetTouchEmulationEnabledParams,
};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::Deserialize;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Endpoints;
use crate::fetch::errors::FetchError;
use crate::fetch::traits::HpSource;
use crate::fetch::types::{Character, DeviceProfile, HpSelectors, IPHONE_7_LANDSCAPE};
use crate::roster::RosterMember;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
const CLOSE_GRACE: Duration = Duration::from_secs(3);

/// [`HpSource`] that reads the public character sheet in headless Chrome.
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    endpoints: Endpoints,
    device: DeviceProfile,
    selectors: HpSelectors,
    poll_interval: Duration,
}

impl BrowserFetcher {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            device: IPHONE_7_LANDSCAPE,
            selectors: HpSelectors::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    async fn read_hp(&self, session: &BrowserSession, id: &str) -> Result<HpPair, FetchError> {
        let page = session
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Launch {
                character_id: id.to_string(),
                message: e.to_string(),
            })?;

        emulate_device(&page, &self.device)
            .await
            .map_err(|message| FetchError::Emulation {
                character_id: id.to_string(),
                message,
            })?;

        let url = self.endpoints.character_page_url(id);
        debug!(event = "core.fetch.navigate_started", character_id = id, url = %url);
        page.goto(url.as_str())
            .await
            .map_err(|e| FetchError::Navigation {
                character_id: id.to_string(),
                message: e.to_string(),
            })?;

        let script = probe_script(&self.selectors);
        let page = &page;
        let script = script.as_str();
        poll_until_ready(self.poll_interval, id, move || async move {
            let evaluation = page
                .evaluate(script)
                .await
                .map_err(|e| ProbeFailure::Transient(e.to_string()))?;
            evaluation
                .into_value::<HpProbe>()
                .map_err(|e| ProbeFailure::Malformed(e.to_string()))
        })
        .await
        .map_err(|message| FetchError::Extraction {
            character_id: id.to_string(),
            message,
        })
    }
}

/// Why one poll of the page produced no reading.
#[derive(Debug)]
enum ProbeFailure {
    /// The page could not be evaluated right now, e.g. mid-navigation.
    Transient(String),
    /// The probe ran but returned something other than the expected shape.
    Malformed(String),
}

/// Poll until both HP values are visible.
///
/// Transient evaluation errors count as "not ready yet"; the caller's
/// timeout bounds the wait.
async fn poll_until_ready<F, Fut>(
    poll_interval: Duration,
    id: &str,
    mut probe: F,
) -> Result<HpPair, String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<HpProbe, ProbeFailure>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match probe().await {
            Ok(reading) => {
                if let Some(pair) = reading.into_pair() {
                    return Ok(pair);
                }
            }
            Err(ProbeFailure::Transient(message)) => debug!(
                event = "core.fetch.probe_retry",
                character_id = id,
                attempt = attempt,
                error = %message
            ),
            Err(ProbeFailure::Malformed(message)) => return Err(message),
        }
        tokio::time::sleep(poll_interval).await;
    }
}

#[async_trait]
impl HpSource for BrowserFetcher {
    async fn fetch(
        &self,
        member: &RosterMember,
        timeout: Duration,
    ) -> Result<Character, FetchError> {
        let id = member.id.as_str();
        let timed_out = || FetchError::Timeout {
            character_id: id.to_string(),
            timeout_secs: timeout.as_secs(),
        };

        info!(event = "core.fetch.started", character_id = id);
        let started = Instant::now();

        let session = tokio::time::timeout(timeout, BrowserSession::launch(id, &self.device))
            .await
            .map_err(|_| timed_out())??;

        let remaining = timeout.saturating_sub(started.elapsed());
        let result = tokio::time::timeout(remaining, self.read_hp(&session, id)).await;

        // Closed on every path before the result is inspected.
        session.close(id).await;

        let pair = match result {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                warn!(
                    event = "core.fetch.timeout",
                    character_id = id,
                    timeout_secs = timeout.as_secs()
                );
                return Err(timed_out());
            }
        };

        info!(
            event = "core.fetch.completed",
            character_id = id,
            current_hp = %pair.current,
            max_hp = %pair.max,
            elapsed_ms = started.elapsed().as_millis() as u64
        );

        Ok(Character {
            id: member.id.clone(),
            name: member.name.clone(),
            current_hp: pair.current,
            max_hp: pair.max,
        })
    }
}

/// One isolated Chrome process plus the task driving its CDP connection.
struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    // Held so the profile directory outlives the browser.
    _profile_dir: TempDir,
}

impl BrowserSession {
    async fn launch(id: &str, device: &DeviceProfile) -> Result<Self, FetchError> {
        let profile_dir = tempfile::Builder::new()
            .prefix("hpwatch-profile-")
            .tempdir()
            .map_err(|e| FetchError::Launch {
                character_id: id.to_string(),
                message: format!("could not create browser profile directory: {}", e),
            })?;

        let config = BrowserConfig::builder()
            .user_data_dir(profile_dir.path())
            .window_size(device.width, device.height)
            .build()
            .map_err(|message| FetchError::BrowserConfig {
                character_id: id.to_string(),
                message,
            })?;

        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| FetchError::Launch {
                    character_id: id.to_string(),
                    message: e.to_string(),
                })?;

        let handler_task = tokio::spawn(async move {
            while handler.next().await.is_some() {}
        });

        debug!(event = "core.fetch.browser_launched", character_id = id);

        Ok(Self {
            browser,
            handler_task,
            _profile_dir: profile_dir,
        })
    }

    async fn close(mut self, id: &str) {
        close_within(&mut self.browser, id, CLOSE_GRACE).await;
        self.handler_task.abort();
        debug!(event = "core.fetch.browser_closed", character_id = id);
    }
}

/// The shutdown half of a browser process.
#[async_trait]
trait BrowserProcess: Send {
    /// Ask the browser to exit and wait for it.
    async fn shut_down(&mut self, id: &str);

    async fn kill(&mut self, id: &str);
}

#[async_trait]
impl BrowserProcess for Browser {
    async fn shut_down(&mut self, id: &str) {
        if let Err(e) = self.close().await {
            debug!(event = "core.fetch.browser_close_failed", character_id = id, error = %e);
        }
        if let Err(e) = self.wait().await {
            debug!(event = "core.fetch.browser_wait_failed", character_id = id, error = %e);
        }
    }

    async fn kill(&mut self, id: &str) {
        if let Some(Err(e)) = Browser::kill(self).await {
            warn!(event = "core.fetch.browser_kill_failed", character_id = id, error = %e);
        }
    }
}

/// Shut the browser down, killing it if it has not exited within `grace`.
///
/// Returns `false` when the kill was needed.
async fn close_within<B: BrowserProcess>(browser: &mut B, id: &str, grace: Duration) -> bool {
    if tokio::time::timeout(grace, browser.shut_down(id)).await.is_ok() {
        return true;
    }

    warn!(
        event = "core.fetch.browser_close_timeout",
        character_id = id,
        grace_ms = grace.as_millis() as u64
    );
    browser.kill(id).await;
    false
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

async fn emulate_device(page: &Page, device: &DeviceProfile) -> Result<(), String> {
    page.execute(SetDeviceMetricsOverrideParams::new(
        i64::from(device.width),
        i64::from(device.height),
        device.device_scale_factor,
        device.mobile,
    ))
    .await
    .map_err(|e| e.to_string())?;

    page.execute(SetTouchEmulationEnabledParams::new(device.touch))
        .await
        .map_err(|e| e.to_string())?;

    page.execute(SetUserAgentOverrideParams::new(device.user_agent))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HpPair {
    current: String,
    max: String,
}

/// Result of one poll of the page: text of each HP node, or null while hidden.
#[derive(Debug, Deserialize)]
struct HpProbe {
    current: Option<String>,
    max: Option<String>,
}

impl HpProbe {
    fn into_pair(self) -> Option<HpPair> {
        match (self.current, self.max) {
            (Some(current), Some(max)) => Some(HpPair {
                current: current.trim().to_string(),
                max: max.trim().to_string(),
            }),
            _ => None,
        }
    }
}

/// Build the script that reports the text of each HP node once it is visible.
fn probe_script(selectors: &HpSelectors) -> String {
    // JSON string literals are valid JavaScript string literals.
    let current = serde_json::Value::String(selectors.current.clone());
    let max = serde_json::Value::String(selectors.max.clone());

    format!(
        r#"(() => {{
    const visibleText = (selector) => {{
        const el = document.querySelector(selector);
        if (!el) return null;
        const style = window.getComputedStyle(el);
        const rect = el.getBoundingClientRect();
        if (style.display === 'none' || style.visibility === 'hidden') return null;
        if (rect.width === 0 && rect.height === 0) return null;
        return el.textContent;
    }};
    return {{ current: visibleText({current}), max: visibleText({max}) }};
}})()"#
    )
}
