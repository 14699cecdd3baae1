use linkgrab_config::BrowserKind;
use serde_json::json;
use webdriver::capabilities::Capabilities;

/// Command-line arguments passed to the browser binary.
pub fn build_browser_arguments(kind: BrowserKind, headless: bool) -> Vec<String> {
    match kind {
        BrowserKind::Firefox => {
            let mut args = Vec::new();
            if headless {
                args.push("-headless".to_string());
            }
            args
        }
        BrowserKind::Chrome => {
            let mut args = vec![
                "--disable-dev-shm-usage".to_string(),
                "--no-sandbox".to_string(),
                "--disable-extensions".to_string(),
            ];
            if headless {
                args.push("--headless=new".to_string());
                args.push("--disable-gpu".to_string());
            }
            args
        }
    }
}

/// New-session capabilities for the requested browser family.
pub fn build_capabilities(kind: BrowserKind, headless: bool) -> Capabilities {
    let mut caps = Capabilities::new();
    let args = build_browser_arguments(kind, headless);

    match kind {
        BrowserKind::Firefox => {
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Chrome => {
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
    }
    caps
}
