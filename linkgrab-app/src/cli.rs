use clap::Parser;
use linkgrab_common::observability::LogFormat;
use linkgrab_config::{ConfigError, GrabConfigLoader as Loader};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "linkgrab",
    version,
    about = "Collect files behind download buttons into one archive",
    long_about = "Visits every page listed in the links file, follows its download \
    button, and stores each downloaded file in a single zip archive."
)]
pub struct Cli {
    /// YAML configuration file; skipped when it does not exist.
    #[arg(short, long, default_value = "linkgrab.yaml")]
    pub config: PathBuf,

    /// Text file with one page URL per line.
    #[arg(short = 'i', long = "links")]
    pub links_file: Option<PathBuf>,

    /// Directory the archive is written into.
    #[arg(short = 'o', long)]
    pub save_dir: Option<PathBuf>,

    /// File name of the archive.
    #[arg(long)]
    pub archive_name: Option<String>,

    /// WebDriver endpoint (geckodriver or chromedriver).
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Browser family the WebDriver should start.
    #[arg(long, value_parser = ["firefox", "chrome"])]
    pub browser: Option<String>,

    /// Show the browser window instead of running headless.
    #[arg(long)]
    pub headed: bool,

    /// Exit with a failure status when any link could not be archived.
    #[arg(long)]
    pub strict: bool,

    /// Directory for log files.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Encoding of the log file: `text` or `json`.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Push every flag the user gave on top of file and environment values.
    pub fn apply_overrides(&self, mut loader: Loader) -> Result<Loader, ConfigError> {
        if let Some(path) = &self.links_file {
            loader = loader.with_override("links_file", path.display().to_string())?;
        }
        if let Some(dir) = &self.save_dir {
            loader = loader.with_override("save_dir", dir.display().to_string())?;
        }
        if let Some(name) = &self.archive_name {
            loader = loader.with_override("archive_name", name.as_str())?;
        }
        if let Some(url) = &self.webdriver_url {
            loader = loader.with_override("browser.webdriver_url", url.as_str())?;
        }
        if let Some(kind) = &self.browser {
            loader = loader.with_override("browser.kind", kind.as_str())?;
        }
        if self.headed {
            loader = loader.with_override("browser.headless", false)?;
        }
        Ok(loader)
    }
}
