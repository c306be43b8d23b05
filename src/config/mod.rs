//! Configuration management for the reservation engine
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default reservation site host
pub const DEFAULT_ROOT_URL: &str = "https://yoyaku.city.chigasaki.kanagawa.jp";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reservation site layout and request parameters
    pub site: SiteConfig,

    /// HTTP transport settings
    pub transport: TransportConfig,

    /// Input file locations
    pub inputs: InputsConfig,

    /// Push notification settings
    pub notify: NotifyConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Screens, parameter names and fixed values of the reservation site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host every relative link is resolved against
    pub root_url: String,

    pub init_path: String,
    pub login_path: String,
    pub category_path: String,
    pub first_selection_path: String,
    pub held_list_path: String,

    /// Session id parameter carried on every request
    pub session_param: String,

    /// Function code parameter and its base value
    pub function_param: String,
    pub function_code: u32,

    /// Screen index parameter and its starting value
    pub index_param: String,
    pub index_start: u32,

    /// Facility category parameter and value
    pub category_param: String,
    pub category_code: String,

    /// Date tab parameter and value
    pub tab_param: String,
    pub date_tab: String,

    pub login_id_field: String,
    pub login_password_field: String,

    /// Label of the purpose link on the day screen
    pub purpose_label: String,

    /// Path fragment of first-stage day links and its second-stage replacement
    pub day_stage_from: String,
    pub day_stage_to: String,

    /// Name attribute of the booking form
    pub booking_form_name: String,

    /// Body fragments that mark an error screen
    pub error_markers: Vec<String>,

    /// Weekdays whose day links are visited (`mon`, `tue`, ...)
    pub target_weekdays: Vec<String>,
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// User agent string
    pub user_agent: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Request pacing (requests per second)
    pub requests_per_second: u32,
}

/// Input file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    /// JSON map of group name to credential list
    pub credential_path: PathBuf,

    /// Group whose first credential is used
    pub credential_group: String,

    pub wish_list_path: PathBuf,
    pub exclusion_path: PathBuf,

    /// Reservations held outside this account (`area,ymd,time` rows)
    pub held_csv_path: PathBuf,
}

/// Push notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// LINE messaging API push endpoint
    pub line_endpoint: String,

    /// Channel access token; without it notifications only go to the log
    pub line_token: Option<String>,

    /// Recipient user id
    pub line_user_id: Option<String>,

    /// Hours at which an error report is pushed
    pub report_hours: Vec<u32>,

    /// Hour at which a heartbeat is pushed after a clean run
    pub heartbeat_hour: Option<u32>,

    /// Errors listed per report
    pub max_reported_errors: usize,

    /// Characters kept per error message
    pub error_message_width: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            init_path: "/cultos/reserve/gin_init2".to_string(),
            login_path: "/cultos/reserve/gin_login".to_string(),
            category_path: "/cultos/reserve/gin_z_bunrui".to_string(),
            first_selection_path: "/cultos/reserve/gin_z_first".to_string(),
            held_list_path: "/cultos/reserve/gin_s_yyklist_in".to_string(),
            session_param: "g_sessionid".to_string(),
            function_param: "g_kinonaiyo".to_string(),
            function_code: 10,
            index_param: "u_genzai_idx".to_string(),
            index_start: 0,
            category_param: "g_bunruicd".to_string(),
            category_code: "1".to_string(),
            tab_param: "u_tab".to_string(),
            date_tab: "2".to_string(),
            login_id_field: "u_userid".to_string(),
            login_password_field: "u_passwd".to_string(),
            purpose_label: "テニス".to_string(),
            day_stage_from: "gin_z_kaisi_smk_rsp".to_string(),
            day_stage_to: "gin_z_second".to_string(),
            booking_form_name: "form_nm".to_string(),
            error_markers: vec![
                "dspErr()".to_string(),
                "無効なパラメータを受信しました".to_string(),
            ],
            target_weekdays: ["mon", "tue", "wed", "thu", "fri", "sat", "sun"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("yoyaku/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            requests_per_second: 2,
        }
    }
}

impl TransportConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            credential_path: PathBuf::from("credentials.json"),
            credential_group: "chigasaki".to_string(),
            wish_list_path: PathBuf::from("expected.txt"),
            exclusion_path: PathBuf::from("jogaibi.csv"),
            held_csv_path: PathBuf::from("reservedCourt.csv"),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            line_endpoint: "https://api.line.me/v2/bot/message/push".to_string(),
            line_token: None,
            line_user_id: None,
            report_hours: vec![10, 12, 15, 18],
            heartbeat_hour: Some(12),
            max_reported_errors: 5,
            error_message_width: 120,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Override fields from `YOYAKU_*` environment variables
    pub fn apply_env(&mut self) {
        self.site.root_url = env_or("YOYAKU_ROOT_URL", self.site.root_url.clone());
        self.site.function_code = env_parse("YOYAKU_FUNCTION_CODE", self.site.function_code);
        self.site.index_start = env_parse("YOYAKU_INDEX_START", self.site.index_start);
        self.site.category_code = env_or("YOYAKU_CATEGORY_CODE", self.site.category_code.clone());
        self.site.date_tab = env_or("YOYAKU_DATE_TAB", self.site.date_tab.clone());
        if let Ok(days) = std::env::var("YOYAKU_TARGET_WEEKDAYS") {
            self.site.target_weekdays = days
                .split(',')
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect();
        }

        self.transport.user_agent = env_or("YOYAKU_USER_AGENT", self.transport.user_agent.clone());
        self.transport.request_timeout_secs =
            env_parse("YOYAKU_REQUEST_TIMEOUT", self.transport.request_timeout_secs);
        self.transport.requests_per_second =
            env_parse("YOYAKU_RATE_LIMIT", self.transport.requests_per_second);

        if let Ok(path) = std::env::var("YOYAKU_CREDENTIAL_PATH") {
            self.inputs.credential_path = path.into();
        }
        self.inputs.credential_group =
            env_or("YOYAKU_CREDENTIAL_GROUP", self.inputs.credential_group.clone());
        if let Ok(path) = std::env::var("YOYAKU_WISH_LIST_PATH") {
            self.inputs.wish_list_path = path.into();
        }
        if let Ok(path) = std::env::var("YOYAKU_EXCLUSION_PATH") {
            self.inputs.exclusion_path = path.into();
        }
        if let Ok(path) = std::env::var("YOYAKU_HELD_CSV_PATH") {
            self.inputs.held_csv_path = path.into();
        }

        if let Ok(token) = std::env::var("LINE_CHANNEL_TOKEN") {
            self.notify.line_token = Some(token);
        }
        if let Ok(user) = std::env::var("LINE_USER_ID") {
            self.notify.line_user_id = Some(user);
        }

        self.logging.level = env_or("YOYAKU_LOG_LEVEL", self.logging.level.clone());
        self.logging.format = env_or("YOYAKU_LOG_FORMAT", self.logging.format.clone());
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.site.root_url)
            .with_context(|| format!("root_url is not a valid URL: {}", self.site.root_url))?;

        if self.site.error_markers.iter().any(|m| m.is_empty()) {
            anyhow::bail!("error_markers must not contain empty fragments");
        }

        if self.site.purpose_label.trim().is_empty() {
            anyhow::bail!("purpose_label must not be empty");
        }

        self.target_weekdays()?;

        if self.transport.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.notify.report_hours.iter().any(|h| *h > 23) {
            anyhow::bail!("report_hours must be within 0..=23");
        }

        if self.notify.heartbeat_hour.is_some_and(|h| h > 23) {
            anyhow::bail!("heartbeat_hour must be within 0..=23");
        }

        if self.notify.max_reported_errors == 0 {
            anyhow::bail!("max_reported_errors must be greater than 0");
        }

        Ok(())
    }

    /// Parsed weekday filter for day links
    pub fn target_weekdays(&self) -> Result<Vec<Weekday>> {
        if self.site.target_weekdays.is_empty() {
            anyhow::bail!("target_weekdays must name at least one day");
        }
        self.site
            .target_weekdays
            .iter()
            .map(|d| {
                d.parse::<Weekday>()
                    .map_err(|_| anyhow::anyhow!("Invalid weekday in target_weekdays: {d}"))
            })
            .collect()
    }
}
