use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Runway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// The API service being supervised
    #[serde(default)]
    pub service: ServiceConfig,

    /// Retry and readiness policy for startup supervision
    #[serde(default)]
    pub supervisor: SupervisorConfig,

    /// Endpoints probed once the service is reachable
    #[serde(default)]
    pub probes: ProbesConfig,

    /// Interactive client launched after the probes
    #[serde(default)]
    pub client: ClientConfig,

    /// Optional SQL seed step
    #[serde(default)]
    pub seed: SeedConfig,

    /// Additional log diagnosis rules
    #[serde(default)]
    pub diagnosis: DiagnosisConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A program and its arguments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CommandConfig {
    /// Program to execute (looked up in PATH when not absolute)
    pub program: String,

    /// Program arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandConfig {
    /// Build a command from a program and string arguments
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServiceConfig {
    /// Host the service listens on
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port the service listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Working directory of the service project
    #[serde(default = "default_service_dir")]
    pub working_dir: PathBuf,

    /// Directory for per-attempt logs, relative to `working_dir`
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// File name prefix for per-attempt logs
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,

    /// Preferred launch path: run a prebuilt artifact
    #[serde(default)]
    pub prebuilt: PrebuiltConfig,

    /// Fallback launch path: build and serve from source
    #[serde(default = "default_build_and_serve")]
    pub build_and_serve: CommandConfig,

    /// Extra environment variables for the service process
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

const fn default_port() -> u16 {
    8080
}

fn default_service_dir() -> PathBuf {
    PathBuf::from("api")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_prefix() -> String {
    "api".to_string()
}

fn default_build_and_serve() -> CommandConfig {
    CommandConfig::new("mvn", &["spring-boot:run"])
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            working_dir: default_service_dir(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            prebuilt: PrebuiltConfig::default(),
            build_and_serve: default_build_and_serve(),
            env: HashMap::new(),
        }
    }
}

impl ServiceConfig {
    /// Base URL of the service, e.g. `http://localhost:8080`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Directory the per-attempt logs are written to
    pub fn log_directory(&self) -> PathBuf {
        self.working_dir.join(&self.log_dir)
    }
}

/// Prebuilt artifact launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PrebuiltConfig {
    /// Build output directory, relative to the service working directory
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// File extension of the artifact
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,

    /// Command used to run the artifact; `{artifact}` is replaced by its path
    #[serde(default = "default_prebuilt_command")]
    pub command: CommandConfig,
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("target")
}

fn default_artifact_extension() -> String {
    "jar".to_string()
}

fn default_prebuilt_command() -> CommandConfig {
    CommandConfig::new("java", &["-jar", "{artifact}"])
}

impl Default for PrebuiltConfig {
    fn default() -> Self {
        Self {
            artifact_dir: default_artifact_dir(),
            artifact_extension: default_artifact_extension(),
            command: default_prebuilt_command(),
        }
    }
}

/// Startup supervision policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SupervisorConfig {
    /// Maximum number of launch attempts (>= 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Seconds to wait for the port to open on each attempt (>= 1)
    #[serde(default = "default_readiness_timeout_secs")]
    pub readiness_timeout_secs: u64,

    /// Interval between readiness probes in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Timeout of a single TCP connect probe in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Delay before the next attempt in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Growth factor of the retry delay; 1.0 keeps it fixed
    #[serde(default = "default_retry_multiplier")]
    pub retry_multiplier: f64,

    /// Upper bound of the retry delay in milliseconds
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,

    /// Number of log lines shown for a failed attempt
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: usize,

    /// Seconds to wait for a killed process to be reaped
    #[serde(default = "default_kill_timeout_secs")]
    pub kill_timeout_secs: u64,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_readiness_timeout_secs() -> u64 {
    60
}

const fn default_poll_interval_ms() -> u64 {
    1000
}

const fn default_connect_timeout_ms() -> u64 {
    500
}

const fn default_retry_delay_ms() -> u64 {
    2000
}

const fn default_retry_multiplier() -> f64 {
    1.0
}

const fn default_max_retry_delay_ms() -> u64 {
    30_000
}

const fn default_log_tail_lines() -> usize {
    50
}

const fn default_kill_timeout_secs() -> u64 {
    5
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            readiness_timeout_secs: default_readiness_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_multiplier: default_retry_multiplier(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            log_tail_lines: default_log_tail_lines(),
            kill_timeout_secs: default_kill_timeout_secs(),
        }
    }
}

impl SupervisorConfig {
    pub const fn readiness_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness_timeout_secs)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub const fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }

    pub const fn kill_timeout(&self) -> Duration {
        Duration::from_secs(self.kill_timeout_secs)
    }
}

/// Endpoint probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProbesConfig {
    /// Paths requested with GET, in order
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_endpoints() -> Vec<String> {
    [
        "/cities/airports",
        "/passengers/aircraft",
        "/aircraft/airports",
        "/passengers/airports",
    ]
    .iter()
    .map(|p| (*p).to_string())
    .collect()
}

const fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ProbesConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ProbesConfig {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Interactive client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClientConfig {
    /// Launch the client at the end of the demo
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Working directory of the client project
    #[serde(default = "default_client_dir")]
    pub working_dir: PathBuf,

    /// Client command; `{base_url}` is replaced by the service base URL,
    /// which is appended when no argument mentions it
    #[serde(default = "default_client_command")]
    pub command: CommandConfig,

    /// Stop a service started by this run once the client exits
    #[serde(default)]
    pub stop_service_on_exit: bool,
}

const fn default_true() -> bool {
    true
}

fn default_client_dir() -> PathBuf {
    PathBuf::from("cli")
}

fn default_client_command() -> CommandConfig {
    CommandConfig::new("java", &["-jar", "target/cli.jar", "{base_url}"])
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            working_dir: default_client_dir(),
            command: default_client_command(),
            stop_service_on_exit: false,
        }
    }
}

/// SQL seed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SeedConfig {
    /// SQL file piped into the database client
    #[serde(default = "default_sql_file")]
    pub sql_file: PathBuf,

    /// Database client executable
    #[serde(default = "default_db_client")]
    pub client_program: String,

    /// Database host
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port
    #[serde(default = "default_db_port")]
    pub port: u16,

    /// Database user; the password is prompted for
    #[serde(default = "default_db_user")]
    pub user: String,

    /// Database selected before running the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Seconds to wait for the client to finish
    #[serde(default = "default_seed_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_sql_file() -> PathBuf {
    PathBuf::from("db/seed.sql")
}

fn default_db_client() -> String {
    "mysql".to_string()
}

const fn default_db_port() -> u16 {
    3306
}

fn default_db_user() -> String {
    "root".to_string()
}

const fn default_seed_timeout_secs() -> u64 {
    120
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            sql_file: default_sql_file(),
            client_program: default_db_client(),
            host: default_host(),
            port: default_db_port(),
            user: default_db_user(),
            database: None,
            timeout_secs: default_seed_timeout_secs(),
        }
    }
}

/// Log diagnosis configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiagnosisConfig {
    /// Rules evaluated after the built-in ones
    #[serde(default)]
    pub extra_rules: Vec<RuleConfig>,
}

/// A user-declared diagnosis rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RuleConfig {
    /// Rule identifier
    pub name: String,

    /// Advisory text shown when the rule matches
    pub message: String,

    /// Case-sensitive regular expressions; any match triggers the rule
    pub patterns: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Rotation of file logs: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
