use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::fairness::{FairnessThresholds, PenaltyWeights};
use crate::workflows::ranking::{ScoreWeights, SkillMatchMode};

const DEFAULT_EXPECTED_EXPERIENCE_YEARS: f64 = 5.0;
const DEFAULT_AUDIT_ACTOR: &str = "system";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
    pub audit: AuditConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = ScoreWeights::default();
        let weights = ScoreWeights {
            skill_weight: float_var("RANKING_SKILL_WEIGHT", defaults.skill_weight)?,
            experience_weight: float_var(
                "RANKING_EXPERIENCE_WEIGHT",
                defaults.experience_weight,
            )?,
        };
        if !weights.is_valid() {
            return Err(ConfigError::InvalidWeights {
                skill: weights.skill_weight,
                experience: weights.experience_weight,
            });
        }

        let expected_experience_years = float_var(
            "RANKING_EXPECTED_EXPERIENCE_YEARS",
            DEFAULT_EXPECTED_EXPERIENCE_YEARS,
        )?;
        if expected_experience_years < 0.0 {
            return Err(ConfigError::InvalidNumber {
                key: "RANKING_EXPECTED_EXPERIENCE_YEARS",
                value: expected_experience_years.to_string(),
            });
        }

        let match_mode = match env::var("RANKING_SKILL_MATCH_MODE") {
            Ok(raw) => SkillMatchMode::parse(&raw).ok_or(ConfigError::InvalidMatchMode(raw))?,
            Err(_) => SkillMatchMode::default(),
        };

        let log_path = env::var("AUDIT_LOG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let default_actor = env::var("AUDIT_ACTOR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUDIT_ACTOR.to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine: EngineConfig {
                ranking: RankingConfig {
                    default_weights: weights,
                    default_expected_experience_years: expected_experience_years,
                    match_mode,
                },
                thresholds: FairnessThresholds::default(),
                penalties: PenaltyWeights::default(),
            },
            audit: AuditConfig {
                log_path,
                default_actor,
            },
        })
    }
}

fn float_var(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Defaults applied when a ranking request does not carry its own settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    pub default_weights: ScoreWeights,
    pub default_expected_experience_years: f64,
    pub match_mode: SkillMatchMode,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_weights: ScoreWeights::default(),
            default_expected_experience_years: DEFAULT_EXPECTED_EXPERIENCE_YEARS,
            match_mode: SkillMatchMode::default(),
        }
    }
}

/// Scoring and auditing rubric shared by every request the engine serves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub ranking: RankingConfig,
    pub thresholds: FairnessThresholds,
    pub penalties: PenaltyWeights,
}

/// Where audit events are written and who they are attributed to by default.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub log_path: Option<PathBuf>,
    pub default_actor: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            default_actor: DEFAULT_AUDIT_ACTOR.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidWeights { skill: f64, experience: f64 },
    InvalidMatchMode(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a finite non-negative number, found '{value}'")
            }
            ConfigError::InvalidWeights { skill, experience } => write!(
                f,
                "ranking weights must sum to 1.0 (skill {skill}, experience {experience})"
            ),
            ConfigError::InvalidMatchMode(value) => write!(
                f,
                "RANKING_SKILL_MATCH_MODE must be 'exact' or 'fuzzy-substring', found '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "RANKING_SKILL_WEIGHT",
            "RANKING_EXPERIENCE_WEIGHT",
            "RANKING_EXPECTED_EXPERIENCE_YEARS",
            "RANKING_SKILL_MATCH_MODE",
            "AUDIT_LOG_PATH",
            "AUDIT_ACTOR",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.engine.ranking, RankingConfig::default());
        assert_eq!(config.audit.default_actor, "system");
        assert!(config.audit.log_path.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RANKING_SKILL_WEIGHT", "0.7");
        env::set_var("RANKING_EXPERIENCE_WEIGHT", "0.7");
        let result = AppConfig::load();
        reset_env();
        assert!(matches!(result, Err(ConfigError::InvalidWeights { .. })));
    }

    #[test]
    fn reads_match_mode_and_audit_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RANKING_SKILL_MATCH_MODE", "exact");
        env::set_var("AUDIT_LOG_PATH", "/tmp/audit.jsonl");
        env::set_var("AUDIT_ACTOR", "compliance-bot");
        let config = AppConfig::load().expect("config loads");
        reset_env();
        assert_eq!(config.engine.ranking.match_mode, SkillMatchMode::Exact);
        assert_eq!(
            config.audit.log_path,
            Some(PathBuf::from("/tmp/audit.jsonl"))
        );
        assert_eq!(config.audit.default_actor, "compliance-bot");
    }

    #[test]
    fn rejects_unknown_match_mode() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RANKING_SKILL_MATCH_MODE", "semantic");
        let result = AppConfig::load();
        reset_env();
        assert!(matches!(result, Err(ConfigError::InvalidMatchMode(value)) if value == "semantic"));
    }
}
