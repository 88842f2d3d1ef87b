//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Form processor that receives finished intake sessions.
pub const DEFAULT_FORM_ENDPOINT: &str = "https://formspree.io/f/xblonwwg";

/// Page the browser is sent to after a successful submission.
pub const DEFAULT_THANK_YOU_PATH: &str = "/thank-you.html";

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Port the HTTP API listens on.
    pub port: u16,
    /// Path of the libSQL file holding persisted quiz state.
    pub db_path: PathBuf,
    /// Third-party form-processing URL submissions are posted to.
    pub form_endpoint: String,
    /// Relative location returned to the browser after a successful submission.
    pub thank_you_path: String,
    /// Origins allowed to call the API. Empty means any origin.
    pub allowed_origins: Vec<String>,
    /// Intake session idle timeout (abandoned visits are pruned after this duration).
    pub session_idle_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            db_path: PathBuf::from("./data/tutor-intake.db"),
            form_endpoint: DEFAULT_FORM_ENDPOINT.to_string(),
            thank_you_path: DEFAULT_THANK_YOU_PATH.to_string(),
            allowed_origins: Vec::new(),
            session_idle_timeout: Duration::from_secs(30 * 60), // 30 minutes
        }
    }
}

/// Read `key` and parse it. Unset means `None`; set but unparsable is an error.
fn parse_var<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?}: {e}"),
            }),
        Err(_) => Ok(None),
    }
}

impl ServiceConfig {
    /// Build configuration from environment variables.
    ///
    /// Unset values fall back to the defaults. A value that is set but
    /// cannot be parsed is reported instead of silently ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = parse_var::<u16>("TUTOR_INTAKE_PORT")?.unwrap_or(defaults.port);

        let db_path = std::env::var("TUTOR_INTAKE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let form_endpoint =
            std::env::var("TUTOR_INTAKE_FORM_ENDPOINT").unwrap_or(defaults.form_endpoint);

        let thank_you_path =
            std::env::var("TUTOR_INTAKE_THANK_YOU_PATH").unwrap_or(defaults.thank_you_path);

        let allowed_origins: Vec<String> = std::env::var("TUTOR_INTAKE_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let session_idle_timeout = match parse_var::<u64>("TUTOR_INTAKE_SESSION_IDLE_SECS")? {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    key: "TUTOR_INTAKE_SESSION_IDLE_SECS".to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.session_idle_timeout,
        };

        Ok(Self {
            port,
            db_path,
            form_endpoint,
            thank_you_path,
            allowed_origins,
            session_idle_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_form_processor() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.form_endpoint, DEFAULT_FORM_ENDPOINT);
        assert_eq!(config.thank_you_path, "/thank-you.html");
        assert!(config.allowed_origins.is_empty());
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
    }

    // All env mutation lives in one test so parallel tests never see each
    // other's variables.
    #[test]
    fn from_env_reads_and_validates() {
        // SAFETY: no other test touches TUTOR_INTAKE_* variables.
        unsafe {
            std::env::set_var("TUTOR_INTAKE_PORT", "9090");
            std::env::set_var("TUTOR_INTAKE_SESSION_IDLE_SECS", "120");
            std::env::set_var("TUTOR_INTAKE_ALLOWED_ORIGINS", "https://a.test, ,https://b.test");
        }
        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(120));
        assert_eq!(config.allowed_origins, ["https://a.test", "https://b.test"]);

        unsafe { std::env::set_var("TUTOR_INTAKE_PORT", "not-a-port") };
        let err = ServiceConfig::from_env().unwrap_err();
        assert!(
            matches!(&err, ConfigError::InvalidValue { key, .. } if key == "TUTOR_INTAKE_PORT"),
            "{err}"
        );

        unsafe {
            std::env::remove_var("TUTOR_INTAKE_PORT");
            std::env::set_var("TUTOR_INTAKE_SESSION_IDLE_SECS", "0");
        }
        let err = ServiceConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("TUTOR_INTAKE_SESSION_IDLE_SECS"));

        unsafe {
            std::env::remove_var("TUTOR_INTAKE_SESSION_IDLE_SECS");
            std::env::remove_var("TUTOR_INTAKE_ALLOWED_ORIGINS");
        }
        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
    }
}
