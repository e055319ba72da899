use std::env;

use crate::errors::AppError;
use crate::services::slots::canonical_department;

/// Longest interview the service will book, one full day.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub default_recruiter_email: String,
    pub default_department: String,
    pub default_duration_minutes: i64,
    pub timezone_label: String,
    pub working_hours_start: u32,
    pub working_hours_end: u32,
    pub meet_base_url: String,
    pub intent_responder: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub ollama_timeout_secs: u64,
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    pub mail_timeout_secs: u64,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parsed_or("PORT", 3000),
            database_url: var_or("DATABASE_URL", "scheduler.db"),
            default_recruiter_email: env::var("DEFAULT_RECRUITER_EMAIL").unwrap_or_default(),
            default_department: var_or("DEFAULT_DEPARTMENT", "Engineering"),
            default_duration_minutes: parsed_or("DEFAULT_DURATION_MINUTES", 60),
            timezone_label: var_or("TIMEZONE_LABEL", "UTC"),
            working_hours_start: parsed_or("WORKING_HOURS_START", 9),
            working_hours_end: parsed_or("WORKING_HOURS_END", 17),
            meet_base_url: var_or("MEET_BASE_URL", "https://meet.google.com"),
            intent_responder: var_or("INTENT_RESPONDER", "keyword"),
            ollama_url: var_or("OLLAMA_URL", "http://localhost:11434"),
            ollama_model: var_or("OLLAMA_MODEL", "llama3.2"),
            ollama_timeout_secs: parsed_or("OLLAMA_TIMEOUT_SECS", 30),
            mail_api_url: var_or("MAIL_API_URL", "https://api.sendgrid.com/v3/mail/send"),
            mail_api_key: env::var("MAIL_API_KEY").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM").unwrap_or_default(),
            mail_timeout_secs: parsed_or("MAIL_TIMEOUT_SECS", 10),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.working_hours_start >= self.working_hours_end || self.working_hours_end > 24 {
            return Err(AppError::Config(format!(
                "working hours {}-{} are not a valid range",
                self.working_hours_start, self.working_hours_end
            )));
        }
        if !(1..=MAX_DURATION_MINUTES).contains(&self.default_duration_minutes) {
            return Err(AppError::Config(format!(
                "DEFAULT_DURATION_MINUTES must be between 1 and {MAX_DURATION_MINUTES}"
            )));
        }
        if canonical_department(&self.default_department).is_none() {
            return Err(AppError::Config(format!(
                "DEFAULT_DEPARTMENT {} is not a known department",
                self.default_department
            )));
        }
        if self.mail_timeout_secs == 0 || self.ollama_timeout_secs == 0 {
            return Err(AppError::Config(
                "MAIL_TIMEOUT_SECS and OLLAMA_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn mail_configured(&self) -> bool {
        !self.mail_api_key.is_empty() && !self.mail_from.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            port: 3000,
            database_url: ":memory:".to_string(),
            default_recruiter_email: String::new(),
            default_department: "Engineering".to_string(),
            default_duration_minutes: 60,
            timezone_label: "UTC".to_string(),
            working_hours_start: 9,
            working_hours_end: 17,
            meet_base_url: "https://meet.google.com".to_string(),
            intent_responder: "keyword".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            ollama_timeout_secs: 30,
            mail_api_url: "http://localhost/mail".to_string(),
            mail_api_key: String::new(),
            mail_from: String::new(),
            mail_timeout_secs: 10,
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_hours() {
        let mut c = config();
        c.working_hours_start = 18;
        assert!(matches!(c.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let mut c = config();
        c.default_duration_minutes = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_duration() {
        let mut c = config();
        c.default_duration_minutes = MAX_DURATION_MINUTES;
        assert!(c.validate().is_ok());
        c.default_duration_minutes = i64::MAX;
        assert!(matches!(c.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_department() {
        let mut c = config();
        c.default_department = "design".to_string();
        assert!(c.validate().is_ok());
        c.default_department = "Legal".to_string();
        assert!(matches!(c.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut c = config();
        c.mail_timeout_secs = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_mail_configured_needs_key_and_sender() {
        let mut c = config();
        assert!(!c.mail_configured());
        c.mail_api_key = "key".to_string();
        assert!(!c.mail_configured());
        c.mail_from = "bot@example.com".to_string();
        assert!(c.mail_configured());
    }
}
