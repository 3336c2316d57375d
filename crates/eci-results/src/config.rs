use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SNAPSHOT_PATH: &str = "candidates_results.json";
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";
pub const DEFAULT_INDEPENDENT_OUTPUT: &str = "independent_candidates.html";
pub const DEFAULT_ALL_OUTPUT: &str = "all_candidates.html";
pub const DEFAULT_INDEPENDENT_LABEL: &str = "Independent";
pub const DEFAULT_NAME_SUFFIX: &str = "(NCT of Delhi)";

pub const FIRST_CONSTITUENCY: u32 = 1;
pub const LAST_CONSTITUENCY: u32 = 70;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONCURRENCY: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Index range {first}..={last} is empty")]
    EmptyRange { first: u32, last: u32 },
    #[error("Concurrency must be greater than 0")]
    ZeroConcurrency,
    #[error("Timeout must be greater than 0")]
    ZeroTimeout,
    #[error("Invalid collision policy '{0}'. Accepted values: 'replace', 'keep-first', 'reject'")]
    InvalidCollisionPolicy(String),
}

/// What the aggregator does when two pages resolve to the same constituency name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// The later-completing page replaces the earlier one.
    #[default]
    Replace,
    KeepFirst,
    /// Neither page is kept.
    Reject,
}

impl FromStr for CollisionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(CollisionPolicy::Replace),
            "keep-first" | "keep_first" => Ok(CollisionPolicy::KeepFirst),
            "reject" => Ok(CollisionPolicy::Reject),
            _ => Err(ConfigError::InvalidCollisionPolicy(s.to_string())),
        }
    }
}

impl Display for CollisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollisionPolicy::Replace => write!(f, "replace"),
            CollisionPolicy::KeepFirst => write!(f, "keep-first"),
            CollisionPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Settings for the fetch + extract + aggregate phase.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub first: u32,
    pub last: u32,
    pub timeout: Duration,
    pub concurrency: usize,
    /// Annotation removed from the end of the constituency label.
    pub name_suffix: String,
    pub on_collision: CollisionPolicy,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: crate::BASE_URL.to_string(),
            first: FIRST_CONSTITUENCY,
            last: LAST_CONSTITUENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            name_suffix: DEFAULT_NAME_SUFFIX.to_string(),
            on_collision: CollisionPolicy::default(),
        }
    }
}

impl ScrapeConfig {
    pub fn indices(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.first > self.last {
            return Err(ConfigError::EmptyRange {
                first: self.first,
                last: self.last,
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(self)
    }
}

/// Settings for the render phase.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub templates_dir: PathBuf,
    pub independent_label: String,
    pub independent_output: PathBuf,
    pub all_output: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            independent_label: DEFAULT_INDEPENDENT_LABEL.to_string(),
            independent_output: PathBuf::from(DEFAULT_INDEPENDENT_OUTPUT),
            all_output: PathBuf::from(DEFAULT_ALL_OUTPUT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scrape_config_covers_all_constituencies() {
        let config = ScrapeConfig::default();
        assert_eq!(config.indices().count(), 70);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.on_collision, CollisionPolicy::Replace);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_range() {
        let config = ScrapeConfig {
            first: 10,
            last: 3,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRange { first: 10, last: 3 })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = ScrapeConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroConcurrency)
        ));
    }

    #[test]
    fn test_collision_policy_from_str() {
        assert_eq!(
            "replace".parse::<CollisionPolicy>().unwrap(),
            CollisionPolicy::Replace
        );
        assert_eq!(
            "keep-first".parse::<CollisionPolicy>().unwrap(),
            CollisionPolicy::KeepFirst
        );
        assert_eq!(
            "reject".parse::<CollisionPolicy>().unwrap(),
            CollisionPolicy::Reject
        );
        assert!("merge".parse::<CollisionPolicy>().is_err());
    }
}
