//! Engine configuration.
//!
//! Every tunable of the recommender lives in one immutable
//! [`RecommendationConfig`] value handed to the engine at construction. It
//! deserializes from TOML with every field optional:
//!
//! ```toml
//! overfetch_multiplier = 3
//! fallback_overfetch_multiplier = 2
//!
//! [thresholds]
//! mutual_connections = 10
//! likes = 10
//! replies = 10
//! common_categories = 2
//! follows_you_score = 50.0
//!
//! [distribution]
//! friends_of_friends = 40
//! interests = 10
//! likes = 20
//! replies = 15
//! followers_not_followed = 15
//! ```

use serde::{Deserialize, Serialize};
use sources::Source;
use std::path::{Path, PathBuf};
use std::{env, fs};
use thiserror::Error;

/// Environment variable consulted when no config path is given explicitly
pub const CONFIG_ENV_VAR: &str = "WHO_TO_FOLLOW_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Raw-signal counts at which each source's score saturates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreThresholds {
    pub mutual_connections: u32,
    pub likes: u32,
    pub replies: u32,
    pub common_categories: u32,
    /// Fixed score for followers-not-followed candidates
    pub follows_you_score: f32,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            mutual_connections: 10,
            likes: 10,
            replies: 10,
            common_categories: 2,
            follows_you_score: 50.0,
        }
    }
}

/// Share of the output each source may claim, in percent.
///
/// Percentages are applied independently, so they need not sum to 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Distribution {
    pub friends_of_friends: u32,
    pub interests: u32,
    pub likes: u32,
    pub replies: u32,
    pub followers_not_followed: u32,
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            friends_of_friends: 40,
            interests: 10,
            likes: 20,
            replies: 15,
            followers_not_followed: 15,
        }
    }
}

impl Distribution {
    pub fn percentage(&self, source: Source) -> u32 {
        match source {
            Source::FriendsOfFriends => self.friends_of_friends,
            Source::Interests => self.interests,
            Source::Likes => self.likes,
            Source::Replies => self.replies,
            Source::FollowersNotFollowed => self.followers_not_followed,
        }
    }

    /// `ceil(limit * percentage / 100)`
    pub fn quota(&self, source: Source, limit: usize) -> usize {
        limit
            .saturating_mul(self.percentage(source) as usize)
            .div_ceil(100)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub thresholds: ScoreThresholds,
    pub distribution: Distribution,
    /// Each source is asked for `quota * overfetch_multiplier` candidates
    pub overfetch_multiplier: usize,
    /// Popularity backfill first asks for `limit * fallback_overfetch_multiplier` users
    pub fallback_overfetch_multiplier: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            thresholds: ScoreThresholds::default(),
            distribution: Distribution::default(),
            overfetch_multiplier: 3,
            fallback_overfetch_multiplier: 2,
        }
    }
}

impl RecommendationConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, else from `$WHO_TO_FOLLOW_CONFIG`, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = resolve_path(path) else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        for (field, value) in [
            ("thresholds.mutual_connections", t.mutual_connections),
            ("thresholds.likes", t.likes),
            ("thresholds.replies", t.replies),
            ("thresholds.common_categories", t.common_categories),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if !(0.0..=100.0).contains(&t.follows_you_score) {
            return Err(ConfigError::Invalid {
                field: "thresholds.follows_you_score",
                reason: format!("{} is outside 0..=100", t.follows_you_score),
            });
        }

        for source in Source::PRIORITY {
            let percentage = self.distribution.percentage(source);
            if percentage > 100 {
                return Err(ConfigError::Invalid {
                    field: "distribution",
                    reason: format!("{} share {}% exceeds 100%", source, percentage),
                });
            }
        }

        if self.overfetch_multiplier == 0 {
            return Err(ConfigError::Invalid {
                field: "overfetch_multiplier",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.fallback_overfetch_multiplier == 0 {
            return Err(ConfigError::Invalid {
                field: "fallback_overfetch_multiplier",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// How many candidates to request from `source` for an output of `limit`
    pub fn fetch_limit(&self, source: Source, limit: usize) -> usize {
        self.distribution
            .quota(source, limit)
            .saturating_mul(self.overfetch_multiplier)
    }
}

fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecommendationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thresholds.mutual_connections, 10);
        assert_eq!(config.distribution.friends_of_friends, 40);
        assert_eq!(config.overfetch_multiplier, 3);
    }

    #[test]
    fn test_quota_is_ceiling_per_source() {
        let distribution = Distribution::default();

        assert_eq!(distribution.quota(Source::FriendsOfFriends, 10), 4);
        assert_eq!(distribution.quota(Source::Interests, 10), 1);
        assert_eq!(distribution.quota(Source::Replies, 10), 2); // 1.5 rounds up
        assert_eq!(distribution.quota(Source::FollowersNotFollowed, 10), 2);
        // Every non-zero share gets at least one slot
        assert_eq!(distribution.quota(Source::Interests, 1), 1);
        assert_eq!(distribution.quota(Source::Likes, 0), 0);
    }

    #[test]
    fn test_fetch_limit_applies_overfetch() {
        let config = RecommendationConfig::default();
        assert_eq!(config.fetch_limit(Source::FriendsOfFriends, 10), 12);
        assert_eq!(config.fetch_limit(Source::Interests, 10), 3);
    }

    #[test]
    fn test_huge_limit_saturates() {
        let config = RecommendationConfig::default();
        let quota = config.distribution.quota(Source::FriendsOfFriends, usize::MAX);
        assert_eq!(quota, usize::MAX.div_ceil(100));
        assert_eq!(config.fetch_limit(Source::FriendsOfFriends, usize::MAX), usize::MAX);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
            overfetch_multiplier = 5

            [distribution]
            likes = 30
        "#;
        let config = RecommendationConfig::from_toml_str(toml).unwrap();

        assert_eq!(config.overfetch_multiplier, 5);
        assert_eq!(config.distribution.likes, 30);
        assert_eq!(config.distribution.friends_of_friends, 40);
        assert_eq!(config.thresholds, ScoreThresholds::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = RecommendationConfig::from_toml_str("").unwrap();
        assert_eq!(config, RecommendationConfig::default());
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let toml = "[thresholds]\nlikes = 0\n";
        let err = RecommendationConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "thresholds.likes",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_oversized_share() {
        let toml = "[distribution]\nreplies = 150\n";
        assert!(RecommendationConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_rejects_bad_syntax() {
        let err = RecommendationConfig::from_toml_str("overfetch_multiplier = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RecommendationConfig::load(Some(Path::new("/nonexistent/wtf.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
