//! Platform identification and metric capability profiles.
//!
//! Platforms differ only in which metrics their chat carries (YouTube
//! superchats have monetary amounts, Twitch chat does not). Everything
//! else — bucketing, aggregation, highlight detection — is shared, so a
//! platform is just a name plus a capability descriptor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregator::MetricKind;
use crate::error::{AnalyticsError, Result};

/// Streaming platform a chatlog was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Youtube,
    Twitch,
}

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "youtu.be"];
const TWITCH_HOSTS: &[&str] = &["twitch.tv"];

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Twitch => "twitch",
        }
    }

    /// Resolve a platform from a CLI shorthand or a stream URL.
    ///
    /// Accepts `youtube`/`yt`, `twitch`/`ttv`, or any URL whose host
    /// belongs to a supported platform.
    pub fn resolve(input: &str) -> Result<Self> {
        let normalized = input.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "youtube" | "yt" => return Ok(Self::Youtube),
            "twitch" | "ttv" => return Ok(Self::Twitch),
            _ => {}
        }
        if let Some(host) = url_host(&normalized) {
            if YOUTUBE_HOSTS.iter().any(|&h| host_matches(host, h)) {
                return Ok(Self::Youtube);
            }
            if TWITCH_HOSTS.iter().any(|&h| host_matches(host, h)) {
                return Ok(Self::Twitch);
            }
        }
        Err(AnalyticsError::UnsupportedPlatform {
            input: input.to_string(),
        })
    }

    /// The metric capability profile for this platform.
    pub fn profile(&self) -> PlatformProfile {
        match self {
            Self::Youtube => PlatformProfile {
                platform: *self,
                metrics: MetricKind::ALL,
            },
            // Twitch chat has no monetary events, so the paid total is
            // neither computed nor eligible for highlight detection.
            Self::Twitch => PlatformProfile {
                platform: *self,
                metrics: &[
                    MetricKind::Messages,
                    MetricKind::TextMessages,
                    MetricKind::PaidMessages,
                    MetricKind::SystemMessages,
                    MetricKind::OtherMessages,
                    MetricKind::UniqueAuthors,
                    MetricKind::Rate,
                ],
            },
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which metrics exist for a platform's chatlogs.
///
/// The single extension point for platform variants: the report builder
/// consults the profile for metric availability and nothing else.
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    platform: Platform,
    metrics: &'static [MetricKind],
}

impl PlatformProfile {
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// All metrics computed for this platform, in report order.
    pub fn metrics(&self) -> &[MetricKind] {
        self.metrics
    }

    pub fn offers(&self, metric: MetricKind) -> bool {
        self.metrics.contains(&metric)
    }
}

/// Extract the host portion of something URL-shaped.
fn url_host(input: &str) -> Option<&str> {
    let rest = input.split_once("://").map_or(input, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = host.split(':').next().unwrap_or(host);
    (!host.is_empty()).then_some(host)
}

/// True when `host` is `base` or a subdomain of it.
fn host_matches(host: &str, base: &str) -> bool {
    host == base || host.ends_with(&format!(".{base}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_resolution() {
        assert_eq!(Platform::resolve("youtube").unwrap(), Platform::Youtube);
        assert_eq!(Platform::resolve("YT").unwrap(), Platform::Youtube);
        assert_eq!(Platform::resolve("twitch").unwrap(), Platform::Twitch);
    }

    #[test]
    fn test_url_resolution() {
        assert_eq!(
            Platform::resolve("https://www.youtube.com/watch?v=abc").unwrap(),
            Platform::Youtube
        );
        assert_eq!(
            Platform::resolve("https://youtu.be/abc").unwrap(),
            Platform::Youtube
        );
        assert_eq!(
            Platform::resolve("https://www.twitch.tv/videos/123").unwrap(),
            Platform::Twitch
        );
        assert_eq!(
            Platform::resolve("m.twitch.tv/somestreamer").unwrap(),
            Platform::Twitch
        );
    }

    #[test]
    fn test_unsupported_platform_is_rejected() {
        assert!(matches!(
            Platform::resolve("https://example.com/stream"),
            Err(AnalyticsError::UnsupportedPlatform { .. })
        ));
        // A lookalike suffix must not match.
        assert!(Platform::resolve("https://nottwitch.tv/foo").is_err());
    }

    #[test]
    fn test_twitch_profile_has_no_paid_total() {
        let profile = Platform::Twitch.profile();
        assert!(!profile.offers(MetricKind::PaidTotal));
        assert!(profile.offers(MetricKind::Messages));

        let profile = Platform::Youtube.profile();
        assert!(profile.offers(MetricKind::PaidTotal));
    }
}
