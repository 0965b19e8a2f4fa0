//! Target platform and app-type tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;

/// Operating system family a user agent is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" | "iphone" => Ok(Self::Ios),
            other => Err(DomainError::ValidationFailed(format!("Unknown platform: {other}"))),
        }
    }
}

/// Application whose identifier grammar is being reproduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AppType {
    #[serde(rename = "browser")]
    Browser,
    #[serde(rename = "messaging-app-a")]
    MessagingAppA,
    /// Browser-in-app variant.
    #[serde(rename = "messaging-app-b")]
    MessagingAppB,
}

impl AppType {
    pub const ALL: [AppType; 3] = [AppType::Browser, AppType::MessagingAppA, AppType::MessagingAppB];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::MessagingAppA => "messaging-app-a",
            Self::MessagingAppB => "messaging-app-b",
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "browser" => Ok(Self::Browser),
            "messaging-app-a" => Ok(Self::MessagingAppA),
            "messaging-app-b" => Ok(Self::MessagingAppB),
            other => Err(DomainError::ValidationFailed(format!("Unknown app type: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse_round_trip() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
        assert_eq!("iPhone".parse::<Platform>().unwrap(), Platform::Ios);
        assert!("windows".parse::<Platform>().is_err());
    }

    #[test]
    fn test_app_type_accepts_underscores() {
        assert_eq!("messaging_app_a".parse::<AppType>().unwrap(), AppType::MessagingAppA);
        assert_eq!("Browser".parse::<AppType>().unwrap(), AppType::Browser);
        assert!("desktop".parse::<AppType>().is_err());
    }

    #[test]
    fn test_app_type_serde_tags() {
        let json = serde_json::to_string(&AppType::MessagingAppB).unwrap();
        assert_eq!(json, "\"messaging-app-b\"");
    }
}
