use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::AppError;

/// Display-name convention applied to flattened column headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingsType {
    /// Raw OCDS paths, no override.
    #[default]
    Ocds,
    EnUserFriendly,
    EsUserFriendly,
    EnRFriendly,
    EsRFriendly,
}

/// Locale used for heading dictionary lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Locale::En),
            "es" => Some(Locale::Es),
            _ => None,
        }
    }
}

impl HeadingsType {
    pub const ALL: [HeadingsType; 5] = [
        HeadingsType::Ocds,
        HeadingsType::EnUserFriendly,
        HeadingsType::EsUserFriendly,
        HeadingsType::EnRFriendly,
        HeadingsType::EsRFriendly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HeadingsType::Ocds => "ocds",
            HeadingsType::EnUserFriendly => "en_user_friendly",
            HeadingsType::EsUserFriendly => "es_user_friendly",
            HeadingsType::EnRFriendly => "en_r_friendly",
            HeadingsType::EsRFriendly => "es_r_friendly",
        }
    }

    pub fn is_ocds(self) -> bool {
        self == HeadingsType::Ocds
    }

    /// Spanish styles look labels up in Spanish, everything else in the default locale.
    pub fn locale(self) -> Locale {
        match self {
            HeadingsType::EsUserFriendly | HeadingsType::EsRFriendly => Locale::Es,
            _ => Locale::En,
        }
    }

    /// Apply the style's formatter to a resolved label.
    pub fn format_label(self, label: &str) -> String {
        match self {
            HeadingsType::EnRFriendly | HeadingsType::EsRFriendly => {
                label.replace(' ', "_").to_lowercase()
            }
            _ => label.to_string(),
        }
    }
}

impl fmt::Display for HeadingsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeadingsType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        HeadingsType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| AppError::UnsupportedHeadingsType(value.to_string()))
    }
}
