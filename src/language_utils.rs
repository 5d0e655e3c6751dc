use anyhow::{Result, anyhow};
use isolang::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target languages offered for translation
///
/// The list is fixed; the English display name is what gets written into
/// the translation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TargetLanguage {
    #[default]
    Indonesian,
    English,
    Japanese,
    Korean,
    Spanish,
    French,
    German,
    Chinese,
    Arabic,
}

impl TargetLanguage {
    /// All supported languages, in menu order
    pub const ALL: [TargetLanguage; 9] = [
        Self::Indonesian,
        Self::English,
        Self::Japanese,
        Self::Korean,
        Self::Spanish,
        Self::French,
        Self::German,
        Self::Chinese,
        Self::Arabic,
    ];

    /// English display name, as recorded by ISO 639
    pub fn display_name(&self) -> &'static str {
        Language::from_639_1(self.code())
            .map(|lang| lang.to_name())
            .unwrap_or_else(|| self.code())
    }

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Indonesian => "id",
            Self::English => "en",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Chinese => "zh",
            Self::Arabic => "ar",
        }
    }

    /// Name of the language in the language itself, when known
    pub fn autonym(&self) -> Option<&'static str> {
        Language::from_639_1(self.code()).and_then(|lang| lang.to_autonym())
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "id" => Some(Self::Indonesian),
            "en" => Some(Self::English),
            // jp and kr are the country codes the web UI used
            "ja" | "jp" => Some(Self::Japanese),
            "ko" | "kr" => Some(Self::Korean),
            "es" => Some(Self::Spanish),
            "fr" => Some(Self::French),
            "de" => Some(Self::German),
            "zh" => Some(Self::Chinese),
            "ar" => Some(Self::Arabic),
            _ => None,
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TargetLanguage {
    type Err = anyhow::Error;

    /// Accepts a display name, an ISO 639-1 or 639-3 code, or a legacy alias
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();

        if let Some(lang) = Self::ALL
            .iter()
            .find(|l| l.display_name().eq_ignore_ascii_case(&normalized))
        {
            return Ok(*lang);
        }

        if let Some(lang) = Self::from_code(&normalized) {
            return Ok(lang);
        }

        if normalized.len() == 3 {
            if let Some(lang) = Language::from_639_3(&normalized)
                .and_then(|l| l.to_639_1())
                .and_then(Self::from_code)
            {
                return Ok(lang);
            }
        }

        Err(anyhow!(
            "Unsupported target language: {} (expected one of: {})",
            s,
            Self::ALL
                .iter()
                .map(|l| l.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }
}

impl TryFrom<String> for TargetLanguage {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TargetLanguage> for String {
    fn from(lang: TargetLanguage) -> Self {
        lang.display_name().to_string()
    }
}
