//! Culture (locale) utilities
//!
//! Wraps [`unic_langid::LanguageIdentifier`] with the small registry the
//! dialogs need: deciding whether a code names a known culture, building a
//! culture tolerantly from possibly broken stored data, and producing human
//! readable display names such as `German (Switzerland)`.

use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;

/// Known languages (ISO 639-1 / 639-3 subtag, English name)
const LANGUAGES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("am", "Amharic"),
    ("ar", "Arabic"),
    ("az", "Azerbaijani"),
    ("be", "Belarusian"),
    ("bg", "Bulgarian"),
    ("bn", "Bangla"),
    ("bs", "Bosnian"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("cy", "Welsh"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("eu", "Basque"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fil", "Filipino"),
    ("fr", "French"),
    ("ga", "Irish"),
    ("gl", "Galician"),
    ("gu", "Gujarati"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("hy", "Armenian"),
    ("id", "Indonesian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ka", "Georgian"),
    ("kk", "Kazakh"),
    ("km", "Khmer"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("lb", "Luxembourgish"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("mk", "Macedonian"),
    ("ml", "Malayalam"),
    ("mn", "Mongolian"),
    ("mr", "Marathi"),
    ("ms", "Malay"),
    ("mt", "Maltese"),
    ("nb", "Norwegian Bokmål"),
    ("ne", "Nepali"),
    ("nl", "Dutch"),
    ("nn", "Norwegian Nynorsk"),
    ("no", "Norwegian"),
    ("pa", "Punjabi"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("si", "Sinhala"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sq", "Albanian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("sw", "Kiswahili"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("uz", "Uzbek"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
    ("zu", "isiZulu"),
];

/// Known regions (ISO 3166-1 alpha-2, English name)
const REGIONS: &[(&str, &str)] = &[
    ("AE", "United Arab Emirates"),
    ("AR", "Argentina"),
    ("AT", "Austria"),
    ("AU", "Australia"),
    ("BE", "Belgium"),
    ("BG", "Bulgaria"),
    ("BR", "Brazil"),
    ("CA", "Canada"),
    ("CH", "Switzerland"),
    ("CL", "Chile"),
    ("CN", "China"),
    ("CO", "Colombia"),
    ("CZ", "Czechia"),
    ("DE", "Germany"),
    ("DK", "Denmark"),
    ("EG", "Egypt"),
    ("ES", "Spain"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("GR", "Greece"),
    ("HK", "Hong Kong SAR"),
    ("HU", "Hungary"),
    ("ID", "Indonesia"),
    ("IE", "Ireland"),
    ("IL", "Israel"),
    ("IN", "India"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("KR", "Korea"),
    ("LU", "Luxembourg"),
    ("MX", "Mexico"),
    ("MY", "Malaysia"),
    ("NL", "Netherlands"),
    ("NO", "Norway"),
    ("NZ", "New Zealand"),
    ("PH", "Philippines"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("RO", "Romania"),
    ("RS", "Serbia"),
    ("RU", "Russia"),
    ("SA", "Saudi Arabia"),
    ("SE", "Sweden"),
    ("SG", "Singapore"),
    ("SK", "Slovakia"),
    ("TH", "Thailand"),
    ("TR", "Türkiye"),
    ("TW", "Taiwan"),
    ("UA", "Ukraine"),
    ("US", "United States"),
    ("VN", "Vietnam"),
    ("ZA", "South Africa"),
];

fn language_name(subtag: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(subtag))
        .map(|(_, name)| *name)
}

fn region_name(subtag: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(subtag))
        .map(|(_, name)| *name)
}

/// A parsed culture
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Culture {
    id: LanguageIdentifier,
}

impl Culture {
    /// The invariant culture (`und`), used when nothing can be salvaged
    pub fn invariant() -> Self {
        Self {
            id: LanguageIdentifier::default(),
        }
    }

    /// Strict parse: syntactically valid and naming a known language
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        let id = LanguageIdentifier::from_str(code).ok()?;
        language_name(id.language.as_str())?;
        Some(Self { id })
    }

    /// Best-effort construction that never fails
    ///
    /// Tries a strict parse first, then the language part alone (`de` for a
    /// broken `de-XX-!!`), then any syntactically valid tag, and finally the
    /// invariant culture.
    pub fn tolerant(code: &str) -> Self {
        if let Some(culture) = Self::parse(code) {
            return culture;
        }

        let trimmed = code.trim();
        let language_part = trimmed
            .split(['-', '_'])
            .next()
            .unwrap_or_default();
        if let Some(culture) = Self::parse(language_part) {
            return culture;
        }

        if trimmed.is_empty() {
            return Self::invariant();
        }

        LanguageIdentifier::from_str(trimmed)
            .map(|id| Self { id })
            .unwrap_or_else(|_| Self::invariant())
    }

    /// Canonical culture name, e.g. `en-US`
    pub fn name(&self) -> String {
        self.id.to_string()
    }

    /// Whether this is the invariant culture
    pub fn is_invariant(&self) -> bool {
        self.id == LanguageIdentifier::default()
    }

    /// English display name, e.g. `English (United States)`
    pub fn display_name(&self) -> String {
        if self.is_invariant() {
            return "Invariant Language".to_string();
        }

        let language = self.id.language.as_str();
        let language = language_name(language)
            .map(str::to_string)
            .unwrap_or_else(|| language.to_string());

        let mut qualifiers = Vec::new();
        if let Some(script) = self.id.script {
            qualifiers.push(script.as_str().to_string());
        }
        if let Some(region) = self.id.region {
            let code = region.as_str();
            qualifiers.push(
                region_name(code)
                    .map(str::to_string)
                    .unwrap_or_else(|| code.to_string()),
            );
        }

        if qualifiers.is_empty() {
            language
        } else {
            format!("{} ({})", language, qualifiers.join(", "))
        }
    }

    /// Whether `code` names this culture, ignoring case and the `-`/`_`
    /// separator spelling
    pub fn matches_code(&self, code: &str) -> bool {
        let code = code.trim();
        let name = self.name();
        if name.eq_ignore_ascii_case(code) {
            return true;
        }
        LanguageIdentifier::from_str(code)
            .map(|id| id.to_string().eq_ignore_ascii_case(&name))
            .unwrap_or(false)
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Whether `code` is a valid culture name
pub fn is_valid_culture_name(code: &str) -> bool {
    Culture::parse(code).is_some()
}

/// Checklist label for a language code: `"{display name} ({code})"`
pub fn language_label(code: &str) -> String {
    format!("{} ({})", Culture::tolerant(code).display_name(), code)
}
