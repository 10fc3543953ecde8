/// Content language: selects the word bank and the on-screen keyboard.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Ar, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::En => "en",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Ar => "Arabic",
            Language::En => "English",
        }
    }

    pub fn parse(s: &str) -> Option<Language> {
        match s.trim().to_lowercase().as_str() {
            "ar" | "arabic" => Some(Language::Ar),
            "en" | "english" => Some(Language::En),
            _ => None,
        }
    }

    pub fn other(self) -> Language {
        match self {
            Language::Ar => Language::En,
            Language::En => Language::Ar,
        }
    }

    /// Keyboard rows shown under the word, in physical layout order.
    pub fn keyboard_rows(self) -> [&'static str; 3] {
        match self {
            Language::En => ["qwertyuiop", "asdfghjkl", "zxcvbnm"],
            Language::Ar => ["ضصثقفغعهخح", "جشسيبلاتنم", "كطئءؤرىةوز"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_codes_and_names() {
        assert_eq!(Language::parse("EN"), Some(Language::En));
        assert_eq!(Language::parse(" arabic "), Some(Language::Ar));
        assert_eq!(Language::parse("fr"), None);
    }

    #[test]
    fn serializes_as_lowercase_code() {
        let json = serde_json::to_string(&Language::Ar).unwrap();
        assert_eq!(json, "\"ar\"");
    }
}
