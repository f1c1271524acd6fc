//! Display languages and numeral systems
//!
//! The site is bilingual. Bengali is the primary language and English the
//! secondary one; counters render digits in whichever numeral system the
//! markup started with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Bengali digits zero through nine
pub const BENGALI_DIGITS: [char; 10] = ['০', '১', '২', '৩', '৪', '৫', '৬', '৭', '৮', '৯'];

/// Active display language
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "bn")]
    Bengali,
    #[serde(rename = "en")]
    English,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Bengali, Locale::English];

    /// Short code stored in preferences and used in `data-lang-*` attributes
    pub fn code(self) -> &'static str {
        match self {
            Locale::Bengali => "bn",
            Locale::English => "en",
        }
    }

    /// Value for the document element's `lang` attribute
    pub fn html_lang(self) -> &'static str {
        match self {
            Locale::Bengali => "bn-BD",
            Locale::English => "en",
        }
    }

    /// Label shown in the language picker button
    pub fn short_label(self) -> &'static str {
        match self {
            Locale::Bengali => "বাং",
            Locale::English => "Eng",
        }
    }

    /// Attribute holding this language's text on a bound element
    pub fn text_attribute(self) -> String {
        format!("data-lang-{}", self.code())
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "bn" | "bn-BD" => Some(Locale::Bengali),
            "en" | "en-US" | "en-GB" => Some(Locale::English),
            _ => None,
        }
    }

    /// The other language
    pub fn other(self) -> Self {
        match self {
            Locale::Bengali => Locale::English,
            Locale::English => Locale::Bengali,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_code(s).ok_or_else(|| format!("unknown locale: {}", s))
    }
}

/// Digit system used when rendering numbers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Numerals {
    #[default]
    Latin,
    Bengali,
}

impl Numerals {
    /// Bengali if the text contains any Bengali digit, Latin otherwise
    pub fn detect(text: &str) -> Self {
        if text.chars().any(is_bengali_digit) {
            Numerals::Bengali
        } else {
            Numerals::Latin
        }
    }

    /// Render an integer, transliterating digit by digit
    pub fn render(self, value: i64) -> String {
        let latin = value.to_string();
        match self {
            Numerals::Latin => latin,
            Numerals::Bengali => latin
                .chars()
                .map(|c| match c.to_digit(10) {
                    Some(d) => BENGALI_DIGITS[d as usize],
                    None => c,
                })
                .collect(),
        }
    }
}

pub fn is_bengali_digit(c: char) -> bool {
    BENGALI_DIGITS.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_codes() {
        assert_eq!(Locale::default(), Locale::Bengali);
        assert_eq!(Locale::Bengali.html_lang(), "bn-BD");
        assert_eq!(Locale::English.text_attribute(), "data-lang-en");
        assert_eq!("en".parse::<Locale>(), Ok(Locale::English));
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!(Locale::English.other(), Locale::Bengali);
    }

    #[test]
    fn test_numerals_detect() {
        assert_eq!(Numerals::detect("১২০+"), Numerals::Bengali);
        assert_eq!(Numerals::detect("৫০০ একর"), Numerals::Bengali);
        assert_eq!(Numerals::detect("120+"), Numerals::Latin);
    }

    #[test]
    fn test_numerals_render() {
        assert_eq!(Numerals::Bengali.render(2024), "২০২৪");
        assert_eq!(Numerals::Bengali.render(-15), "-১৫");
        assert_eq!(Numerals::Latin.render(350), "350");
    }
}
