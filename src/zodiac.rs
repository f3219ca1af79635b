use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zodiac {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl Zodiac {
    pub const ALL: [Zodiac; 12] = [
        Zodiac::Aries,
        Zodiac::Taurus,
        Zodiac::Gemini,
        Zodiac::Cancer,
        Zodiac::Leo,
        Zodiac::Virgo,
        Zodiac::Libra,
        Zodiac::Scorpio,
        Zodiac::Sagittarius,
        Zodiac::Capricorn,
        Zodiac::Aquarius,
        Zodiac::Pisces,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Zodiac::Aries => "Aries",
            Zodiac::Taurus => "Taurus",
            Zodiac::Gemini => "Gemini",
            Zodiac::Cancer => "Cancer",
            Zodiac::Leo => "Leo",
            Zodiac::Virgo => "Virgo",
            Zodiac::Libra => "Libra",
            Zodiac::Scorpio => "Scorpio",
            Zodiac::Sagittarius => "Sagittarius",
            Zodiac::Capricorn => "Capricorn",
            Zodiac::Aquarius => "Aquarius",
            Zodiac::Pisces => "Pisces",
        }
    }

    /// Trim + title-case a free-form token and match it to a sign.
    ///
    /// `" cancer "`, `"CANCER"` and `"Cancer"` all map to `Cancer`. Empty and
    /// unknown tokens return `None`.
    pub fn normalize(raw: &str) -> Option<Zodiac> {
        let title = title_case(raw.trim());
        if title.is_empty() {
            return None;
        }
        Zodiac::ALL.into_iter().find(|z| z.label() == title)
    }
}

impl fmt::Display for Zodiac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Zodiac {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zodiac::normalize(s).ok_or_else(|| format!("unknown zodiac sign: {s:?}"))
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = String::with_capacity(s.len());
    out.extend(first.to_uppercase());
    for c in chars {
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::Zodiac;

    #[test]
    fn normalize_collapses_case_and_whitespace() {
        assert_eq!(Zodiac::normalize("cancer"), Some(Zodiac::Cancer));
        assert_eq!(Zodiac::normalize(" Cancer "), Some(Zodiac::Cancer));
        assert_eq!(Zodiac::normalize("CANCER"), Some(Zodiac::Cancer));
        assert_eq!(Zodiac::normalize("sAGITTARIUS\t"), Some(Zodiac::Sagittarius));
    }

    #[test]
    fn normalize_rejects_empty_and_unknown() {
        assert_eq!(Zodiac::normalize(""), None);
        assert_eq!(Zodiac::normalize("   "), None);
        assert_eq!(Zodiac::normalize("Ophiuchus"), None);
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for z in Zodiac::ALL {
            assert_eq!(z.label().parse::<Zodiac>(), Ok(z));
        }
    }
}
