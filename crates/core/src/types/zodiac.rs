//! Western and Chinese zodiac signs.

use serde::{Deserialize, Serialize};

/// Western zodiac sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
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

impl ZodiacSign {
    /// All signs in calendar order, starting at the spring equinox.
    pub const ALL: [Self; 12] = [
        Self::Aries,
        Self::Taurus,
        Self::Gemini,
        Self::Cancer,
        Self::Leo,
        Self::Virgo,
        Self::Libra,
        Self::Scorpio,
        Self::Sagittarius,
        Self::Capricorn,
        Self::Aquarius,
        Self::Pisces,
    ];

    /// English name, as sent to the fortune generator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aries => "Aries",
            Self::Taurus => "Taurus",
            Self::Gemini => "Gemini",
            Self::Cancer => "Cancer",
            Self::Leo => "Leo",
            Self::Virgo => "Virgo",
            Self::Libra => "Libra",
            Self::Scorpio => "Scorpio",
            Self::Sagittarius => "Sagittarius",
            Self::Capricorn => "Capricorn",
            Self::Aquarius => "Aquarius",
            Self::Pisces => "Pisces",
        }
    }

    /// Chinese display label.
    #[must_use]
    pub const fn label_zh(self) -> &'static str {
        match self {
            Self::Aries => "白羊座",
            Self::Taurus => "金牛座",
            Self::Gemini => "双子座",
            Self::Cancer => "巨蟹座",
            Self::Leo => "狮子座",
            Self::Virgo => "处女座",
            Self::Libra => "天秤座",
            Self::Scorpio => "天蝎座",
            Self::Sagittarius => "射手座",
            Self::Capricorn => "摩羯座",
            Self::Aquarius => "水瓶座",
            Self::Pisces => "双鱼座",
        }
    }

    /// Derive the sign from a birthday.
    ///
    /// Returns `None` only for month/day pairs outside every range, which
    /// means the date itself is out of range. Callers validate the date first.
    #[must_use]
    pub const fn from_birthday(month: u8, day: u8) -> Option<Self> {
        let sign = match (month, day) {
            (3, 21..) | (4, ..=19) => Self::Aries,
            (4, 20..) | (5, ..=20) => Self::Taurus,
            (5, 21..) | (6, ..=21) => Self::Gemini,
            (6, 22..) | (7, ..=22) => Self::Cancer,
            (7, 23..) | (8, ..=22) => Self::Leo,
            (8, 23..) | (9, ..=22) => Self::Virgo,
            (9, 23..) | (10, ..=23) => Self::Libra,
            (10, 24..) | (11, ..=21) => Self::Scorpio,
            (11, 22..) | (12, ..=21) => Self::Sagittarius,
            (12, 22..) | (1, ..=19) => Self::Capricorn,
            (1, 20..) | (2, ..=18) => Self::Aquarius,
            (2, 19..) | (3, ..=20) => Self::Pisces,
            _ => return None,
        };
        Some(sign)
    }
}

impl std::fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ZodiacSign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sign| sign.name().eq_ignore_ascii_case(s) || sign.label_zh() == s)
            .ok_or_else(|| format!("invalid zodiac sign: {s}"))
    }
}

/// Chinese zodiac animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChineseZodiac {
    Rat,
    Ox,
    Tiger,
    Rabbit,
    Dragon,
    Snake,
    Horse,
    Goat,
    Monkey,
    Rooster,
    Dog,
    Pig,
}

impl ChineseZodiac {
    /// All animals in cycle order.
    pub const ALL: [Self; 12] = [
        Self::Rat,
        Self::Ox,
        Self::Tiger,
        Self::Rabbit,
        Self::Dragon,
        Self::Snake,
        Self::Horse,
        Self::Goat,
        Self::Monkey,
        Self::Rooster,
        Self::Dog,
        Self::Pig,
    ];

    /// English name, as sent to the fortune generator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rat => "Rat",
            Self::Ox => "Ox",
            Self::Tiger => "Tiger",
            Self::Rabbit => "Rabbit",
            Self::Dragon => "Dragon",
            Self::Snake => "Snake",
            Self::Horse => "Horse",
            Self::Goat => "Goat",
            Self::Monkey => "Monkey",
            Self::Rooster => "Rooster",
            Self::Dog => "Dog",
            Self::Pig => "Pig",
        }
    }

    /// Chinese display label.
    #[must_use]
    pub const fn label_zh(self) -> &'static str {
        match self {
            Self::Rat => "鼠",
            Self::Ox => "牛",
            Self::Tiger => "虎",
            Self::Rabbit => "兔",
            Self::Dragon => "龙",
            Self::Snake => "蛇",
            Self::Horse => "马",
            Self::Goat => "羊",
            Self::Monkey => "猴",
            Self::Rooster => "鸡",
            Self::Dog => "狗",
            Self::Pig => "猪",
        }
    }
}

impl std::fmt::Display for ChineseZodiac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ChineseZodiac {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|animal| animal.name().eq_ignore_ascii_case(s) || animal.label_zh() == s)
            .ok_or_else(|| format!("invalid chinese zodiac: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_birthday_boundaries() {
        assert_eq!(ZodiacSign::from_birthday(3, 21), Some(ZodiacSign::Aries));
        assert_eq!(ZodiacSign::from_birthday(3, 20), Some(ZodiacSign::Pisces));
        assert_eq!(ZodiacSign::from_birthday(12, 22), Some(ZodiacSign::Capricorn));
        assert_eq!(ZodiacSign::from_birthday(1, 19), Some(ZodiacSign::Capricorn));
        assert_eq!(ZodiacSign::from_birthday(1, 20), Some(ZodiacSign::Aquarius));
        assert_eq!(ZodiacSign::from_birthday(2, 29), Some(ZodiacSign::Pisces));
        assert_eq!(ZodiacSign::from_birthday(10, 24), Some(ZodiacSign::Scorpio));
    }

    #[test]
    fn test_from_birthday_out_of_range() {
        assert_eq!(ZodiacSign::from_birthday(13, 1), None);
        assert_eq!(ZodiacSign::from_birthday(0, 10), None);
    }

    #[test]
    fn test_every_valid_day_has_a_sign() {
        let days = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for (month, max_day) in (1..=12).zip(days) {
            for day in 1..=max_day {
                assert!(
                    ZodiacSign::from_birthday(month, day).is_some(),
                    "{month}/{day} has no sign"
                );
            }
        }
    }

    #[test]
    fn test_zodiac_from_str() {
        assert_eq!("leo".parse::<ZodiacSign>().unwrap(), ZodiacSign::Leo);
        assert_eq!("天蝎座".parse::<ZodiacSign>().unwrap(), ZodiacSign::Scorpio);
        assert!("Ophiuchus".parse::<ZodiacSign>().is_err());
    }

    #[test]
    fn test_chinese_zodiac_from_str() {
        assert_eq!("Dragon".parse::<ChineseZodiac>().unwrap(), ChineseZodiac::Dragon);
        assert_eq!("猪".parse::<ChineseZodiac>().unwrap(), ChineseZodiac::Pig);
        assert!("Cat".parse::<ChineseZodiac>().is_err());
    }

    #[test]
    fn test_serde_uses_english_names() {
        let json = serde_json::to_string(&ZodiacSign::Sagittarius).unwrap();
        assert_eq!(json, "\"Sagittarius\"");
        let parsed: ChineseZodiac = serde_json::from_str("\"Rooster\"").unwrap();
        assert_eq!(parsed, ChineseZodiac::Rooster);
    }
}
