//! User profile and birthday validation.

use serde::{Deserialize, Serialize};

use super::zodiac::{ChineseZodiac, ZodiacSign};

/// Days in each month. February allows 29 since the birth year is unknown.
const DAYS_IN_MONTH: [u8; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Errors that can occur when validating a profile.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// Month or day was left empty on submit.
    #[error("请输入完整的生日")]
    MissingBirthday,
    /// The month/day pair does not exist in any year.
    #[error("请输入有效的日期 (例如: 2月只有28或29天)")]
    InvalidDate {
        /// Month as entered.
        month: u8,
        /// Day as entered.
        day: u8,
    },
    /// Month or day was not a number.
    #[error("invalid birthday component: {0}")]
    NotANumber(String),
}

/// A month/day birthday without a year.
///
/// ## Examples
///
/// ```
/// use paw_fortune_core::Birthday;
///
/// assert!(Birthday::new(2, 29).is_ok());  // leap day tolerated
/// assert!(Birthday::new(2, 30).is_err());
/// assert!(Birthday::new(4, 31).is_err());
/// assert!(Birthday::new(13, 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Birthday {
    month: u8,
    day: u8,
}

impl Birthday {
    /// Validate and build a birthday.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidDate`] if the month is outside 1-12 or
    /// the day does not exist in that month.
    pub fn new(month: u8, day: u8) -> Result<Self, ProfileError> {
        if is_valid_date(month, day) {
            Ok(Self { month, day })
        } else {
            Err(ProfileError::InvalidDate { month, day })
        }
    }

    /// Month, 1-12.
    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    /// Day of month.
    #[must_use]
    pub const fn day(self) -> u8 {
        self.day
    }

    /// Western sign for this birthday.
    #[must_use]
    pub fn zodiac(self) -> ZodiacSign {
        // Every validated date falls in exactly one range.
        ZodiacSign::from_birthday(self.month, self.day).unwrap_or(ZodiacSign::Aries)
    }
}

/// Whether a month/day pair exists, with February allowing the 29th.
#[must_use]
pub fn is_valid_date(month: u8, day: u8) -> bool {
    if !(1..=12).contains(&month) || day < 1 {
        return false;
    }
    DAYS_IN_MONTH
        .get(usize::from(month - 1))
        .is_some_and(|&max| day <= max)
}

/// The user's fortune profile.
///
/// Stored as a single record and overwritten wholesale on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub zodiac: ZodiacSign,
    pub chinese_zodiac: ChineseZodiac,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday_day: Option<u8>,
}

impl UserProfile {
    /// Build a profile from a validated birthday. The western sign is
    /// derived from the birthday.
    #[must_use]
    pub fn with_birthday(birthday: Birthday, chinese_zodiac: ChineseZodiac) -> Self {
        Self {
            zodiac: birthday.zodiac(),
            chinese_zodiac,
            birthday_month: Some(birthday.month()),
            birthday_day: Some(birthday.day()),
        }
    }

    /// Birthday, if both parts are present and valid.
    #[must_use]
    pub fn birthday(&self) -> Option<Birthday> {
        match (self.birthday_month, self.birthday_day) {
            (Some(month), Some(day)) => Birthday::new(month, day).ok(),
            _ => None,
        }
    }

    /// Validate the stored birthday parts.
    ///
    /// A profile without a birthday is valid; a profile with only one part,
    /// or with a date that does not exist, is not.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidDate`] or
    /// [`ProfileError::MissingBirthday`].
    pub fn validate(&self) -> Result<(), ProfileError> {
        match (self.birthday_month, self.birthday_day) {
            (None, None) => Ok(()),
            (Some(month), Some(day)) => Birthday::new(month, day).map(|_| ()),
            _ => Err(ProfileError::MissingBirthday),
        }
    }

    /// Generator context line, e.g.
    /// `用户背景: 星座(Western Zodiac): Leo, 生肖(Chinese Zodiac): Dragon. 生日: 8月1日.`
    #[must_use]
    pub fn context_line(&self) -> String {
        let birthday = self
            .birthday()
            .map(|b| format!("生日: {}月{}日.", b.month(), b.day()))
            .unwrap_or_default();
        format!(
            "用户背景: 星座(Western Zodiac): {}, 生肖(Chinese Zodiac): {}. {birthday}",
            self.zodiac.name(),
            self.chinese_zodiac.name(),
        )
    }
}

/// Raw profile form input, as typed by the user.
///
/// Month and day are free text until submit, matching a form with two
/// number inputs and two selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileForm {
    pub month: String,
    pub day: String,
    pub zodiac: ZodiacSign,
    pub chinese_zodiac: ChineseZodiac,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            month: String::new(),
            day: String::new(),
            zodiac: ZodiacSign::Aries,
            chinese_zodiac: ChineseZodiac::Rat,
        }
    }
}

impl ProfileForm {
    /// Pre-fill the form from an existing profile.
    #[must_use]
    pub fn from_profile(profile: Option<&UserProfile>) -> Self {
        profile.map_or_else(Self::default, |p| Self {
            month: p.birthday_month.map(|m| m.to_string()).unwrap_or_default(),
            day: p.birthday_day.map(|d| d.to_string()).unwrap_or_default(),
            zodiac: p.zodiac,
            chinese_zodiac: p.chinese_zodiac,
        })
    }

    /// The sign implied by the current month/day input, if both parse to
    /// a valid date. While this is `Some`, the zodiac select is locked.
    #[must_use]
    pub fn locked_zodiac(&self) -> Option<ZodiacSign> {
        let month = self.month.trim().parse::<u8>().ok()?;
        let day = self.day.trim().parse::<u8>().ok()?;
        Birthday::new(month, day).ok().map(Birthday::zodiac)
    }

    /// Strict validation on submit.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::MissingBirthday`] if either field is empty,
    /// [`ProfileError::NotANumber`] if a field does not parse, and
    /// [`ProfileError::InvalidDate`] if the date does not exist.
    pub fn submit(&self) -> Result<UserProfile, ProfileError> {
        let month = self.month.trim();
        let day = self.day.trim();
        if month.is_empty() || day.is_empty() {
            return Err(ProfileError::MissingBirthday);
        }
        let month = parse_component(month)?;
        let day = parse_component(day)?;
        let birthday = Birthday::new(month, day)?;
        Ok(UserProfile::with_birthday(birthday, self.chinese_zodiac))
    }
}

fn parse_component(s: &str) -> Result<u8, ProfileError> {
    s.parse::<u8>()
        .map_err(|_| ProfileError::NotANumber(s.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(month: &str, day: &str) -> ProfileForm {
        ProfileForm {
            month: month.to_owned(),
            day: day.to_owned(),
            zodiac: ZodiacSign::Aries,
            chinese_zodiac: ChineseZodiac::Goat,
        }
    }

    #[test]
    fn test_leap_day_accepted() {
        assert!(Birthday::new(2, 29).is_ok());
        assert!(form("2", "29").submit().is_ok());
    }

    #[test]
    fn test_february_thirtieth_rejected() {
        assert_eq!(
            Birthday::new(2, 30),
            Err(ProfileError::InvalidDate { month: 2, day: 30 })
        );
        assert!(matches!(
            form("2", "30").submit(),
            Err(ProfileError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_thirty_day_months() {
        for month in [4, 6, 9, 11] {
            assert!(Birthday::new(month, 30).is_ok());
            assert!(Birthday::new(month, 31).is_err());
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(!is_valid_date(0, 1));
        assert!(!is_valid_date(13, 1));
        assert!(!is_valid_date(5, 0));
    }

    #[test]
    fn test_submit_requires_both_fields() {
        assert_eq!(form("", "12").submit(), Err(ProfileError::MissingBirthday));
        assert_eq!(form("3", " ").submit(), Err(ProfileError::MissingBirthday));
    }

    #[test]
    fn test_submit_not_a_number() {
        assert!(matches!(
            form("three", "4").submit(),
            Err(ProfileError::NotANumber(_))
        ));
    }

    #[test]
    fn test_submit_derives_zodiac() {
        let profile = form("8", "1").submit().unwrap();
        assert_eq!(profile.zodiac, ZodiacSign::Leo);
        assert_eq!(profile.chinese_zodiac, ChineseZodiac::Goat);
        assert_eq!(profile.birthday_month, Some(8));
        assert_eq!(profile.birthday_day, Some(1));
    }

    #[test]
    fn test_locked_zodiac() {
        assert_eq!(form("12", "25").locked_zodiac(), Some(ZodiacSign::Capricorn));
        assert_eq!(form("2", "30").locked_zodiac(), None);
        assert_eq!(form("", "30").locked_zodiac(), None);
    }

    #[test]
    fn test_profile_validate() {
        let mut profile = form("2", "29").submit().unwrap();
        assert!(profile.validate().is_ok());

        profile.birthday_day = Some(30);
        assert!(profile.validate().is_err());

        profile.birthday_day = None;
        assert_eq!(profile.validate(), Err(ProfileError::MissingBirthday));

        profile.birthday_month = None;
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_context_line() {
        let profile = form("8", "1").submit().unwrap();
        assert_eq!(
            profile.context_line(),
            "用户背景: 星座(Western Zodiac): Leo, 生肖(Chinese Zodiac): Goat. 生日: 8月1日."
        );
    }

    #[test]
    fn test_serde_camel_case() {
        let profile = form("8", "1").submit().unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["chineseZodiac"], "Goat");
        assert_eq!(json["birthdayMonth"], 8);

        let parsed: UserProfile =
            serde_json::from_str(r#"{"zodiac":"Virgo","chineseZodiac":"Ox"}"#).unwrap();
        assert_eq!(parsed.birthday(), None);
    }

    #[test]
    fn test_form_from_profile() {
        let profile = form("8", "1").submit().unwrap();
        let prefilled = ProfileForm::from_profile(Some(&profile));
        assert_eq!(prefilled.month, "8");
        assert_eq!(prefilled.zodiac, ZodiacSign::Leo);
        assert_eq!(ProfileForm::from_profile(None), ProfileForm::default());
    }
}
