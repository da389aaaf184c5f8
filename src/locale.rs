//! Label tables for the supported locales.
//!
//! Weekday indices follow the task model: 0 = Sunday through 6 = Saturday.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::ActivityKind;

const ES_DAYS_SHORT: [&str; 7] = ["Dom", "Lun", "Mar", "Mié", "Jue", "Vie", "Sáb"];
const ES_DAYS_LONG: [&str; 7] = ["domingo", "lunes", "martes", "miércoles", "jueves", "viernes", "sábado"];
const ES_MONTHS_SHORT: [&str; 12] = ["ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic"];
const ES_MONTHS_LONG: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio",
    "julio", "agosto", "septiembre", "octubre", "noviembre", "diciembre",
];

const EN_DAYS_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const EN_DAYS_LONG: [&str; 7] = ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];
const EN_MONTHS_SHORT: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
const EN_MONTHS_LONG: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Config files and `MADRIGUERA_LOCALE` accept the same spellings.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Locale {
    #[default]
    EsAr,
    En,
}

impl TryFrom<String> for Locale {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" | "es-ar" | "es_ar" => Ok(Locale::EsAr),
            "en" | "en-us" | "en_us" | "en-gb" => Ok(Locale::En),
            _ => Err(Error::InvalidLocale(s.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::EsAr => f.write_str("es-AR"),
            Locale::En => f.write_str("en"),
        }
    }
}

impl Locale {
    /// Short weekday name for an index, or `None` past Saturday.
    pub fn weekday_short(&self, index: u8) -> Option<&'static str> {
        let table = match self {
            Locale::EsAr => &ES_DAYS_SHORT,
            Locale::En => &EN_DAYS_SHORT,
        };
        table.get(index as usize).copied()
    }

    pub fn weekday_long(&self, index: u8) -> Option<&'static str> {
        let table = match self {
            Locale::EsAr => &ES_DAYS_LONG,
            Locale::En => &EN_DAYS_LONG,
        };
        table.get(index as usize).copied()
    }

    fn month_short(&self, month0: u32) -> &'static str {
        let table = match self {
            Locale::EsAr => &ES_MONTHS_SHORT,
            Locale::En => &EN_MONTHS_SHORT,
        };
        table[month0 as usize % 12]
    }

    fn month_long(&self, month0: u32) -> &'static str {
        let table = match self {
            Locale::EsAr => &ES_MONTHS_LONG,
            Locale::En => &EN_MONTHS_LONG,
        };
        table[month0 as usize % 12]
    }

    pub fn today(&self) -> &'static str {
        match self {
            Locale::EsAr => "hoy",
            Locale::En => "today",
        }
    }

    pub fn tomorrow(&self) -> &'static str {
        match self {
            Locale::EsAr => "mañana",
            Locale::En => "tomorrow",
        }
    }

    pub fn yesterday(&self) -> &'static str {
        match self {
            Locale::EsAr => "ayer",
            Locale::En => "yesterday",
        }
    }

    /// "el Mié" / "on Wed".
    pub fn on_weekday(&self, index: u8) -> String {
        let name = self.weekday_short(index).unwrap_or_default();
        match self {
            Locale::EsAr => format!("el {}", name),
            Locale::En => format!("on {}", name),
        }
    }

    pub fn one_time(&self) -> &'static str {
        match self {
            Locale::EsAr => "una vez",
            Locale::En => "one-time",
        }
    }

    pub fn every_day(&self) -> &'static str {
        match self {
            Locale::EsAr => "todos los días",
            Locale::En => "every day",
        }
    }

    /// Joined weekday names for a weekly schedule. Unknown indices are skipped.
    pub fn weekly(&self, days: impl IntoIterator<Item = u8>) -> String {
        let names: Vec<&str> = days.into_iter().filter_map(|d| self.weekday_short(d)).collect();
        if names.is_empty() {
            return String::new();
        }
        match self {
            Locale::EsAr => format!("los {}", names.join(", ")),
            Locale::En => format!("on {}", names.join(", ")),
        }
    }

    pub fn monthly(&self, day: u32) -> String {
        match self {
            Locale::EsAr => format!("el {} de cada mes", day),
            Locale::En => format!("on day {} of every month", day),
        }
    }

    /// "16 oct" / "Oct 16".
    pub fn short_date(&self, date: NaiveDate) -> String {
        let month = self.month_short(date.month0());
        match self {
            Locale::EsAr => format!("{} {}", date.day(), month),
            Locale::En => format!("{} {}", month, date.day()),
        }
    }

    /// "jueves, 15 de octubre" / "Thursday, October 15".
    pub fn long_date(&self, date: NaiveDate) -> String {
        let weekday = self
            .weekday_long(date.weekday().num_days_from_sunday() as u8)
            .unwrap_or_default();
        let month = self.month_long(date.month0());
        match self {
            Locale::EsAr => format!("{}, {} de {}", weekday, date.day(), month),
            Locale::En => format!("{}, {} {}", weekday, month, date.day()),
        }
    }

    /// Day header for the activity feed.
    pub fn day_header(&self, offset_from_today: i64, date: NaiveDate) -> String {
        match (offset_from_today, self) {
            (0, Locale::EsAr) => "Hoy".to_string(),
            (0, Locale::En) => "Today".to_string(),
            (-1, Locale::EsAr) => "Ayer".to_string(),
            (-1, Locale::En) => "Yesterday".to_string(),
            _ => self.long_date(date),
        }
    }

    pub fn activity_verb(&self, kind: ActivityKind) -> &'static str {
        match (self, kind) {
            (Locale::EsAr, ActivityKind::TaskAdd) => "agregó la tarea",
            (Locale::EsAr, ActivityKind::TaskDone) => "completó",
            (Locale::EsAr, ActivityKind::TaskUndone) => "desmarcó",
            (Locale::EsAr, ActivityKind::TaskEdit) => "editó",
            (Locale::EsAr, ActivityKind::TaskDelete) => "eliminó",
            (Locale::En, ActivityKind::TaskAdd) => "added the task",
            (Locale::En, ActivityKind::TaskDone) => "completed",
            (Locale::En, ActivityKind::TaskUndone) => "unchecked",
            (Locale::En, ActivityKind::TaskEdit) => "edited",
            (Locale::En, ActivityKind::TaskDelete) => "deleted",
            (Locale::EsAr, ActivityKind::Add) => "agregó",
            (Locale::EsAr, ActivityKind::Check) => "tachó",
            (Locale::EsAr, ActivityKind::Delete) => "eliminó",
            (Locale::EsAr, ActivityKind::Note) => "editó las notas de",
            (Locale::EsAr, ActivityKind::NewPlace) => "creó el lugar",
            (Locale::En, ActivityKind::Add) => "added",
            (Locale::En, ActivityKind::Check) => "checked off",
            (Locale::En, ActivityKind::Delete) => "deleted",
            (Locale::En, ActivityKind::Note) => "edited the notes of",
            (Locale::En, ActivityKind::NewPlace) => "created the place",
        }
    }

    /// Joins place names as "Coto y Feria" / "Coto and Feria".
    pub fn join_places(&self, names: &[String]) -> String {
        let and = match self {
            Locale::EsAr => " y ",
            Locale::En => " and ",
        };
        names.join(and)
    }

    /// Preposition before the places an item was added to.
    pub fn added_to(&self) -> &'static str {
        match self {
            Locale::EsAr => "a",
            Locale::En => "to",
        }
    }

    /// Preposition before the place an item was checked off at.
    pub fn checked_at(&self) -> &'static str {
        match self {
            Locale::EsAr => "en",
            Locale::En => "at",
        }
    }

    pub fn both(&self) -> &'static str {
        match self {
            Locale::EsAr => "ambos",
            Locale::En => "both",
        }
    }
}

/// Parses a weekday given as an index ("3") or a short English or Spanish
/// name ("wed", "mié", "mie").
pub fn parse_weekday(s: &str) -> Result<u8, Error> {
    let lower = s.trim().to_lowercase();
    if let Ok(n) = lower.parse::<u8>() {
        return if n <= 6 { Ok(n) } else { Err(Error::InvalidWeekday(s.to_string())) };
    }
    let key: String = lower.chars().take(3).collect();
    let index = match key.as_str() {
        "sun" | "dom" => 0,
        "mon" | "lun" => 1,
        "tue" | "mar" => 2,
        "wed" | "mié" | "mie" => 3,
        "thu" | "jue" => 4,
        "fri" | "vie" => 5,
        "sat" | "sáb" | "sab" => 6,
        _ => return Err(Error::InvalidWeekday(s.to_string())),
    };
    Ok(index)
}

/// Parses a comma separated weekday list such as "lun,jue" or "1,4".
pub fn parse_weekdays(s: &str) -> Result<Vec<u8>, Error> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_weekday)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_label_joins_names_in_order() {
        assert_eq!(Locale::EsAr.weekly([1, 4]), "los Lun, Jue");
        assert_eq!(Locale::En.weekly([0, 6]), "on Sun, Sat");
        assert_eq!(Locale::En.weekly([9]), "");
    }

    #[test]
    fn dates_follow_locale_order() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(Locale::EsAr.short_date(d), "15 oct");
        assert_eq!(Locale::En.short_date(d), "Oct 15");
        assert_eq!(Locale::EsAr.long_date(d), "jueves, 15 de octubre");
        assert_eq!(Locale::En.long_date(d), "Thursday, October 15");
    }

    #[test]
    fn parses_weekdays_in_both_languages() {
        assert_eq!(parse_weekdays("lun, jue").unwrap(), vec![1, 4]);
        assert_eq!(parse_weekdays("Wed,sat").unwrap(), vec![3, 6]);
        assert_eq!(parse_weekdays("0,6").unwrap(), vec![0, 6]);
        assert_eq!(parse_weekday("Miércoles").unwrap(), 3);
        assert!(parse_weekday("7").is_err());
        assert!(parse_weekday("someday").is_err());
    }

    #[test]
    fn locale_parses_from_config_strings() {
        assert_eq!("es-AR".parse::<Locale>().unwrap(), Locale::EsAr);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn locale_serde_accepts_the_same_spellings() {
        let es: Locale = serde_json::from_str("\"es\"").unwrap();
        assert_eq!(es, Locale::EsAr);
        let en: Locale = serde_json::from_str("\"en-US\"").unwrap();
        assert_eq!(en, Locale::En);
        assert!(serde_json::from_str::<Locale>("\"fr\"").is_err());
        assert_eq!(serde_json::to_string(&Locale::EsAr).unwrap(), "\"es-AR\"");
    }
}
