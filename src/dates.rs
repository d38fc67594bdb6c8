//! Date sequence backing the built-in `date` variable
//!
//! The first call yields the start date; every later call advances the cursor
//! by one increment and yields the new date. Month and year steps clamp to the
//! end of shorter months, and the clamped day carries forward
//! (Jan 31 -> Feb 28 -> Mar 28).

use crate::config::{DateConfig, DateIncrement, DEFAULT_DATE_FORMAT};
use crate::error::{ProjectionError, Result};
use chrono::{Days, Locale, Months, NaiveDate};

#[derive(Debug, Clone)]
pub struct DateSequence {
    start: NaiveDate,
    cursor: NaiveDate,
    increment: DateIncrement,
    format: String,
    locale: Locale,
    started: bool,
}

impl DateSequence {
    /// Build a sequence from config, resolving the locale and defaulting the start to today
    pub fn from_config(config: &DateConfig) -> Result<Self> {
        let start = config
            .start
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let (locale, format) = match config.locale.as_deref() {
            Some(name) => {
                let (locale, language) = resolve_locale(name)?;
                let format = config
                    .format
                    .clone()
                    .unwrap_or_else(|| long_date_pattern(&language).to_string());
                (locale, format)
            }
            None => (
                Locale::POSIX,
                config.format.clone().unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
            ),
        };

        Ok(Self {
            start,
            cursor: start,
            increment: config.increment,
            format,
            locale,
            started: false,
        })
    }

    /// Rewind to the start date
    pub fn reset(&mut self) {
        self.cursor = self.start;
        self.started = false;
    }

    /// Next date in the sequence, formatted
    pub fn next_formatted(&mut self) -> Result<String> {
        if self.started {
            self.cursor = self.advance(self.cursor)?;
        }
        self.started = true;
        Ok(self.format(self.cursor))
    }

    fn advance(&self, date: NaiveDate) -> Result<NaiveDate> {
        let next = match self.increment {
            DateIncrement::Days => date.checked_add_days(Days::new(1)),
            DateIncrement::Months => date.checked_add_months(Months::new(1)),
            DateIncrement::Years => date.checked_add_months(Months::new(12)),
        };
        next.ok_or_else(|| ProjectionError::DateOutOfRange(date.to_string()))
    }

    pub fn format(&self, date: NaiveDate) -> String {
        date.and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .format_localized(&self.format, self.locale)
            .to_string()
    }
}

/// Resolve `es_ES`, `es-ES` or a bare `es` to a chrono locale, returning its language code too
fn resolve_locale(name: &str) -> Result<(Locale, String)> {
    let normalized = name.replace('-', "_");
    let (language, qualified) = match normalized.split_once('_') {
        Some((language, _)) => (language.to_lowercase(), normalized.clone()),
        None => {
            let language = normalized.to_lowercase();
            let qualified = format!("{}_{}", language, default_territory(&language));
            (language, qualified)
        }
    };
    let locale = Locale::try_from(qualified.as_str())
        .map_err(|_| ProjectionError::UnknownLocale(name.to_string()))?;
    Ok((locale, language))
}

/// Territory used when only a language code is given
fn default_territory(language: &str) -> String {
    match language {
        "en" => "US",
        "pt" => "PT",
        "ja" => "JP",
        "zh" => "CN",
        "ko" => "KR",
        "sv" => "SE",
        "da" => "DK",
        "cs" => "CZ",
        "el" => "GR",
        "uk" => "UA",
        "nb" => "NO",
        other => return other.to_uppercase(),
    }
    .to_string()
}

/// Long-form date pattern for a language (day, month name, year in local order)
fn long_date_pattern(language: &str) -> &'static str {
    match language {
        "en" => DEFAULT_DATE_FORMAT,
        "es" | "pt" => "%-d de %B de %Y",
        "de" | "da" | "nb" | "cs" => "%-d. %B %Y",
        "ja" | "zh" => "%Y年%-m月%-d日",
        _ => "%-d %B %Y",
    }
}
