use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Locale-style date/time options, stored in snapshots as `timeStampOptions`.
///
/// Component values follow the browser vocabulary: `"numeric"`, `"2-digit"`,
/// and for `month` also `"long"` / `"short"`. A missing component is left out
/// of the rendered string. Keys this type does not model are kept in `extra`
/// so a snapshot round-trips them untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour12: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for TimestampOptions {
    fn default() -> Self {
        Self {
            year: Some("numeric".into()),
            month: Some("numeric".into()),
            day: Some("numeric".into()),
            hour: Some("2-digit".into()),
            minute: Some("2-digit".into()),
            second: None,
            hour12: None,
            extra: BTreeMap::new(),
        }
    }
}

impl TimestampOptions {
    /// Render `when` as `M/D/YYYY, HH:MM` (or the subset of it selected).
    /// A textual month switches the date to `Month D, YYYY`.
    pub fn format<Tz>(&self, when: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let pattern = self.pattern();
        if pattern.is_empty() {
            return String::new();
        }
        when.format(&pattern).to_string()
    }

    fn pattern(&self) -> String {
        let two_digit = |value: &Option<String>| value.as_deref() == Some("2-digit");

        let year = self.year.as_ref().map(|_| {
            if two_digit(&self.year) { "%y" } else { "%Y" }
        });
        let day = self.day.as_ref().map(|_| {
            if two_digit(&self.day) { "%d" } else { "%-d" }
        });

        let date = match self.month.as_deref() {
            Some(textual @ ("long" | "short")) => {
                let month = if textual == "long" { "%B" } else { "%b" };
                let mut out = month.to_string();
                if let Some(day) = day {
                    out.push(' ');
                    out.push_str(day);
                }
                if let Some(year) = year {
                    out.push_str(if day.is_some() { ", " } else { " " });
                    out.push_str(year);
                }
                out
            }
            month => {
                let month = month.map(|m| if m == "2-digit" { "%m" } else { "%-m" });
                [month, day, year]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join("/")
            }
        };

        let twelve_hour = self.hour12.unwrap_or(false);
        let hour = self.hour.as_ref().map(|_| match (twelve_hour, two_digit(&self.hour)) {
            (true, true) => "%I",
            (true, false) => "%-I",
            (false, true) => "%H",
            (false, false) => "%-H",
        });
        let minute = self.minute.as_ref().map(|_| "%M");
        let second = self.second.as_ref().map(|_| "%S");
        let mut time = [hour, minute, second]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(":");
        if twelve_hour && hour.is_some() {
            time.push_str(" %p");
        }

        match (date.is_empty(), time.is_empty()) {
            (false, false) => format!("{date}, {time}"),
            (false, true) => date,
            (true, _) => time,
        }
    }
}
