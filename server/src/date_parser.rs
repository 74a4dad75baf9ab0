// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// A date found inside free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    /// The part of the text that produced the date.
    pub matched: String,
    pub date: DateTime<Utc>,
}

/// Extracts a due date from free text such as "dentist tomorrow".
///
/// Implementations return the first date they recognize, or `None`.
pub trait DateParser: Send + Sync {
    fn parse(&self, text: &str, reference_now: DateTime<Utc>) -> Option<DateMatch>;
}

/// Recognizes a handful of fixed phrases and ISO dates:
/// `today`, `tonight`, `tomorrow`, `next week` and `YYYY-MM-DD`.
///
/// Relative phrases keep the time of day of the reference instant, except
/// `tonight` (20:00). ISO dates resolve to noon. Both use the configured offset.
#[derive(Debug, Clone, Copy)]
pub struct KeywordDateParser {
    offset: FixedOffset,
}

impl KeywordDateParser {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    fn at_local(&self, day: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        self.offset
            .from_local_datetime(&day.and_time(time))
            .single()
            .map(|d| d.with_timezone(&Utc))
    }

    fn resolve(
        &self,
        words: &[&str],
        reference_now: DateTime<Utc>,
    ) -> Option<(usize, DateTime<Utc>)> {
        let local_now = reference_now.with_timezone(&self.offset);
        match words {
            ["next", "week", ..] => Some((2, reference_now + Duration::days(7))),
            ["today", ..] => Some((1, reference_now)),
            ["tomorrow", ..] => Some((1, reference_now + Duration::days(1))),
            ["tonight", ..] => {
                let evening = NaiveTime::from_hms_opt(20, 0, 0)?;
                Some((1, self.at_local(local_now.date_naive(), evening)?))
            }
            [word, ..] => {
                let day = NaiveDate::parse_from_str(word, "%Y-%m-%d").ok()?;
                let noon = NaiveTime::from_hms_opt(12, 0, 0)?;
                Some((1, self.at_local(day, noon)?))
            }
            [] => None,
        }
    }
}

impl DateParser for KeywordDateParser {
    fn parse(&self, text: &str, reference_now: DateTime<Utc>) -> Option<DateMatch> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
            .collect();

        (0..words.len()).find_map(|start| {
            let (len, date) = self.resolve(&words[start..], reference_now)?;
            Some(DateMatch {
                matched: words[start..start + len].join(" "),
                date,
            })
        })
    }
}
