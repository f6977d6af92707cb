use regex::Regex;

/// Fields recovered from one line of banner text, e.g.
///
/// `@ FOSA_01 73F 23C @ 06-09-2023 13:41:51`
///
/// Only built when both a date and a time were found on the same line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerRecord {
    /// The line the fields were taken from.
    pub raw_text: String,
    pub camera_id: Option<String>,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HHMMSS`
    pub time: String,
    /// e.g. `23C`
    pub temperature_celsius: Option<String>,
    /// e.g. `73F`
    pub temperature_fahrenheit: Option<String>,
}

/// Result of parsing recognized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerParse {
    Record(BannerRecord),
    /// No line held both a date and a time. Not an error.
    NoBanner,
}

impl BannerParse {
    pub fn record(&self) -> Option<&BannerRecord> {
        match self {
            BannerParse::Record(record) => Some(record),
            BannerParse::NoBanner => None,
        }
    }

    pub fn into_record(self) -> Option<BannerRecord> {
        match self {
            BannerParse::Record(record) => Some(record),
            BannerParse::NoBanner => None,
        }
    }
}

lazy_static! {
    /// `MM-DD-YYYY`
    static ref REGEX_DATE: Regex = Regex::new(r"\d{2}-\d{2}-\d{4}").unwrap();
    /// `HH:MM:SS`
    static ref REGEX_TIME: Regex = Regex::new(r"\d{2}:\d{2}:\d{2}").unwrap();
    static ref REGEX_FAHRENHEIT: Regex = Regex::new(r" \d+F ").unwrap();
    static ref REGEX_CELSIUS: Regex = Regex::new(r" \d+C ").unwrap();
}

/// Parses recognizer output line by line; the first line that yields a
/// record wins. Lines are never merged.
///
/// `None` stands for "the recognizer produced nothing" and is treated like
/// empty text.
pub fn parse(raw_text: Option<&str>) -> BannerParse {
    let raw_text = match raw_text {
        Some(text) => text,
        None => return BannerParse::NoBanner,
    };

    raw_text
        .lines()
        .find_map(parse_line)
        .map(BannerParse::Record)
        .unwrap_or(BannerParse::NoBanner)
}

/// Parses a single line. Returns `None` unless both a date and a time are
/// present.
pub fn parse_line(line: &str) -> Option<BannerRecord> {
    let raw_date = REGEX_DATE.find(line)?.as_str();
    let raw_time = REGEX_TIME.find(line)?.as_str();

    let temperature_fahrenheit = REGEX_FAHRENHEIT
        .find(line)
        .map(|m| m.as_str().trim().to_string());
    let temperature_celsius = REGEX_CELSIUS
        .find(line)
        .map(|m| m.as_str().trim().to_string());

    let residual = residual_camera_text(
        line,
        &[
            Some(raw_date),
            Some(raw_time),
            temperature_celsius.as_deref(),
            temperature_fahrenheit.as_deref(),
        ],
    );
    let camera_id = longest_token(&residual).map(str::to_string);

    log::debug!("[banner] text={:?}", line);
    log::debug!("[banner] residual={:?}", residual);
    log::debug!("[banner] cam_id={:?}", camera_id);
    log::debug!(
        "[banner] temperature_c={:?} temperature_f={:?}",
        temperature_celsius,
        temperature_fahrenheit
    );

    Some(BannerRecord {
        raw_text: line.to_string(),
        camera_id,
        date: reformat_date(raw_date),
        time: normalize_time(raw_time),
        temperature_celsius,
        temperature_fahrenheit,
    })
}

/// `MM-DD-YYYY` to `YYYY-MM-DD`. The groups are only reordered; a month of
/// 13 passes through unchanged.
pub fn reformat_date(raw_date: &str) -> String {
    let mut parts = raw_date.splitn(3, '-');
    let month = parts.next().unwrap_or_default();
    let day = parts.next().unwrap_or_default();
    let year = parts.next().unwrap_or_default();
    format!("{}-{}-{}", year, month, day)
}

/// `HH:MM:SS` to `HHMMSS`.
pub fn normalize_time(raw_time: &str) -> String {
    raw_time.replace(':', "")
}

/// Removes every occurrence of each matched token from the line and
/// collapses runs of spaces, leaving the text the camera id is picked from.
pub fn residual_camera_text(line: &str, matched: &[Option<&str>]) -> String {
    let mut residual = line.to_string();
    for token in matched.iter().flatten() {
        if !token.is_empty() {
            residual = residual.replace(token, "");
        }
    }
    collapse_spaces(&residual)
}

/// Collapses every run of spaces into a single space. Other whitespace is
/// left alone.
pub fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for c in text.chars() {
        if c == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        out.push(c);
    }
    out
}

/// Longest space-separated token; ties go to the earliest one. `None` when
/// nothing but spaces remains.
pub fn longest_token(text: &str) -> Option<&str> {
    let mut best = "";
    let mut best_len = 0;
    for token in text.split(' ') {
        let len = token.chars().count();
        if len > best_len {
            best = token;
            best_len = len;
        }
    }
    if best_len == 0 {
        None
    } else {
        Some(best)
    }
}
