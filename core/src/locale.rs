//! Locale resolution, message catalogs and date display.
//!
//! A locale segment taken from the page address is checked against a fixed
//! allow-list. Anything else, or a catalog that fails to load, resolves to
//! not-found; there is no silent fallback to English.
//!
//! Catalogs are nested JSON objects embedded in the binary and parsed once
//! per process. Lookups use dotted keys (`todo.tabs.completed`).
//!
//! All timestamps are displayed in one fixed timezone whatever the locale,
//! so every renderer prints the same wall-clock time.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use thiserror::Error;
use tracing::warn;

/// IANA name of the display timezone.
pub const DISPLAY_TIME_ZONE: &str = "Asia/Shanghai";

// Asia/Shanghai has had no daylight saving since 1991.
const DISPLAY_OFFSET_SECS: i32 = 8 * 3600;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    En,
    Zh,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Zh];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }

    /// Name of the language in itself, for a language switch.
    pub fn native_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Zh => "中文",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Locale::En => include_str!("../messages/en.json"),
            Locale::Zh => include_str!("../messages/zh.json"),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|l| l.code() == segment)
            .ok_or_else(|| LocaleError::NotFound {
                segment: segment.to_string(),
            })
    }
}

#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("no locale named {segment:?}")]
    NotFound { segment: String },

    #[error("message catalog for {locale} failed to load: {message}")]
    Catalog { locale: Locale, message: String },
}

/// Flattened translation table for one locale.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        let root: serde_json::Value = serde_json::from_str(source)?;
        let mut messages = HashMap::new();
        flatten("", &root, &mut messages);
        Ok(Self { messages })
    }

    /// Parsed once per process; later calls return the same catalog.
    pub fn load(locale: Locale) -> Result<&'static Catalog, LocaleError> {
        static EN: OnceLock<Result<Catalog, String>> = OnceLock::new();
        static ZH: OnceLock<Result<Catalog, String>> = OnceLock::new();
        let cell = match locale {
            Locale::En => &EN,
            Locale::Zh => &ZH,
        };
        cell.get_or_init(|| Catalog::from_json(locale.source()).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|message| LocaleError::Catalog {
                locale,
                message: message.clone(),
            })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Translated string, or the key itself when the catalog lacks it.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).unwrap_or(key)
    }

    /// Like `t`, with `{name}` placeholders replaced from `args`.
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut text = self.t(key).to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut HashMap<String, String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        serde_json::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// Everything a renderer needs for one request in one locale.
#[derive(Debug, Clone, Copy)]
pub struct LocaleContext {
    pub locale: Locale,
    pub catalog: &'static Catalog,
    pub time_zone: &'static str,
}

impl LocaleContext {
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.catalog.t(key)
    }

    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.catalog.t_with(key, args)
    }

    pub fn format_datetime(&self, at: &DateTime<Utc>) -> String {
        format_datetime(at)
    }
}

/// Resolve a locale segment from the page address.
pub fn resolve_locale(segment: &str) -> Result<LocaleContext, LocaleError> {
    let locale: Locale = segment.parse()?;
    let catalog = Catalog::load(locale).map_err(|e| {
        warn!(%locale, error = %e, "locale catalog unavailable");
        LocaleError::NotFound {
            segment: segment.to_string(),
        }
    })?;
    Ok(LocaleContext {
        locale,
        catalog,
        time_zone: DISPLAY_TIME_ZONE,
    })
}

pub fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// `yyyy-MM-dd HH:mm` in the display timezone.
pub fn format_datetime(at: &DateTime<Utc>) -> String {
    at.with_timezone(&display_offset())
        .format(DATETIME_FORMAT)
        .to_string()
}

/// First segment of a page path, e.g. `zh` for `/zh/todos`.
pub fn locale_segment(path: &str) -> Option<&str> {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
}

/// Rewrite the leading locale segment of `path` from `from` to `to`.
/// A path without a leading `from` segment gets `to` prepended.
pub fn switch_locale_path(path: &str, from: Locale, to: Locale) -> String {
    let rest = path.trim_start_matches('/');
    let prefix = from.code();
    match rest.strip_prefix(prefix) {
        Some("") => format!("/{to}"),
        Some(tail) if tail.starts_with('/') => format!("/{to}{tail}"),
        _ if rest.is_empty() => format!("/{to}"),
        _ => format!("/{to}/{rest}"),
    }
}
