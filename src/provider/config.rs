//! Typed configuration entries registered by providers.

use std::fmt;

/// Separator used when a filter is persisted in configuration text.
pub const FILTER_SEPARATOR_INLINE: &str = ",";
/// Separator used when a filter is shown to a user or edited as text.
pub const FILTER_SEPARATOR_DISPLAY: &str = "\n";

/// Error returned when a configuration value is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No entry registered under this key.
    UnknownKey(String),
    /// A key was registered twice.
    DuplicateKey(String),
    /// The value's type differs from the registered entry's type.
    TypeMismatch {
        key: String,
        expected: &'static str,
        got: &'static str,
    },
    /// The textual form could not be parsed for the entry's type.
    InvalidValue { key: String, reason: String },
    /// A filter entry is empty or contains a separator.
    InvalidFilterEntry(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::UnknownKey(key) => write!(f, "unknown key '{}'", key),
            ConfigurationError::DuplicateKey(key) => write!(f, "key '{}' registered twice", key),
            ConfigurationError::TypeMismatch { key, expected, got } => {
                write!(f, "'{}' expects {}, got {}", key, expected, got)
            }
            ConfigurationError::InvalidValue { key, reason } => {
                write!(f, "invalid value for '{}': {}", key, reason)
            }
            ConfigurationError::InvalidFilterEntry(entry) => {
                write!(f, "invalid filter entry {:?}", entry)
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Inclusion list of source names. Empty means "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    entries: Vec<String>,
}

impl Filter {
    /// Builds a filter, rejecting entries that are empty or contain either
    /// separator.
    pub fn new<I, S>(entries: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.into();
            if entry.is_empty()
                || entry.contains(FILTER_SEPARATOR_INLINE)
                || entry.contains(FILTER_SEPARATOR_DISPLAY)
            {
                return Err(ConfigurationError::InvalidFilterEntry(entry));
            }
            out.push(entry);
        }
        Ok(Self { entries: out })
    }

    fn split(text: &str, separator: &str) -> Result<Self, ConfigurationError> {
        Self::new(
            text.split(separator)
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    /// Parses the persisted form, `"eth0,wlan0"`.
    pub fn from_inline(text: &str) -> Result<Self, ConfigurationError> {
        Self::split(text, FILTER_SEPARATOR_INLINE)
    }

    /// Parses the display form, one entry per line.
    pub fn from_display(text: &str) -> Result<Self, ConfigurationError> {
        Self::split(text, FILTER_SEPARATOR_DISPLAY)
    }

    pub fn to_inline(&self) -> String {
        self.entries.join(FILTER_SEPARATOR_INLINE)
    }

    pub fn to_display(&self) -> String {
        self.entries.join(FILTER_SEPARATOR_DISPLAY)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a source named `name` passes the filter.
    pub fn includes(&self, name: &str) -> bool {
        self.entries.is_empty() || self.entries.iter().any(|e| e == name)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn footprint(&self) -> usize {
        super::strings_footprint(&self.entries)
    }
}

/// Current value of a configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    Number(i64),
    Text(String),
    List(Filter),
}

impl ConfigValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Number(_) => "number",
            ConfigValue::Text(_) => "text",
            ConfigValue::List(_) => "list",
        }
    }

    /// Persisted textual form, accepted back by [`ProviderConfig::set_from_str`].
    pub fn to_persisted(&self) -> String {
        match self {
            ConfigValue::Bool(b) => b.to_string(),
            ConfigValue::Number(n) => n.to_string(),
            ConfigValue::Text(s) => s.clone(),
            ConfigValue::List(filter) => filter.to_inline(),
        }
    }
}

/// One registered, typed key/value binding with its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub help: &'static str,
    pub value: ConfigValue,
}

/// Entries a provider registered at initialization.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    entries: Vec<ConfigEntry>,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entry with its default value.
    pub fn add_entry(
        &mut self,
        key: &'static str,
        label: &'static str,
        help: &'static str,
        default: ConfigValue,
    ) -> Result<(), ConfigurationError> {
        if self.entries.iter().any(|e| e.key == key) {
            return Err(ConfigurationError::DuplicateKey(key.to_string()));
        }
        self.entries.push(ConfigEntry {
            key,
            label,
            help,
            value: default,
        });
        Ok(())
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_number(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            ConfigValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            ConfigValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_list(&self, key: &str) -> Option<&Filter> {
        match self.get(key)? {
            ConfigValue::List(filter) => Some(filter),
            _ => None,
        }
    }

    /// Replaces an entry's value. On error the previous value is kept.
    pub fn set(&mut self, key: &str, value: ConfigValue) -> Result<(), ConfigurationError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.key == key)
            .ok_or_else(|| ConfigurationError::UnknownKey(key.to_string()))?;
        if std::mem::discriminant(&entry.value) != std::mem::discriminant(&value) {
            return Err(ConfigurationError::TypeMismatch {
                key: key.to_string(),
                expected: entry.value.type_name(),
                got: value.type_name(),
            });
        }
        entry.value = value;
        Ok(())
    }

    /// Parses `text` in the entry's persisted form and sets it.
    pub fn set_from_str(&mut self, key: &str, text: &str) -> Result<(), ConfigurationError> {
        let current = self
            .get(key)
            .ok_or_else(|| ConfigurationError::UnknownKey(key.to_string()))?;
        let invalid = |reason: String| ConfigurationError::InvalidValue {
            key: key.to_string(),
            reason,
        };
        let value = match current {
            ConfigValue::Bool(_) => match text.trim() {
                "true" | "1" => ConfigValue::Bool(true),
                "false" | "0" => ConfigValue::Bool(false),
                other => return Err(invalid(format!("{:?} is not a boolean", other))),
            },
            ConfigValue::Number(_) => ConfigValue::Number(
                text.trim()
                    .parse()
                    .map_err(|e| invalid(format!("{:?}: {}", text, e)))?,
            ),
            ConfigValue::Text(_) => ConfigValue::Text(text.to_string()),
            ConfigValue::List(_) => ConfigValue::List(Filter::from_inline(text)?),
        };
        self.set(key, value)
    }

    pub fn footprint(&self) -> usize {
        self.entries.capacity() * std::mem::size_of::<ConfigEntry>()
            + self
                .entries
                .iter()
                .map(|e| match &e.value {
                    ConfigValue::Text(s) => s.capacity(),
                    ConfigValue::List(filter) => filter.footprint(),
                    _ => 0,
                })
                .sum::<usize>()
    }
}
