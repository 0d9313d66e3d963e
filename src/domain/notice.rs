// Notice domain model - user-facing notifications
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    Other(String),
}

impl Severity {
    pub fn parse(token: &str) -> Self {
        match token {
            "info" => Severity::Info,
            "success" => Severity::Success,
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            other => Severity::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Other(other) => other,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeId(u64);

impl NoticeId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    /// Persistent notices survive the periodic fade-out.
    pub persist: bool,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>, persist: bool) -> Self {
        Self {
            severity,
            message: message.into(),
            persist,
        }
    }

    /// Class list of the rendered entry, e.g. `error persist`.
    pub fn css_class(&self) -> String {
        if self.persist {
            format!("{} persist", self.severity)
        } else {
            self.severity.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("error"), Severity::Error);
        assert_eq!(Severity::parse("custom"), Severity::Other("custom".to_string()));
        assert_eq!(Severity::parse("custom").as_str(), "custom");
    }

    #[test]
    fn test_css_class() {
        assert_eq!(Notice::new(Severity::Error, "boom", true).css_class(), "error persist");
        assert_eq!(Notice::new(Severity::Info, "saved", false).css_class(), "info");
    }
}
