// Response directives - server-to-client instructions carried in headers
use super::notice::Severity;
use super::region::RegionId;

pub const HEADER_ACCEPT: &str = "X-Icinga-Accept";
pub const HEADER_WINDOW_ID: &str = "X-Icinga-WindowId";
pub const HEADER_NOTIFICATION: &str = "X-Icinga-Notification";
pub const HEADER_CONTAINER: &str = "X-Icinga-Container";
pub const HEADER_MODULE: &str = "X-Icinga-Module";
pub const HEADER_CSS_RELOAD: &str = "X-Icinga-CssReload";
pub const HEADER_TITLE: &str = "X-Icinga-Title";
pub const HEADER_REFRESH: &str = "X-Icinga-Refresh";

/// Container value telling the client to drop the response.
const RETARGET_IGNORE: &str = "ignore";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDirective {
    pub severity: Severity,
    pub message: String,
}

impl NotificationDirective {
    /// `"<severity> <message...>"`, the first space-separated token is the severity.
    pub fn parse(raw: &str) -> Self {
        let (severity, message) = raw.split_once(' ').unwrap_or((raw, ""));
        Self {
            severity: Severity::parse(severity),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retarget {
    Ignore,
    Container(RegionId),
}

/// All directives of a single response, parsed once before any is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDirectives {
    pub notification: Option<NotificationDirective>,
    pub retarget: Option<Retarget>,
    pub module: Option<String>,
    pub css_reload: bool,
    pub title: Option<String>,
    pub refresh_secs: Option<u64>,
    pub window_id: Option<String>,
}

impl ResponseDirectives {
    /// Build from a header lookup. Empty header values count as absent.
    pub fn from_headers<'a, F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let present = |name: &str| lookup(name).map(str::trim).filter(|v| !v.is_empty());

        let refresh_secs = present(HEADER_REFRESH).and_then(|raw| match raw.parse::<u64>() {
            Ok(secs) => Some(secs),
            Err(e) => {
                tracing::warn!("Ignoring malformed refresh directive {:?}: {}", raw, e);
                None
            }
        });

        Self {
            notification: present(HEADER_NOTIFICATION).map(NotificationDirective::parse),
            retarget: present(HEADER_CONTAINER).map(|target| {
                if target == RETARGET_IGNORE {
                    Retarget::Ignore
                } else {
                    Retarget::Container(RegionId::from(target))
                }
            }),
            module: present(HEADER_MODULE).map(str::to_string),
            css_reload: present(HEADER_CSS_RELOAD).is_some(),
            title: present(HEADER_TITLE).map(str::to_string),
            refresh_secs,
            window_id: present(HEADER_WINDOW_ID).map(str::to_string),
        }
    }
}
