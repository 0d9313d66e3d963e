// Document traits - the page surface the loader reads and mutates
use crate::domain::markup::{Element, Fragment};
use crate::domain::notice::{Notice, NoticeId};
use crate::domain::region::{ElementKey, NavMatch, NavScope, RegionId};

/// Per-region metadata and placement.
pub trait ContainerDirectory: Send + Sync {
    fn contains(&self, region: &RegionId) -> bool;

    /// Regions carrying a positive refresh interval, in document order.
    fn refreshable_regions(&self) -> Vec<RegionId>;

    fn refresh_interval(&self, region: &RegionId) -> Option<u64>;
    fn set_refresh_interval(&self, region: &RegionId, secs: u64);

    /// Milliseconds since the epoch.
    fn last_update(&self, region: &RegionId) -> Option<i64>;
    fn set_last_update(&self, region: &RegionId, at: Option<i64>);

    /// URL the region was last loaded from.
    fn source_url(&self, region: &RegionId) -> Option<String>;
    fn set_source_url(&self, region: &RegionId, url: &str);

    /// Tag the region as belonging to a module, or clear any tagging.
    fn set_module(&self, region: &RegionId, module: Option<&str>);

    fn is_impacted(&self, region: &RegionId) -> bool;
    fn set_impacted(&self, region: &RegionId, impacted: bool);

    /// The region itself or one of its ancestors is a dashboard pane.
    fn in_dashboard(&self, region: &RegionId) -> bool;

    /// No other region encloses this one.
    fn is_top_level(&self, region: &RegionId) -> bool;

    /// Regions inside dashboard panes nested in `region`, in document order,
    /// skipping dashboard containers.
    fn dashboard_subregions(&self, region: &RegionId) -> Vec<RegionId>;

    fn first_heading(&self, region: &RegionId) -> Option<Element>;
    /// Swap the region's first heading for `heading`, or drop it on `None`.
    fn replace_heading(&self, region: &RegionId, heading: Option<&Element>);
}

/// Active-state bookkeeping of menu entries, action tables and forms.
pub trait Navigation: Send + Sync {
    /// Links whose href equals `url` followed by forms whose action equals `path`.
    fn navigation_matches(&self, url: &str, path: &str) -> Vec<NavMatch>;
    fn clear_active(&self, scope: &NavScope);
    fn mark_active(&self, target: &NavMatch);

    /// Href of the active link inside `region`, if any.
    fn active_link(&self, region: &RegionId) -> Option<String>;
    fn mark_link_active(&self, region: &RegionId, href: &str);
}

/// Content swapping primitives.
pub trait Surface: Send + Sync {
    fn scroll_top(&self, region: &RegionId) -> f64;
    fn set_scroll_top(&self, region: &RegionId, offset: f64);
    fn focused_element(&self) -> Option<ElementKey>;
    fn focus(&self, element: &ElementKey);
    /// Swallow every click until `unblock_clicks`.
    fn block_clicks(&self);
    fn unblock_clicks(&self);
    fn replace_content(&self, region: &RegionId, content: &Fragment);
}

/// The list notices are rendered into.
pub trait NotificationArea: Send + Sync {
    fn append_notice(&self, notice: &Notice) -> NoticeId;
    fn remove_notice(&self, id: NoticeId);
    /// Drop every notice that is not persistent. Returns how many went away.
    fn fade_transient(&self) -> usize;
}

pub trait Document: ContainerDirectory + Navigation + Surface + NotificationArea {}

impl<T> Document for T where T: ContainerDirectory + Navigation + Surface + NotificationArea {}
