// Container loader - partial page loading for independently refreshable regions
pub mod application;
pub mod domain;
pub mod infrastructure;
