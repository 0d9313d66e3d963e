use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoaderConfig {
    #[serde(default)]
    pub loader: LoaderSettings,
    #[serde(default)]
    pub page: PageSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoaderSettings {
    /// Prefix for relative URLs handed to the transport.
    pub base_url: String,
    pub tick_interval_ms: u64,
    /// Used when a refreshable region carries no usable interval.
    pub default_refresh_secs: u64,
    /// Window id header value before the server assigned one.
    pub window_id_sentinel: String,
    pub accept: String,
    /// Requests whose URL matches this are eligible for dashboard splicing.
    pub search_pattern: String,
    pub autorefresh: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            tick_interval_ms: 500,
            default_refresh_secs: 10,
            window_id_sentinel: "undefined".to_string(),
            accept: "text/html".to_string(),
            search_pattern: "^/search".to_string(),
            autorefresh: true,
        }
    }
}

/// Skeleton of the headless page and what to load into it first.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PageSettings {
    pub layout: String,
    pub start_url: Option<String>,
    pub start_container: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            layout: concat!(
                r#"<div id="layout">"#,
                r#"<div id="col1" class="container"></div>"#,
                r#"<div id="col2" class="container"></div>"#,
                r#"</div>"#,
            )
            .to_string(),
            start_url: None,
            start_container: "col1".to_string(),
        }
    }
}

pub fn load_loader_config() -> anyhow::Result<LoaderConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/loader").required(false))
        .add_source(config::Environment::with_prefix("LOADER").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = LoaderSettings::default();
        assert_eq!(settings.tick_interval_ms, 500);
        assert_eq!(settings.default_refresh_secs, 10);
        assert_eq!(settings.window_id_sentinel, "undefined");
        assert!(settings.autorefresh);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[loader]\nbase_url = \"http://monitor.local\"\ndefault_refresh_secs = 30\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: LoaderConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.loader.base_url, "http://monitor.local");
        assert_eq!(config.loader.default_refresh_secs, 30);
        assert_eq!(config.loader.tick_interval_ms, 500);
        assert_eq!(config.page.start_container, "col1");
    }
}
