use std::env;
use std::path::PathBuf;

use folio_core::listing::ListingMarkers;
use folio_core::materialize::SiteRoot;
use folio_core::site::{ListingDocument, Site};
use folio_core::store::RecordStore;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub site_root: PathBuf,
    /// Listing document, relative to the site root.
    pub listing: String,
    /// Record file directory, relative to the site root.
    pub data_dir: String,
    pub max_upload_bytes: usize,
    pub log_json: bool,
    pub settings_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            site_root: PathBuf::from("."),
            listing: "index.html".to_string(),
            data_dir: "data".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_json: false,
            settings_path: folio_core::settings_path(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            bind: env::var("FOLIO_BIND").unwrap_or(defaults.bind),
            site_root: env::var_os("FOLIO_SITE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.site_root),
            listing: env::var("FOLIO_LISTING").unwrap_or(defaults.listing),
            data_dir: env::var("FOLIO_DATA_DIR").unwrap_or(defaults.data_dir),
            max_upload_bytes: env_usize("FOLIO_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            log_json: env_bool("FOLIO_LOG_JSON", defaults.log_json),
            settings_path: env::var_os("FOLIO_SETTINGS")
                .map(PathBuf::from)
                .unwrap_or(defaults.settings_path),
        })
    }

    pub fn site(&self) -> Site {
        let store = RecordStore::in_dir(&self.site_root.join(&self.data_dir));
        let listing = ListingDocument {
            path: self.listing.clone(),
            markers: ListingMarkers::default(),
        };
        Site::new(SiteRoot::new(self.site_root.clone()), store, listing)
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

fn env_usize(name: &str, default: usize) -> Result<usize, String> {
    match env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .map_err(|e| format!("{name}={v:?} is not a byte count: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_spellings() {
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn site_paths_follow_config() {
        let config = ServerConfig {
            site_root: PathBuf::from("/srv/site"),
            data_dir: "records".into(),
            ..ServerConfig::default()
        };
        let site = config.site();
        assert_eq!(site.root_dir(), std::path::Path::new("/srv/site"));
        assert_eq!(
            site.store().projects_path(),
            std::path::Path::new("/srv/site/records/projects.json")
        );
    }
}
