use serde::{Deserialize, Serialize};

/// Storage keys for the persisted endpoint configuration.
pub mod keys {
    /// The set of Flux endpoint URLs known to the app.
    pub const FLUX_URLS: &str = "flux-urls";
    /// The index of the endpoint currently in use.
    pub const SELECTED_FLUX_URL_INDEX: &str = "selected-flux-url-index";
}

/// Persisted app configuration: which Flux daemons the app knows about and
/// which one is active. The selection index always points into `flux_urls`
/// while the set is non-empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluxSettings {
    pub flux_urls: Vec<String>,
    pub selected_flux_url_index: usize,
}

impl FluxSettings {
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        let Some(storage) = storage else {
            return Self::default();
        };
        let mut settings = Self {
            flux_urls: eframe::get_value(storage, keys::FLUX_URLS).unwrap_or_default(),
            selected_flux_url_index: eframe::get_value(storage, keys::SELECTED_FLUX_URL_INDEX)
                .unwrap_or_default(),
        };
        settings.clamp_selection();
        settings
    }

    pub fn store(&self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, keys::FLUX_URLS, &self.flux_urls);
        eframe::set_value(
            storage,
            keys::SELECTED_FLUX_URL_INDEX,
            &self.selected_flux_url_index,
        );
    }

    pub fn selected_url(&self) -> Option<&str> {
        self.flux_urls
            .get(self.selected_flux_url_index)
            .map(String::as_str)
    }

    /// Adds an endpoint URL; duplicates are ignored.
    pub fn add_url(&mut self, url: String) {
        if !self.flux_urls.contains(&url) {
            self.flux_urls.push(url);
        }
    }

    pub fn remove_url(&mut self, index: usize) {
        if index < self.flux_urls.len() {
            self.flux_urls.remove(index);
            if self.selected_flux_url_index > index {
                self.selected_flux_url_index -= 1;
            }
            self.clamp_selection();
        }
    }

    pub fn select(&mut self, index: usize) {
        if index < self.flux_urls.len() {
            self.selected_flux_url_index = index;
        }
    }

    fn clamp_selection(&mut self) {
        if self.selected_flux_url_index >= self.flux_urls.len() {
            self.selected_flux_url_index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemStorage(HashMap<String, String>);

    impl eframe::Storage for MemStorage {
        fn get_string(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }

        fn set_string(&mut self, key: &str, value: String) {
            self.0.insert(key.to_owned(), value);
        }

        fn flush(&mut self) {}
    }

    fn settings_with(urls: &[&str], selected: usize) -> FluxSettings {
        FluxSettings {
            flux_urls: urls.iter().map(|u| (*u).to_owned()).collect(),
            selected_flux_url_index: selected,
        }
    }

    #[test]
    fn round_trips_through_storage_keys() {
        let mut storage = MemStorage::default();
        let settings = settings_with(&["http://a:3030", "http://b:3030"], 1);

        settings.store(&mut storage);
        assert!(storage.0.contains_key(keys::FLUX_URLS));
        assert!(storage.0.contains_key(keys::SELECTED_FLUX_URL_INDEX));

        let loaded = FluxSettings::load(Some(&storage));
        assert_eq!(loaded, settings);
        assert_eq!(loaded.selected_url(), Some("http://b:3030"));
    }

    #[test]
    fn defaults_when_storage_is_absent_or_empty() {
        assert_eq!(FluxSettings::load(None), FluxSettings::default());

        let storage = MemStorage::default();
        let loaded = FluxSettings::load(Some(&storage));
        assert!(loaded.flux_urls.is_empty());
        assert_eq!(loaded.selected_url(), None);
    }

    #[test]
    fn out_of_range_selection_clamps_on_load() {
        let mut storage = MemStorage::default();
        settings_with(&["http://a:3030"], 7).store(&mut storage);

        let loaded = FluxSettings::load(Some(&storage));
        assert_eq!(loaded.selected_flux_url_index, 0);
        assert_eq!(loaded.selected_url(), Some("http://a:3030"));
    }

    #[test]
    fn removal_adjusts_the_selection() {
        let mut settings = settings_with(&["http://a:3030", "http://b:3030", "http://c:3030"], 2);

        settings.remove_url(0);
        assert_eq!(settings.selected_url(), Some("http://c:3030"));

        settings.remove_url(1);
        assert_eq!(settings.selected_url(), Some("http://b:3030"));

        settings.remove_url(0);
        assert_eq!(settings.selected_url(), None);
    }

    #[test]
    fn duplicate_urls_are_ignored() {
        let mut settings = FluxSettings::default();
        settings.add_url("http://a:3030".to_owned());
        settings.add_url("http://a:3030".to_owned());
        assert_eq!(settings.flux_urls.len(), 1);
    }

    #[test]
    fn selecting_out_of_range_is_a_noop() {
        let mut settings = settings_with(&["http://a:3030"], 0);
        settings.select(5);
        assert_eq!(settings.selected_flux_url_index, 0);
    }
}
