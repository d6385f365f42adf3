use porteria_engine::{Config, ConfigStore, JsonFileConfigStore, PersistError};
use porteria_logging::{porteria_error, porteria_info};

const CONFIG_FILENAME: &str = "config.json";

pub(crate) fn config_store() -> JsonFileConfigStore {
    JsonFileConfigStore::new(CONFIG_FILENAME)
}

pub(crate) fn load_api_url(store: &dyn ConfigStore) -> String {
    let api_url = store.load().api_url;
    if api_url.is_empty() {
        porteria_info!("No API URL configured yet");
    }
    api_url
}

pub(crate) fn save_api_url(store: &dyn ConfigStore, api_url: &str) -> Result<(), PersistError> {
    let config = Config {
        api_url: api_url.to_string(),
    };
    store.save(&config).inspect_err(|err| {
        porteria_error!("Failed to persist API URL: {}", err);
    })
}
