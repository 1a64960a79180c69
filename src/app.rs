//! Application context shared by page actions and the CLI.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::db::{self, DbState};
use crate::error::AdminResult;
use crate::search::Debouncer;
use crate::storage::open_session_store;
use crate::store::{reduce, Action, AppState};

pub struct AdminApp {
    pub config: AppConfig,
    pub db: Arc<DbState>,
    pub api: ApiClient,
    /// Menu item search box.
    pub menu_search: Debouncer,
    /// Customer phone lookup on the create-order page.
    pub phone_search: Debouncer,
    state: Mutex<AppState>,
}

impl AdminApp {
    /// Open the local database and session store and build the API client.
    pub fn bootstrap(config: AppConfig) -> AdminResult<Self> {
        config.validate()?;
        let db = Arc::new(db::init(&config.data_dir)?);
        let sessions = open_session_store(config.session_backend, db.clone())?;
        let api = ApiClient::new(&config.api_base_url, config.request_timeout(), sessions)?;
        info!(
            api = api.base_url(),
            backend = ?config.session_backend,
            "admin context ready"
        );
        Ok(Self::from_parts(config, db, api))
    }

    pub fn from_parts(config: AppConfig, db: Arc<DbState>, api: ApiClient) -> Self {
        let menu_search = Debouncer::new(config.search_debounce());
        let phone_search = Debouncer::new(config.search_debounce());
        Self {
            config,
            db,
            api,
            menu_search,
            phone_search,
            state: Mutex::new(AppState::default()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, AppState> {
        // The reducer never panics midway, so a poisoned guard still holds consistent state.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn dispatch(&self, action: Action) {
        reduce(&mut self.lock_state(), action);
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.lock_state())
    }

    pub fn snapshot(&self) -> AppState {
        self.lock_state().clone()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::api::test_support::client;

    /// Context wired to `base_url` with an in-memory database.
    pub fn app(base_url: &str, token: Option<&str>) -> AdminApp {
        let (api, _) = client(base_url, token);
        let config = AppConfig {
            api_base_url: base_url.to_string(),
            ..AppConfig::default()
        };
        let db = Arc::new(DbState::in_memory().expect("db"));
        AdminApp::from_parts(config, db, api)
    }
}
