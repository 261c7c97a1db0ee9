use crate::config::Config;
use crate::roster::Roster;
use crate::store::AttendanceStore;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything a session owns. Handlers receive it by `&mut`.
pub struct AppState {
    pub store: AttendanceStore,
    pub roster: Roster,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: AttendanceStore::new(),
            roster: Roster::new(),
            config,
        }
    }
}
