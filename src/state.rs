use crate::{config::CoreSettings, db::OrmConn};

/// Handles shared by every request; built once by the composition root.
#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub settings: CoreSettings,
}

impl AppState {
    pub fn new(orm: OrmConn, settings: CoreSettings) -> Self {
        Self { orm, settings }
    }
}
