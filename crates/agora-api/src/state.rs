use std::sync::Arc;

use agora_engine::Engine;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub engine: Engine,
}

impl AppStateInner {
    pub fn new(engine: Engine) -> AppState {
        Arc::new(Self { engine })
    }
}
