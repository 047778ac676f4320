use std::sync::Arc;

use freefind_core::application::FreeFindService;

use crate::args::Args;

#[derive(Clone)]
pub struct AppState {
    pub args: Arc<Args>,
    pub service: FreeFindService,
}

impl AppState {
    pub fn new(args: Arc<Args>, service: FreeFindService) -> Self {
        Self { args, service }
    }
}
