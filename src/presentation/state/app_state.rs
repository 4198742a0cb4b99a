use std::sync::Arc;

use crate::application::services::RequestPipeline;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RequestPipeline>,
    pub settings: Arc<Settings>,
}
