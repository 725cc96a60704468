//! Shared application state: the model handles loaded at startup.

use std::sync::Arc;

use crate::inference::{TextClassifier, TextGenerator};
use crate::models::ModelInfo;

pub struct AppState {
    pub classifier: Arc<dyn TextClassifier>,
    pub generator: Arc<dyn TextGenerator>,
    pub model_info: ModelInfo,
}
