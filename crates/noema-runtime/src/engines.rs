use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use noema_core::{CognitiveEngine, ProcessType};

/// One engine per process type. A single capability with a type
/// discriminant. Registration replaces any previous engine for the
/// same type.
#[derive(Default)]
pub struct EngineRegistry {
    engines: RwLock<HashMap<ProcessType, Arc<dyn CognitiveEngine>>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, engine: Arc<dyn CognitiveEngine>) {
        let process_type = engine.process_type();
        self.engines.write().insert(process_type, engine);
        debug!(process_type = %process_type, "engine registered");
    }

    pub fn get(&self, process_type: ProcessType) -> Option<Arc<dyn CognitiveEngine>> {
        self.engines.read().get(&process_type).cloned()
    }

    pub fn is_registered(&self, process_type: ProcessType) -> bool {
        self.engines.read().contains_key(&process_type)
    }
}
