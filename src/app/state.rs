use super::{ComponentState, Coordinator};
use std::collections::HashMap;
use tracing::debug;

impl Coordinator {
    /// Update component state
    pub async fn set_component_state(&self, component: &'static str, state: ComponentState) {
        let mut states = self.component_states.lock().await;
        states.insert(component, state);
        debug!("Component '{}' state changed to: {:?}", component, state);
    }

    /// Get component state
    pub async fn get_component_state(&self, component: &str) -> Option<ComponentState> {
        let states = self.component_states.lock().await;
        states.get(component).copied()
    }

    /// Get all component states
    pub async fn get_all_component_states(&self) -> HashMap<&'static str, ComponentState> {
        let states = self.component_states.lock().await;
        states.clone()
    }
}
