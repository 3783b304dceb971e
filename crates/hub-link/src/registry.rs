use crate::HubLink;
use std::sync::Arc;

/// Logical hub name to link mapping, built once at orchestrator startup
/// and passed by injection. Dispatch fans out over `links()`; nothing in
/// the system reaches for a module-level hub.
#[derive(Clone, Default)]
pub struct HubRegistry {
    links: Vec<Arc<HubLink>>,
}

impl HubRegistry {
    pub fn new(links: Vec<Arc<HubLink>>) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &[Arc<HubLink>] {
        &self.links
    }

    pub fn get(&self, name: &str) -> Option<&Arc<HubLink>> {
        self.links.iter().find(|l| l.name() == name)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
