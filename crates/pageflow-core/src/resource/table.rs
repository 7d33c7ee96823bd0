//! Resource state table: the single owner of every resource record.

use super::{Resource, ResourceDescriptor, ResourceIndex, ResourceState, TransitionError};

/// All resources of one chapter in reading order.
///
/// State only changes through [`ResourceTable::transition`], which enforces
/// the delivery state machine.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    resources: Vec<Resource>,
}

impl ResourceTable {
    /// Build a table from descriptors already in reading order.
    pub fn new(descriptors: impl IntoIterator<Item = ResourceDescriptor>) -> Self {
        Self {
            resources: descriptors.into_iter().map(Resource::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn get(&self, index: ResourceIndex) -> Option<&Resource> {
        self.resources.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn state(&self, index: ResourceIndex) -> Option<ResourceState> {
        self.resources.get(index).map(|r| r.state)
    }

    /// Move resource `index` to `next`. Returns the previous state.
    pub fn transition(
        &mut self,
        index: ResourceIndex,
        next: ResourceState,
    ) -> Result<ResourceState, TransitionError> {
        let resource = self
            .resources
            .get_mut(index)
            .ok_or(TransitionError::UnknownResource(index))?;
        let from = resource.state;
        if !from.can_transition_to(next) {
            return Err(TransitionError::Illegal {
                index,
                from,
                to: next,
            });
        }
        resource.state = next;
        tracing::trace!(index, %from, to = %next, "resource transition");
        Ok(from)
    }

    pub fn set_current_location(&mut self, index: ResourceIndex, location: String) {
        if let Some(r) = self.resources.get_mut(index) {
            r.current_location = location;
        }
    }

    pub fn set_retry_count(&mut self, index: ResourceIndex, retry_count: u32) {
        if let Some(r) = self.resources.get_mut(index) {
            r.retry_count = retry_count;
        }
    }

    pub fn count_in_state(&self, state: ResourceState) -> usize {
        self.resources.iter().filter(|r| r.state == state).count()
    }

    /// True when the table is non-empty and every resource is in `state`.
    pub fn all_in_state(&self, state: ResourceState) -> bool {
        !self.resources.is_empty() && self.resources.iter().all(|r| r.state == state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: usize) -> ResourceTable {
        ResourceTable::new((0..n).map(|i| ResourceDescriptor::new(i, format!("/p/{i}.jpg"))))
    }

    #[test]
    fn new_resources_start_idle_at_source() {
        let t = table(3);
        assert_eq!(t.len(), 3);
        for (i, r) in t.iter().enumerate() {
            assert_eq!(r.state(), ResourceState::Idle);
            assert_eq!(r.retry_count(), 0);
            assert_eq!(r.current_location(), format!("/p/{i}.jpg"));
            assert_eq!(r.source_location(), r.current_location());
        }
    }

    #[test]
    fn transition_follows_state_machine() {
        let mut t = table(1);
        assert_eq!(t.transition(0, ResourceState::Loading), Ok(ResourceState::Idle));
        assert_eq!(t.transition(0, ResourceState::Loaded), Ok(ResourceState::Loading));
        assert_eq!(
            t.transition(0, ResourceState::Idle),
            Err(TransitionError::Illegal {
                index: 0,
                from: ResourceState::Loaded,
                to: ResourceState::Idle
            })
        );
        assert_eq!(t.state(0), Some(ResourceState::Loaded));
    }

    #[test]
    fn unknown_index_rejected() {
        let mut t = table(1);
        assert_eq!(
            t.transition(5, ResourceState::Loading),
            Err(TransitionError::UnknownResource(5))
        );
    }

    #[test]
    fn counts_and_all_in_state() {
        let mut t = table(3);
        assert!(!t.all_in_state(ResourceState::Loaded));
        for i in 0..3 {
            t.transition(i, ResourceState::Loading).unwrap();
        }
        assert_eq!(t.count_in_state(ResourceState::Loading), 3);
        for i in 0..3 {
            t.transition(i, ResourceState::Loaded).unwrap();
        }
        assert!(t.all_in_state(ResourceState::Loaded));
        assert!(!ResourceTable::default().all_in_state(ResourceState::Loaded));
    }
}
