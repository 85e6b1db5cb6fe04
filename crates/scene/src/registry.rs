use std::collections::BTreeMap;

use foundation::ids::FrameId;

use crate::frustum::Frustum;

/// The owned mapping from frame identifier to frustum.
///
/// Populated once by the startup frustum builder; afterwards search and hover
/// only look existing keys up (always by stringified identifier) and mutate
/// the entities in place. BTreeMap keeps iteration deterministic.
#[derive(Debug, Default)]
pub struct FrustumRegistry {
    frustums: BTreeMap<String, Frustum>,
}

impl FrustumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a frustum under its frame identifier. Build phase only.
    pub fn insert(&mut self, id: &FrameId, frustum: Frustum) {
        self.frustums.insert(id.as_str().to_string(), frustum);
    }

    pub fn get(&self, key: &str) -> Option<&Frustum> {
        self.frustums.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Frustum> {
        self.frustums.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.frustums.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Frustum)> {
        self.frustums.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Frustum)> {
        self.frustums.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.frustums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frustums.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::FrustumRegistry;
    use crate::frustum::{Frustum, FrustumGeometry};
    use crate::intrinsics::PinholeIntrinsics;
    use foundation::color::Color;
    use foundation::ids::FrameId;
    use foundation::math::RigidTransform;

    fn frustum() -> Frustum {
        let geom = FrustumGeometry::from_pose(
            &PinholeIntrinsics::default(),
            &RigidTransform::IDENTITY,
            0.35,
        );
        Frustum::new(geom, Color::new(0.6, 0.6, 0.6))
    }

    #[test]
    fn integer_keys_are_found_by_string() {
        let mut reg = FrustumRegistry::new();
        reg.insert(&FrameId::from_integer(12), frustum());
        assert!(reg.contains_key("12"));
        assert!(reg.get("12").is_some());
        assert!(reg.get("012").is_none());
    }

    #[test]
    fn iteration_is_deterministic() {
        let mut reg = FrustumRegistry::new();
        reg.insert(&FrameId::new("b"), frustum());
        reg.insert(&FrameId::new("a"), frustum());
        let keys: Vec<&str> = reg.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn get_mut_mutates_in_place() {
        let mut reg = FrustumRegistry::new();
        reg.insert(&FrameId::new("7"), frustum());
        reg.get_mut("7").unwrap().visible = false;
        assert!(!reg.get("7").unwrap().visible);
        assert_eq!(reg.len(), 1);
    }
}
