use crate::foundation::error::{ChoreoError, ChoreoResult};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TrackerId(pub u32);

/// Scalar cells read by updaters and animated by tracker tweens.
#[derive(Clone, Debug, Default)]
pub struct TrackerStore {
    values: Vec<f64>,
}

impl TrackerStore {
    pub fn create(&mut self, value: f64) -> TrackerId {
        self.values.push(value);
        TrackerId((self.values.len() - 1) as u32)
    }

    pub fn contains(&self, id: TrackerId) -> bool {
        (id.0 as usize) < self.values.len()
    }

    pub fn get(&self, id: TrackerId) -> ChoreoResult<f64> {
        self.values
            .get(id.0 as usize)
            .copied()
            .ok_or_else(|| ChoreoError::unknown_target(format!("tracker {} does not exist", id.0)))
    }

    /// Current value, or `0.0` for an unknown tracker.
    pub fn value(&self, id: TrackerId) -> f64 {
        self.get(id).unwrap_or_default()
    }

    pub fn set(&mut self, id: TrackerId, value: f64) -> ChoreoResult<()> {
        let slot = self
            .values
            .get_mut(id.0 as usize)
            .ok_or_else(|| ChoreoError::unknown_target(format!("tracker {} does not exist", id.0)))?;
        *slot = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/tracker.rs"]
mod tests;
