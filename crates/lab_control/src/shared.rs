//! Unlock policy and a catalog that several threads can score against.

use lab_core::{
    summarize, Attempt, CatalogError, Mission, MissionCatalog, MissionId, MotionKind,
    PhysicsConfig, ProgressSummary, SimulationResult,
};
use parking_lot::Mutex;

use crate::run::ResultSink;

/// One catalog slot as the unlock policy sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEntry {
    pub id: MissionId,
    pub motion: MotionKind,
    /// False for objectives that can never be judged a success.
    pub supported: bool,
}

/// Catalog order, one entry per mission.
pub fn catalog_order(catalog: &MissionCatalog) -> Vec<OrderEntry> {
    catalog
        .missions()
        .iter()
        .map(|m| OrderEntry {
            id: m.id().clone(),
            motion: m.motion(),
            supported: m.is_supported(),
        })
        .collect()
}

/// Decides which missions open up after an attempt.
pub trait UnlockPolicy {
    fn unlocks_after(&self, order: &[OrderEntry], attempt: &Attempt) -> Vec<MissionId>;

    /// Apply the policy to `catalog`. Returns the ids that were newly unlocked.
    fn apply(&self, catalog: &mut MissionCatalog, attempt: &Attempt) -> Vec<MissionId> {
        let order = catalog_order(catalog);
        self.unlocks_after(&order, attempt)
            .into_iter()
            .filter(|id| matches!(catalog.unlock(id), Ok(true)))
            .inspect(|id| tracing::info!(mission = %id, "mission unlocked"))
            .collect()
    }
}

/// A successful attempt opens the next mission of the same motion type.
/// Missions that can never succeed are opened on the way, together with the
/// next one that can, so they never block a motion type.
pub struct SequentialUnlock;

impl UnlockPolicy for SequentialUnlock {
    fn unlocks_after(&self, order: &[OrderEntry], attempt: &Attempt) -> Vec<MissionId> {
        if !attempt.success {
            return Vec::new();
        }
        let Some(motion) = order
            .iter()
            .find(|entry| entry.id == attempt.mission_id)
            .map(|entry| entry.motion)
        else {
            return Vec::new();
        };
        let mut unlocked = Vec::new();
        for entry in order
            .iter()
            .filter(|entry| entry.motion == motion)
            .skip_while(|entry| entry.id != attempt.mission_id)
            .skip(1)
        {
            unlocked.push(entry.id.clone());
            if entry.supported {
                break;
            }
        }
        unlocked
    }
}

// ---------------------------------------------------------------------------
// SharedCatalog
// ---------------------------------------------------------------------------

/// Missions each behind their own lock. Scoring one mission never blocks
/// another.
pub struct SharedCatalog {
    content_version: String,
    order: Vec<OrderEntry>,
    missions: Vec<Mutex<Mission>>,
}

impl SharedCatalog {
    pub fn new(catalog: MissionCatalog) -> Self {
        let order = catalog_order(&catalog);
        let (content_version, missions) = catalog.into_parts();
        Self {
            content_version,
            order,
            missions: missions.into_iter().map(Mutex::new).collect(),
        }
    }

    pub fn order(&self) -> &[OrderEntry] {
        &self.order
    }

    fn index_of(&self, id: &MissionId) -> Result<usize, CatalogError> {
        self.order
            .iter()
            .position(|entry| entry.id == *id)
            .ok_or_else(|| CatalogError::UnknownMission(id.clone()))
    }

    /// Run `f` with the mission locked.
    pub fn with_mission<T>(
        &self,
        id: &MissionId,
        f: impl FnOnce(&mut Mission) -> T,
    ) -> Result<T, CatalogError> {
        let index = self.index_of(id)?;
        let mut mission = self.missions[index].lock();
        Ok(f(&mut mission))
    }

    pub fn register_result(
        &self,
        id: &MissionId,
        result: &SimulationResult,
        physics: &PhysicsConfig,
    ) -> Result<Attempt, CatalogError> {
        self.with_mission(id, |mission| {
            if mission.is_unlocked() {
                Ok(mission.register_result(result, physics))
            } else {
                Err(CatalogError::MissionLocked(id.clone()))
            }
        })?
    }

    pub fn unlock(&self, id: &MissionId) -> Result<bool, CatalogError> {
        self.with_mission(id, |mission| {
            let was_locked = !mission.is_unlocked();
            mission.unlock();
            was_locked
        })
    }

    pub fn apply_policy(&self, policy: &impl UnlockPolicy, attempt: &Attempt) -> Vec<MissionId> {
        policy
            .unlocks_after(&self.order, attempt)
            .into_iter()
            .filter(|id| matches!(self.unlock(id), Ok(true)))
            .inspect(|id| tracing::info!(mission = %id, "mission unlocked"))
            .collect()
    }

    pub fn summary(&self) -> ProgressSummary {
        let missions: Vec<Mission> = self.missions.iter().map(|m| m.lock().clone()).collect();
        summarize(&missions)
    }

    /// Back to a plain catalog, progress included.
    pub fn into_catalog(self) -> Result<MissionCatalog, CatalogError> {
        let missions = self.missions.into_iter().map(Mutex::into_inner).collect();
        MissionCatalog::from_missions(self.content_version, missions)
    }
}

impl ResultSink for &SharedCatalog {
    fn register_result(
        &mut self,
        id: &MissionId,
        result: &SimulationResult,
        physics: &PhysicsConfig,
    ) -> Result<Attempt, CatalogError> {
        SharedCatalog::register_result(*self, id, result, physics)
    }
}
