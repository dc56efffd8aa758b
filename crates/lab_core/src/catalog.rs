//! Ordered mission catalog with unlock state.

use std::collections::HashSet;

use crate::mission::Mission;
use crate::{
    Attempt, CatalogError, MissionDef, MissionId, MotionKind, PhysicsConfig, ProgressSnapshot,
    SimulationResult,
};

#[derive(Debug, Clone)]
pub struct MissionCatalog {
    content_version: String,
    missions: Vec<Mission>,
}

impl MissionCatalog {
    /// Build from definitions in display order. The first mission of each
    /// motion type starts unlocked.
    pub fn from_defs(
        content_version: impl Into<String>,
        defs: Vec<MissionDef>,
    ) -> Result<Self, CatalogError> {
        let mut seen_ids: HashSet<MissionId> = HashSet::new();
        let mut seen_motions: HashSet<MotionKind> = HashSet::new();
        let mut missions = Vec::with_capacity(defs.len());
        for def in defs {
            if !seen_ids.insert(def.id.clone()) {
                return Err(CatalogError::DuplicateId(def.id));
            }
            let first_of_motion = seen_motions.insert(def.kind.motion());
            missions.push(Mission::from_def(def, first_of_motion)?);
        }
        Ok(Self {
            content_version: content_version.into(),
            missions,
        })
    }

    /// Reassemble a catalog from missions that already carry progress.
    pub fn from_missions(
        content_version: impl Into<String>,
        missions: Vec<Mission>,
    ) -> Result<Self, CatalogError> {
        let mut seen_ids: HashSet<&MissionId> = HashSet::new();
        for mission in &missions {
            if !seen_ids.insert(mission.id()) {
                return Err(CatalogError::DuplicateId(mission.id().clone()));
            }
        }
        Ok(Self {
            content_version: content_version.into(),
            missions,
        })
    }

    pub fn content_version(&self) -> &str {
        &self.content_version
    }

    /// Content version and missions, in order.
    pub fn into_parts(self) -> (String, Vec<Mission>) {
        (self.content_version, self.missions)
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    pub fn by_motion(&self, motion: MotionKind) -> impl Iterator<Item = &Mission> {
        self.missions.iter().filter(move |m| m.motion() == motion)
    }

    pub fn get(&self, id: &MissionId) -> Result<&Mission, CatalogError> {
        self.missions
            .iter()
            .find(|m| m.id() == id)
            .ok_or_else(|| CatalogError::UnknownMission(id.clone()))
    }

    pub fn get_mut(&mut self, id: &MissionId) -> Result<&mut Mission, CatalogError> {
        self.missions
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or_else(|| CatalogError::UnknownMission(id.clone()))
    }

    /// Mission following `id` within the same motion type, if any.
    pub fn next_in_motion(&self, id: &MissionId) -> Option<&Mission> {
        let current = self.get(id).ok()?;
        let motion = current.motion();
        self.by_motion(motion)
            .skip_while(|m| m.id() != id)
            .nth(1)
    }

    /// Unlock a mission. Returns true if it was locked before.
    pub fn unlock(&mut self, id: &MissionId) -> Result<bool, CatalogError> {
        let mission = self.get_mut(id)?;
        let was_locked = !mission.is_unlocked();
        mission.unlock();
        Ok(was_locked)
    }

    /// Score a result against an unlocked mission.
    pub fn register_result(
        &mut self,
        id: &MissionId,
        result: &SimulationResult,
        physics: &PhysicsConfig,
    ) -> Result<Attempt, CatalogError> {
        let mission = self.get_mut(id)?;
        if !mission.is_unlocked() {
            return Err(CatalogError::MissionLocked(id.clone()));
        }
        Ok(mission.register_result(result, physics))
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            content_version: self.content_version.clone(),
            missions: self.missions.iter().map(Mission::record).collect(),
        }
    }

    /// Merge stored progress. Returns the ids the catalog does not know.
    pub fn restore(&mut self, snapshot: &ProgressSnapshot) -> Vec<MissionId> {
        let mut unknown = Vec::new();
        for record in &snapshot.missions {
            match self.get_mut(&record.id) {
                Ok(mission) => mission.restore(record),
                Err(_) => unknown.push(record.id.clone()),
            }
        }
        unknown
    }

    /// Clear all progress back to the construction-time state.
    pub fn reset_progress(&mut self) {
        let mut seen_motions: HashSet<MotionKind> = HashSet::new();
        for mission in &mut self.missions {
            let first_of_motion = seen_motions.insert(mission.motion());
            mission.reset_progress(first_of_motion);
        }
    }
}
