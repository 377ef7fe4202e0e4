use chrono::Utc;

use crate::creature::{Creature, CreatureId, Stats};

use super::catalog::CatalogSource;
use super::error::{CoreError, RosterRejection};
use super::store::{PersistedRoster, RosterStore};
use super::types::{RosterEntry, StatSummary, TeamSummary};
use super::well_known::MAX_TEAM_SIZE;

/// Ordered team of at most `MAX_TEAM_SIZE` entries. Slots always equal
/// positions.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt entries from an untrusted source: extra entries past capacity
    /// are dropped and slots are recomputed.
    pub fn from_entries(mut entries: Vec<RosterEntry>) -> Self {
        if entries.len() > MAX_TEAM_SIZE {
            tracing::warn!(
                found = entries.len(),
                max = MAX_TEAM_SIZE,
                "truncating oversized team"
            );
            entries.truncate(MAX_TEAM_SIZE);
        }
        let mut roster = Self { entries };
        roster.reslot();
        roster
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_TEAM_SIZE
    }

    pub fn contains(&self, id: CreatureId) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    pub fn get(&self, slot: usize) -> Option<&RosterEntry> {
        self.entries.get(slot)
    }

    pub fn export_ids(&self) -> Vec<CreatureId> {
        self.entries.iter().map(RosterEntry::id).collect()
    }

    pub fn add(&mut self, creature: Creature) -> Result<usize, RosterRejection> {
        if self.is_full() {
            tracing::warn!(id = creature.pokedex_id, "team is full, not adding");
            return Err(RosterRejection::Full);
        }
        if self.contains(creature.pokedex_id) {
            tracing::warn!(id = creature.pokedex_id, "already in team, not adding");
            return Err(RosterRejection::Duplicate(creature.pokedex_id));
        }

        let slot = self.entries.len();
        self.entries.push(RosterEntry {
            creature,
            added_at: Utc::now(),
            slot,
        });
        Ok(slot)
    }

    /// Remove every entry for `id`. Returns the first removed entry, or
    /// `None` when the id was not in the team.
    pub fn remove(&mut self, id: CreatureId) -> Option<RosterEntry> {
        let position = self.entries.iter().position(|entry| entry.id() == id)?;
        let removed = self.entries.remove(position);
        self.entries.retain(|entry| entry.id() != id);
        self.reslot();
        Some(removed)
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), RosterRejection> {
        let len = self.entries.len();
        for index in [from, to] {
            if index >= len {
                return Err(RosterRejection::OutOfBounds { index, len });
            }
        }

        let moved = self.entries.remove(from);
        self.entries.insert(to, moved);
        self.reslot();
        Ok(())
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Replace the whole team with freshly timestamped, sequentially slotted
    /// entries. Input past capacity is ignored; repeated ids are kept.
    pub fn replace_with(&mut self, creatures: Vec<Creature>) {
        let added_at = Utc::now();
        self.entries = creatures
            .into_iter()
            .take(MAX_TEAM_SIZE)
            .enumerate()
            .map(|(slot, creature)| RosterEntry {
                creature,
                added_at,
                slot,
            })
            .collect();
    }

    /// Hydrate the first `MAX_TEAM_SIZE` ids from the catalog and replace the
    /// team. On any fetch failure the current team is left untouched.
    pub async fn import_from_ids<C: CatalogSource>(
        &mut self,
        catalog: &C,
        ids: &[CreatureId],
    ) -> Result<usize, CoreError> {
        let wanted = &ids[..ids.len().min(MAX_TEAM_SIZE)];
        let creatures = catalog.fetch_by_ids(wanted).await.inspect_err(|e| {
            tracing::warn!(error = %e, "team import failed, keeping current team");
        })?;
        self.replace_with(creatures);
        Ok(self.entries.len())
    }

    pub fn summary(&self) -> TeamSummary {
        let members = self.entries.len();
        let mut sums = [0u32; 6];
        let mut types: Vec<String> = Vec::new();

        for entry in &self.entries {
            if let Some(stats) = &entry.creature.stats {
                for (sum, value) in sums.iter_mut().zip(stats.values()) {
                    *sum += value;
                }
            }
            for name in entry.creature.type_names() {
                if !types.iter().any(|seen| seen == name) {
                    types.push(name.to_string());
                }
            }
        }

        let stats = Stats::KEYS
            .iter()
            .zip(sums)
            .map(|(key, sum)| StatSummary {
                key: (*key).to_string(),
                sum,
                average: if members == 0 {
                    0.0
                } else {
                    f64::from(sum) / members as f64
                },
            })
            .collect();

        TeamSummary {
            members,
            stats,
            total: sums.iter().sum(),
            types,
        }
    }

    pub fn to_persisted(&self) -> PersistedRoster {
        PersistedRoster {
            team: self.entries.clone(),
        }
    }

    fn reslot(&mut self) {
        for (slot, entry) in self.entries.iter_mut().enumerate() {
            entry.slot = slot;
        }
    }
}

/// A roster bound to its store: loaded once on `open`, written after every
/// successful mutation.
#[derive(Debug)]
pub struct RosterSession<S: RosterStore> {
    roster: Roster,
    store: S,
}

impl<S: RosterStore> RosterSession<S> {
    pub fn open(store: S) -> Result<Self, CoreError> {
        let persisted = store.load()?;
        let roster = Roster::from_entries(persisted.team);
        tracing::debug!(members = roster.len(), "opened team");
        Ok(Self { roster, store })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn add(&mut self, creature: Creature) -> Result<usize, RosterRejection> {
        let slot = self.roster.add(creature)?;
        self.persist();
        Ok(slot)
    }

    pub fn remove(&mut self, id: CreatureId) -> Option<RosterEntry> {
        let removed = self.roster.remove(id)?;
        self.persist();
        Some(removed)
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), RosterRejection> {
        self.roster.reorder(from, to)?;
        self.persist();
        Ok(())
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.roster.clear();
        self.persist();
        dropped
    }

    pub fn replace_with(&mut self, creatures: Vec<Creature>) {
        self.roster.replace_with(creatures);
        self.persist();
    }

    pub async fn import_from_ids<C: CatalogSource>(
        &mut self,
        catalog: &C,
        ids: &[CreatureId],
    ) -> Result<usize, CoreError> {
        let count = self.roster.import_from_ids(catalog, ids).await?;
        self.persist();
        Ok(count)
    }

    pub fn save(&mut self) -> Result<(), CoreError> {
        self.store.save(&self.roster.to_persisted())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "failed to persist team");
        }
    }
}
