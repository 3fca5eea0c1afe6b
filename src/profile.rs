//! # House Profiles
//!
//! A house profile is a named, persisted bundle of a decor style and its
//! "design DNA" (colour and material notes). Staging several rooms against
//! the same profile keeps them visually consistent: the profile's data is
//! sent with every generation request and its style is locked in the session.
//!
//! ## Lifecycle
//!
//! - created by explicit user action, DNA filled from the style's preset
//! - `rooms_staged` is bumped after each successful generation tied to it
//! - deleted by explicit user action
//!
//! The list lives in a [`KeyValueStore`] under [`PROFILES_KEY`], is loaded
//! once at startup and saved on every change. When the last profile is
//! deleted the key is removed rather than written as an empty list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::Style;
use crate::error::{StagingError, StagingResult};
use crate::storage::KeyValueStore;

/// Storage key holding the serialized profile list.
pub const PROFILES_KEY: &str = "house_profiles";

/// Descriptive colour/material fields attached to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDna {
    pub primary_colors: String,
    pub accent_colors: String,
    pub wood_tone: String,
    pub metal_finish: String,
    pub textile_style: String,
    pub flooring_note: String,
}

impl DesignDna {
    /// Fixed preset for a style.
    pub fn for_style(style: Style) -> Self {
        let (primary, accent, wood, metal, textile, flooring) = match style {
            Style::Modern => (
                "Warm white, soft gray, charcoal",
                "Matte black, sage green",
                "Light white oak",
                "Matte black",
                "Clean-lined linen and bouclé",
                "Keep existing floor; add low-pile neutral rug",
            ),
            Style::Luxury => (
                "Ivory, deep navy, champagne",
                "Emerald, burnished gold",
                "Dark walnut",
                "Polished brass",
                "Velvet, silk and layered throws",
                "Keep existing floor; add plush patterned rug",
            ),
            Style::Scandinavian => (
                "Pure white, pale gray, oatmeal",
                "Dusty blue, blush",
                "Natural ash and birch",
                "Brushed steel",
                "Wool, sheepskin and cotton",
                "Keep existing floor; add flatweave wool rug",
            ),
            Style::Industrial => (
                "Concrete gray, espresso, off-white",
                "Rust orange, olive",
                "Reclaimed pine",
                "Raw iron and aged steel",
                "Leather and heavy canvas",
                "Keep existing floor; add distressed vintage rug",
            ),
            Style::Coastal => (
                "Sand, crisp white, driftwood gray",
                "Ocean blue, seafoam",
                "Whitewashed oak",
                "Brushed nickel",
                "Light linen and jute",
                "Keep existing floor; add natural jute rug",
            ),
            Style::Farmhouse => (
                "Cream, greige, soft black",
                "Muted terracotta, olive",
                "Rustic knotty oak",
                "Oil-rubbed bronze",
                "Plaid, cotton and chunky knits",
                "Keep existing floor; add vintage-wash rug",
            ),
        };
        Self {
            primary_colors: primary.to_string(),
            accent_colors: accent.to_string(),
            wood_tone: wood.to_string(),
            metal_finish: metal.to_string(),
            textile_style: textile.to_string(),
            flooring_note: flooring.to_string(),
        }
    }
}

/// A persisted house profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseProfile {
    pub id: String,
    pub name: String,
    pub style: Style,
    #[serde(rename = "designDNA")]
    pub design_dna: DesignDna,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub rooms_staged: u32,
}

/// In-memory profile list mirrored to a [`KeyValueStore`].
pub struct HouseProfileStore<S: KeyValueStore> {
    storage: S,
    profiles: Vec<HouseProfile>,
    active: Option<String>,
}

impl<S: KeyValueStore> HouseProfileStore<S> {
    /// Load the list from storage. A missing entry is an empty list.
    pub fn load(storage: S) -> StagingResult<Self> {
        let profiles = match storage.get(PROFILES_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<HouseProfile>>(&raw).map_err(|e| {
                StagingError::storage(PROFILES_KEY, format!("malformed profile list: {}", e))
                    .with_recovery_suggestion("Delete the stored profile list to start over")
            })?,
            None => Vec::new(),
        };
        debug!(count = profiles.len(), "house profiles loaded");
        Ok(Self {
            storage,
            profiles,
            active: None,
        })
    }

    pub fn profiles(&self) -> &[HouseProfile] {
        &self.profiles
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[cfg(test)]
    pub(crate) fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn get(&self, id: &str) -> Option<&HouseProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Resolve by exact id, then by case-insensitive name.
    pub fn find(&self, id_or_name: &str) -> Option<&HouseProfile> {
        let query = id_or_name.trim();
        self.get(query).or_else(|| {
            self.profiles
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(query))
        })
    }

    /// Create a profile with the style's preset design DNA.
    ///
    /// Like every mutation here, the in-memory list only changes once the
    /// new list has been saved.
    pub fn create(&mut self, name: &str, style: Style) -> StagingResult<HouseProfile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StagingError::config("name", name, "profile name must not be empty"));
        }
        let mut id = Uuid::new_v4().to_string();
        while self.get(&id).is_some() {
            id = Uuid::new_v4().to_string();
        }
        let profile = HouseProfile {
            id,
            name: name.to_string(),
            style,
            design_dna: DesignDna::for_style(style),
            created_at: Utc::now(),
            rooms_staged: 0,
        };
        self.profiles.push(profile.clone());
        if let Err(e) = self.save() {
            self.profiles.pop();
            return Err(e);
        }
        info!(id = %profile.id, name = %profile.name, style = %style, "house profile created");
        Ok(profile)
    }

    /// Make `id` the active profile.
    pub fn select(&mut self, id: &str) -> StagingResult<&HouseProfile> {
        let profile = self
            .profiles
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StagingError::profile_not_found(id))?;
        self.active = Some(profile.id.clone());
        debug!(id, "house profile selected");
        Ok(profile)
    }

    pub fn clear_selection(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&HouseProfile> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    /// Delete a profile. Removes the storage entry when the list becomes empty.
    pub fn delete(&mut self, id: &str) -> StagingResult<HouseProfile> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StagingError::profile_not_found(id))?;
        let removed = self.profiles.remove(index);
        if let Err(e) = self.save() {
            self.profiles.insert(index, removed);
            return Err(e);
        }
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        info!(id, name = %removed.name, "house profile deleted");
        Ok(removed)
    }

    /// Bump the staged-room counter after a successful generation.
    pub fn record_staged(&mut self, id: &str) -> StagingResult<u32> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StagingError::profile_not_found(id))?;
        self.profiles[index].rooms_staged += 1;
        let count = self.profiles[index].rooms_staged;
        if let Err(e) = self.save() {
            self.profiles[index].rooms_staged -= 1;
            return Err(e);
        }
        debug!(id, rooms_staged = count, "house profile counter bumped");
        Ok(count)
    }

    fn save(&mut self) -> StagingResult<()> {
        if self.profiles.is_empty() {
            return self.storage.remove(PROFILES_KEY);
        }
        let raw = serde_json::to_string(&self.profiles)
            .map_err(|e| StagingError::storage(PROFILES_KEY, e.to_string()))?;
        self.storage.set(PROFILES_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::storage::testing::FlakyStore;

    fn store() -> HouseProfileStore<MemoryStore> {
        HouseProfileStore::load(MemoryStore::new()).unwrap()
    }

    #[test]
    fn create_uses_style_preset_and_persists() {
        let mut profiles = store();
        let p = profiles.create("  Maple Street  ", Style::Coastal).unwrap();
        assert_eq!(p.name, "Maple Street");
        assert_eq!(p.design_dna, DesignDna::for_style(Style::Coastal));
        assert_eq!(p.rooms_staged, 0);
        assert!(profiles.storage().contains(PROFILES_KEY));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut profiles = store();
        assert!(profiles.create("   ", Style::Modern).is_err());
        assert!(profiles.is_empty());
        assert!(!profiles.storage().contains(PROFILES_KEY));
    }

    #[test]
    fn ids_are_unique() {
        let mut profiles = store();
        let a = profiles.create("A", Style::Modern).unwrap();
        let b = profiles.create("A", Style::Modern).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn deleting_last_profile_clears_storage() {
        let mut profiles = store();
        let a = profiles.create("A", Style::Modern).unwrap();
        let b = profiles.create("B", Style::Luxury).unwrap();
        profiles.delete(&a.id).unwrap();
        assert!(profiles.storage().contains(PROFILES_KEY));
        profiles.delete(&b.id).unwrap();
        assert!(!profiles.storage().contains(PROFILES_KEY));
        assert!(matches!(
            profiles.delete(&b.id),
            Err(StagingError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn deleting_active_profile_clears_selection() {
        let mut profiles = store();
        let a = profiles.create("A", Style::Modern).unwrap();
        profiles.select(&a.id).unwrap();
        assert_eq!(profiles.active().map(|p| p.id.as_str()), Some(a.id.as_str()));
        profiles.delete(&a.id).unwrap();
        assert!(profiles.active().is_none());
    }

    #[test]
    fn record_staged_increments_and_survives_reload() {
        let mut profiles = store();
        let a = profiles.create("A", Style::Industrial).unwrap();
        assert_eq!(profiles.record_staged(&a.id).unwrap(), 1);
        assert_eq!(profiles.record_staged(&a.id).unwrap(), 2);

        let reloaded = HouseProfileStore::load(profiles.storage().clone()).unwrap();
        assert_eq!(reloaded.get(&a.id).unwrap().rooms_staged, 2);
        assert_eq!(reloaded.get(&a.id).unwrap().style, Style::Industrial);
    }

    #[test]
    fn find_by_id_or_name() {
        let mut profiles = store();
        let a = profiles.create("Lake House", Style::Scandinavian).unwrap();
        assert_eq!(profiles.find(&a.id).unwrap().id, a.id);
        assert_eq!(profiles.find("lake house").unwrap().id, a.id);
        assert!(profiles.find("city flat").is_none());
    }

    #[test]
    fn serialized_keys_match_stored_format() {
        let mut profiles = store();
        profiles.create("A", Style::Farmhouse).unwrap();
        let raw = profiles.storage().get(PROFILES_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value[0];
        assert!(first.get("designDNA").is_some());
        assert!(first.get("createdAt").is_some());
        assert_eq!(first["roomsStaged"], 0);
        assert_eq!(first["style"], "FARMHOUSE");
        assert!(first["designDNA"].get("woodTone").is_some());
    }

    #[test]
    fn failed_saves_leave_the_list_unchanged() {
        let mut profiles = HouseProfileStore::load(FlakyStore::default()).unwrap();
        let a = profiles.create("A", Style::Modern).unwrap();
        profiles.select(&a.id).unwrap();
        let on_disk = profiles.storage().inner.get(PROFILES_KEY).unwrap();

        profiles.storage_mut().fail_writes = true;
        assert!(matches!(
            profiles.create("B", Style::Luxury),
            Err(StagingError::Storage { .. })
        ));
        assert!(profiles.record_staged(&a.id).is_err());
        assert!(profiles.delete(&a.id).is_err());

        assert_eq!(profiles.profiles().len(), 1);
        assert_eq!(profiles.get(&a.id).unwrap().rooms_staged, 0);
        assert_eq!(profiles.active().map(|p| p.id.as_str()), Some(a.id.as_str()));

        // the next successful save must not carry the refused changes
        profiles.storage_mut().fail_writes = false;
        profiles.record_staged(&a.id).unwrap();
        let reloaded = HouseProfileStore::load(profiles.storage().inner.clone()).unwrap();
        assert_eq!(reloaded.profiles().len(), 1);
        assert_eq!(reloaded.get(&a.id).unwrap().rooms_staged, 1);
        assert_ne!(profiles.storage().inner.get(PROFILES_KEY).unwrap(), on_disk);
    }

    #[test]
    fn malformed_storage_is_reported() {
        let mut raw = MemoryStore::new();
        raw.set(PROFILES_KEY, "{not json").unwrap();
        assert!(matches!(
            HouseProfileStore::load(raw),
            Err(StagingError::Storage { .. })
        ));
    }
}
