//! Name to id reference catalogs. The league catalog is loaded once per
//! process and persisted to disk; team catalogs are fetched per league
//! selection and live only inside the session that selected the league.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::warn;

use crate::error::CatalogError;
use crate::stats_fetch::StatsProvider;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeagueCatalog {
    entries: BTreeMap<String, u32>,
}

impl LeagueCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, u32)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Load the league mapping: from the store when it exists and parses,
    /// otherwise from the remote list endpoint, persisting the result for
    /// the next run. A store that fails to parse counts as absent. A store
    /// that fails to write is logged and otherwise ignored; the mapping is
    /// already in hand.
    pub fn load(path: &Path, provider: &dyn StatsProvider) -> Result<Self, CatalogError> {
        if let Some(catalog) = Self::read_store(path) {
            return Ok(catalog);
        }
        let fetched = provider
            .leagues()
            .map_err(|err| CatalogError::Unavailable(format!("league list fetch failed: {err}")))?;
        let catalog = Self::from_entries(fetched.into_iter().map(|league| (league.name, league.id)));
        if let Err(err) = catalog.persist(path) {
            warn!("league store not persisted: {err}");
        }
        Ok(catalog)
    }

    fn read_store(path: &Path) -> Option<Self> {
        let raw = fs::read_to_string(path).ok()?;
        let entries = serde_json::from_str::<BTreeMap<String, u32>>(&raw).ok()?;
        Some(Self { entries })
    }

    /// Serialize next to the target, then swap, so a crash mid-write never
    /// leaves a half-written store.
    fn persist(&self, path: &Path) -> Result<(), CatalogError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|err| {
                    CatalogError::Unavailable(format!("create store dir failed: {err}"))
                })?;
            }
        }
        let json = serde_json::to_string(&self.entries)
            .map_err(|err| CatalogError::Unavailable(format!("serialize store failed: {err}")))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|err| CatalogError::Unavailable(format!("write store failed: {err}")))?;
        fs::rename(&tmp, path)
            .map_err(|err| CatalogError::Unavailable(format!("swap store failed: {err}")))?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Teams of one league. Never persisted: the set is small and goes stale
/// with transfers and promotions, so it is refetched on every league
/// selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamCatalog {
    entries: BTreeMap<String, u32>,
}

impl TeamCatalog {
    pub fn from_entries(entries: impl IntoIterator<Item = (String, u32)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn load(
        provider: &dyn StatsProvider,
        league_id: u32,
        season: i32,
    ) -> Result<Self, CatalogError> {
        let fetched = provider
            .teams(league_id, season)
            .map_err(|err| CatalogError::Unavailable(format!("team list fetch failed: {err}")))?;
        Ok(Self::from_entries(
            fetched.into_iter().map(|team| (team.name, team.id)),
        ))
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
