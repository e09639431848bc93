// src/db/index.rs

//! Persistent dependency index over the installed-trove tables

use crate::dependencies::{DependencyCache, DependencySet, MergeType};
use crate::error::{Error, Result};
use crate::resolver::{DependencyIndex, TroveDeps, TroveSpec};
use indexmap::{IndexMap, IndexSet};
use rusqlite::Connection;
use std::cell::RefCell;
use tracing::debug;

use super::models::{DepTable, DependencyEntry, Trove};

/// Record an installed trove with its requires and provides
///
/// Returns the new trove id. Callers wanting atomicity run this inside
/// `db::transaction`.
pub fn record_trove(conn: &Connection, spec: &TroveSpec, deps: &TroveDeps) -> Result<i64> {
    let mut trove = Trove::from_spec(spec);
    let trove_id = trove.insert(conn)?;

    for (tag, dep) in deps.requires.iter() {
        DependencyEntry::new(trove_id, tag, dep).insert(conn, DepTable::Requires)?;
    }
    for (tag, dep) in deps.provides.iter() {
        DependencyEntry::new(trove_id, tag, dep).insert(conn, DepTable::Provides)?;
    }

    debug!(
        "Recorded {} with {} requires and {} provides",
        spec,
        deps.requires.len(),
        deps.provides.len()
    );
    Ok(trove_id)
}

/// Remove an installed trove and its dependency rows
pub fn remove_trove(conn: &Connection, spec: &TroveSpec) -> Result<()> {
    let trove = Trove::find_by_spec(conn, spec)?
        .ok_or_else(|| Error::NotFoundError(format!("Trove {} is not installed", spec)))?;
    if let Some(id) = trove.id {
        Trove::delete(conn, id)?;
    }
    Ok(())
}

/// `DependencyIndex` backed by the installed-trove database
///
/// Give the index a connection inside a transaction when other writers may
/// run during a check. Thawed dependencies are shared through one cache per
/// index.
pub struct SqliteIndex<'a> {
    conn: &'a Connection,
    cache: RefCell<DependencyCache>,
}

impl<'a> SqliteIndex<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            cache: RefCell::new(DependencyCache::new()),
        }
    }

    fn spec_of(&self, trove_id: i64) -> Result<Option<TroveSpec>> {
        Trove::find_by_id(self.conn, trove_id)?
            .map(|trove| trove.spec())
            .transpose()
    }

    fn load_set(&self, table: DepTable, trove_id: i64) -> Result<DependencySet> {
        let mut set = DependencySet::new();
        let mut cache = self.cache.borrow_mut();
        for entry in DependencyEntry::find_by_trove(self.conn, table, trove_id)? {
            set.add_shared(entry.class, cache.thaw(&entry.frozen)?, MergeType::Normal)?;
        }
        Ok(set)
    }
}

impl DependencyIndex for SqliteIndex<'_> {
    fn providers_of(&self, deps: &DependencySet) -> Result<Vec<TroveSpec>> {
        let mut found = IndexSet::new();
        for (tag, required) in deps.iter() {
            for entry in DependencyEntry::find_by_name(self.conn, DepTable::Provides, tag, required.name())? {
                let provided = self.cache.borrow_mut().thaw(&entry.frozen)?;
                if provided.satisfies(required) {
                    found.insert(entry.trove_id);
                }
            }
        }

        let mut specs = Vec::with_capacity(found.len());
        for trove_id in found {
            if let Some(spec) = self.spec_of(trove_id)? {
                specs.push(spec);
            }
        }
        debug!("{} installed providers for {} dependencies", specs.len(), deps.len());
        Ok(specs)
    }

    fn requirers_of(&self, provides: &DependencySet) -> Result<Vec<(TroveSpec, DependencySet)>> {
        let mut found: IndexMap<i64, DependencySet> = IndexMap::new();
        for (tag, provided) in provides.iter() {
            for entry in DependencyEntry::find_by_name(self.conn, DepTable::Requires, tag, provided.name())? {
                let required = self.cache.borrow_mut().thaw(&entry.frozen)?;
                if provided.satisfies(&required) {
                    found
                        .entry(entry.trove_id)
                        .or_default()
                        .add_shared(tag, required, MergeType::Normal)?;
                }
            }
        }

        let mut requirers = Vec::with_capacity(found.len());
        for (trove_id, matched) in found {
            if let Some(spec) = self.spec_of(trove_id)? {
                requirers.push((spec, matched));
            }
        }
        Ok(requirers)
    }

    fn trove_deps(&self, trove: &TroveSpec) -> Result<Option<TroveDeps>> {
        let Some(id) = Trove::find_by_spec(self.conn, trove)?.and_then(|t| t.id) else {
            return Ok(None);
        };
        Ok(Some(TroveDeps {
            requires: self.load_set(DepTable::Requires, id)?,
            provides: self.load_set(DepTable::Provides, id)?,
        }))
    }
}
