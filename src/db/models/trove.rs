// src/db/models/trove.rs

//! Trove model - one installed trove

use crate::dependencies::DependencySet;
use crate::error::Result;
use crate::resolver::TroveSpec;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// An installed trove, flavor kept in frozen form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trove {
    pub id: Option<i64>,
    pub name: String,
    pub version: String,
    pub flavor: String,
    pub installed_at: Option<String>,
}

impl Trove {
    /// Create a new Trove
    pub fn new(name: String, version: String, flavor: &DependencySet) -> Self {
        Self {
            id: None,
            name,
            version,
            flavor: flavor.freeze(),
            installed_at: None,
        }
    }

    pub fn from_spec(spec: &TroveSpec) -> Self {
        Self::new(spec.name.clone(), spec.version.clone(), &spec.flavor)
    }

    /// Thaw this record back into a spec
    pub fn spec(&self) -> Result<TroveSpec> {
        Ok(TroveSpec::new(
            self.name.clone(),
            self.version.clone(),
            DependencySet::thaw(&self.flavor)?,
        ))
    }

    /// Insert this trove into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO troves (name, version, flavor) VALUES (?1, ?2, ?3)",
            params![&self.name, &self.version, &self.flavor],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a trove by ID
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, version, flavor, installed_at FROM troves WHERE id = ?1",
        )?;

        let trove = stmt.query_row([id], Self::from_row).optional()?;
        Ok(trove)
    }

    /// Find all versions and flavors of a trove by name
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, version, flavor, installed_at FROM troves
             WHERE name = ?1 ORDER BY version, flavor",
        )?;

        let troves = stmt
            .query_map([name], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(troves)
    }

    /// Find the record for an exact trove
    pub fn find_by_spec(conn: &Connection, spec: &TroveSpec) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, version, flavor, installed_at FROM troves
             WHERE name = ?1 AND version = ?2 AND flavor = ?3",
        )?;

        let trove = stmt
            .query_row(
                params![&spec.name, &spec.version, spec.flavor.freeze()],
                Self::from_row,
            )
            .optional()?;
        Ok(trove)
    }

    /// List all installed troves
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, version, flavor, installed_at FROM troves ORDER BY name, version",
        )?;

        let troves = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(troves)
    }

    /// Delete a trove; its requires and provides go with it
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        conn.execute("DELETE FROM troves WHERE id = ?1", [id])?;
        Ok(())
    }

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            version: row.get(2)?,
            flavor: row.get(3)?,
            installed_at: row.get(4)?,
        })
    }
}
