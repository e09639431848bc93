// src/db/models/dependency.rs

//! DependencyEntry model - one required or provided dependency of a trove

use crate::dependencies::{ClassTag, Dependency};
use crate::error::Result;
use rusqlite::{Connection, Row, params};

/// Which side of a trove's dependencies a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepTable {
    Requires,
    Provides,
}

impl DepTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepTable::Requires => "requires",
            DepTable::Provides => "provides",
        }
    }
}

/// A stored dependency: indexed class and name plus the frozen text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub id: Option<i64>,
    pub trove_id: i64,
    pub class: ClassTag,
    pub name: String,
    pub frozen: String,
}

impl DependencyEntry {
    /// Create a new DependencyEntry
    pub fn new(trove_id: i64, class: ClassTag, dep: &Dependency) -> Self {
        Self {
            id: None,
            trove_id,
            class,
            name: dep.name().to_string(),
            frozen: dep.freeze(),
        }
    }

    /// Insert this dependency into the given table
    pub fn insert(&mut self, conn: &Connection, table: DepTable) -> Result<i64> {
        conn.execute(
            &format!(
                "INSERT INTO {} (trove_id, class, name, frozen) VALUES (?1, ?2, ?3, ?4)",
                table.as_str()
            ),
            params![&self.trove_id, self.class.tag_id(), &self.name, &self.frozen],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// All dependencies of one trove
    pub fn find_by_trove(conn: &Connection, table: DepTable, trove_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, trove_id, class, name, frozen FROM {} WHERE trove_id = ?1 ORDER BY class, name",
            table.as_str()
        ))?;

        let entries = stmt
            .query_map([trove_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// All rows for one dependency name in one class, across troves
    pub fn find_by_name(conn: &Connection, table: DepTable, class: ClassTag, name: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, trove_id, class, name, frozen FROM {} WHERE class = ?1 AND name = ?2 ORDER BY trove_id",
            table.as_str()
        ))?;

        let entries = stmt
            .query_map(params![class.tag_id(), name], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Thaw the stored dependency
    pub fn dependency(&self) -> Result<Dependency> {
        Dependency::thaw(&self.frozen)
    }

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let class_id: u32 = row.get(2)?;
        let class = ClassTag::from_tag_id(class_id)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(2, i64::from(class_id)))?;

        Ok(Self {
            id: Some(row.get(0)?),
            trove_id: row.get(1)?,
            class,
            name: row.get(3)?,
            frozen: row.get(4)?,
        })
    }
}
