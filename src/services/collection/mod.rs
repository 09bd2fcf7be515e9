//! Collection service for CRUD operations on alarm collections.
//!
//! Policies and compatibility metadata are stored in their text wire
//! formats. At most one collection may be standard for each alarm type;
//! every write that sets a standard bit clears it on all other collections
//! within the same transaction.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use crate::models::collection::{
    AlarmType, AlarmTypes, Collection, CollectionPolicy, CompatibilityAttribute,
};

const SELECT_COLUMNS: &str = "SELECT id, name, location, attributes, compatibility FROM collections";

/// Service for managing alarm collections.
pub struct CollectionService<'a> {
    conn: &'a Connection,
}

impl<'a> CollectionService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Collection> {
        let attributes: String = row.get(3)?;
        let compatibility: String = row.get(4)?;
        Ok(Collection {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            location: row.get(2)?,
            policy: CollectionPolicy::deserialize(&attributes),
            compatibility: CompatibilityAttribute::deserialize(&compatibility),
        })
    }

    /// Create a new collection.
    pub fn create(&self, collection: Collection) -> Result<Collection> {
        collection.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        self.conn
            .execute(
                "INSERT INTO collections (name, location, attributes, compatibility)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    collection.name.trim(),
                    collection.location,
                    collection.policy.serialized(),
                    collection.compatibility.serialized(),
                ],
            )
            .context("Failed to insert collection")?;

        let id = self.conn.last_insert_rowid();
        self.release_standard(id, collection.policy.standard_types())?;
        tx.commit().context("Failed to commit collection")?;

        log::info!("Created collection '{}' ({})", collection.name.trim(), id);
        self.get_by_id(id)
    }

    /// Get a collection by ID.
    pub fn get_by_id(&self, id: i64) -> Result<Collection> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::from_row,
            )
            .context("Collection not found")
    }

    /// Get a collection by name.
    pub fn get_by_name(&self, name: &str) -> Result<Option<Collection>> {
        let result = self.conn.query_row(
            &format!("{} WHERE name = ?1", SELECT_COLUMNS),
            params![name],
            Self::from_row,
        );

        match result {
            Ok(collection) => Ok(Some(collection)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get all collections ordered by name.
    pub fn list_all(&self) -> Result<Vec<Collection>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY name ASC", SELECT_COLUMNS))?;

        let collections = stmt.query_map([], Self::from_row)?;

        collections
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to fetch collections")
    }

    /// Update an existing collection.
    pub fn update(&self, collection: &Collection) -> Result<()> {
        collection.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        let id = collection
            .id
            .ok_or_else(|| anyhow::anyhow!("Collection ID is required for update"))?;

        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        let rows = self
            .conn
            .execute(
                "UPDATE collections
                 SET name = ?1, location = ?2, attributes = ?3, compatibility = ?4,
                     updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?5",
                params![
                    collection.name.trim(),
                    collection.location,
                    collection.policy.serialized(),
                    collection.compatibility.serialized(),
                    id,
                ],
            )
            .context("Failed to update collection")?;

        if rows == 0 {
            anyhow::bail!("Collection {} not found", id);
        }

        self.release_standard(id, collection.policy.standard_types())?;
        tx.commit().context("Failed to commit collection update")?;
        Ok(())
    }

    /// Delete a collection by ID.
    pub fn delete(&self, id: i64) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM collections WHERE id = ?1", params![id])
            .context("Failed to delete collection")?;

        if rows == 0 {
            anyhow::bail!("Collection {} not found", id);
        }

        log::info!("Deleted collection {}", id);
        Ok(())
    }

    /// Collections that can currently receive new alarms of `alarm_type`.
    pub fn collections_accepting(&self, alarm_type: AlarmType) -> Result<Vec<Collection>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|c| c.can_receive(alarm_type))
            .collect())
    }

    /// The standard collection for `alarm_type`, if one is set.
    pub fn standard_for(&self, alarm_type: AlarmType) -> Result<Option<Collection>> {
        Ok(self
            .list_all()?
            .into_iter()
            .find(|c| c.policy.is_standard(alarm_type)))
    }

    /// Make collection `id` the standard for `alarm_type`.
    ///
    /// Fails if the collection does not have the type enabled.
    pub fn set_standard(&self, id: i64, alarm_type: AlarmType) -> Result<()> {
        let mut collection = self.get_by_id(id)?;
        if !collection.policy.is_enabled(alarm_type) {
            anyhow::bail!(
                "Collection '{}' does not accept {} alarms",
                collection.name,
                alarm_type.name()
            );
        }

        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        collection.policy.set_standard(alarm_type, true);
        self.write_policy(id, &collection.policy)?;
        self.release_standard(id, alarm_type.into())?;

        tx.commit().context("Failed to commit standard collection")?;
        log::info!(
            "Collection '{}' is now standard for {} alarms",
            collection.name,
            alarm_type.name()
        );
        Ok(())
    }

    /// Clear `types` from the standard set of every collection except `keep`.
    fn release_standard(&self, keep: i64, types: AlarmTypes) -> Result<()> {
        if types.is_empty() {
            return Ok(());
        }

        for mut other in self.list_all()? {
            let Some(other_id) = other.id.filter(|&other_id| other_id != keep) else {
                continue;
            };

            let before = other.policy.standard_types();
            for alarm_type in types.iter() {
                other.policy.set_standard(alarm_type, false);
            }

            if other.policy.standard_types() != before {
                log::debug!("Clearing standard types {} on '{}'", types, other.name);
                self.write_policy(other_id, &other.policy)?;
            }
        }
        Ok(())
    }

    fn write_policy(&self, id: i64, policy: &CollectionPolicy) -> Result<()> {
        self.conn
            .execute(
                "UPDATE collections SET attributes = ?1, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?2",
                params![policy.serialized(), id],
            )
            .context("Failed to store collection attributes")?;
        Ok(())
    }
}
