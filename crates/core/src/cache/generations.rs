//! Named cache generations.
//!
//! A generation is a partition of the store that is created whole and
//! deleted whole. Entries never outlive their generation.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

/// Handle to an opened generation.
///
/// Only [`CacheDb::open_generation`] creates handles, so holding one means
/// the generation row exists (until an activation prune removes it).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationHandle {
    name: String,
}

impl GenerationHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The two generation names designated for one deployed version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GenerationNames {
    /// Static content: documents, manifest, icons, fonts, stylesheets.
    pub asset: String,
    /// Dynamic API responses.
    pub api: String,
}

impl GenerationNames {
    /// `<app>-v<version>` and `<app>-api-v<version>`.
    pub fn for_version(app: &str, version: &str) -> Self {
        Self { asset: format!("{app}-v{version}"), api: format!("{app}-api-v{version}") }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.asset == name || self.api == name
    }
}

/// Summary row for listing generations.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GenerationInfo {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
}

impl CacheDb {
    /// Open a generation, creating it if it doesn't exist yet.
    pub async fn open_generation(&self, name: &str) -> Result<GenerationHandle, Error> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("generation name cannot be empty".into()));
        }
        let owned = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO generations (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![owned, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(GenerationHandle { name: name.to_string() })
    }

    /// Handle to an existing generation, without creating it.
    pub async fn existing_generation(&self, name: &str) -> Result<Option<GenerationHandle>, Error> {
        let owned = name.to_string();
        let found = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let found = conn
                    .query_row("SELECT name FROM generations WHERE name = ?1", params![owned], |row| row.get(0))
                    .optional()?;
                Ok(found)
            })
            .await
            .map_err(Error::from)?;

        Ok(found.map(|name| GenerationHandle { name }))
    }

    /// Names of every generation in the store, sorted.
    pub async fn list_generations(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Every generation with its entry count, sorted by name.
    pub async fn describe_generations(&self) -> Result<Vec<GenerationInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<GenerationInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT g.name, g.created_at, COUNT(e.key_hash)
                     FROM generations g LEFT JOIN entries e ON e.generation = g.name
                     GROUP BY g.name ORDER BY g.name",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(GenerationInfo {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every generation whose name is not in `keep`.
    ///
    /// Returns the deleted names, sorted. Running it again with the same
    /// `keep` set deletes nothing.
    pub async fn prune_generations(&self, keep: &[&str]) -> Result<Vec<String>, Error> {
        let stale: Vec<String> = self
            .list_generations()
            .await?
            .into_iter()
            .filter(|name| !keep.contains(&name.as_str()))
            .collect();

        for name in &stale {
            self.delete_generation(name).await?;
            tracing::info!(generation = %name, "deleted stale generation");
        }

        Ok(stale)
    }

    /// Delete a generation and all of its entries.
    ///
    /// Returns false if no such generation existed.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_for_version() {
        let names = GenerationNames::for_version("app", "2");
        assert_eq!(names.asset, "app-v2");
        assert_eq!(names.api, "app-api-v2");
        assert!(names.contains("app-v2"));
        assert!(!names.contains("app-v1"));
    }

    #[tokio::test]
    async fn test_open_creates_once() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let first = db.open_generation("app-v1").await.unwrap();
        let second = db.open_generation("app-v1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(db.list_generations().await.unwrap(), vec!["app-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_open_empty_name() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.open_generation("  ").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_existing_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.existing_generation("app-v1").await.unwrap().is_none());

        db.open_generation("app-v1").await.unwrap();
        let handle = db.existing_generation("app-v1").await.unwrap().unwrap();
        assert_eq!(handle.name(), "app-v1");
    }

    #[tokio::test]
    async fn test_delete_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("app-v1").await.unwrap();
        db.open_generation("app-api-v1").await.unwrap();

        assert!(db.delete_generation("app-v1").await.unwrap());
        assert!(!db.delete_generation("app-v1").await.unwrap());
        assert_eq!(db.list_generations().await.unwrap(), vec!["app-api-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_prune_generations() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for name in ["app-v1", "app-api-v1", "app-v2", "app-api-v2"] {
            db.open_generation(name).await.unwrap();
        }

        let deleted = db.prune_generations(&["app-v2", "app-api-v2"]).await.unwrap();
        assert_eq!(deleted, vec!["app-api-v1".to_string(), "app-v1".to_string()]);
        assert_eq!(db.list_generations().await.unwrap(), vec!["app-api-v2".to_string(), "app-v2".to_string()]);

        let again = db.prune_generations(&["app-v2", "app-api-v2"]).await.unwrap();
        assert!(again.is_empty());
        assert_eq!(db.list_generations().await.unwrap(), vec!["app-api-v2".to_string(), "app-v2".to_string()]);
    }

    #[tokio::test]
    async fn test_describe_empty_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("app-v1").await.unwrap();

        let info = db.describe_generations().await.unwrap();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].name, "app-v1");
        assert_eq!(info[0].entries, 0);
    }
}
