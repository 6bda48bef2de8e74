//! Stored responses inside a generation.
//!
//! Entries are keyed by the hash of their request identity and overwritten
//! on every refresh. There is no expiry: the last stored response wins.

use super::connection::CacheDb;
use super::generations::GenerationHandle;
use crate::Error;
use crate::request::RequestIdentity;
use crate::response::{Response, ResponseSource};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

const UPSERT_ENTRY: &str = "INSERT INTO entries (
        generation, key_hash, method, url, status, headers_json, body, stored_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT(generation, key_hash) DO UPDATE SET
        status = excluded.status,
        headers_json = excluded.headers_json,
        body = excluded.body,
        stored_at = excluded.stored_at";

/// One row ready to be written.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn new(identity: &RequestIdentity, response: &Response) -> Result<Self, Error> {
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("failed to serialize headers: {e}")))?;
        Ok(Self {
            key_hash: identity.key_hash(),
            method: identity.method.clone(),
            url: identity.url.clone(),
            status: response.status,
            headers_json,
            body: response.body.to_vec(),
        })
    }

    fn write(&self, conn: &rusqlite::Connection, generation: &str, stored_at: &str) -> Result<(), Error> {
        conn.execute(
            UPSERT_ENTRY,
            params![
                generation,
                &self.key_hash,
                &self.method,
                &self.url,
                self.status,
                &self.headers_json,
                &self.body,
                stored_at,
            ],
        )?;
        Ok(())
    }
}

impl CacheDb {
    /// Store a response under `identity`, replacing any previous entry.
    pub async fn put_entry(
        &self, generation: &GenerationHandle, identity: &RequestIdentity, response: &Response,
    ) -> Result<(), Error> {
        let row = EntryRow::new(identity, response)?;
        let generation = generation.name().to_string();
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| row.write(conn, &generation, &stored_at))
            .await
            .map_err(Error::from)
    }

    /// Store several responses in one transaction.
    ///
    /// Either every entry is written or none is.
    pub async fn put_entries(
        &self, generation: &GenerationHandle, entries: &[(RequestIdentity, Response)],
    ) -> Result<usize, Error> {
        let rows = entries
            .iter()
            .map(|(identity, response)| EntryRow::new(identity, response))
            .collect::<Result<Vec<_>, _>>()?;
        let generation = generation.name().to_string();
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                for row in &rows {
                    row.write(&tx, &generation, &stored_at)?;
                }
                tx.commit()?;
                Ok(rows.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the stored response for `identity`.
    pub async fn match_entry(
        &self, generation: &GenerationHandle, identity: &RequestIdentity,
    ) -> Result<Option<Response>, Error> {
        let generation = generation.name().to_string();
        let key_hash = identity.key_hash();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(u16, String, Vec<u8>)>, Error> {
                let row = conn
                    .query_row(
                        "SELECT status, headers_json, body FROM entries
                         WHERE generation = ?1 AND key_hash = ?2",
                        params![generation, key_hash],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                    )
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(Error::from)?;

        let Some((status, headers_json, body)) = row else {
            return Ok(None);
        };

        let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)
            .map_err(|e| Error::CorruptEntry(format!("{identity}: {e}")))?;

        Ok(Some(Response::new(status, headers, body, ResponseSource::Cache)))
    }

    /// Identities stored in a generation, oldest insertion first.
    pub async fn entry_keys(&self, generation: &GenerationHandle) -> Result<Vec<RequestIdentity>, Error> {
        let generation = generation.name().to_string();
        self.conn
            .call(move |conn| -> Result<Vec<RequestIdentity>, Error> {
                let mut stmt = conn.prepare("SELECT method, url FROM entries WHERE generation = ?1 ORDER BY rowid")?;
                let keys = stmt
                    .query_map(params![generation], |row| {
                        Ok(RequestIdentity { method: row.get(0)?, url: row.get(1)? })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(url: &str) -> RequestIdentity {
        RequestIdentity { method: "GET".into(), url: url.into() }
    }

    fn response(status: u16, body: &'static str) -> Response {
        Response::new(status, vec![("content-type".into(), "text/plain".into())], body, ResponseSource::Network)
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let generation = db.open_generation("app-v1").await.unwrap();
        let id = identity("http://localhost:8080/app.css");

        db.put_entry(&generation, &id, &response(200, "body{}")).await.unwrap();

        let cached = db.match_entry(&generation, &id).await.unwrap().unwrap();
        assert_eq!(cached.status, 200);
        assert_eq!(cached.body.as_ref(), b"body{}");
        assert_eq!(cached.content_type(), Some("text/plain"));
        assert_eq!(cached.source, ResponseSource::Cache);
    }

    #[tokio::test]
    async fn test_match_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let generation = db.open_generation("app-v1").await.unwrap();
        let result = db.match_entry(&generation, &identity("http://localhost:8080/nope")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_generations_are_isolated() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let assets = db.open_generation("app-v1").await.unwrap();
        let api = db.open_generation("app-api-v1").await.unwrap();
        let id = identity("http://localhost:8080/api/items");

        db.put_entry(&api, &id, &response(200, "[]")).await.unwrap();

        assert!(db.match_entry(&api, &id).await.unwrap().is_some());
        assert!(db.match_entry(&assets, &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_keeps_insertion_order() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let generation = db.open_generation("app-v1").await.unwrap();
        let first = identity("http://localhost:8080/");
        let second = identity("http://localhost:8080/manifest.json");

        db.put_entry(&generation, &first, &response(200, "v1")).await.unwrap();
        db.put_entry(&generation, &second, &response(200, "{}")).await.unwrap();
        db.put_entry(&generation, &first, &response(200, "v2")).await.unwrap();

        let cached = db.match_entry(&generation, &first).await.unwrap().unwrap();
        assert_eq!(cached.body.as_ref(), b"v2");

        let keys = db.entry_keys(&generation).await.unwrap();
        assert_eq!(keys, vec![first, second]);
    }

    #[tokio::test]
    async fn test_put_entries_batch() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let generation = db.open_generation("app-v1").await.unwrap();
        let batch = vec![
            (identity("http://localhost:8080/"), response(200, "<html>")),
            (identity("http://localhost:8080/manifest.json"), response(200, "{}")),
        ];

        let written = db.put_entries(&generation, &batch).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(db.entry_keys(&generation).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_generation_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let generation = db.open_generation("app-v1").await.unwrap();
        let id = identity("http://localhost:8080/");
        db.put_entry(&generation, &id, &response(200, "<html>")).await.unwrap();

        db.delete_generation("app-v1").await.unwrap();
        let reopened = db.open_generation("app-v1").await.unwrap();

        assert!(db.match_entry(&reopened, &id).await.unwrap().is_none());
    }
}
