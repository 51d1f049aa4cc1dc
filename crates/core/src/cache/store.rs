//! Named cache store operations.
//!
//! Mirrors the request/response cache a background worker owns: responses are
//! put into a named store and matched later by exact method and URL.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored network response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// URL the response was fetched from.
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// RFC 3339 timestamp of the put.
    pub stored_at: String,
}

impl CachedResponse {
    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// url, status, headers_json, body, stored_at
type RawEntry = (String, u16, String, Vec<u8>, String);

fn row_to_response(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode(raw: RawEntry) -> Result<CachedResponse, Error> {
    let (url, status, headers_json, body, stored_at) = raw;
    let headers = serde_json::from_str(&headers_json)
        .map_err(|e| Error::InvalidInput(format!("corrupt cached headers for {url}: {e}")))?;
    Ok(CachedResponse { url, status, headers, body, stored_at })
}

impl CacheDb {
    /// Store a response under `(cache_name, method, url)`.
    ///
    /// Uses UPSERT semantics, so a second put for the same request replaces
    /// the first.
    pub async fn put(&self, cache_name: &str, method: &str, url: &str, response: &CachedResponse) -> Result<(), Error> {
        let cache_name = cache_name.to_string();
        let method = method.to_ascii_uppercase();
        let url = url.to_string();
        let key_hash = compute_cache_key(&method, &url);
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let response = response.clone();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_entries (cache_name, key_hash, method, url, status, headers_json, body, stored_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(cache_name, key_hash) DO UPDATE SET
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        cache_name,
                        key_hash,
                        method,
                        url,
                        response.status,
                        headers_json,
                        response.body,
                        response.stored_at
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Match a request in one named store.
    pub async fn match_in(&self, cache_name: &str, method: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        let cache_name = cache_name.to_string();
        let key_hash = compute_cache_key(method, url);
        let raw = self
            .conn
            .call(move |conn| -> Result<Option<RawEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status, headers_json, body, stored_at
                    FROM cache_entries WHERE cache_name = ?1 AND key_hash = ?2",
                )?;

                match stmt.query_row(params![cache_name, key_hash], row_to_response) {
                    Ok(raw) => Ok(Some(raw)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        raw.map(decode).transpose()
    }

    /// Match a request across every store, oldest store entry first.
    pub async fn match_any(&self, method: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        let key_hash = compute_cache_key(method, url);
        let raw = self
            .conn
            .call(move |conn| -> Result<Option<RawEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status, headers_json, body, stored_at
                    FROM cache_entries WHERE key_hash = ?1
                    ORDER BY rowid ASC LIMIT 1",
                )?;

                match stmt.query_row(params![key_hash], row_to_response) {
                    Ok(raw) => Ok(Some(raw)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        raw.map(decode).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(url: &str, body: &str) -> CachedResponse {
        CachedResponse {
            url: url.to_string(),
            status: 200,
            headers: vec![("Content-Type".to_string(), "text/html".to_string())],
            body: body.as_bytes().to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_put_and_match_in() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "http://localhost:8080/offline";
        db.put("offline-v1", "GET", url, &make_response(url, "offline"))
            .await
            .unwrap();

        let hit = db.match_in("offline-v1", "GET", url).await.unwrap().unwrap();
        assert_eq!(hit.text(), "offline");
        assert_eq!(hit.header("content-type"), Some("text/html"));

        assert!(db.match_in("offline-v2", "GET", url).await.unwrap().is_none());
        assert!(db.match_in("offline-v1", "POST", url).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_match_any_across_stores() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "http://localhost:8080/about";
        db.put("offline-v1", "GET", url, &make_response(url, "old"))
            .await
            .unwrap();
        db.put("offline-v2", "GET", url, &make_response(url, "new"))
            .await
            .unwrap();

        let hit = db.match_any("GET", url).await.unwrap().unwrap();
        assert_eq!(hit.text(), "old");
        assert!(db.match_any("GET", "http://localhost:8080/missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "http://localhost:8080/offline";
        db.put("offline-v1", "GET", url, &make_response(url, "first"))
            .await
            .unwrap();
        db.put("offline-v1", "GET", url, &make_response(url, "second"))
            .await
            .unwrap();

        let hit = db.match_in("offline-v1", "GET", url).await.unwrap().unwrap();
        assert_eq!(hit.text(), "second");

        let rows: i64 = db
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }
}
