use ankiquiz_core::collection::{in_deck_tree, Collection};
use ankiquiz_core::{CoreError, Note};
use serde::Deserialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub mod paths;

/// Separator Anki uses between note fields and between deck name components.
const FIELD_SEP: char = '\x1f';

pub type DeckId = i64;
pub type NotetypeId = i64;

/// A local Anki collection opened read-only.
pub struct AnkiCollection {
    pool: SqlitePool,
    template: String,
    media_dir: PathBuf,
}

impl AnkiCollection {
    /// Locates the collection in Anki's data folder and opens it.
    pub async fn open_default(template: &str) -> Result<Self, CoreError> {
        let base = paths::anki_base_dir()?;
        Self::open_in(&base, template).await
    }

    /// Opens the first collection found under `base`.
    pub async fn open_in(base: &Path, template: &str) -> Result<Self, CoreError> {
        let file = paths::find_collection(base)?;
        Self::open_file(&file, template).await
    }

    pub async fn open_file(path: impl AsRef<Path>, template: &str) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CoreError::StoreNotFound);
        }
        let opts = SqliteConnectOptions::new().filename(path).read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| store_err("sqlite connect", e))?;

        // Anki keeps an exclusive lock while running; the first read surfaces it.
        sqlx::query("SELECT 1 FROM col LIMIT 1")
            .fetch_optional(&pool)
            .await
            .map_err(|e| store_err("read col", e))?;

        info!(path = %path.display(), template, "opened anki collection");
        Ok(Self {
            pool,
            template: template.to_string(),
            media_dir: paths::media_dir_for(path),
        })
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    async fn has_table(&self, name: &str) -> Result<bool, CoreError> {
        Ok(
            sqlx::query("SELECT 1 FROM sqlite_master WHERE type='table' AND name=? LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| store_err("read schema", e))?
                .is_some(),
        )
    }

    /// Deck id -> `A::B` style name.
    async fn decks(&self) -> Result<BTreeMap<DeckId, String>, CoreError> {
        let mut out = BTreeMap::new();
        if self.has_table("decks").await? {
            let rows = sqlx::query("SELECT id, name FROM decks")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| store_err("list decks", e))?;
            for row in rows {
                let id: i64 = row.try_get("id").map_err(|e| store_err("decode row", e))?;
                let name: String = row.try_get("name").map_err(|e| store_err("decode row", e))?;
                out.insert(id, name.replace(FIELD_SEP, "::"));
            }
        } else {
            for (id, name) in self.legacy_names("decks").await? {
                out.insert(id, name);
            }
        }
        Ok(out)
    }

    /// Ids of every note type whose name equals the template.
    async fn template_ids(&self) -> Result<Vec<NotetypeId>, CoreError> {
        let all: Vec<(NotetypeId, String)> = if self.has_table("notetypes").await? {
            let rows = sqlx::query("SELECT id, name FROM notetypes")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| store_err("list notetypes", e))?;
            let mut v = Vec::with_capacity(rows.len());
            for row in rows {
                v.push((
                    row.try_get("id").map_err(|e| store_err("decode row", e))?,
                    row.try_get("name").map_err(|e| store_err("decode row", e))?,
                ));
            }
            v
        } else {
            self.legacy_names("models").await?
        };
        Ok(all
            .into_iter()
            .filter(|(_, name)| name == &self.template)
            .map(|(id, _)| id)
            .collect())
    }

    /// Reads `{id: {"name": ..}}` JSON from the pre-2.1.28 `col` row.
    async fn legacy_names(&self, column: &str) -> Result<Vec<(i64, String)>, CoreError> {
        #[derive(Deserialize)]
        struct Named {
            name: String,
        }

        let sql = match column {
            "decks" => "SELECT decks AS j FROM col LIMIT 1",
            _ => "SELECT models AS j FROM col LIMIT 1",
        };
        let row = sqlx::query(sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_err("read col", e))?;
        let Some(row) = row else {
            return Ok(Vec::new());
        };
        let json: String = row.try_get("j").map_err(|e| store_err("decode row", e))?;
        let map: HashMap<String, Named> = serde_json::from_str(&json)
            .map_err(|e| CoreError::StoreOpen(format!("legacy {column}: {e}")))?;
        Ok(map
            .into_iter()
            .filter_map(|(id, n)| id.parse().ok().map(|id| (id, n.name)))
            .collect())
    }

    /// (card deck id, note) pairs for the template, in card creation order.
    async fn template_cards(&self) -> Result<Vec<(DeckId, Note)>, CoreError> {
        let mut out = Vec::new();
        for mid in self.template_ids().await? {
            let rows = sqlx::query(
                r#"SELECT c.id AS cid, c.did AS did, n.id AS nid, n.flds AS flds
                   FROM cards c JOIN notes n ON n.id = c.nid
                   WHERE n.mid = ? ORDER BY c.id ASC"#,
            )
            .bind(mid)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_err("list cards", e))?;
            for row in rows {
                let cid: i64 = row.try_get("cid").map_err(|e| store_err("decode row", e))?;
                let did: i64 = row.try_get("did").map_err(|e| store_err("decode row", e))?;
                let nid: i64 = row.try_get("nid").map_err(|e| store_err("decode row", e))?;
                let flds: String = row.try_get("flds").map_err(|e| store_err("decode row", e))?;
                out.push((cid, did, Note::new(nid, self.template.clone(), split_fields(&flds))));
            }
        }
        out.sort_by_key(|(cid, _, _)| *cid);
        Ok(out.into_iter().map(|(_, did, note)| (did, note)).collect())
    }
}

#[async_trait::async_trait]
impl Collection for AnkiCollection {
    fn template(&self) -> &str {
        &self.template
    }

    async fn deck_names(&self) -> Result<Vec<String>, CoreError> {
        let decks = self.decks().await?;
        let used: HashSet<&str> = self
            .template_cards()
            .await?
            .iter()
            .filter_map(|(did, _)| decks.get(did).map(String::as_str))
            .collect();

        let mut names: Vec<String> = decks
            .values()
            .filter(|name| used.iter().any(|u| in_deck_tree(u, name)))
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        debug!(count = names.len(), "supported decks");
        if names.is_empty() {
            return Err(CoreError::NoSupportedDecks(self.template.clone()));
        }
        Ok(names)
    }

    async fn deck_notes(&self, deck: &str) -> Result<Vec<Note>, CoreError> {
        let decks = self.decks().await?;
        if !decks.values().any(|d| d == deck) {
            return Err(CoreError::DeckNotFound(deck.to_string()));
        }
        let tree: HashSet<DeckId> = decks
            .iter()
            .filter(|(_, name)| in_deck_tree(name, deck))
            .map(|(id, _)| *id)
            .collect();

        let mut seen = HashSet::new();
        let notes: Vec<Note> = self
            .template_cards()
            .await?
            .into_iter()
            .filter(|(did, _)| tree.contains(did))
            .map(|(_, note)| note)
            .filter(|note| seen.insert(note.id))
            .collect();
        if notes.is_empty() {
            return Err(CoreError::DeckEmpty(deck.to_string()));
        }
        Ok(notes)
    }

    async fn media(&self, reference: &str) -> Option<Vec<u8>> {
        let dir = self.media_dir.clone();
        let reference = reference.to_string();
        let res = task::spawn_blocking(move || find_media(&dir, &reference)).await;
        match res {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "media lookup task failed");
                None
            }
        }
    }
}

fn split_fields(flds: &str) -> Vec<String> {
    flds.split(FIELD_SEP).map(str::to_string).collect()
}

fn store_err(what: &str, e: sqlx::Error) -> CoreError {
    CoreError::StoreOpen(format!("{what}: {e}"))
}

/// First file under `dir` whose name ends with `reference`.
fn find_media(dir: &Path, reference: &str) -> Option<Vec<u8>> {
    let path = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .find(|e| e.file_name().to_string_lossy().ends_with(reference))?
        .into_path();
    match std::fs::read(&path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read media file");
            None
        }
    }
}
