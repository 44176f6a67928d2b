use crate::tools::dedup::IndexSource;
use crate::types::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persisted corpus, partitioned by category. Written only after a run
/// has fully assembled its batch.
pub trait CorpusStore: IndexSource {
    /// Append every record; existing records are untouched.
    fn append(&self, category: &Category, records: &[ProductRecord]) -> Result<()>;
    /// Drop stored records sharing an external id with `records`, then append.
    fn replace(&self, category: &Category, records: &[ProductRecord]) -> Result<()>;
    fn records(&self, category: &Category) -> Result<Vec<ProductRecord>>;
    fn categories(&self) -> Result<Vec<Category>>;
}

/// Merge `incoming` into `existing` with replace-on-conflict semantics.
fn replace_on_conflict(existing: &mut Vec<ProductRecord>, incoming: &[ProductRecord]) {
    let replaced: HashSet<&ExternalId> = incoming
        .iter()
        .map(|r| &r.external_id)
        .filter(|id| !id.is_malformed())
        .collect();
    existing.retain(|r| !replaced.contains(&r.external_id));
    existing.extend(incoming.iter().cloned());
}

fn index_of(records: &[ProductRecord]) -> HashSet<String> {
    records
        .iter()
        .filter(|r| !r.external_id.is_malformed())
        .map(|r| r.external_id.as_str().to_string())
        .collect()
}

/* ===========================
LOCAL FILESYSTEM
=========================== */

pub struct LocalFsStore {
    root: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct CorpusDoc {
    category: Category,
    records: Vec<ProductRecord>,
}

impl LocalFsStore {
    pub fn new() -> Result<Self> {
        let proj = ProjectDirs::from("io", "harvest", "harvest").ok_or_else(|| {
            HarvestError::storage_error("initialization", "could not resolve data dir")
        })?;
        Self::at(proj.data_local_dir().join("corpus"))
    }

    pub fn at(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, c: &Category) -> Result<PathBuf> {
        if !c.is_canonical() {
            return Err(HarvestError::storage_error(
                "path",
                format!("category {:?} is not a canonical key", c.0),
            ));
        }
        Ok(self.root.join(format!("{}.json", c.0)))
    }

    fn read(&self, category: &Category) -> Result<Option<Vec<ProductRecord>>> {
        let p = self.path_for(category)?;
        if !p.exists() {
            return Ok(None);
        }
        let file = fs::File::open(&p)?;
        let doc: CorpusDoc = serde_json::from_reader(file)?;
        Ok(Some(doc.records))
    }

    /// Stored records ahead of a write. A corpus that no longer parses is
    /// moved aside to `<category>.json.corrupt` so the new batch still lands.
    fn read_for_write(&self, category: &Category) -> Result<Vec<ProductRecord>> {
        match self.read(category) {
            Ok(records) => Ok(records.unwrap_or_default()),
            Err(HarvestError::Json(e)) => {
                let p = self.path_for(category)?;
                let aside = p.with_extension("json.corrupt");
                tracing::warn!(%category, error = %e, aside = %aside.display(), "unreadable corpus moved aside");
                fs::rename(&p, &aside)?;
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Write through a temp file so a crash never leaves a half-written corpus.
    fn write(&self, category: &Category, records: Vec<ProductRecord>) -> Result<()> {
        let p = self.path_for(category)?;
        let tmp = p.with_extension("json.tmp");
        let doc = CorpusDoc {
            category: category.clone(),
            records,
        };
        let file = fs::File::create(&tmp)?;
        serde_json::to_writer_pretty(file, &doc)?;
        fs::rename(&tmp, &p)?;
        Ok(())
    }
}

impl IndexSource for LocalFsStore {
    fn load_index(&self, category: &Category) -> Result<HashSet<String>> {
        match self.read(category)? {
            Some(records) => Ok(index_of(&records)),
            None => Err(HarvestError::storage_error(
                "load_index",
                format!("no corpus for category {category}"),
            )),
        }
    }
}

impl CorpusStore for LocalFsStore {
    fn append(&self, category: &Category, records: &[ProductRecord]) -> Result<()> {
        let mut all = self.read_for_write(category)?;
        all.extend(records.iter().cloned());
        self.write(category, all)
    }

    fn replace(&self, category: &Category, records: &[ProductRecord]) -> Result<()> {
        let mut all = self.read_for_write(category)?;
        replace_on_conflict(&mut all, records);
        self.write(category, all)
    }

    fn records(&self, category: &Category) -> Result<Vec<ProductRecord>> {
        Ok(self.read(category)?.unwrap_or_default())
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let mut out = Vec::new();
        if !self.root.exists() {
            return Ok(out);
        }
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            out.push(Category(name.to_string()));
        }
        out.sort();
        Ok(out)
    }
}

/* ===========================
IN-MEMORY
=========================== */

#[derive(Default)]
pub struct MemoryStore {
    corpora: Mutex<HashMap<Category, Vec<ProductRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Category, Vec<ProductRecord>>>> {
        self.corpora
            .lock()
            .map_err(|_| HarvestError::storage_error("lock", "memory store poisoned"))
    }
}

impl IndexSource for MemoryStore {
    fn load_index(&self, category: &Category) -> Result<HashSet<String>> {
        let corpora = self.lock()?;
        let records = corpora.get(category).ok_or_else(|| {
            HarvestError::storage_error("load_index", format!("no corpus for category {category}"))
        })?;
        Ok(index_of(records))
    }
}

impl CorpusStore for MemoryStore {
    fn append(&self, category: &Category, records: &[ProductRecord]) -> Result<()> {
        self.lock()?
            .entry(category.clone())
            .or_default()
            .extend(records.iter().cloned());
        Ok(())
    }

    fn replace(&self, category: &Category, records: &[ProductRecord]) -> Result<()> {
        let mut corpora = self.lock()?;
        replace_on_conflict(corpora.entry(category.clone()).or_default(), records);
        Ok(())
    }

    fn records(&self, category: &Category) -> Result<Vec<ProductRecord>> {
        Ok(self.lock()?.get(category).cloned().unwrap_or_default())
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let mut out: Vec<Category> = self.lock()?.keys().cloned().collect();
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::dedup::load_dedup_index;

    fn record(token: &str, title: &str) -> ProductRecord {
        let fields = ProductFields {
            title: FieldValue::Found(title.into()),
            ..ProductFields::default()
        };
        ProductRecord::new(
            &format!("https://shop.example/dp/{token}"),
            ExternalId::Valid(token.into()),
            fields,
        )
    }

    fn temp_store() -> (LocalFsStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("harvest-store-{}", uuid::Uuid::new_v4()));
        (LocalFsStore::at(&dir).unwrap(), dir)
    }

    #[test]
    fn test_missing_corpus_is_an_error_that_dedup_absorbs() {
        let (store, dir) = temp_store();
        let cat = Category::from_raw("best seller");
        assert!(store.load_index(&cat).is_err());
        assert!(!load_dedup_index(&store, &cat).is_available());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_append_then_index() {
        let (store, dir) = temp_store();
        let cat = Category::from_raw("best seller");
        store.append(&cat, &[record("A000000001", "a")]).unwrap();
        store.append(&cat, &[record("B000000002", "b")]).unwrap();

        let index = store.load_index(&cat).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.contains("B000000002"));
        assert_eq!(store.records(&cat).unwrap().len(), 2);
        assert_eq!(store.categories().unwrap(), vec![cat]);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_replace_swaps_conflicting_records() {
        let (store, dir) = temp_store();
        let cat = Category::from_raw("most wished for");
        store
            .append(&cat, &[record("A000000001", "old"), record("B000000002", "keep")])
            .unwrap();
        store.replace(&cat, &[record("A000000001", "new")]).unwrap();

        let records = store.records(&cat).unwrap();
        assert_eq!(records.len(), 2);
        let a = records
            .iter()
            .find(|r| r.external_id.as_str() == "A000000001")
            .unwrap();
        assert_eq!(a.fields.title.as_deref(), Some("new"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_unreadable_corpus_is_moved_aside_on_write() {
        let (store, dir) = temp_store();
        let cat = Category::from_raw("best seller");
        fs::write(dir.join("best_seller.json"), "{ not json").unwrap();
        assert!(!load_dedup_index(&store, &cat).is_available());

        store.append(&cat, &[record("A000000001", "a")]).unwrap();
        assert_eq!(store.records(&cat).unwrap().len(), 1);
        assert_eq!(
            fs::read_to_string(dir.join("best_seller.json.corrupt")).unwrap(),
            "{ not json"
        );
        assert_eq!(store.categories().unwrap(), vec![cat]);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_non_canonical_category_never_reaches_the_filesystem() {
        let (store, dir) = temp_store();
        let escape = Category("../escape".into());
        assert!(matches!(
            store.append(&escape, &[record("A000000001", "a")]),
            Err(HarvestError::Storage { .. })
        ));
        assert!(!dir.parent().unwrap().join("escape.json").exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_memory_store_matches_fs_semantics() {
        let store = MemoryStore::new();
        let cat = Category::from_raw("best seller");
        assert!(store.load_index(&cat).is_err());

        store.append(&cat, &[record("A000000001", "old")]).unwrap();
        store.replace(&cat, &[record("A000000001", "new")]).unwrap();
        let records = store.records(&cat).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields.title.as_deref(), Some("new"));
    }

    #[test]
    fn test_malformed_ids_stay_out_of_the_index() {
        let store = MemoryStore::new();
        let cat = Category::from_raw("best seller");
        let mut bad = record("A000000001", "x");
        bad.external_id = ExternalId::Malformed;
        store.append(&cat, &[bad]).unwrap();
        assert!(store.load_index(&cat).unwrap().is_empty());
    }
}
