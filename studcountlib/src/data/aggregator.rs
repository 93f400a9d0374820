//! Memoized bottom-up stud aggregation over the sub-file graph.
//!
//! Primitives such as `stud.dat` are referenced by nearly every part, so each
//! resolved file is computed once and its counts are kept in a
//! [`ProcessedCache`] shared by every later lookup. Without the cache the
//! traversal cost grows exponentially with nesting depth.
//!
//! The LDraw reference graph is acyclic. No cycle detection is performed; a
//! cyclic library would recurse until the stack is exhausted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::trace;

use crate::error::StudError;
use crate::source::resolver::FileResolver;
use crate::Result;

use super::document::LdrawDocument;
use super::file_type::file_type_for_name;
use super::stats::StudCounts;

/// Computed counts per resolved file.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ProcessedCache {
    entries: HashMap<PathBuf, StudCounts>,
}

impl ProcessedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, location: &Path) -> Option<StudCounts> {
        self.entries.get(location).copied()
    }

    pub fn insert(&mut self, location: &Path, counts: StudCounts) {
        self.entries.insert(location.to_path_buf(), counts);
    }

    pub fn contains(&self, location: &Path) -> bool {
        self.entries.contains_key(location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &StudCounts)> {
        self.entries.iter().map(|(k, v)| (k.as_path(), v))
    }
}

/// How often each location was handed to the aggregator, cache hits included.
///
/// Diagnostic only.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct VisitCounter {
    visits: HashMap<PathBuf, u32>,
}

impl VisitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, location: &Path) {
        *self.visits.entry(location.to_path_buf()).or_insert(0) += 1;
    }

    /// Visits of `location` (0 if never visited).
    pub fn get(&self, location: &Path) -> u32 {
        self.visits.get(location).copied().unwrap_or(0)
    }

    /// Number of distinct locations visited.
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Sum of all visits.
    pub fn total(&self) -> u64 {
        self.visits.values().map(|&v| u64::from(v)).sum()
    }

    /// Locations sorted by descending visit count.
    pub fn most_visited(&self, limit: usize) -> Vec<(&Path, u32)> {
        let mut entries: Vec<(&Path, u32)> =
            self.visits.iter().map(|(k, &v)| (k.as_path(), v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }
}

/// Compute the stud counts of the file at `location`.
///
/// Recognized stud primitives are leaves and are never opened. Every other
/// file is read and its sub-file counts summed. A reference the resolver
/// does not know fails with [`StudError::SubfileMissing`] carrying the chain
/// of files from `location` down to the one holding the reference.
pub fn aggregate(
    location: &Path,
    resolver: &FileResolver,
    cache: &mut ProcessedCache,
    mut visits: Option<&mut VisitCounter>,
) -> Result<StudCounts> {
    if let Some(counter) = visits.as_deref_mut() {
        counter.record(location);
    }

    if let Some(counts) = cache.get(location) {
        return Ok(counts);
    }

    let name = location
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    if let Some(counts) = StudCounts::for_tag(file_type_for_name(&name)) {
        cache.insert(location, counts);
        return Ok(counts);
    }

    let document = LdrawDocument::read(location)?;
    let mut total = StudCounts::new();

    for key in document.sub_files() {
        let sub_location = resolver
            .get(key)
            .ok_or_else(|| StudError::SubfileMissing {
                chain: vec![location.to_path_buf()],
                missing: key.clone(),
            })?;

        total += aggregate(sub_location, resolver, cache, visits.as_deref_mut())
            .map_err(|e| e.within(location))?;
    }

    trace!(file = %location.display(), ?total, "Aggregated file");
    cache.insert(location, total);
    Ok(total)
}

/// Aggregation state bundled with the resolver it reads from.
///
/// Keeps one cache (and optionally one visit counter) alive across many
/// top-level files.
#[derive(Debug)]
pub struct Aggregator<'r> {
    resolver: &'r FileResolver,
    cache: ProcessedCache,
    visits: Option<VisitCounter>,
}

impl<'r> Aggregator<'r> {
    pub fn new(resolver: &'r FileResolver) -> Self {
        Self {
            resolver,
            cache: ProcessedCache::new(),
            visits: None,
        }
    }

    /// Also count visits per location.
    pub fn with_visit_tracking(mut self) -> Self {
        self.visits = Some(VisitCounter::new());
        self
    }

    pub fn aggregate(&mut self, location: &Path) -> Result<StudCounts> {
        aggregate(location, self.resolver, &mut self.cache, self.visits.as_mut())
    }

    pub fn cache(&self) -> &ProcessedCache {
        &self.cache
    }

    pub fn visits(&self) -> Option<&VisitCounter> {
        self.visits.as_ref()
    }

    pub fn into_parts(self) -> (ProcessedCache, Option<VisitCounter>) {
        (self.cache, self.visits)
    }
}

/// Counts for a single file with a fresh cache.
pub fn count_part(location: impl AsRef<Path>, resolver: &FileResolver) -> Result<StudCounts> {
    Aggregator::new(resolver).aggregate(location.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::resolver::SearchRoot;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn write(root: &Path, rel: &str, lines: &[&str]) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, lines.join("\n")).unwrap();
    }

    fn sub(name: &str) -> String {
        format!("1 16 0 0 0 1 0 0 0 1 0 0 0 1 {name}")
    }

    struct Library {
        _temp: TempDir,
        parts: PathBuf,
        prims: PathBuf,
        resolver: FileResolver,
    }

    /// Small library: 3024 (1x1 plate), 3070b (1x1 tile), a 2x2 brick with
    /// an underside ring, and a part with a dangling reference.
    fn library() -> Library {
        let temp = tempdir().unwrap();
        let parts = temp.path().join("parts");
        let prims = temp.path().join("p");

        write(&prims, "stud.dat", &["0 Stud", &sub("4-4cyli.dat")]);
        write(&prims, "stud4.dat", &["0 Stud Tube Open", &sub("4-4cyli.dat")]);
        write(&prims, "stud4s.dat", &["0 Stud Tube Sloped"]);
        write(&prims, "4-4cyli.dat", &["0 Cylinder 1.0", "4 16 1 0 0 1 1 0 0 1 0 0 1 0"]);
        write(&prims, "box5.dat", &["0 Box with 5 Faces", "4 16 1 1 1 -1 1 1 -1 1 -1"]);
        write(&prims, "box4.dat", &["0 Box with 4 Faces"]);

        write(&parts, "3024.dat", &["0 Plate  1 x  1", &sub("box5.dat"), &sub("stud.dat")]);
        write(
            &parts,
            "s/3070bs01.dat",
            &["0 ~Tile  1 x  1", &sub("box4.dat"), &sub("box4.dat"), &sub("box5.dat")],
        );
        write(&parts, "3070b.dat", &["0 Tile  1 x  1 with Groove", &sub("s\\3070bs01.dat")]);
        write(
            &parts,
            "s/3003s01.dat",
            &[&sub("stud.dat"), &sub("STUD.DAT"), &sub("stud.dat"), &sub("stud.dat")],
        );
        write(
            &parts,
            "3003.dat",
            &["0 Brick  2 x  2", &sub("S\\3003s01.dat"), &sub("stud4.dat"), &sub("stud4s.dat")],
        );
        write(
            &parts,
            "broken.dat",
            &["0 Broken", &sub("s\\3003s01.dat"), &sub("s\\nothere.dat")],
        );
        write(&parts, "wrapper.dat", &["0 Wrapper", &sub("3024.dat"), &sub("broken.dat")]);

        let resolver =
            FileResolver::new(&[SearchRoot::official(&parts), SearchRoot::official(&prims)])
                .unwrap();

        Library {
            _temp: temp,
            parts,
            prims,
            resolver,
        }
    }

    #[test]
    fn test_leaf_primitive() {
        let lib = library();
        let counts = count_part(lib.prims.join("stud.dat"), &lib.resolver).unwrap();
        assert_eq!(counts, StudCounts::with_counts(1, 0, 0));
    }

    #[test]
    fn test_leaf_is_not_expanded() {
        let lib = library();
        let mut cache = ProcessedCache::new();
        aggregate(&lib.prims.join("stud.dat"), &lib.resolver, &mut cache, None).unwrap();

        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(&lib.prims.join("4-4cyli.dat")));
    }

    #[test]
    fn test_part_without_studs() {
        let lib = library();
        let counts = count_part(lib.parts.join("3070b.dat"), &lib.resolver).unwrap();
        assert_eq!(counts, StudCounts::new());
    }

    #[test]
    fn test_composite_counts() {
        let lib = library();
        let counts = count_part(lib.parts.join("3003.dat"), &lib.resolver).unwrap();
        assert_eq!(counts, StudCounts::with_counts(4, 0, 1));
    }

    #[test]
    fn test_sloped_ring_contributes_nothing() {
        let lib = library();
        let counts = count_part(lib.prims.join("stud4s.dat"), &lib.resolver).unwrap();
        assert!(counts.is_zero());
    }

    #[test]
    fn test_cache_entries() {
        let lib = library();
        let mut cache = ProcessedCache::new();
        aggregate(&lib.parts.join("3024.dat"), &lib.resolver, &mut cache, None).unwrap();

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&lib.parts.join("3024.dat")).unwrap().top_studs, 1);
        assert_eq!(cache.get(&lib.prims.join("box5.dat")).unwrap().top_studs, 0);
        assert_eq!(cache.get(&lib.prims.join("stud.dat")).unwrap().top_studs, 1);
    }

    #[test]
    fn test_cache_iter_and_serialize() {
        let lib = library();
        let mut cache = ProcessedCache::new();
        aggregate(&lib.parts.join("3003.dat"), &lib.resolver, &mut cache, None).unwrap();

        let total: StudCounts = cache
            .iter()
            .filter(|(location, _)| location.starts_with(&lib.prims))
            .map(|(_, counts)| *counts)
            .sum();
        // stud, stud4 and the unexpanded stud4s
        assert_eq!(total, StudCounts::with_counts(1, 0, 1));

        let json = serde_json::to_value(&cache).unwrap();
        let entries = json.as_object().unwrap();
        assert_eq!(entries.len(), cache.len());
        let key = lib.parts.join("3003.dat").to_string_lossy().to_string();
        assert_eq!(entries[&key]["top_studs"], 4);
        assert_eq!(entries[&key]["stud_rings"], 1);
    }

    #[test]
    fn test_deep_fan_out_saturates() {
        let lib = library();
        // each level references the one below 16 times: 16^8 studs at level 7
        for level in 0..8 {
            let below = match level {
                0 => "stud.dat".to_string(),
                n => format!("s\\level{}.dat", n - 1),
            };
            let line = sub(&below);
            write(&lib.parts, &format!("s/level{level}.dat"), &[line.as_str(); 16]);
        }
        let roots = [SearchRoot::official(&lib.parts), SearchRoot::official(&lib.prims)];
        let resolver = FileResolver::new(&roots).unwrap();

        let counts = count_part(lib.parts.join("s/level7.dat"), &resolver).unwrap();
        assert_eq!(counts, StudCounts::with_counts(u32::MAX, 0, 0));
    }

    #[test]
    fn test_warm_cache_matches_cold() {
        let lib = library();
        let cold = count_part(lib.parts.join("3003.dat"), &lib.resolver).unwrap();

        let mut cache = ProcessedCache::new();
        let subpart = lib.parts.join("s/3003s01.dat");
        aggregate(&subpart, &lib.resolver, &mut cache, None).unwrap();
        aggregate(&lib.prims.join("stud4.dat"), &lib.resolver, &mut cache, None).unwrap();
        let warm =
            aggregate(&lib.parts.join("3003.dat"), &lib.resolver, &mut cache, None).unwrap();

        assert_eq!(cold, warm);
    }

    #[test]
    fn test_sum_of_direct_references() {
        let lib = library();
        let mut cache = ProcessedCache::new();
        let location = lib.parts.join("3003.dat");
        let total = aggregate(&location, &lib.resolver, &mut cache, None).unwrap();

        let doc = LdrawDocument::read(&location).unwrap();
        let summed: StudCounts = doc
            .sub_files()
            .map(|k| {
                let sub = lib.resolver.resolve(k).unwrap();
                aggregate(sub, &lib.resolver, &mut cache, None).unwrap()
            })
            .sum();

        assert_eq!(total, summed);
    }

    #[test]
    fn test_visit_counter() {
        let lib = library();
        let mut cache = ProcessedCache::new();
        let mut visits = VisitCounter::new();
        let part = lib.parts.join("3024.dat");

        aggregate(&part, &lib.resolver, &mut cache, Some(&mut visits)).unwrap();
        assert_eq!(visits.len(), 3);
        assert_eq!(visits.get(&part), 1);
        assert_eq!(visits.get(&lib.prims.join("box5.dat")), 1);
        assert_eq!(visits.get(&lib.prims.join("stud.dat")), 1);

        let before = cache.get(&part);
        aggregate(&part, &lib.resolver, &mut cache, Some(&mut visits)).unwrap();
        assert_eq!(visits.len(), 3);
        assert_eq!(visits.get(&part), 2);
        assert_eq!(visits.get(&lib.prims.join("box5.dat")), 1);
        assert_eq!(visits.get(&lib.prims.join("stud.dat")), 1);
        assert_eq!(cache.get(&part), before);
    }

    #[test]
    fn test_visits_count_cache_hits() {
        let lib = library();
        let mut aggregator = Aggregator::new(&lib.resolver).with_visit_tracking();
        aggregator.aggregate(&lib.parts.join("3003.dat")).unwrap();

        let visits = aggregator.visits().unwrap();
        assert_eq!(visits.get(&lib.prims.join("stud.dat")), 4);
        assert_eq!(visits.most_visited(1)[0].0, lib.prims.join("stud.dat"));
        assert_eq!(
            aggregator.cache().get(&lib.prims.join("stud.dat")),
            Some(StudCounts::with_counts(1, 0, 0))
        );
    }

    #[test]
    fn test_missing_subfile_chain() {
        let lib = library();
        let err = count_part(lib.parts.join("wrapper.dat"), &lib.resolver).unwrap_err();

        match &err {
            StudError::SubfileMissing { chain, missing } => {
                assert_eq!(missing.as_str(), "s/nothere.dat");
                assert_eq!(
                    chain,
                    &vec![lib.parts.join("wrapper.dat"), lib.parts.join("broken.dat")]
                );
            }
            other => panic!("Expected SubfileMissing, got {:?}", other),
        }
        assert!(err.to_string().contains("wrapper.dat"));
    }

    #[test]
    fn test_missing_subfile_does_not_poison_cache() {
        let lib = library();
        let mut aggregator = Aggregator::new(&lib.resolver);

        assert!(aggregator.aggregate(&lib.parts.join("broken.dat")).is_err());
        assert!(!aggregator.cache().contains(&lib.parts.join("broken.dat")));

        let counts = aggregator.aggregate(&lib.parts.join("3003.dat")).unwrap();
        assert_eq!(counts, StudCounts::with_counts(4, 0, 1));
    }
}
