//! Tree walker: descends the dataset layouts and checks the files it finds.

use crate::archive::{validate_archive, validate_entries};
use crate::grammar::GrammarRegistry;
use crate::layout::{DatasetLayout, LeafKind, NodeRole};
use crate::name::{validate_name, NameContext, PathContext};
use crate::policy::ReferencePolicy;
use crate::report::{Violation, ViolationKind};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file found at the bottom of a dataset layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub path: PathBuf,
    pub dataset: u16,
    pub kind: LeafKind,
    /// Directory values on the way down.
    pub context: PathContext,
}

/// One result of leaf collection, in path order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkItem {
    Leaf(Leaf),
    /// A directory below the root that could not be listed, or whose name
    /// does not fit its level.
    Directory(Violation),
}

impl WalkItem {
    pub fn path(&self) -> &Path {
        match self {
            WalkItem::Leaf(leaf) => &leaf.path,
            WalkItem::Directory(violation) => violation.path.as_deref().unwrap_or(Path::new("")),
        }
    }
}

/// Leaves and directory violations found under a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    pub items: Vec<WalkItem>,
    /// True if collection stopped because `should_stop` returned true.
    pub interrupted: bool,
}

/// Walks every layout and checks every leaf, serially.
///
/// Missing dataset directories are skipped. The result is in path order and
/// contains every leaf, including those without violations.
pub fn walk(
    root: &Path,
    layouts: &[DatasetLayout],
    registry: &GrammarRegistry,
    policy: &ReferencePolicy,
) -> Vec<(PathBuf, Vec<Violation>)> {
    collect_leaves(root, layouts, || false)
        .items
        .into_iter()
        .map(|item| match item {
            WalkItem::Leaf(leaf) => {
                let violations = check_leaf(&leaf, registry, policy);
                (leaf.path, violations)
            }
            WalkItem::Directory(violation) => {
                (violation.path.clone().unwrap_or_default(), vec![violation])
            }
        })
        .collect()
}

/// Finds every leaf of every layout, sorted by path.
///
/// Layouts are walked together, so a directory they share (such as
/// `Tiles/N62/W162`) is listed once. `should_stop` is polled before each
/// directory; once it returns true the walk ends and what was found so far
/// is returned.
pub fn collect_leaves<F>(root: &Path, layouts: &[DatasetLayout], should_stop: F) -> Collected
where
    F: Fn() -> bool,
{
    let mut walker = Walker {
        items: Vec::new(),
        interrupted: false,
        should_stop: &should_stop,
    };

    let all: Vec<&DatasetLayout> = layouts.iter().collect();
    walker.descend(root, &all, 0, PathContext::default());

    let mut items = walker.items;
    items.sort_by(|a, b| a.path().cmp(b.path()));

    Collected {
        items,
        interrupted: walker.interrupted,
    }
}

struct Walker<'a> {
    items: Vec<WalkItem>,
    interrupted: bool,
    should_stop: &'a dyn Fn() -> bool,
}

impl Walker<'_> {
    /// Descends `dir` for every layout that reached it with the same
    /// directory values above.
    fn descend(&mut self, dir: &Path, layouts: &[&DatasetLayout], depth: usize, context: PathContext) {
        if self.interrupted || (self.should_stop)() {
            self.interrupted = true;
            return;
        }

        let mut fixed: BTreeMap<&'static str, Vec<&DatasetLayout>> = BTreeMap::new();
        let mut named: Vec<(NodeRole, Vec<&DatasetLayout>)> = Vec::new();
        for &layout in layouts {
            match layout.levels.get(depth) {
                None => self.collect_files(dir, layout, &context),
                Some(NodeRole::Fixed(name)) => fixed.entry(*name).or_default().push(layout),
                Some(role) => match named.iter_mut().find(|(r, _)| r == role) {
                    Some((_, group)) => group.push(layout),
                    None => named.push((*role, vec![layout])),
                },
            }
        }

        for (name, group) in &fixed {
            let next = dir.join(name);
            if next.is_dir() {
                self.descend(&next, group, depth + 1, context.clone());
            } else {
                tracing::debug!(
                    path = %next.display(),
                    layouts = group.len(),
                    "directory not present, skipping"
                );
            }
            if self.interrupted {
                return;
            }
        }

        if named.is_empty() {
            return;
        }
        for entry in self.list(dir) {
            if !entry.file_type().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                self.reject(
                    entry.path(),
                    format!("Invalid directory name: {}", entry.file_name().to_string_lossy()),
                );
                continue;
            };

            for (role, group) in &named {
                if !role.accepts(name) {
                    self.reject(
                        entry.path(),
                        format!("Invalid {} directory: {}", role.describe(), name),
                    );
                    continue;
                }
                let next = with_value(&context, *role, name);
                self.descend(entry.path(), group, depth + 1, next);
                if self.interrupted {
                    return;
                }
            }
        }
    }

    fn collect_files(&mut self, dir: &Path, layout: &DatasetLayout, context: &PathContext) {
        for entry in self.list(dir) {
            if !entry.file_type().is_file() {
                continue;
            }
            self.items.push(WalkItem::Leaf(Leaf {
                path: entry.into_path(),
                dataset: layout.dataset,
                kind: layout.leaf,
                context: context.clone(),
            }));
        }
    }

    fn reject(&mut self, path: &Path, message: String) {
        tracing::debug!(path = %path.display(), %message, "misnamed directory");
        self.items.push(WalkItem::Directory(
            Violation::new(ViolationKind::Format, message).with_path(path),
        ));
    }

    /// Lists a directory one level deep in file-name order. A listing
    /// failure is recorded as a violation on the directory.
    fn list(&mut self, dir: &Path) -> Vec<walkdir::DirEntry> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    tracing::debug!(path = %path.display(), error = %err, "directory listing failed");
                    self.items.push(WalkItem::Directory(
                        Violation::new(
                            ViolationKind::Format,
                            format!("Unable to read directory ({})", err),
                        )
                        .with_path(path),
                    ));
                }
            }
        }
        entries
    }
}

/// Copies `context` with the value of one more directory level.
fn with_value(context: &PathContext, role: NodeRole, name: &str) -> PathContext {
    let mut next = context.clone();
    let value = Some(name.to_string());
    match role {
        NodeRole::Latitude => next.latitude = value,
        NodeRole::Longitude => next.longitude = value,
        NodeRole::Lod => next.lod = value,
        NodeRole::Uref => next.uref = value,
        NodeRole::Category => next.category = value,
        NodeRole::Subcategory => next.subcategory = value,
        NodeRole::FeatureType => next.feature_type = value,
        NodeRole::Fixed(_) => {}
    }
    next
}

/// Checks one leaf: its name, and for archives the container and entries.
///
/// Entries are only tied to the archive's stem when the archive name itself
/// matched its grammar; a misnamed archive is reported once, not once per
/// entry.
pub fn check_leaf(leaf: &Leaf, registry: &GrammarRegistry, policy: &ReferencePolicy) -> Vec<Violation> {
    let Some(grammar) = registry.grammar_for(leaf.dataset) else {
        return vec![Violation::new(
            ViolationKind::Format,
            format!("No filename grammar for dataset {:03}", leaf.dataset),
        )
        .with_path(&leaf.path)];
    };

    let name = leaf
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ctx = NameContext::file().with_path(&leaf.context);
    let mut violations = validate_name(&name, grammar, policy, &ctx);

    if leaf.kind == LeafKind::Archive {
        violations.extend(validate_archive(&leaf.path));
        if let Some(entry_grammar) = registry.entry_grammar_for(leaf.dataset) {
            let stem = leaf
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let anchored = grammar.matches(&name);
            violations.extend(validate_entries(
                &leaf.path,
                entry_grammar,
                policy,
                anchored.then_some(stem.as_str()),
            ));
        }
    }

    violations
        .into_iter()
        .map(|v| v.with_path(&leaf.path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::standard_layouts;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_missing_datasets_are_skipped() {
        let dir = TempDir::new().unwrap();
        let collected = collect_leaves(dir.path(), &standard_layouts(), || false);
        assert!(collected.items.is_empty());
        assert!(!collected.interrupted);
    }

    #[test]
    fn test_collects_gt_model_leaves_with_context() {
        let dir = TempDir::new().unwrap();
        let file = touch(
            dir.path(),
            "GTModel/500_GTModelGeometry/A_Culture/L_Misc_Feature/015_Building/D500_S001_T001_AL015_004_Castle.flt",
        );

        let collected = collect_leaves(dir.path(), &standard_layouts(), || false);
        assert_eq!(collected.items.len(), 1);
        let WalkItem::Leaf(leaf) = &collected.items[0] else {
            panic!("expected a leaf");
        };
        assert_eq!(leaf.path, file);
        assert_eq!(leaf.dataset, 500);
        assert_eq!(leaf.context.category.as_deref(), Some("A_Culture"));
        assert_eq!(leaf.context.feature_type.as_deref(), Some("015_Building"));

        let results = walk(
            dir.path(),
            &standard_layouts(),
            GrammarRegistry::standard(),
            &ReferencePolicy::builtin(),
        );
        assert_eq!(results, vec![(file, Vec::new())]);
    }

    fn directory_messages(collected: &Collected) -> Vec<(String, String)> {
        collected
            .items
            .iter()
            .filter_map(|item| match item {
                WalkItem::Directory(v) => Some((
                    v.path.as_ref().unwrap().file_name().unwrap().to_string_lossy().into_owned(),
                    v.message.clone(),
                )),
                WalkItem::Leaf(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_misnamed_directories_are_reported() {
        let dir = TempDir::new().unwrap();
        touch(
            dir.path(),
            "Tiles/N62/W162/306_GSModelInteriorTexture/notes/U38/x.zip",
        );
        touch(dir.path(), "Tiles/metadata/W162/x.zip");
        touch(dir.path(), "Tiles/N62/W162/001_Elevation/LC/U0/x.tif");

        let collected = collect_leaves(dir.path(), &standard_layouts(), || false);
        assert_eq!(
            directory_messages(&collected),
            vec![
                ("notes".to_string(), "Invalid LOD directory: notes".to_string()),
                ("metadata".to_string(), "Invalid latitude directory: metadata".to_string()),
            ]
        );
        assert!(collected
            .items
            .iter()
            .all(|item| matches!(item, WalkItem::Directory(v) if v.kind == ViolationKind::Format)));
    }

    #[test]
    fn test_misnamed_directory_is_reported_once() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Tiles/n62/W162/300_GSModelGeometry/L07/U38/a.zip");

        let collected = collect_leaves(dir.path(), &standard_layouts(), || false);
        assert_eq!(
            directory_messages(&collected),
            vec![("n62".to_string(), "Invalid latitude directory: n62".to_string())]
        );
    }

    #[test]
    fn test_shared_directories_are_visited_once() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Tiles/N62/W162/300_GSModelGeometry/L07/U1/a.zip");

        let visits = Cell::new(0);
        let collected = collect_leaves(dir.path(), &standard_layouts(), || {
            visits.set(visits.get() + 1);
            false
        });
        assert_eq!(collected.items.len(), 1);
        // root, Tiles, N62, W162, 300_GSModelGeometry, L07, U1
        assert_eq!(visits.get(), 7);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_directory_is_reported() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let tiles = dir.path().join("Tiles");
        fs::create_dir_all(tiles.join(OsStr::from_bytes(b"N6\xff"))).unwrap();

        let collected = collect_leaves(dir.path(), &standard_layouts(), || false);
        assert_eq!(
            directory_messages(&collected),
            vec![(
                "N6\u{FFFD}".to_string(),
                "Invalid directory name: N6\u{FFFD}".to_string()
            )]
        );
    }

    #[test]
    fn test_leaves_are_in_path_order() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Tiles/N63/W162/300_GSModelGeometry/L07/U1/b.zip");
        touch(dir.path(), "Tiles/N62/W162/301_GSModelTexture/L07/U1/a.zip");
        touch(dir.path(), "Tiles/N62/W162/300_GSModelGeometry/L07/U1/c.zip");

        let collected = collect_leaves(dir.path(), &standard_layouts(), || false);
        let paths: Vec<_> = collected.items.iter().map(|i| i.path().to_path_buf()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn test_stop_interrupts_collection() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Tiles/N62/W162/300_GSModelGeometry/L07/U1/a.zip");

        let calls = Cell::new(0);
        let collected = collect_leaves(dir.path(), &standard_layouts(), || {
            calls.set(calls.get() + 1);
            calls.get() > 2
        });
        assert!(collected.interrupted);
        assert!(collected.items.is_empty());
    }

    #[test]
    fn test_check_leaf_sets_path() {
        let dir = TempDir::new().unwrap();
        let path = touch(
            dir.path(),
            "GTModel/500_GTModelGeometry/A_Culture/L_Misc_Feature/015_Building/D500_S001_T001_AL015_4_Castle.flt",
        );
        let leaf = Leaf {
            path: path.clone(),
            dataset: 500,
            kind: LeafKind::File,
            context: PathContext::default(),
        };
        let violations = check_leaf(&leaf, GrammarRegistry::standard(), &ReferencePolicy::builtin());
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.path.as_deref() == Some(path.as_path())));
    }
}
