//! Groups duplicates by the exact set of elements that share them.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::cache::CacheStats;
use crate::index::{ClasspathIndex, Owners};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictGroup {
    pub elements: Vec<String>,
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DuplicateReport {
    pub elements_scanned: usize,
    pub duplicate_classes: usize,
    pub duplicate_resources: usize,
    pub classes: Vec<ConflictGroup>,
    pub resources: Vec<ConflictGroup>,
    pub cache: CacheStats,
    pub duration_ms: u64,
}

impl DuplicateReport {
    pub fn from_index(index: &ClasspathIndex, duration_ms: u64) -> Self {
        let classes = group_conflicts(index.duplicate_classes());
        let resources = group_conflicts(index.duplicate_resources());
        Self {
            elements_scanned: index.elements().len(),
            duplicate_classes: classes.iter().map(|g| g.names.len()).sum(),
            duplicate_resources: resources.iter().map(|g| g.names.len()).sum(),
            classes,
            resources,
            cache: index.cache().stats(),
            duration_ms,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.classes.is_empty() && self.resources.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        write_groups(&mut out, "classes", &self.classes);
        write_groups(&mut out, "resources", &self.resources);
        if self.is_clean() {
            let _ = writeln!(
                out,
                "No duplicates found in {} elements",
                self.elements_scanned
            );
        }
        out
    }
}

pub fn group_conflicts<'a>(
    duplicates: impl Iterator<Item = (&'a str, &'a Owners)>,
) -> Vec<ConflictGroup> {
    let mut grouped: BTreeMap<Vec<String>, Vec<String>> = BTreeMap::new();
    for (name, owners) in duplicates {
        let key = owners.iter().map(|e| e.display_name()).collect();
        grouped.entry(key).or_default().push(name.to_string());
    }
    grouped
        .into_iter()
        .map(|(elements, names)| ConflictGroup { elements, names })
        .collect()
}

fn write_groups(out: &mut String, kind: &str, groups: &[ConflictGroup]) {
    for group in groups {
        let _ = writeln!(
            out,
            "Found duplicate {kind} in [{}] :",
            group.elements.join(", ")
        );
        for name in &group.names {
            let _ = writeln!(out, "  {name}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ScanCache;
    use crate::policy::IgnorePolicy;
    use std::path::Path;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn groups_names_by_owner_set() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let c = tempfile::tempdir().unwrap();
        for dir in [&a, &b] {
            touch(&dir.path().join("p/One.class"));
            touch(&dir.path().join("p/Two.class"));
        }
        touch(&c.path().join("p/Two.class"));
        touch(&c.path().join("q/Three.class"));

        let mut index = ClasspathIndex::with_cache(IgnorePolicy::default(), ScanCache::new());
        for dir in [&a, &b, &c] {
            index.add(dir.path()).unwrap();
        }

        let report = DuplicateReport::from_index(&index, 0);
        assert_eq!(report.elements_scanned, 3);
        assert_eq!(report.duplicate_classes, 2);
        assert_eq!(report.classes.len(), 2);
        let names: Vec<&Vec<String>> = report.classes.iter().map(|g| &g.names).collect();
        assert!(names.contains(&&vec!["p.One".to_string()]));
        assert!(names.contains(&&vec!["p.Two".to_string()]));
        let two = report
            .classes
            .iter()
            .find(|g| g.names == ["p.Two"])
            .unwrap();
        assert_eq!(two.elements.len(), 3);
        assert!(report.resources.is_empty());
    }

    #[test]
    fn text_rendering_follows_warning_layout() {
        let report = DuplicateReport {
            elements_scanned: 2,
            duplicate_classes: 1,
            duplicate_resources: 0,
            classes: vec![ConflictGroup {
                elements: vec!["/lib/a.jar".to_string(), "/lib/b.jar".to_string()],
                names: vec!["com.acme.Foo".to_string()],
            }],
            resources: Vec::new(),
            cache: ScanCache::new().stats(),
            duration_ms: 0,
        };
        assert_eq!(
            report.render_text(),
            "Found duplicate classes in [/lib/a.jar, /lib/b.jar] :\n  com.acme.Foo\n"
        );
    }

    #[test]
    fn clean_report_says_so() {
        let index = ClasspathIndex::with_cache(IgnorePolicy::default(), ScanCache::new());
        let report = DuplicateReport::from_index(&index, 0);
        assert!(report.is_clean());
        assert_eq!(report.render_text(), "No duplicates found in 0 elements\n");
    }
}
