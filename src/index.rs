//! Reverse index from class names and resource paths to the classpath
//! elements that contain them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::cache::ScanCache;
use crate::element::Element;
use crate::error::IndexResult;
use crate::policy::IgnorePolicy;
use crate::scan::{ScanResult, is_inner_class};

pub type Owners = BTreeSet<Element>;

/// One comparison scope. Elements are added one at a time; everything else
/// is read-only.
#[derive(Debug)]
pub struct ClasspathIndex {
    policy: IgnorePolicy,
    cache: ScanCache,
    elements: Vec<Element>,
    classes: BTreeMap<String, Owners>,
    resources: BTreeMap<String, Owners>,
}

impl ClasspathIndex {
    /// Creates an index backed by the process-wide scan cache.
    pub fn new(policy: IgnorePolicy) -> Self {
        Self::with_cache(policy, ScanCache::global())
    }

    pub fn with_cache(policy: IgnorePolicy, cache: ScanCache) -> Self {
        Self {
            policy,
            cache,
            elements: Vec::new(),
            classes: BTreeMap::new(),
            resources: BTreeMap::new(),
        }
    }

    /// Scans (or replays) `path` and folds its classes and resources into the
    /// index. On error nothing is recorded.
    pub fn add(&mut self, path: impl AsRef<Path>) -> IndexResult<Element> {
        let element = Element::resolve(path)?;
        let scanned = self.cache.get_or_scan(&element)?;
        self.replay(&element, &scanned);
        if !self.elements.contains(&element) {
            self.elements.push(element.clone());
        }
        Ok(element)
    }

    fn replay(&mut self, element: &Element, scanned: &ScanResult) {
        for class_name in scanned.classes() {
            self.index_class(class_name, element);
        }
        for resource in scanned.resources() {
            self.index_resource(resource, element);
        }
    }

    /// Returns `false` for inner classes, which are never indexed.
    pub fn index_class(&mut self, class_name: &str, element: &Element) -> bool {
        if is_inner_class(class_name) {
            return false;
        }
        insert_owner(&mut self.classes, class_name, element);
        true
    }

    /// Returns `false` for resources rejected by the ignore policy.
    pub fn index_resource(&mut self, path: &str, element: &Element) -> bool {
        if self.policy.is_ignored(path) {
            return false;
        }
        insert_owner(&mut self.resources, path, element);
        true
    }

    pub fn classes_of(&self, class_name: &str) -> Option<&Owners> {
        self.classes.get(class_name)
    }

    pub fn resources_of(&self, path: &str) -> Option<&Owners> {
        self.resources.get(path)
    }

    pub fn class_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.classes.keys().map(String::as_str)
    }

    pub fn resource_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.resources.keys().map(String::as_str)
    }

    pub fn duplicate_classes(&self) -> impl Iterator<Item = (&str, &Owners)> + '_ {
        duplicates(&self.classes)
    }

    pub fn duplicate_resources(&self) -> impl Iterator<Item = (&str, &Owners)> + '_ {
        duplicates(&self.resources)
    }

    /// Elements in the order they were first added.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn policy(&self) -> &IgnorePolicy {
        &self.policy
    }

    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }
}

fn insert_owner(map: &mut BTreeMap<String, Owners>, name: &str, element: &Element) {
    if let Some(owners) = map.get_mut(name) {
        owners.insert(element.clone());
    } else {
        map.insert(name.to_string(), BTreeSet::from([element.clone()]));
    }
}

fn duplicates(map: &BTreeMap<String, Owners>) -> impl Iterator<Item = (&str, &Owners)> + '_ {
    map.iter()
        .filter(|(_, owners)| owners.len() > 1)
        .map(|(name, owners)| (name.as_str(), owners))
}
