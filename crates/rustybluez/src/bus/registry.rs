//! Path-keyed table of live signal subscriptions
//!
//! Both the notification table (characteristic path → value callback) and the
//! disconnect-watch table (device path → disconnect callback) are a
//! [`Registry`]. Each path owns at most one entry; an id index maps delivered
//! signals back to the path that owns them.

use super::SubscriptionId;
use std::collections::{BTreeMap, HashMap};

/// One live subscription and the handler attached to it
pub struct Entry<H> {
    pub subscription: SubscriptionId,
    pub handler: H,
}

/// Arena of subscription handles indexed by object path
pub struct Registry<H> {
    entries: BTreeMap<String, Entry<H>>,
    paths: HashMap<SubscriptionId, String>,
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Registry<H> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            paths: HashMap::new(),
        }
    }

    /// Store an entry for `path`, returning the one it replaced
    pub fn insert(
        &mut self,
        path: &str,
        subscription: SubscriptionId,
        handler: H,
    ) -> Option<Entry<H>> {
        let previous = self.remove(path);
        self.paths.insert(subscription, path.to_string());
        self.entries.insert(
            path.to_string(),
            Entry {
                subscription,
                handler,
            },
        );
        previous
    }

    /// Take the entry for `path` out of the table
    pub fn remove(&mut self, path: &str) -> Option<Entry<H>> {
        let entry = self.entries.remove(path)?;
        self.paths.remove(&entry.subscription);
        Some(entry)
    }

    /// Take every entry whose path satisfies `predicate`
    pub fn remove_where<F>(&mut self, predicate: F) -> Vec<(String, Entry<H>)>
    where
        F: Fn(&str) -> bool,
    {
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|path| predicate(path))
            .cloned()
            .collect();

        doomed
            .into_iter()
            .filter_map(|path| self.remove(&path).map(|entry| (path, entry)))
            .collect()
    }

    /// Path owning `subscription`, if it is still live
    pub fn path_of(&self, subscription: SubscriptionId) -> Option<&str> {
        self.paths.get(&subscription).map(String::as_str)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Entry<H>> {
        self.entries.get_mut(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empty the table, handing back every entry
    pub fn drain(&mut self) -> Vec<(String, Entry<H>)> {
        self.paths.clear();
        std::mem::take(&mut self.entries).into_iter().collect()
    }
}
