/// A source change reported by the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// sources of the named bundle or copy set changed
    Step(String),
    /// the watcher lost track (rescan), rebuild everything
    All,
}

#[derive(Debug, Default, Clone)]
pub struct ChangeSet(Vec<Change>);

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    /// true when the named step has to run again
    pub fn needs(&self, step: &str) -> bool {
        self.0.iter().any(|change| match change {
            Change::All => true,
            Change::Step(name) => name == step,
        })
    }

    pub fn add(&mut self, change: Change) -> bool {
        if !self.0.contains(&change) {
            self.0.push(change);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_not_added() {
        let mut set = ChangeSet::default();
        assert!(set.add(Change::Step("main.css".to_string())));
        assert!(!set.add(Change::Step("main.css".to_string())));
        assert!(set.needs("main.css"));
        assert!(!set.needs("view"));
    }

    #[test]
    fn all_needs_every_step() {
        let mut set = ChangeSet::default();
        set.add(Change::All);
        assert!(set.needs("view"));
        set.clear();
        assert!(set.is_empty());
        assert!(!set.needs("view"));
    }
}
