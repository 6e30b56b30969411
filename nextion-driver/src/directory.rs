//! Component directory
//!
//! Holds the components announced by the display's discovery transcript and
//! two indices over them: by name and by packed `(page << 8) | id` key.
//!
//! Each rebuild is a new *generation*. Components are addressed through
//! [`ComponentHandle`]s that carry the generation they were issued in, so a
//! handle kept across a rebuild resolves to nothing instead of a different
//! component.
//!
//! Rebuilds are staged: rows accumulate in a separate [`Directory`] owned by
//! the [`Ingester`] and only replace the live directory once the closing
//! `component list end` line arrives.

use heapless::{FnvIndexMap, String, Vec};
use nextion_protocol::{ComponentKind, ComponentRow, DiscoveryLine, RowError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum components per generation (must be a power of two)
pub const MAX_COMPONENTS: usize = 128;

/// Maximum component name length in bytes
pub const MAX_NAME_LEN: usize = 32;

/// Component name storage
pub type ComponentName = String<MAX_NAME_LEN>;

/// Reasons a row cannot be added
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DirectoryError {
    /// `MAX_COMPONENTS` already stored
    Full,
    /// Name longer than `MAX_NAME_LEN`
    NameTooLong,
    /// Name already used in this generation
    DuplicateName,
    /// Page/id pair already used in this generation
    DuplicateId,
}

/// A component announced by the display
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Component {
    /// Page number
    pub page_id: u8,
    /// Id within the page
    pub component_id: u8,
    /// Object name from the HMI project
    pub name: ComponentName,
    /// Normalized type
    pub kind: ComponentKind,
}

impl Component {
    /// Packed page/id key
    pub fn key(&self) -> u16 {
        pack_key(self.page_id, self.component_id)
    }
}

/// Stable reference to a component within one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ComponentHandle {
    index: u8,
    generation: u16,
}

impl ComponentHandle {
    /// Generation this handle was issued in
    pub fn generation(&self) -> u16 {
        self.generation
    }
}

/// Pack a page/id pair into a lookup key
pub const fn pack_key(page_id: u8, component_id: u8) -> u16 {
    ((page_id as u16) << 8) | component_id as u16
}

/// Components of one generation plus lookup indices
pub struct Directory {
    components: Vec<Component, MAX_COMPONENTS>,
    by_name: FnvIndexMap<ComponentName, u8, MAX_COMPONENTS>,
    by_id: FnvIndexMap<u16, u8, MAX_COMPONENTS>,
    generation: u16,
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory {
    /// Create an empty directory (generation 0)
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            by_name: FnvIndexMap::new(),
            by_id: FnvIndexMap::new(),
            generation: 0,
        }
    }

    /// Drop every component and start `generation`
    pub(crate) fn restart(&mut self, generation: u16) {
        self.components.clear();
        self.by_name.clear();
        self.by_id.clear();
        self.generation = generation;
    }

    /// Add a parsed row
    ///
    /// Duplicate names or page/id pairs are rejected so the first row wins.
    pub fn insert(&mut self, row: &ComponentRow<'_>) -> Result<ComponentHandle, DirectoryError> {
        let mut name = ComponentName::new();
        name.push_str(row.name)
            .map_err(|_| DirectoryError::NameTooLong)?;

        let key = pack_key(row.page_id, row.component_id);
        if self.by_name.contains_key(&name) {
            return Err(DirectoryError::DuplicateName);
        }
        if self.by_id.contains_key(&key) {
            return Err(DirectoryError::DuplicateId);
        }

        let slot = self.components.len() as u8;
        self.components
            .push(Component {
                page_id: row.page_id,
                component_id: row.component_id,
                name: name.clone(),
                kind: row.kind,
            })
            .map_err(|_| DirectoryError::Full)?;

        // Indices share the arena's capacity, so they have room whenever it did.
        let _ = self.by_name.insert(name, slot);
        let _ = self.by_id.insert(key, slot);

        Ok(ComponentHandle {
            index: slot,
            generation: self.generation,
        })
    }

    /// Current generation
    pub fn generation(&self) -> u16 {
        self.generation
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if no components are stored
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Resolve a handle issued by this generation
    pub fn get(&self, handle: ComponentHandle) -> Option<&Component> {
        if handle.generation != self.generation {
            return None;
        }
        self.components.get(handle.index as usize)
    }

    /// Handle for the component called `name`
    pub fn handle_by_name(&self, name: &str) -> Option<ComponentHandle> {
        let mut key = ComponentName::new();
        key.push_str(name).ok()?;
        self.by_name.get(&key).map(|&index| self.handle(index))
    }

    /// Handle for the component at `page_id`/`component_id`
    pub fn handle_by_id(&self, page_id: u8, component_id: u8) -> Option<ComponentHandle> {
        self.by_id
            .get(&pack_key(page_id, component_id))
            .map(|&index| self.handle(index))
    }

    /// Component called `name`
    pub fn by_name(&self, name: &str) -> Option<&Component> {
        self.handle_by_name(name).and_then(|h| self.get(h))
    }

    /// Component at `page_id`/`component_id`
    pub fn by_id(&self, page_id: u8, component_id: u8) -> Option<&Component> {
        self.handle_by_id(page_id, component_id)
            .and_then(|h| self.get(h))
    }

    /// Returns true if a component is called `name`
    pub fn contains_name(&self, name: &str) -> bool {
        self.handle_by_name(name).is_some()
    }

    /// Returns true if `page_id`/`component_id` is known
    pub fn contains_id(&self, page_id: u8, component_id: u8) -> bool {
        self.by_id.contains_key(&pack_key(page_id, component_id))
    }

    /// All components in transcript order
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Components placed on `page_id`
    pub fn on_page(&self, page_id: u8) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| c.page_id == page_id)
    }

    /// Components of one kind
    pub fn of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| c.kind == kind)
    }

    fn handle(&self, index: u8) -> ComponentHandle {
        ComponentHandle {
            index,
            generation: self.generation,
        }
    }
}

/// Result of feeding one transcript line to the [`Ingester`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ingest {
    /// `component list begin` opened (or reopened) a session
    Opened,
    /// Row stored in the staging directory
    Added(ComponentHandle),
    /// Row rejected by the grammar
    Malformed(RowError),
    /// Row rejected by the directory
    Rejected(DirectoryError),
    /// Session closed and staged directory became live
    Committed { count: usize },
    /// Session closed after an overflow; live directory left empty
    Failed,
    /// Row or end marker outside a session
    Stray,
}

/// Staging area for a directory rebuild
pub struct Ingester {
    staging: Directory,
    active: bool,
    overflowed: bool,
    next_generation: u16,
}

impl Default for Ingester {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingester {
    /// Create an idle ingester
    pub fn new() -> Self {
        Self {
            staging: Directory::new(),
            active: false,
            overflowed: false,
            next_generation: 1,
        }
    }

    /// Hand out a fresh generation number
    pub fn next_generation(&mut self) -> u16 {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        generation
    }

    /// Start staging a new generation, discarding any partial one
    pub fn open(&mut self) {
        let generation = self.next_generation();
        self.staging.restart(generation);
        self.active = true;
        self.overflowed = false;
    }

    /// Returns true while a transcript is being collected
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Rows staged so far
    pub fn staged(&self) -> usize {
        self.staging.len()
    }

    /// Feed one line; on commit the staged directory is swapped into `live`
    pub fn ingest(&mut self, line: &str, live: &mut Directory) -> Ingest {
        match DiscoveryLine::parse(line) {
            Ok(DiscoveryLine::Begin) => {
                self.open();
                Ingest::Opened
            }
            Ok(DiscoveryLine::End) if self.active => {
                self.active = false;
                if self.overflowed {
                    self.overflowed = false;
                    self.staging.restart(0);
                    return Ingest::Failed;
                }
                core::mem::swap(live, &mut self.staging);
                self.staging.restart(0);
                Ingest::Committed { count: live.len() }
            }
            Ok(DiscoveryLine::Row(row)) if self.active => match self.staging.insert(&row) {
                Ok(handle) => Ingest::Added(handle),
                Err(DirectoryError::Full) => {
                    self.overflowed = true;
                    Ingest::Rejected(DirectoryError::Full)
                }
                Err(e) => Ingest::Rejected(e),
            },
            Ok(_) => Ingest::Stray,
            Err(e) if self.active => Ingest::Malformed(e),
            Err(_) => Ingest::Stray,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(page_id: u8, component_id: u8, name: &str, kind: ComponentKind) -> ComponentRow<'_> {
        ComponentRow {
            page_id,
            component_id,
            name,
            kind,
        }
    }

    fn run_transcript(ingester: &mut Ingester, live: &mut Directory, transcript: &str) -> Ingest {
        let mut last = Ingest::Stray;
        for line in transcript.lines() {
            last = ingester.ingest(line, live);
        }
        last
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut dir = Directory::new();
        dir.insert(&row(0, 1, "b0", ComponentKind::Button)).unwrap();
        dir.insert(&row(0, 2, "t0", ComponentKind::Text)).unwrap();

        assert_eq!(dir.len(), 2);
        assert_eq!(dir.by_name("b0").unwrap().kind, ComponentKind::Button);
        assert_eq!(dir.by_id(0, 2).unwrap().name.as_str(), "t0");
        assert!(dir.by_name("x9").is_none());
        assert!(dir.by_id(3, 3).is_none());
        assert!(dir.contains_name("t0"));
        assert!(dir.contains_id(0, 1));
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut dir = Directory::new();
        dir.insert(&row(0, 1, "b0", ComponentKind::Button)).unwrap();

        assert_eq!(
            dir.insert(&row(0, 5, "b0", ComponentKind::Button)),
            Err(DirectoryError::DuplicateName)
        );
        assert_eq!(
            dir.insert(&row(0, 1, "b1", ComponentKind::Button)),
            Err(DirectoryError::DuplicateId)
        );
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.by_id(0, 1).unwrap().name.as_str(), "b0");
    }

    #[test]
    fn test_name_too_long() {
        let mut dir = Directory::new();
        let long = "n".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            dir.insert(&row(0, 1, &long, ComponentKind::Number)),
            Err(DirectoryError::NameTooLong)
        );
        assert!(dir.is_empty());
        assert!(dir.by_name(&long).is_none());
    }

    #[test]
    fn test_full() {
        let mut dir = Directory::new();
        for i in 0..MAX_COMPONENTS {
            let name = format!("c{}", i);
            dir.insert(&row((i / 256) as u8, (i % 256) as u8, &name, ComponentKind::Text))
                .unwrap();
        }
        assert_eq!(
            dir.insert(&row(9, 9, "extra", ComponentKind::Text)),
            Err(DirectoryError::Full)
        );
        assert_eq!(dir.len(), MAX_COMPONENTS);
    }

    #[test]
    fn test_page_and_kind_filters() {
        let mut dir = Directory::new();
        dir.insert(&row(0, 1, "b0", ComponentKind::Button)).unwrap();
        dir.insert(&row(1, 1, "n0", ComponentKind::Number)).unwrap();
        dir.insert(&row(1, 2, "n1", ComponentKind::Number)).unwrap();

        assert_eq!(dir.on_page(1).count(), 2);
        assert_eq!(dir.on_page(7).count(), 0);
        assert_eq!(dir.of_kind(ComponentKind::Number).count(), 2);
        assert_eq!(dir.of_kind(ComponentKind::Button).count(), 1);
    }

    #[test]
    fn test_stale_handle() {
        let mut dir = Directory::new();
        dir.restart(1);
        let handle = dir.insert(&row(0, 1, "b0", ComponentKind::Button)).unwrap();
        assert!(dir.get(handle).is_some());

        dir.restart(2);
        dir.insert(&row(0, 1, "b0", ComponentKind::Button)).unwrap();
        assert!(dir.get(handle).is_none());
        assert_eq!(dir.handle_by_name("b0").unwrap().generation(), 2);
    }

    #[test]
    fn test_packed_key() {
        assert_eq!(pack_key(0, 2), 0x0002);
        assert_eq!(pack_key(3, 1), 0x0301);
        let mut dir = Directory::new();
        let handle = dir.insert(&row(3, 1, "x", ComponentKind::Unknown)).unwrap();
        assert_eq!(dir.get(handle).unwrap().key(), 0x0301);
    }

    #[test]
    fn test_transcript_commits_on_end() {
        let mut ingester = Ingester::new();
        let mut live = Directory::new();

        assert_eq!(ingester.ingest("component list begin", &mut live), Ingest::Opened);
        assert!(matches!(ingester.ingest("0,1,b0,button", &mut live), Ingest::Added(_)));
        assert!(matches!(ingester.ingest("0,2,t0,text", &mut live), Ingest::Added(_)));

        // Not visible until the end marker
        assert!(live.is_empty());
        assert_eq!(ingester.staged(), 2);

        assert_eq!(
            ingester.ingest("component list end", &mut live),
            Ingest::Committed { count: 2 }
        );
        assert_eq!(live.len(), 2);
        assert_eq!(live.by_name("b0").unwrap().kind, ComponentKind::Button);
        assert_eq!(live.by_id(0, 2).unwrap().kind, ComponentKind::Text);
        assert!(!ingester.is_active());
    }

    #[test]
    fn test_partial_transcript_leaves_live_untouched() {
        let mut ingester = Ingester::new();
        let mut live = Directory::new();
        run_transcript(
            &mut ingester,
            &mut live,
            "component list begin\n0,1,b0,b\ncomponent list end",
        );
        let generation = live.generation();

        run_transcript(&mut ingester, &mut live, "component list begin\n0,9,z9,z");
        assert_eq!(live.len(), 1);
        assert_eq!(live.generation(), generation);
        assert!(live.by_name("z9").is_none());
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let mut ingester = Ingester::new();
        let mut live = Directory::new();
        ingester.ingest("component list begin", &mut live);

        assert_eq!(
            ingester.ingest("0,1", &mut live),
            Ingest::Malformed(RowError::MissingField)
        );
        assert!(matches!(ingester.ingest("0,2,t0,t", &mut live), Ingest::Added(_)));
        assert_eq!(
            ingester.ingest("0,2,t9,t", &mut live),
            Ingest::Rejected(DirectoryError::DuplicateId)
        );
        assert_eq!(
            ingester.ingest("component list end", &mut live),
            Ingest::Committed { count: 1 }
        );
    }

    #[test]
    fn test_overflow_fails_generation() {
        let mut ingester = Ingester::new();
        let mut live = Directory::new();
        ingester.ingest("component list begin", &mut live);
        for i in 0..=MAX_COMPONENTS {
            let line = format!("{},{},c{},n", i / 200, i % 200, i);
            ingester.ingest(&line, &mut live);
        }
        assert_eq!(ingester.ingest("component list end", &mut live), Ingest::Failed);
        assert!(live.is_empty());
    }

    #[test]
    fn test_lines_outside_session_are_stray() {
        let mut ingester = Ingester::new();
        let mut live = Directory::new();
        assert_eq!(ingester.ingest("0,1,b0,b", &mut live), Ingest::Stray);
        assert_eq!(ingester.ingest("component list end", &mut live), Ingest::Stray);
        assert_eq!(ingester.ingest("garbage", &mut live), Ingest::Stray);
        assert!(live.is_empty());
    }

    #[test]
    fn test_begin_restarts_session() {
        let mut ingester = Ingester::new();
        let mut live = Directory::new();
        run_transcript(
            &mut ingester,
            &mut live,
            "component list begin\n0,1,old,b\ncomponent list begin\n0,1,new,b\ncomponent list end",
        );
        assert_eq!(live.len(), 1);
        assert!(live.contains_name("new"));
        assert!(!live.contains_name("old"));
    }

    fn tuples(dir: &Directory) -> std::vec::Vec<(u8, u8, std::string::String, ComponentKind)> {
        dir.iter()
            .map(|c| (c.page_id, c.component_id, c.name.as_str().to_owned(), c.kind))
            .collect()
    }

    proptest! {
        #[test]
        fn prop_ingestion_idempotent(
            rows in proptest::collection::vec(
                (any::<u8>(), any::<u8>(), "[a-z][a-z0-9]{0,7}", "[btngjzq]"),
                0..40,
            )
        ) {
            let mut transcript = std::string::String::from("component list begin\n");
            for (page, id, name, kind) in &rows {
                transcript.push_str(&format!("{},{},{},{}\n", page, id, name, kind));
            }
            transcript.push_str("component list end\n");

            let mut ingester = Ingester::new();
            let mut live = Directory::new();
            run_transcript(&mut ingester, &mut live, &transcript);
            let first = tuples(&live);

            run_transcript(&mut ingester, &mut live, &transcript);
            let second = tuples(&live);

            prop_assert_eq!(&first, &second);
            for (page, id, name, kind) in &first {
                let by_name = live.by_name(name).unwrap();
                prop_assert_eq!((by_name.page_id, by_name.component_id), (*page, *id));
                prop_assert_eq!(live.by_id(*page, *id).unwrap().kind, *kind);
            }
        }
    }
}
