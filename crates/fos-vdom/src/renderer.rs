//! Node Renderer
//!
//! Owns the virtual tree and the key → element map, and drives a sync:
//! 1. Validate the description (nothing is touched if it is malformed)
//! 2. Bump the generation
//! 3. Depth-first: attributes, then children left to right, resolving
//!    each child by key and moving it into place when needed
//! 4. Purge every key whose stamp is behind the current generation

use std::collections::{HashMap, HashSet};

use crate::{
    ElementId, ElementTree, Generation, HostTree, InvalidDescription, InvariantViolation, Key,
    NodeDesc, RenderError, RenderResult, RendererConfig, VElement,
};

/// What one sync did to the host tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Elements created (new keys and retagged keys)
    pub created: usize,
    /// Keys whose tag changed, replacing their element
    pub retagged: usize,
    /// Newly attached elements
    pub inserted: usize,
    /// Elements relocated within or across parents
    pub moved: usize,
    /// Elements detached from a parent
    pub removed: usize,
    pub attributes_set: usize,
    pub attributes_removed: usize,
    /// Elements destroyed by garbage collection
    pub purged: usize,
}

impl SyncStats {
    /// True if the sync changed nothing
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Renderer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Between syncs; the host tree matches the last description
    Idle,
    /// Inside `sync`. Also left behind if a host panics mid-sync.
    Syncing,
    /// A sync failed part-way; the host tree is in an unspecified state
    Poisoned,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    element: ElementId,
    generation: Generation,
}

/// Keyed reconciler bound to one root element
#[derive(Debug)]
pub struct NodeRenderer<H: HostTree> {
    tree: ElementTree<H>,
    root: ElementId,
    root_host: H::Handle,
    root_key: Key,
    identities: HashMap<Key, Entry>,
    /// Elements replaced by a retag during the current pass
    retired: Vec<ElementId>,
    generation: Generation,
    state: RenderState,
    config: RendererConfig,
}

impl<H: HostTree> NodeRenderer<H> {
    /// Create a renderer and perform the first sync
    pub fn new(host: H, desc: &NodeDesc) -> RenderResult<Self> {
        Self::with_config(host, desc, RendererConfig::default())
    }

    /// Create a renderer with custom configuration
    pub fn with_config(host: H, desc: &NodeDesc, config: RendererConfig) -> RenderResult<Self> {
        if desc.tag.is_empty() {
            return Err(InvalidDescription::EmptyTag { key: desc.key.clone() }.into());
        }
        if !host.accepts_name(&desc.tag) {
            return Err(InvalidDescription::InvalidName { key: desc.key.clone(), name: desc.tag.clone() }.into());
        }
        let mut tree = ElementTree::new(host);
        let root = tree.create(&desc.tag)?;
        let root_host = tree.get(root)
            .map(VElement::host)
            .ok_or(InvariantViolation::MissingElement(root))?;

        let mut renderer = Self {
            tree,
            root,
            root_host,
            root_key: desc.key.clone(),
            identities: HashMap::new(),
            retired: Vec::new(),
            generation: Generation::INITIAL,
            state: RenderState::Idle,
            config,
        };
        renderer.sync(desc)?;
        Ok(renderer)
    }

    /// Bring the host tree in line with `desc`.
    ///
    /// A malformed description is rejected before anything is touched. Any
    /// other failure poisons the renderer: the host tree may be half
    /// updated and every later call returns [`RenderError::Poisoned`].
    pub fn sync(&mut self, desc: &NodeDesc) -> RenderResult<SyncStats> {
        match self.state {
            RenderState::Syncing => return Err(RenderError::Reentrant),
            RenderState::Poisoned => return Err(RenderError::Poisoned),
            RenderState::Idle => {}
        }
        self.validate(desc)?;

        self.state = RenderState::Syncing;
        let result = self.run(desc);
        self.state = match &result {
            Ok(_) => RenderState::Idle,
            Err(err) => {
                tracing::error!("Sync failed, renderer poisoned: {}", err);
                RenderState::Poisoned
            }
        };
        result
    }

    fn validate(&self, desc: &NodeDesc) -> RenderResult<()> {
        let root_tag = self.tree.get(self.root)
            .map(VElement::tag)
            .ok_or(InvariantViolation::MissingElement(self.root))?;
        if desc.tag != root_tag {
            return Err(InvalidDescription::RootTagMismatch {
                expected: root_tag.to_string(),
                found: desc.tag.clone(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        let mut stack = vec![(desc, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if node.tag.is_empty() {
                return Err(InvalidDescription::EmptyTag { key: node.key.clone() }.into());
            }
            if depth > self.config.max_depth {
                return Err(InvalidDescription::TooDeep {
                    key: node.key.clone(),
                    limit: self.config.max_depth,
                }
                .into());
            }
            let host = self.tree.host();
            let bad_name = std::iter::once(node.tag.as_str())
                .chain(node.attributes.keys().map(String::as_str))
                .find(|name| !host.accepts_name(name));
            if let Some(name) = bad_name {
                return Err(InvalidDescription::InvalidName {
                    key: node.key.clone(),
                    name: name.to_string(),
                }
                .into());
            }
            if !seen.insert(&node.key) {
                return Err(InvalidDescription::DuplicateKey { key: node.key.clone() }.into());
            }
            stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }
        Ok(())
    }

    fn run(&mut self, desc: &NodeDesc) -> RenderResult<SyncStats> {
        self.generation = self.generation.next();
        let span = tracing::debug_span!("sync", generation = self.generation.value());
        let _enter = span.enter();

        self.tree.stats = SyncStats::default();
        self.root_key = desc.key.clone();

        self.sync_element(self.root, desc)?;
        self.purge()?;

        let stats = std::mem::take(&mut self.tree.stats);
        if self.config.log_stats {
            tracing::debug!(
                "Synced {} nodes: {} created, {} moved, {} removed, {} purged",
                desc.node_count(),
                stats.created,
                stats.moved,
                stats.removed,
                stats.purged
            );
        }
        Ok(stats)
    }

    fn sync_element(&mut self, id: ElementId, desc: &NodeDesc) -> RenderResult<()> {
        self.tree.apply_attributes(id, &desc.attributes)?;

        if desc.children.is_empty() {
            return self.tree.clear_children(id);
        }

        for (index, child_desc) in desc.children.iter().enumerate() {
            let child = self.resolve(child_desc)?;
            if self.tree.child_at(id, index) != Some(child) {
                self.tree.insert_child(id, child, index)?;
            }
            self.sync_element(child, child_desc)?;
        }
        self.tree.truncate_children(id, desc.children.len())
    }

    /// Find or create the element for a description and stamp its key
    /// with the current generation. Does not populate it.
    fn resolve(&mut self, desc: &NodeDesc) -> RenderResult<ElementId> {
        let generation = self.generation;
        if desc.key == self.root_key {
            return Err(InvalidDescription::DuplicateKey { key: desc.key.clone() }.into());
        }

        let existing = match self.identities.get_mut(&desc.key) {
            Some(entry) if entry.generation == generation => {
                return Err(InvalidDescription::DuplicateKey { key: desc.key.clone() }.into());
            }
            Some(entry) => {
                entry.generation = generation;
                Some(entry.element)
            }
            None => None,
        };

        if let Some(element) = existing {
            let tag = self.tree.get(element)
                .map(VElement::tag)
                .ok_or(InvariantViolation::MissingElement(element))?;
            if tag == desc.tag {
                return Ok(element);
            }
            tracing::trace!("Key {} changed tag from <{}> to <{}>", desc.key, tag, desc.tag);
            if let Some(parent) = self.tree.get(element).and_then(VElement::parent) {
                self.tree.remove_child(parent, element)?;
            }
            self.retired.push(element);
            self.tree.stats.retagged += 1;
        }

        let element = self.tree.create(&desc.tag)?;
        self.identities.insert(desc.key.clone(), Entry { element, generation });
        Ok(element)
    }

    /// Drop every identity not visited this generation and destroy its
    /// element, together with anything retired by a retag.
    fn purge(&mut self) -> RenderResult<()> {
        let generation = self.generation;
        let mut doomed = std::mem::take(&mut self.retired);
        self.identities.retain(|key, entry| {
            let stale = entry.generation.is_stale(generation);
            if stale {
                tracing::trace!("Purging key {} ({})", key, entry.element);
                doomed.push(entry.element);
            }
            !stale
        });
        if doomed.is_empty() {
            return Ok(());
        }

        let doomed_set: HashSet<ElementId> = doomed.iter().copied().collect();
        for &id in &doomed {
            let parent = self.tree.get(id).and_then(VElement::parent);
            if let Some(parent) = parent.filter(|p| !doomed_set.contains(p)) {
                tracing::warn!("Stale element {} still attached to live parent {}; detaching", id, parent);
                self.tree.remove_child(parent, id)?;
            }
        }
        for id in doomed {
            self.tree.destroy(id)?;
            self.tree.stats.purged += 1;
        }
        Ok(())
    }

    /// The root virtual element
    pub fn node(&self) -> ElementId {
        self.root
    }

    /// The root host element
    pub fn html(&self) -> H::Handle {
        self.root_host
    }

    /// Look up any live virtual element
    pub fn element(&self, id: ElementId) -> Option<&VElement<H::Handle>> {
        self.tree.get(id)
    }

    /// Element currently bound to `key`. The root is not addressable by key.
    pub fn lookup(&self, key: &Key) -> Option<ElementId> {
        self.identities.get(key).map(|entry| entry.element)
    }

    /// Host element currently bound to `key`
    pub fn lookup_host(&self, key: &Key) -> Option<H::Handle> {
        self.lookup(key).and_then(|id| self.tree.get(id)).map(VElement::host)
    }

    /// Number of keyed elements (the root is not counted)
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The virtual tree, read-only
    pub fn tree(&self) -> &ElementTree<H> {
        &self.tree
    }

    pub fn host(&self) -> &H {
        self.tree.host()
    }

    /// Mutable host access, e.g. to mount [`html`](Self::html) into a
    /// document. Elements owned by the renderer must not be modified.
    pub fn host_mut(&mut self) -> &mut H {
        self.tree.host_mut()
    }

    pub fn into_host(self) -> H {
        self.tree.into_host()
    }
}
