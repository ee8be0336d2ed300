/// Expansion limits to keep pathological rotations from blowing up

use alloc::vec::Vec;

use crate::error::LimitReason;

pub const MAX_GROUP_DEPTH: u32 = 16;
pub const MAX_EXPANDED_ACTIONS: u32 = 4096;
pub const MAX_COPIED_NODES: u32 = 65_536;
/// Nesting bound for SCALE-decoded rotations
pub const MAX_DECODE_DEPTH: u32 = 256;
pub const DEFAULT_ID_SEED: u64 = 0x5eed_a11c_a7ed_1d5;

/// Knobs for a single assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveConfig {
    pub max_group_depth: u32,
    pub max_expanded_actions: u32,
    pub max_copied_nodes: u32,
    /// Seed for the uuids given to substituted copies
    pub id_seed: u64,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_group_depth: MAX_GROUP_DEPTH,
            max_expanded_actions: MAX_EXPANDED_ACTIONS,
            max_copied_nodes: MAX_COPIED_NODES,
            id_seed: DEFAULT_ID_SEED,
        }
    }
}

/// Tracks budget use during an assembly
#[derive(Debug, Clone)]
pub struct ResolveLimits {
    config: ResolveConfig,
    pub group_depth: u32,
    pub expanded_actions: u32,
    pub copied_nodes: u32,
    pub limit_exceeded_reason: Option<LimitReason>,
}

impl ResolveLimits {
    pub fn new(config: &ResolveConfig) -> Self {
        Self {
            config: config.clone(),
            group_depth: 0,
            expanded_actions: 0,
            copied_nodes: 0,
            limit_exceeded_reason: None,
        }
    }

    pub fn is_exceeded(&self) -> bool {
        self.limit_exceeded_reason.is_some()
    }

    fn exceed(&mut self, reason: LimitReason) -> Result<(), LimitReason> {
        self.limit_exceeded_reason.get_or_insert(reason);
        Err(reason)
    }

    /// On success the caller must pair this with [`Self::exit_group`].
    pub fn enter_group(&mut self) -> Result<(), LimitReason> {
        if self.group_depth >= self.config.max_group_depth {
            return self.exceed(LimitReason::GroupDepth);
        }
        self.group_depth += 1;
        Ok(())
    }

    pub fn exit_group(&mut self) {
        if self.group_depth > 0 {
            self.group_depth -= 1;
        }
    }

    /// Count the actions a group invocation splices in itself, not those of
    /// the groups it references.
    pub fn record_actions(&mut self, count: u32) -> Result<(), LimitReason> {
        self.expanded_actions = self.expanded_actions.saturating_add(count);
        if self.expanded_actions > self.config.max_expanded_actions {
            return self.exceed(LimitReason::ExpandedActions);
        }
        Ok(())
    }

    pub fn record_copy(&mut self, nodes: u32) -> Result<(), LimitReason> {
        self.copied_nodes = self.copied_nodes.saturating_add(nodes);
        if self.copied_nodes > self.config.max_copied_nodes {
            return self.exceed(LimitReason::CopiedNodes);
        }
        Ok(())
    }
}

/// The chain of definitions currently being resolved.
///
/// Entering a key that is already on the chain means the definition
/// depends on itself.
#[derive(Debug, Clone)]
pub struct InProgress<K> {
    stack: Vec<K>,
}

impl<K: PartialEq> InProgress<K> {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Push `key`, or return false without pushing if it is already in progress.
    pub fn enter(&mut self, key: K) -> bool {
        if self.stack.contains(&key) {
            return false;
        }
        self.stack.push(key);
        true
    }

    pub fn exit(&mut self) {
        self.stack.pop();
    }

    pub fn contains(&self, key: &K) -> bool {
        self.stack.contains(key)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl<K: PartialEq> Default for InProgress<K> {
    fn default() -> Self {
        Self::new()
    }
}
