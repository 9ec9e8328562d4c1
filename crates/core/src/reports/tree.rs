//! Report line hierarchy.
//!
//! A `ReportTree` is an arena of report line definitions in display order
//! (pre-order, siblings by sequence). Parent and child links are indices into
//! the arena. Cycles, duplicate ids and dangling parents are rejected when the
//! tree is built, so every consumer can walk parents without a visited set.

use std::collections::{HashMap, HashSet};

use ledgerlens_shared::types::{AccountId, AccountTypeId, ReportLineId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReportError;

/// Kind of a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    /// Sum of its child lines.
    #[serde(rename = "sum")]
    AggregateNode,
    /// Explicit list of accounts.
    #[serde(rename = "accounts")]
    AccountSet,
    /// Every account of the listed account types.
    #[serde(rename = "account_type")]
    AccountTypeSet,
    /// Value of another report line.
    #[serde(rename = "account_report")]
    ReportReference,
}

/// Sign convention of a report line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Sign {
    /// Balance is displayed positive.
    #[default]
    Positive,
    /// Balance is displayed negative.
    Negative,
}

impl Sign {
    /// Negates `balance` when its sign contradicts this convention. Zero is
    /// never flipped.
    #[must_use]
    pub fn correct(self, balance: Decimal) -> Decimal {
        let contradicts = match self {
            Self::Positive => balance.is_sign_negative() && !balance.is_zero(),
            Self::Negative => balance.is_sign_positive() && !balance.is_zero(),
        };
        if contradicts { -balance } else { balance }
    }
}

impl From<Sign> for i8 {
    fn from(sign: Sign) -> Self {
        match sign {
            Sign::Positive => 1,
            Sign::Negative => -1,
        }
    }
}

impl TryFrom<i8> for Sign {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Positive),
            -1 => Ok(Self::Negative),
            other => Err(format!("invalid sign {other}, expected 1 or -1")),
        }
    }
}

/// Display style of a report line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    /// Derived from the line level.
    #[default]
    Automatic,
    /// Report title.
    MainTitle,
    /// Section title.
    Title,
    /// Sub-section title.
    Subtitle,
    /// Plain text.
    Normal,
    /// Italic text.
    Italic,
    /// Smallest text.
    Smallest,
}

impl LineStyle {
    /// Resolves `Automatic` from the line level.
    #[must_use]
    pub const fn resolve(self, level: u32) -> Self {
        match self {
            Self::Automatic => match level {
                1 => Self::MainTitle,
                2 => Self::Title,
                _ => Self::Normal,
            },
            other => other,
        }
    }
}

/// Whether account rows are shown under account-set lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayDetail {
    /// Account rows are rolled up but not displayed.
    NoDetail,
    /// One row per account.
    #[default]
    DetailFlat,
    /// One row per account. Accounts carry no hierarchy of their own, so
    /// this renders like `DetailFlat`.
    DetailWithHierarchy,
}

impl DisplayDetail {
    /// Returns true if account rows are displayed.
    #[must_use]
    pub const fn shows_accounts(self) -> bool {
        !matches!(self, Self::NoDetail)
    }
}

/// Stored definition of one report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLineDef {
    /// Line ID.
    pub id: ReportLineId,
    /// Parent line, `None` for roots.
    pub parent_id: Option<ReportLineId>,
    /// Display name.
    pub name: String,
    /// Order among siblings.
    pub sequence: i32,
    /// Line kind.
    pub kind: LineKind,
    /// Accounts of an account-set line.
    #[serde(default)]
    pub account_ids: Vec<AccountId>,
    /// Account types of an account-type-set line.
    #[serde(default)]
    pub account_type_ids: Vec<AccountTypeId>,
    /// Target of a report-reference line.
    #[serde(default)]
    pub report_reference_id: Option<ReportLineId>,
    /// Sign convention.
    #[serde(default)]
    pub sign: Sign,
    /// Display style.
    #[serde(default)]
    pub style: LineStyle,
    /// Account row display.
    #[serde(default)]
    pub display_detail: DisplayDetail,
}

impl ReportLineDef {
    /// Creates a line with default sign, style and detail.
    #[must_use]
    pub fn new(
        id: ReportLineId,
        parent_id: Option<ReportLineId>,
        name: impl Into<String>,
        sequence: i32,
        kind: LineKind,
    ) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            sequence,
            kind,
            account_ids: Vec::new(),
            account_type_ids: Vec::new(),
            report_reference_id: None,
            sign: Sign::Positive,
            style: LineStyle::Automatic,
            display_detail: DisplayDetail::DetailFlat,
        }
    }
}

/// One node of a `ReportTree`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTreeNode {
    /// Stored definition.
    pub def: ReportLineDef,
    /// Depth; roots are level 0.
    pub level: u32,
    /// Parent index.
    pub parent: Option<usize>,
    /// Child indices in sequence order.
    pub children: Vec<usize>,
}

/// Validated report hierarchy in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTree {
    nodes: Vec<ReportTreeNode>,
    index: HashMap<ReportLineId, usize>,
}

impl ReportTree {
    /// Builds the full forest of `defs`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateLine`, `UnknownParent` or `TreeCycle` for malformed input.
    pub fn build(defs: Vec<ReportLineDef>) -> Result<Self, ReportError> {
        let forest = Forest::new(defs)?;
        let roots = forest.roots();
        Ok(forest.flatten(&roots))
    }

    /// Builds the subtree under the first root whose name contains
    /// `name_filter`, ignoring case. Roots are tried in sequence order.
    ///
    /// # Errors
    ///
    /// Returns `ReportNotFound` when no root matches, or a validation error
    /// for malformed input.
    pub fn find(defs: Vec<ReportLineDef>, name_filter: &str) -> Result<Self, ReportError> {
        let forest = Forest::new(defs)?;
        let needle = name_filter.to_lowercase();
        let root = forest
            .roots()
            .into_iter()
            .find(|&idx| forest.defs[idx].name.to_lowercase().contains(&needle))
            .ok_or_else(|| ReportError::ReportNotFound(name_filter.to_string()))?;
        Ok(forest.flatten(&[root]))
    }

    /// Nodes in display order.
    #[must_use]
    pub fn lines(&self) -> &[ReportTreeNode] {
        &self.nodes
    }

    /// Node at `idx`.
    #[must_use]
    pub fn node(&self, idx: usize) -> &ReportTreeNode {
        &self.nodes[idx]
    }

    /// Index of the line with `id`.
    #[must_use]
    pub fn position(&self, id: ReportLineId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Line with `id`.
    #[must_use]
    pub fn get(&self, id: ReportLineId) -> Option<&ReportTreeNode> {
        self.position(id).map(|idx| &self.nodes[idx])
    }

    /// Deepest level in the tree.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
    }

    /// First root, if any.
    #[must_use]
    pub fn root(&self) -> Option<&ReportTreeNode> {
        self.nodes.first()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Validated definitions with child lists, before flattening.
struct Forest {
    defs: Vec<ReportLineDef>,
    children: Vec<Vec<usize>>,
}

impl Forest {
    fn new(defs: Vec<ReportLineDef>) -> Result<Self, ReportError> {
        let mut by_id = HashMap::with_capacity(defs.len());
        for (idx, def) in defs.iter().enumerate() {
            if by_id.insert(def.id, idx).is_some() {
                return Err(ReportError::DuplicateLine(def.id));
            }
        }

        let mut children = vec![Vec::new(); defs.len()];
        for (idx, def) in defs.iter().enumerate() {
            if let Some(parent) = def.parent_id {
                let parent_idx = by_id.get(&parent).copied().ok_or(ReportError::UnknownParent {
                    line: def.id,
                    parent,
                })?;
                children[parent_idx].push(idx);
            }
        }
        for list in &mut children {
            list.sort_by_key(|&idx| (defs[idx].sequence, defs[idx].id));
        }

        let forest = Self { defs, children };
        forest.check_cycles(&by_id)?;
        Ok(forest)
    }

    /// Every line must reach a root by following parents.
    fn check_cycles(&self, by_id: &HashMap<ReportLineId, usize>) -> Result<(), ReportError> {
        let mut reaches_root = vec![false; self.defs.len()];
        for start in 0..self.defs.len() {
            let mut path = Vec::new();
            let mut on_path = HashSet::new();
            let mut cur = start;
            loop {
                if reaches_root[cur] {
                    break;
                }
                if !on_path.insert(cur) {
                    return Err(ReportError::TreeCycle(self.defs[cur].id));
                }
                path.push(cur);
                match self.defs[cur].parent_id.and_then(|p| by_id.get(&p).copied()) {
                    Some(parent) => cur = parent,
                    None => break,
                }
            }
            for idx in path {
                reaches_root[idx] = true;
            }
        }
        Ok(())
    }

    fn roots(&self) -> Vec<usize> {
        let mut roots: Vec<usize> = (0..self.defs.len())
            .filter(|&idx| self.defs[idx].parent_id.is_none())
            .collect();
        roots.sort_by_key(|&idx| (self.defs[idx].sequence, self.defs[idx].id));
        roots
    }

    /// Pre-order walk from `roots`, re-indexing into a `ReportTree`.
    fn flatten(&self, roots: &[usize]) -> ReportTree {
        let mut nodes: Vec<ReportTreeNode> = Vec::new();
        let mut index = HashMap::new();
        // (source index, parent arena index, level)
        let mut stack: Vec<(usize, Option<usize>, u32)> =
            roots.iter().rev().map(|&idx| (idx, None, 0)).collect();

        while let Some((src, parent, level)) = stack.pop() {
            let arena_idx = nodes.len();
            let def = self.defs[src].clone();
            index.insert(def.id, arena_idx);
            nodes.push(ReportTreeNode {
                def,
                level,
                parent,
                children: Vec::new(),
            });
            if let Some(parent_idx) = parent {
                nodes[parent_idx].children.push(arena_idx);
            }
            for &child in self.children[src].iter().rev() {
                stack.push((child, Some(arena_idx), level + 1));
            }
        }

        ReportTree { nodes, index }
    }
}

/// Provider of report hierarchies.
pub trait ReportTreeSource {
    /// Loads the tree under the first root whose name contains `name_filter`.
    fn load_tree(&self, name_filter: &str) -> Result<ReportTree, ReportError>;
}

impl ReportTreeSource for [ReportLineDef] {
    fn load_tree(&self, name_filter: &str) -> Result<ReportTree, ReportError> {
        ReportTree::find(self.to_vec(), name_filter)
    }
}
