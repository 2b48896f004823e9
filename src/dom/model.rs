//! Order-insensitive, deeply comparable descriptor trees.
//!
//! A [`DomNode`] is built once from an XML fragment or from an MXF local set. Leaf elements become
//! named fields, complex elements become child nodes. Both fields and children are multisets: the
//! order of repeated entries is not significant but their counts are.

use crate::mxf::ul::Ul;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Value of a leaf field.
#[derive(Clone, Debug)]
pub enum FieldValue {
    /// Free text (numbers, enumerations, UUIDs, strings).
    Text(String),
    /// Universal label; compared ignoring its version byte.
    Ul(Ul),
    /// Rational value such as an edit rate.
    Fraction {
        /// Numerator.
        num: i64,
        /// Denominator.
        den: i64,
    },
}

impl FieldValue {
    /// Classify a text value: `urn:smpte:ul:` labels and `a/b` rationals get typed variants.
    pub fn parse(text: &str) -> Self {
        let t = text.trim();
        if has_prefix(t, "urn:smpte:ul:")
            && let Ok(ul) = Ul::parse_urn(t)
        {
            return Self::Ul(ul);
        }
        if let Some((n, d)) = t.split_once('/')
            && let (Ok(num), Ok(den)) = (n.trim().parse::<i64>(), d.trim().parse::<i64>())
        {
            return Self::Fraction { num, den };
        }
        if has_prefix(t, "urn:uuid:") {
            return Self::Text(t.to_ascii_lowercase());
        }
        Self::Text(t.to_owned())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ul(&self) -> Option<Ul> {
        match self {
            Self::Ul(ul) => Some(*ul),
            _ => None,
        }
    }

    pub fn as_fraction(&self) -> Option<(i64, i64)> {
        match self {
            Self::Fraction { num, den } => Some((*num, *den)),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Text(_) => 0,
            Self::Ul(_) => 1,
            Self::Fraction { .. } => 2,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Ul(a), Self::Ul(b)) => a.without_version().cmp(&b.without_version()),
            (Self::Fraction { num: an, den: ad }, Self::Fraction { num: bn, den: bd }) => {
                (an, ad).cmp(&(bn, bd))
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Text(s) => s.hash(state),
            Self::Ul(ul) => ul.without_version().hash(state),
            Self::Fraction { num, den } => (num, den).hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Ul(ul) => write!(f, "{ul}"),
            Self::Fraction { num, den } => write!(f, "{num}/{den}"),
        }
    }
}

fn has_prefix(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
}

/// Multiset of values held by one field name.
pub type FieldValues = BTreeMap<FieldValue, usize>;

/// Normalized descriptor tree node.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DomNode {
    local_name: String,
    namespace: String,
    fields: BTreeMap<String, FieldValues>,
    children: BTreeMap<DomNode, usize>,
}

impl DomNode {
    pub fn new(local_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace: namespace.into(),
            fields: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    /// Builder form of [`DomNode::add_field`].
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.add_field(name, value);
        self
    }

    /// Builder form of [`DomNode::add_child`].
    pub fn with_child(mut self, child: DomNode) -> Self {
        self.add_child(child);
        self
    }

    pub(crate) fn add_field(&mut self, name: impl Into<String>, value: FieldValue) {
        *self
            .fields
            .entry(name.into())
            .or_default()
            .entry(value)
            .or_insert(0) += 1;
    }

    pub(crate) fn add_child(&mut self, child: DomNode) {
        self.add_child_n(child, 1);
    }

    fn add_child_n(&mut self, child: DomNode, count: usize) {
        if count > 0 {
            *self.children.entry(child).or_insert(0) += count;
        }
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValues> {
        &self.fields
    }

    /// First value of a field (in canonical order) when present.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).and_then(|v| v.keys().next())
    }

    /// Distinct children with their occurrence counts.
    pub fn children(&self) -> impl Iterator<Item = (&DomNode, usize)> {
        self.children.iter().map(|(n, c)| (n, *c))
    }

    /// Children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DomNode> + 'a {
        self.children.keys().filter(move |n| n.local_name == name)
    }

    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&DomNode> {
        self.children.keys().find(|n| n.local_name == name)
    }

    /// Depth-first search for the first node (self included) with the given local name.
    pub fn find(&self, name: &str) -> Option<&DomNode> {
        if self.local_name == name {
            return Some(self);
        }
        self.children.keys().find_map(|c| c.find(name))
    }

    /// `true` when the node carries neither fields nor children.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.children.is_empty()
    }

    /// Number of field values and nodes below this node, counting multiplicities.
    pub fn size(&self) -> usize {
        let fields: usize = self.fields.values().flat_map(|v| v.values()).sum();
        let children: usize = self
            .children
            .iter()
            .map(|(c, n)| n * (1 + c.size()))
            .sum();
        fields + children
    }

    /// Copy of the tree without any field or element whose local name is in `ignore`.
    ///
    /// Applied recursively. Children that become equal after projection are merged and their
    /// counts added, so the projection is idempotent.
    pub fn with_ignored(&self, ignore: &BTreeSet<String>) -> DomNode {
        let mut out = DomNode::new(self.local_name.clone(), self.namespace.clone());
        for (name, values) in &self.fields {
            if !ignore.contains(name) {
                out.fields.insert(name.clone(), values.clone());
            }
        }
        for (child, count) in &self.children {
            if !ignore.contains(&child.local_name) {
                out.add_child_n(child.with_ignored(ignore), *count);
            }
        }
        out
    }

    /// Structural equality after stripping `ignore` from both trees.
    pub fn equals_ignoring(&self, other: &DomNode, ignore: &BTreeSet<String>) -> bool {
        if ignore.is_empty() {
            return self == other;
        }
        self.with_ignored(ignore) == other.with_ignored(ignore)
    }

    /// Remove from `reference` everything that also appears in `candidate`.
    ///
    /// Fields and children are consumed as multisets. A reference child with no exact counterpart
    /// is diffed against the closest remaining candidate child of the same name, so the result
    /// points at the innermost differing values rather than whole subtrees. Returns an empty node
    /// (same name) when the trees are equal.
    pub fn remove_nodes(reference: &DomNode, candidate: &DomNode) -> DomNode {
        let mut out = DomNode::new(reference.local_name.clone(), reference.namespace.clone());

        for (name, values) in &reference.fields {
            let other = candidate.fields.get(name);
            for (value, count) in values {
                let matched = other.and_then(|o| o.get(value)).copied().unwrap_or(0);
                let remaining = count.saturating_sub(matched);
                if remaining > 0 {
                    *out.fields
                        .entry(name.clone())
                        .or_default()
                        .entry(value.clone())
                        .or_insert(0) += remaining;
                }
            }
        }

        // Candidate children left over after exact matches are used as diff targets.
        let mut leftover: Vec<(&DomNode, usize)> = candidate
            .children
            .iter()
            .filter_map(|(c, n)| {
                let used = reference.children.get(c).copied().unwrap_or(0);
                let rest = n.saturating_sub(used);
                (rest > 0).then_some((c, rest))
            })
            .collect();

        for (child, count) in &reference.children {
            let matched = candidate.children.get(child).copied().unwrap_or(0);
            let mut remaining = count.saturating_sub(matched);
            while remaining > 0 {
                let best = leftover
                    .iter()
                    .enumerate()
                    .filter(|(_, (c, n))| *n > 0 && c.local_name == child.local_name)
                    .min_by_key(|(_, (c, _))| child.difference_count(c))
                    .map(|(i, _)| i);
                match best {
                    Some(i) => {
                        let take = remaining.min(leftover[i].1);
                        out.add_child_n(Self::remove_nodes(child, leftover[i].0), take);
                        leftover[i].1 -= take;
                        remaining -= take;
                    }
                    None => {
                        out.add_child_n(child.clone(), remaining);
                        remaining = 0;
                    }
                }
            }
        }
        out
    }

    /// Number of structural differences between two trees (symmetric).
    pub fn difference_count(&self, other: &DomNode) -> usize {
        if self.local_name != other.local_name || self.namespace != other.namespace {
            return self.size() + other.size() + 1;
        }
        Self::remove_nodes(self, other).size() + Self::remove_nodes(other, self).size()
    }

    /// Index and value of the candidate with the fewest differences from `reference`.
    ///
    /// Ties resolve to the earliest candidate.
    pub fn closest_match<'a>(
        reference: &DomNode,
        candidates: &'a [DomNode],
    ) -> Option<(usize, &'a DomNode)> {
        candidates
            .iter()
            .enumerate()
            .min_by_key(|(i, c)| (reference.difference_count(c), *i))
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize, count: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        write!(f, "{pad}{}", self.local_name)?;
        if !self.namespace.is_empty() {
            write!(f, " [{}]", self.namespace)?;
        }
        if count > 1 {
            write!(f, " (x{count})")?;
        }
        writeln!(f)?;
        for (name, values) in &self.fields {
            for (value, n) in values {
                write!(f, "{pad}  {name} = {value}")?;
                if *n > 1 {
                    write!(f, " (x{n})")?;
                }
                writeln!(f)?;
            }
        }
        for (child, n) in &self.children {
            child.fmt_indented(f, depth + 1, *n)?;
        }
        Ok(())
    }
}

impl fmt::Display for DomNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0, 1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dom/model.rs"]
mod tests;
