use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::fmt;

use log::debug;

use super::RewriteError;

/// One pending edit in a rewrite program.
///
/// Indices are token indices. An insert-after is stored as an insert before
/// the following token, which is how it renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOp {
    /// Emit `text` before token `index`.
    InsertBefore {
        /// Token the text goes in front of.
        index: usize,
        /// Text to insert.
        text: String,
        /// Position of the op in its program.
        instruction_index: usize,
    },
    /// Emit `text` after token `index - 1`.
    InsertAfter {
        /// One past the token the text follows.
        index: usize,
        /// Text to insert.
        text: String,
        /// Position of the op in its program.
        instruction_index: usize,
    },
    /// Emit `text` instead of tokens `from..=to`; `None` deletes them.
    Replace {
        /// First replaced token.
        from: usize,
        /// Last replaced token, inclusive.
        to: usize,
        /// Replacement text.
        text: Option<String>,
        /// Position of the op in its program.
        instruction_index: usize,
    },
}

impl RewriteOp {
    /// Token index the op is keyed on when rendering.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            RewriteOp::InsertBefore { index, .. } | RewriteOp::InsertAfter { index, .. } => *index,
            RewriteOp::Replace { from, .. } => *from,
        }
    }

    /// Position of the op in its program.
    #[must_use]
    pub fn instruction_index(&self) -> usize {
        match self {
            RewriteOp::InsertBefore {
                instruction_index, ..
            }
            | RewriteOp::InsertAfter {
                instruction_index, ..
            }
            | RewriteOp::Replace {
                instruction_index, ..
            } => *instruction_index,
        }
    }

    /// Text the op emits, `None` for deletes.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            RewriteOp::InsertBefore { text, .. } | RewriteOp::InsertAfter { text, .. } => Some(text),
            RewriteOp::Replace { text, .. } => text.as_deref(),
        }
    }

    /// Whether this is an insert of either flavour.
    #[must_use]
    pub fn is_insert(&self) -> bool {
        !self.is_replace()
    }

    /// Whether this is a replace or delete.
    #[must_use]
    pub fn is_replace(&self) -> bool {
        matches!(self, RewriteOp::Replace { .. })
    }

    /// First and last token index the op covers.
    fn span(&self) -> (usize, usize) {
        match self {
            RewriteOp::Replace { from, to, .. } => (*from, *to),
            op => (op.index(), op.index()),
        }
    }

    fn prepend_text(&mut self, prefix: &str) {
        match self {
            RewriteOp::InsertBefore { text, .. } | RewriteOp::InsertAfter { text, .. } => {
                text.insert_str(0, prefix);
            }
            RewriteOp::Replace { text, .. } => {
                let mut joined = String::from(prefix);
                joined.push_str(text.as_deref().unwrap_or_default());
                *text = Some(joined);
            }
        }
    }

    fn widen(&mut self, lo: usize, hi: usize) {
        if let RewriteOp::Replace { from, to, .. } = self {
            *from = lo;
            *to = hi;
        }
    }
}

impl fmt::Display for RewriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteOp::InsertBefore { index, text, .. } => {
                write!(f, "<InsertBeforeOp@{index}:\"{text}\">")
            }
            RewriteOp::InsertAfter { index, text, .. } => {
                write!(f, "<InsertAfterOp@{index}:\"{text}\">")
            }
            RewriteOp::Replace {
                from,
                to,
                text: None,
                ..
            } => write!(f, "<DeleteOp@{from}..{to}>"),
            RewriteOp::Replace {
                from,
                to,
                text: Some(text),
                ..
            } => write!(f, "<ReplaceOp@{from}..{to}:\"{text}\">"),
        }
    }
}

/// Collapses a program to at most one op per token index.
///
/// Replaces are processed first, in program order: earlier inserts at a
/// replace's first token become a prefix of its text, earlier inserts
/// inside it disappear, earlier replaces it covers disappear and
/// overlapping deletes merge. Inserts are processed next: earlier inserts
/// at the same index are prepended to the later one, and an insert at a
/// replace's first token is folded into that replace.
pub(crate) fn reduce(ops: &[RewriteOp]) -> Result<BTreeMap<usize, RewriteOp>, RewriteError> {
    let mut rewrites: Vec<Option<RewriteOp>> = ops.iter().cloned().map(Some).collect();

    for i in 0..rewrites.len() {
        let Some(mut rop) = rewrites[i].take_if(|op| op.is_replace()) else {
            continue;
        };
        let (from, to) = rop.span();
        let mut prefix = String::new();
        let mut folded = false;
        for slot in &mut rewrites[..i] {
            let Some(iop) = slot.as_ref().filter(|op| op.is_insert()) else {
                continue;
            };
            let index = iop.index();
            if index == from {
                prefix.push_str(iop.text().unwrap_or_default());
                folded = true;
                *slot = None;
            } else if index > from && index <= to {
                *slot = None;
            }
        }
        if folded {
            debug!("rewriter: folding inserts {prefix:?} into {rop}");
            rop.prepend_text(&prefix);
        }

        for slot in &mut rewrites[..i] {
            let Some(prev) = slot.as_ref().filter(|op| op.is_replace()) else {
                continue;
            };
            let (prev_from, prev_to) = prev.span();
            let (from, to) = rop.span();
            if prev_from >= from && prev_to <= to {
                *slot = None;
                continue;
            }
            let disjoint = prev_to < from || prev_from > to;
            if disjoint {
                continue;
            }
            if prev.text().is_none() && rop.text().is_none() {
                rop.widen(prev_from.min(from), prev_to.max(to));
                debug!("rewriter: merged overlapping deletes into {rop}");
                *slot = None;
            } else {
                return Err(RewriteError::ReplaceOverlap {
                    op: rop,
                    previous: prev.clone(),
                });
            }
        }
        rewrites[i] = Some(rop);
    }

    for i in 0..rewrites.len() {
        let Some(mut iop) = rewrites[i].take_if(|op| op.is_insert()) else {
            continue;
        };
        let index = iop.index();
        // A later insert at the same index absorbs this one.
        if rewrites[i + 1..]
            .iter()
            .flatten()
            .any(|op| op.is_insert() && op.index() == index)
        {
            rewrites[i] = Some(iop);
            continue;
        }
        let mut prefix = String::new();
        for slot in &mut rewrites[..i] {
            if slot.as_ref().is_some_and(|prev| prev.is_insert() && prev.index() == index) {
                if let Some(prev) = slot.take() {
                    prefix.push_str(prev.text().unwrap_or_default());
                }
            }
        }
        iop.prepend_text(&prefix);

        let mut folded = false;
        for slot in &mut rewrites[..i] {
            let Some(rop) = slot.as_mut().filter(|op| op.is_replace()) else {
                continue;
            };
            let (from, to) = rop.span();
            if index == from {
                rop.prepend_text(iop.text().unwrap_or_default());
                debug!("rewriter: folding {iop} into {rop}");
                folded = true;
                continue;
            }
            if index > from && index <= to {
                return Err(RewriteError::InsertWithinReplace {
                    op: iop,
                    previous: rop.clone(),
                });
            }
        }
        if !folded {
            rewrites[i] = Some(iop);
        }
    }

    let mut by_index = BTreeMap::new();
    for op in rewrites.into_iter().flatten() {
        let index = op.index();
        if by_index.insert(index, op).is_some() {
            return Err(RewriteError::DuplicateOperation(index));
        }
    }
    Ok(by_index)
}
