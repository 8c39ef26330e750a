//! First-segment index over compiled templates.
//!
//! Every template still has to be tried against the path (a catch-all regex can
//! match anything), but most templates start with a plain literal segment such as
//! `/users`. Those are bucketed by that segment, so a lookup only tries the bucket
//! for the request's first segment plus the templates that could match any first
//! segment (variables, regexes, escaped literals, the root template).
//!
//! The candidate set is identical to a full scan; the index only skips templates
//! whose first literal segment cannot match.

use std::collections::HashMap;

use crate::template::{PathTemplate, SegmentKind};

#[derive(Debug, Clone, Default)]
pub(crate) struct SegmentIndex {
    /// Literal first segment -> group indexes, ascending
    literal: HashMap<String, Vec<usize>>,
    /// Groups that must be tried for every path, ascending
    dynamic: Vec<usize>,
}

impl SegmentIndex {
    pub(crate) fn insert(&mut self, template: &PathTemplate, group: usize) {
        match indexable_segment(template) {
            Some(segment) => self.literal.entry(segment.to_string()).or_default().push(group),
            None => self.dynamic.push(group),
        }
    }

    /// Groups worth trying for `path`, in ascending (registration) order.
    pub(crate) fn lookup(&self, path: &str) -> Vec<usize> {
        let first = path
            .strip_prefix('/')
            .map(|rest| rest.split('/').next().unwrap_or_default());
        let bucket = first
            .and_then(|segment| self.literal.get(segment))
            .map_or(&[][..], Vec::as_slice);

        merge_sorted(bucket, &self.dynamic)
    }

    pub(crate) fn literal_buckets(&self) -> usize {
        self.literal.len()
    }

    pub(crate) fn dynamic_len(&self) -> usize {
        self.dynamic.len()
    }
}

/// The first segment, if it is pure literal text made only of unreserved characters,
/// so comparing it to the raw request segment is exact.
fn indexable_segment(template: &PathTemplate) -> Option<&str> {
    let first = template.segments().first()?;
    let plain = first.kind == SegmentKind::Literal
        && !first.raw.is_empty()
        && first
            .raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'));
    plain.then_some(first.raw.as_str())
}

fn merge_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}
