//! Multiset difference and intersection over partlists.

use crate::domain::Partlist;

/// The result of diffing partlist A against partlist B.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartlistDiff {
    /// Parts (or part surplus) present in A but not covered by B.
    pub only_a: Partlist,
    /// The per-key intersection, `min(a_count, b_count)`.
    pub common: Partlist,
}

/// Splits A's counts into "only in A" and "in both".
///
/// For every key in A: counts covered by B go to `common`, any surplus goes
/// to `only_a`. Keys present only in B are not emitted; call the function a
/// second time with the arguments swapped to obtain "only in B". The
/// `common` result is the same mapping regardless of argument order.
#[must_use]
pub fn diff_partlists(a: &Partlist, b: &Partlist) -> PartlistDiff {
    let mut diff = PartlistDiff::default();
    for (key, a_count) in a.iter() {
        let b_count = b.count(key);
        diff.common.add(key.clone(), a_count.min(b_count));
        diff.only_a.add(key.clone(), a_count.saturating_sub(b_count));
    }
    diff
}
