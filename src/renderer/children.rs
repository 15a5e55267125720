//! Children reconciliation and the keyed fast diff.
//!
//! The fast diff trims the common prefix and suffix in one pass each, then
//! handles the pure-mount and pure-unmount tails. What remains is the
//! general middle: every old child is matched to a new index by key (or a
//! positional same-kind search when keyless), producing a `source` array of
//! old indices with `-1` marking children that have no old counterpart.
//! When any matched index ran backwards, a longest increasing subsequence
//! over `source` identifies the nodes that can stay put; everything else is
//! moved (or mounted) right-to-left in front of its already-settled
//! neighbour.

use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use super::patch::patch;
use super::unmount::unmount;
use super::RendererShared;
use crate::host::{HostAdapter, HostNode};
use crate::types::Key;
use crate::vnode::{Children, VNode};

// =============================================================================
// Shape Matrix
// =============================================================================

/// Reconcile the children of `new` against the children of `old` inside
/// `container`.
pub(crate) fn reconcile_children<H: HostAdapter + 'static>(
    r: &Rc<RendererShared<H>>,
    old: &VNode,
    new: &VNode,
    container: HostNode,
    anchor: Option<HostNode>,
) {
    match (old.children(), new.children()) {
        (Children::Nodes(old_list), Children::Nodes(new_list)) => {
            keyed_diff(r, old_list, new_list, container, anchor);
        }
        (Children::Text(_), Children::Nodes(new_list)) => {
            r.host.borrow_mut().set_element_text(container, "");
            for child in new_list {
                patch(r, None, child, container, anchor);
            }
        }
        (Children::None, Children::Nodes(new_list)) => {
            for child in new_list {
                patch(r, None, child, container, anchor);
            }
        }
        (Children::Nodes(old_list), Children::Text(text)) => {
            for child in old_list {
                unmount(r, child);
            }
            r.host.borrow_mut().set_element_text(container, text);
        }
        (Children::Text(prev), Children::Text(text)) => {
            if prev != text {
                r.host.borrow_mut().set_element_text(container, text);
            }
        }
        (Children::None, Children::Text(text)) => {
            r.host.borrow_mut().set_element_text(container, text);
        }
        (Children::Nodes(old_list), Children::None) => {
            for child in old_list {
                unmount(r, child);
            }
        }
        (Children::Text(_), Children::None) => {
            r.host.borrow_mut().set_element_text(container, "");
        }
        (Children::None, Children::None) => {}
        (Children::Slots(_), _) | (_, Children::Slots(_)) => {
            log::warn!("slot children reconcile through the component runtime");
        }
    }
}

// =============================================================================
// Keyed Fast Diff
// =============================================================================

fn keyed_diff<H: HostAdapter + 'static>(
    r: &Rc<RendererShared<H>>,
    old_list: &[VNode],
    new_list: &[VNode],
    container: HostNode,
    parent_anchor: Option<HostNode>,
) {
    let mut start: usize = 0;
    let mut old_end: isize = old_list.len() as isize - 1;
    let mut new_end: isize = new_list.len() as isize - 1;

    // Phase 1: common prefix. Keyless siblings match positionally
    // (None == None); the patch handles any kind change.
    while (start as isize) <= old_end
        && (start as isize) <= new_end
        && old_list[start].key() == new_list[start].key()
    {
        patch(r, Some(&old_list[start]), &new_list[start], container, None);
        start += 1;
    }

    // Phase 2: common suffix.
    while (start as isize) <= old_end
        && (start as isize) <= new_end
        && old_list[old_end as usize].key() == new_list[new_end as usize].key()
    {
        patch(
            r,
            Some(&old_list[old_end as usize]),
            &new_list[new_end as usize],
            container,
            None,
        );
        old_end -= 1;
        new_end -= 1;
    }

    if (start as isize) > old_end {
        // Phase 3a: old exhausted, mount the remaining new children before
        // the settled suffix (or the parent anchor past the end).
        if (start as isize) <= new_end {
            let anchor = anchor_at(new_list, (new_end + 1) as usize, parent_anchor);
            for index in start..=(new_end as usize) {
                patch(r, None, &new_list[index], container, anchor);
            }
        }
    } else if (start as isize) > new_end {
        // Phase 3b: new exhausted, unmount the leftover old children.
        for index in start..=(old_end as usize) {
            unmount(r, &old_list[index]);
        }
    } else {
        // Phase 4: unknown middle.
        diff_middle(
            r,
            old_list,
            new_list,
            start,
            old_end as usize,
            new_end as usize,
            container,
            parent_anchor,
        );
    }
}

/// Host anchor in front of `new_list[position]`, falling back to the parent
/// anchor when the position is past the end.
fn anchor_at(new_list: &[VNode], position: usize, parent_anchor: Option<HostNode>) -> Option<HostNode> {
    if position < new_list.len() {
        new_list[position].el()
    } else {
        parent_anchor
    }
}

#[allow(clippy::too_many_arguments)]
fn diff_middle<H: HostAdapter + 'static>(
    r: &Rc<RendererShared<H>>,
    old_list: &[VNode],
    new_list: &[VNode],
    start: usize,
    old_end: usize,
    new_end: usize,
    container: HostNode,
    parent_anchor: Option<HostNode>,
) {
    let to_patch = new_end - start + 1;

    let mut key_to_new: HashMap<&Key, usize> = HashMap::new();
    for index in start..=new_end {
        if let Some(key) = new_list[index].key() {
            key_to_new.insert(key, index);
        }
    }

    // source[x] = old index that new child start+x came from, -1 when new.
    let mut source: Vec<isize> = vec![-1; to_patch];
    let mut patched = 0usize;
    let mut moved = false;
    let mut max_new_index = 0usize;

    for old_index in start..=old_end {
        let prev = &old_list[old_index];

        // Every remaining new slot already has a source: the rest of the
        // old children are surplus.
        if patched >= to_patch {
            unmount(r, prev);
            continue;
        }

        let new_index = match prev.key() {
            Some(key) => key_to_new.get(key).copied(),
            None => (start..=new_end).find(|&candidate| {
                source[candidate - start] == -1
                    && new_list[candidate].key().is_none()
                    && prev.kind().same_kind(new_list[candidate].kind())
            }),
        };

        match new_index {
            None => unmount(r, prev),
            Some(new_index) => {
                source[new_index - start] = old_index as isize;
                if new_index >= max_new_index {
                    max_new_index = new_index;
                } else {
                    moved = true;
                }
                patch(r, Some(prev), &new_list[new_index], container, None);
                patched += 1;
            }
        }
    }

    let stable = if moved {
        longest_increasing(&source)
    } else {
        Vec::new()
    };
    trace!(
        "middle diff: {} slots, moved={}, {} stable",
        to_patch,
        moved,
        stable.len()
    );

    // Walk right-to-left so each node's anchor is already in place.
    let mut cursor = stable.len() as isize - 1;
    for x in (0..to_patch).rev() {
        let index = start + x;
        let anchor = anchor_at(new_list, index + 1, parent_anchor);
        if source[x] == -1 {
            patch(r, None, &new_list[index], container, anchor);
        } else if moved {
            if cursor < 0 || x != stable[cursor as usize] {
                move_vnode(r, &new_list[index], container, anchor);
            } else {
                cursor -= 1;
            }
        }
    }
}

fn move_vnode<H: HostAdapter + 'static>(
    r: &Rc<RendererShared<H>>,
    vnode: &VNode,
    container: HostNode,
    anchor: Option<HostNode>,
) {
    match vnode.el() {
        Some(el) => r.host.borrow_mut().insert(el, container, anchor),
        None => log::warn!("cannot move a node with no host backing"),
    }
}

// =============================================================================
// Longest Increasing Subsequence
// =============================================================================

/// Indices into `source` of one longest strictly increasing subsequence.
///
/// `-1` entries are holes (freshly mounted slots) and can never belong to
/// the subsequence; any other value - including 0 - is a legal member.
/// O(n log n) patience sort with predecessor reconstruction.
pub(crate) fn longest_increasing(source: &[isize]) -> Vec<usize> {
    let mut result: Vec<usize> = Vec::new();
    let mut prev: Vec<usize> = vec![0; source.len()];

    for i in 0..source.len() {
        let value = source[i];
        if value == -1 {
            continue;
        }
        if let Some(&last) = result.last() {
            if source[last] < value {
                prev[i] = last;
                result.push(i);
                continue;
            }
            // Leftmost tail with a value >= `value`.
            let mut lo = 0usize;
            let mut hi = result.len() - 1;
            while lo < hi {
                let mid = (lo + hi) / 2;
                if source[result[mid]] < value {
                    lo = mid + 1;
                } else {
                    hi = mid;
                }
            }
            if value < source[result[lo]] {
                if lo > 0 {
                    prev[i] = result[lo - 1];
                }
                result[lo] = i;
            }
        } else {
            result.push(i);
        }
    }

    // Rebuild the chain by walking predecessor links from the tail.
    let mut remaining = result.len();
    if remaining > 0 {
        let mut index = result[remaining - 1];
        while remaining > 0 {
            remaining -= 1;
            result[remaining] = index;
            index = prev[index];
        }
    }
    result
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::longest_increasing;

    #[test]
    fn test_lis_basic() {
        // values 1,3 at indices 0,2 (or 1,2); length must be 2 and increasing
        let seq = longest_increasing(&[1, 5, 3]);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq[0], 0);
        assert!(seq[1] == 1 || seq[1] == 2);
    }

    #[test]
    fn test_lis_strictly_decreasing() {
        let seq = longest_increasing(&[3, 2, 1, 0]);
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_lis_sorted_input() {
        let seq = longest_increasing(&[0, 1, 2, 3]);
        assert_eq!(seq, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_lis_skips_holes() {
        let seq = longest_increasing(&[-1, 5, 3, 4]);
        assert_eq!(seq, vec![2, 3]); // values 3, 4
    }

    #[test]
    fn test_lis_zero_is_not_a_hole() {
        let seq = longest_increasing(&[0, 1]);
        assert_eq!(seq, vec![0, 1]);
    }

    #[test]
    fn test_lis_reconstruction_is_increasing() {
        let source = [9, 2, 5, 3, 7, 101, 4, -1, 6];
        let seq = longest_increasing(&source);
        for pair in seq.windows(2) {
            assert!(pair[0] < pair[1], "indices must increase");
            assert!(
                source[pair[0]] < source[pair[1]],
                "values must strictly increase"
            );
        }
        assert_eq!(seq.len(), 4); // e.g. 2, 3, 4, 6
    }
}
