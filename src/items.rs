//! Bounded array primitives used for all data movement inside a node.
//!
//! Every mutating primitive takes the capacity bound of the array it works on
//! and asserts it. Nodes pre-size their arrays to that bound, so none of these
//! ever grow an allocation.

use std::borrow::Borrow;

use smallvec::{Array, SmallVec};

/// Index of the first element that is `>= target`, or `data.len()` if none.
///
/// `data` must be sorted ascending. Nodes are small, so this is a linear scan.
#[inline]
pub(crate) fn first_ge<T, Q>(data: &[T], target: &Q) -> usize
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    data.iter()
        .position(|item| item.borrow() >= target)
        .unwrap_or(data.len())
}

#[inline]
pub(crate) fn insert_item<A: Array>(data: &mut SmallVec<A>, cap: usize, i: usize, value: A::Item) {
    assert!(data.len() < cap, "insert_item: array is full ({cap})");
    data.insert(i, value);
}

#[inline]
pub(crate) fn delete_item<A: Array>(data: &mut SmallVec<A>, i: usize) -> A::Item {
    assert!(i < data.len(), "delete_item: index {i} out of bounds ({})", data.len());
    data.remove(i)
}

#[inline]
pub(crate) fn attach_item<A: Array>(data: &mut SmallVec<A>, cap: usize, value: A::Item) {
    assert!(data.len() < cap, "attach_item: array is full ({cap})");
    data.push(value);
}

#[inline]
pub(crate) fn detach_item<A: Array>(data: &mut SmallVec<A>) -> A::Item {
    assert!(!data.is_empty(), "detach_item: array is empty");
    let last = data.len() - 1;
    data.remove(last)
}

/// Appends all of `src` onto `dst`, leaving `src` empty.
pub(crate) fn merge<A: Array>(dst: &mut SmallVec<A>, cap: usize, src: &mut SmallVec<A>) {
    assert!(
        dst.len() + src.len() <= cap,
        "merge: {} + {} exceeds capacity {cap}",
        dst.len(),
        src.len()
    );
    dst.extend(src.drain(..));
}

/// Moves the upper `len / 2` elements of `src` onto the end of `dst`.
///
/// The lower half keeps `len - len / 2` elements, so an odd-sized array leaves
/// the extra element behind in `src`.
pub(crate) fn split<A: Array>(src: &mut SmallVec<A>, dst: &mut SmallVec<A>, cap: usize) {
    let keep = src.len() - src.len() / 2;
    assert!(
        dst.len() + (src.len() - keep) <= cap,
        "split: destination capacity {cap} exceeded"
    );
    dst.extend(src.drain(keep..));
}

/// Index of the first maximal element of a non-empty slice.
pub fn index_of_maximal<T: PartialOrd>(data: &[T]) -> usize {
    assert!(!data.is_empty(), "index_of_maximal: slice is empty");
    let mut answer = 0;
    for i in 1..data.len() {
        if data[answer] < data[i] {
            answer = i;
        }
    }
    answer
}
