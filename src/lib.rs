// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A fixed-capacity binary max-heap with in-place heap sort.
//!
//! A `MaxHeap` allocates room for exactly `capacity` items when it is created and never
//! grows. Inserting into a full heap is rejected with [`Error::CapacityExceeded`] instead of
//! reallocating, which makes the heap usable as a bounded work queue or as scratch space for
//! sorting a known number of items.
//!
//! Insertion and extraction of the greatest item are `O(log n)`. Retrieving the greatest item
//! is `O(1)`. Sorting the heap in place is `O(n log n)` and allocates nothing.

use std::fmt::{self, Debug, Display};
use std::iter;
use std::slice;
use std::vec;

use compare::{natural, Compare, Natural};
use log::{debug, trace};
use thiserror::Error;

// The heap is a complete binary tree stored level by level in a Vec. Positions
// are 1-based so that the node at position k has its parent at k / 2 and its
// children at 2k and 2k + 1. Position k lives at offset k - 1 in the Vec:
//
//            1
//          /   \
//         2     3
//        / \   / \
//       4   5 6   7
//
// Only positions 1..=len are part of the heap. The Vec may hold more items than
// that; anything past len is left over from `sort` and carries no meaning.

/// Offset in the buffer of the 1-based position `k`.
fn slot(k: usize) -> usize {
    debug_assert!(k > 0);
    k - 1
}

fn parent(k: usize) -> usize {
    k / 2
}

/// Moves the item at position `k` up until its parent is not smaller.
fn swim<T, C: Compare<T>>(v: &mut [T], mut k: usize, cmp: &C) {
    while k > 1 && cmp.compares_gt(&v[slot(k)], &v[slot(parent(k))]) {
        v.swap(slot(k), slot(parent(k)));
        k = parent(k);
    }
}

/// Moves the item at position `k` down until it is not smaller than its
/// greater child. All of `v` is treated as the heap.
fn sink<T, C: Compare<T>>(v: &mut [T], mut k: usize, cmp: &C) {
    let len = v.len();
    loop {
        let left = 2 * k;
        if left > len {
            return; // leaf
        }
        let right = left + 1;
        let child = if right <= len && cmp.compares_gt(&v[slot(right)], &v[slot(left)]) {
            right
        } else {
            left
        };
        if !cmp.compares_lt(&v[slot(k)], &v[slot(child)]) {
            return;
        }
        v.swap(slot(k), slot(child));
        k = child;
    }
}

/// Errors returned by [`MaxHeap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The heap already holds as many items as it was created for.
    #[error("heap capacity of {capacity} exceeded")]
    CapacityExceeded { capacity: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A binary max-heap that holds at most a fixed number of items.
///
/// Items are ordered by their natural order. It is a logic error for an item to be modified in
/// such a way that its ordering relative to any other item changes while it is in the heap.
/// This is normally only possible through `Cell`, `RefCell`, global state, I/O, or unsafe code.
pub struct MaxHeap<T: Ord> {
    data: Vec<T>,
    len: usize,
    cap: usize,
    cmp: Natural<T>,
}

impl<T: Ord> MaxHeap<T> {
    /// Returns an empty heap that can hold up to `capacity` items.
    ///
    /// The buffer is allocated here and never reallocated. A capacity of zero is allowed and
    /// yields a heap that rejects every insertion.
    ///
    /// # Examples
    ///
    /// ```
    /// use bounded_max_heap::MaxHeap;
    ///
    /// let heap = MaxHeap::<u32>::with_capacity(5);
    /// assert!(heap.is_empty());
    /// assert_eq!(heap.capacity(), 5);
    /// ```
    pub fn with_capacity(capacity: usize) -> MaxHeap<T> {
        MaxHeap {
            data: Vec::with_capacity(capacity),
            len: 0,
            cap: capacity,
            cmp: natural(),
        }
    }

    /// Same as [`with_capacity`](#method.with_capacity).
    pub fn new(capacity: usize) -> MaxHeap<T> {
        Self::with_capacity(capacity)
    }

    /// Builds a heap out of the items of `vec` in linear time.
    ///
    /// Fails if `vec` holds more than `capacity` items. The vector's allocation is reused.
    ///
    /// # Examples
    ///
    /// ```
    /// use bounded_max_heap::{Error, MaxHeap};
    ///
    /// let heap = MaxHeap::from_vec(8, vec![5, 1, 6, 4]).unwrap();
    /// assert_eq!(heap.len(), 4);
    /// assert_eq!(heap.peek(), Some(&6));
    ///
    /// let err = MaxHeap::from_vec(2, vec![5, 1, 6]).unwrap_err();
    /// assert_eq!(err, Error::CapacityExceeded { capacity: 2 });
    /// ```
    pub fn from_vec(capacity: usize, mut vec: Vec<T>) -> Result<MaxHeap<T>> {
        if vec.len() > capacity {
            debug!(
                "cannot build heap of capacity {} from {} items",
                capacity,
                vec.len()
            );
            return Err(Error::CapacityExceeded { capacity });
        }
        let additional = capacity - vec.len();
        vec.reserve_exact(additional);

        let cmp: Natural<T> = natural();
        for k in (1..=vec.len() / 2).rev() {
            sink(&mut vec, k, &cmp);
        }
        let heap = MaxHeap {
            len: vec.len(),
            data: vec,
            cap: capacity,
            cmp,
        };
        debug_assert!(heap.is_valid());
        Ok(heap)
    }

    /// Returns the number of items the heap was created to hold.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns the number of items in the heap.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the heap contains no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if another insertion would be rejected.
    pub fn is_full(&self) -> bool {
        self.len == self.cap
    }

    /// Returns a reference to the greatest item in the heap.
    ///
    /// Returns `None` if the heap is empty.
    pub fn peek(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Inserts an item into the heap.
    ///
    /// Returns `Error::CapacityExceeded` and leaves the heap untouched if it is full.
    ///
    /// # Examples
    ///
    /// ```
    /// use bounded_max_heap::{Error, MaxHeap};
    ///
    /// let mut heap = MaxHeap::with_capacity(1);
    /// assert_eq!(heap.insert(7), Ok(()));
    /// assert_eq!(heap.insert(8), Err(Error::CapacityExceeded { capacity: 1 }));
    /// assert_eq!(heap.len(), 1);
    /// ```
    pub fn insert(&mut self, item: T) -> Result<()> {
        debug_assert!(self.is_valid());
        if self.is_full() {
            debug!("rejected insert into full heap of capacity {}", self.cap);
            return Err(Error::CapacityExceeded { capacity: self.cap });
        }
        // Reuse a slot left behind by `sort` if there is one. Otherwise the Vec
        // has spare room reserved up front, so pushing does not reallocate.
        if self.len < self.data.len() {
            self.data[self.len] = item;
        } else {
            self.data.push(item);
        }
        self.len += 1;
        swim(&mut self.data[..self.len], self.len, &self.cmp);
        debug_assert!(self.is_valid());
        Ok(())
    }

    /// Inserts every item of `iter` in order, stopping at the first one that does not fit.
    ///
    /// Items inserted before the failure stay in the heap.
    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<()> {
        for item in iter {
            self.insert(item)?;
        }
        Ok(())
    }

    /// Removes the greatest item from the heap and returns it.
    ///
    /// Returns `None` if the heap was empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use bounded_max_heap::MaxHeap;
    ///
    /// let mut heap = MaxHeap::from_vec(4, vec![2, 9, 4]).unwrap();
    /// assert_eq!(heap.extract_max(), Some(9));
    /// assert_eq!(heap.extract_max(), Some(4));
    /// assert_eq!(heap.extract_max(), Some(2));
    /// assert_eq!(heap.extract_max(), None);
    /// ```
    pub fn extract_max(&mut self) -> Option<T> {
        debug_assert!(self.is_valid());
        if self.len == 0 {
            return None;
        }
        // Leftovers from `sort` would otherwise be the ones swapped into the root.
        self.data.truncate(self.len);
        let max = self.data.swap_remove(0);
        self.len -= 1;
        sink(&mut self.data[..self.len], 1, &self.cmp);
        debug_assert!(self.is_valid());
        Some(max)
    }

    /// Sorts the heap's buffer in place.
    ///
    /// Each round moves the greatest remaining item to the end of the heap and shrinks the
    /// heap by one, so afterwards the heap holds at most one item and the first `n` slots of
    /// [`buffer`](#method.buffer) are in ascending order, `n` being the length before the call.
    ///
    /// # Examples
    ///
    /// ```
    /// use bounded_max_heap::MaxHeap;
    ///
    /// let mut heap = MaxHeap::with_capacity(5);
    /// heap.try_extend(vec![3, 1, 4, 1, 5]).unwrap();
    /// heap.sort();
    /// assert_eq!(heap.buffer(), &[1, 1, 3, 4, 5]);
    /// assert_eq!(heap.len(), 1);
    /// ```
    pub fn sort(&mut self) {
        debug_assert!(self.is_valid());
        let n = self.len;
        while self.len > 1 {
            self.data.swap(0, self.len - 1);
            self.len -= 1;
            sink(&mut self.data[..self.len], 1, &self.cmp);
        }
        trace!("sorted {} items in place", n);
    }

    /// Removes all items from the heap. The capacity is kept.
    pub fn clear(&mut self) {
        self.data.clear();
        self.len = 0;
    }

    /// Returns the items in the heap in storage order.
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    /// Returns every filled slot of the buffer, including the ones past the end of the heap.
    ///
    /// After [`sort`](#method.sort) this is where the sorted items can be read.
    pub fn buffer(&self) -> &[T] {
        &self.data
    }

    /// Returns an iterator visiting all items in the heap in arbitrary order.
    pub fn iter(&self) -> Iter<T> {
        Iter(self.as_slice().iter())
    }

    /// Consumes the heap and returns its items as a vector in arbitrary order.
    pub fn into_vec(self) -> Vec<T> {
        let mut vec = self.data;
        vec.truncate(self.len);
        vec
    }

    /// Consumes the heap and returns its items as a vector in sorted (ascending) order.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let n = self.len;
        self.sort();
        let mut vec = self.data;
        vec.truncate(n);
        vec
    }

    /// Checks that no item in the heap is greater than its parent.
    fn is_valid(&self) -> bool {
        let v = &self.data;
        self.len <= v.len()
            && self.len <= self.cap
            && (2..=self.len).all(|k| self.cmp.compares_ge(&v[slot(parent(k))], &v[slot(k)]))
    }
}

impl<T: Ord + Display> MaxHeap<T> {
    /// Lists the items in the heap in storage order, e.g. `[5, 4, 3, 1, 1]`.
    ///
    /// Meant for diagnostics; the order is the heap's internal layout, not sorted order.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl<T: Ord + Clone> Clone for MaxHeap<T> {
    fn clone(&self) -> MaxHeap<T> {
        let mut data = Vec::with_capacity(self.cap);
        data.extend_from_slice(&self.data);
        MaxHeap {
            data,
            len: self.len,
            cap: self.cap,
            cmp: natural(),
        }
    }
}

impl<T: Ord + Debug> Debug for MaxHeap<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

impl<T: Ord + Display> Display for MaxHeap<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", item)?;
        }
        f.write_str("]")
    }
}

/// An iterator over a `MaxHeap` in arbitrary order.
///
/// Acquire through [`MaxHeap::iter`](struct.MaxHeap.html#method.iter).
pub struct Iter<'a, T: 'a>(slice::Iter<'a, T>);

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Iter<'a, T> { Iter(self.0.clone()) }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline] fn next(&mut self) -> Option<&'a T> { self.0.next() }
    #[inline] fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> { self.0.next_back() }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> iter::FusedIterator for Iter<'a, T> {}

/// A consuming iterator over a `MaxHeap` in arbitrary order.
pub struct IntoIter<T>(vec::IntoIter<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;
    fn next(&mut self) -> Option<T> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> { self.0.next_back() }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T: Ord> IntoIterator for MaxHeap<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(self) -> IntoIter<T> { IntoIter(self.into_vec().into_iter()) }
}

impl<'a, T: Ord> IntoIterator for &'a MaxHeap<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Iter<'a, T> { self.iter() }
}
