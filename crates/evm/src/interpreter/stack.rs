// Copyright 2015-2020 Parity Technologies (UK) Ltd.
// This file is part of OpenEthereum.

// OpenEthereum is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// OpenEthereum is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with OpenEthereum.  If not, see <http://www.gnu.org/licenses/>.

//! EVM execution stack, bounded to 1024 words. Bounds are enforced by the
//! caller (`Interpreter::verify_instruction`) before any of these methods
//! run, so the implementation itself panics rather than erroring on
//! exhaustion: reaching that panic means a handler skipped the check.

/// Abstraction over the fixed-capacity stack the interpreter keeps the 256-
/// bit words on.
pub trait Stack<T> {
    /// Returns the item at `no_from_top` positions below the top, without
    /// removing it. `peek(0)` is the top of the stack.
    fn peek(&self, no_from_top: usize) -> &T;
    /// Returns the top `no_of_elems` items, top-most last, without removing
    /// them.
    fn peek_top(&self, no_of_elems: usize) -> &[T];
    /// Removes and returns the top item.
    fn pop_back(&mut self) -> T;
    /// Removes and returns the top `no_of_elems` items, top-most first.
    fn pop_n(&mut self, no_of_elems: usize) -> Vec<T>;
    /// Pushes an item onto the top.
    fn push(&mut self, elem: T);
    /// Current depth.
    fn size(&self) -> usize;
    /// True iff at least `no_of_elems` items are present.
    fn has(&self, no_of_elems: usize) -> bool;
    /// Swaps the top item with the one `no_from_top` positions below it.
    fn swap_with_top(&mut self, no_from_top: usize);
}

/// `Vec`-backed `Stack` implementation with a fixed capacity reservation.
pub struct VecStack<S> {
    stack: Vec<S>,
}

impl<S: Copy> VecStack<S> {
    /// Creates an empty stack reserving capacity for `capacity` items. The
    /// `zero` value is unused beyond documenting the expected fill value;
    /// kept for parity with the call site, which always has one handy.
    pub fn with_capacity(capacity: usize, _zero: S) -> Self {
        VecStack {
            stack: Vec::with_capacity(capacity),
        }
    }
}

impl<S> Stack<S> for VecStack<S> {
    fn peek(&self, no_from_top: usize) -> &S {
        &self.stack[self.stack.len() - no_from_top - 1]
    }

    fn peek_top(&self, no_of_elems: usize) -> &[S] {
        let len = self.stack.len();
        &self.stack[len - no_of_elems..]
    }

    fn pop_back(&mut self) -> S {
        self.stack
            .pop()
            .expect("stack bounds are checked by verify_instruction before any pop; qed")
    }

    fn pop_n(&mut self, no_of_elems: usize) -> Vec<S> {
        let new_len = self.stack.len() - no_of_elems;
        let mut popped = self.stack.split_off(new_len);
        popped.reverse();
        popped
    }

    fn push(&mut self, elem: S) {
        self.stack.push(elem);
    }

    fn size(&self) -> usize {
        self.stack.len()
    }

    fn has(&self, no_of_elems: usize) -> bool {
        self.stack.len() >= no_of_elems
    }

    fn swap_with_top(&mut self, no_from_top: usize) {
        let len = self.stack.len();
        self.stack.swap(len - 1, len - no_from_top - 1);
    }
}
