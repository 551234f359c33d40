// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Rolling tag matcher.
//!
//! One byte in, one step of a KMP automaton out. `matched` is the length of
//! the longest tag prefix that ends at the last byte fed. On a mismatch the
//! pointer falls back through the failure table instead of dropping to zero,
//! so an occurrence is found no matter where scanning started; for tags
//! whose first byte never recurs (`<DOC>`, `<page>`) the fallback is zero.

/// Incremental matcher for one delimiter tag.
#[derive(Debug, Clone)]
pub struct TagMatcher {
    tag: Vec<u8>,
    /// fail[i] = length of the longest proper border of tag[..=i]
    fail: Vec<usize>,
    matched: usize,
}

impl TagMatcher {
    /// Build a matcher. `tag` must be non-empty.
    pub fn new(tag: &[u8]) -> Self {
        debug_assert!(!tag.is_empty(), "delimiter tags are validated non-empty");
        let mut fail = vec![0usize; tag.len()];
        let mut k = 0;
        for i in 1..tag.len() {
            while k > 0 && tag[i] != tag[k] {
                k = fail[k - 1];
            }
            if tag[i] == tag[k] {
                k += 1;
            }
            fail[i] = k;
        }
        Self {
            tag: tag.to_vec(),
            fail,
            matched: 0,
        }
    }

    /// Feed one byte. Returns true when it completes the tag; the pointer is
    /// then reset so matches never overlap.
    #[inline]
    pub fn advance(&mut self, byte: u8) -> bool {
        while self.matched > 0 && self.tag[self.matched] != byte {
            self.matched = self.fail[self.matched - 1];
        }
        if self.tag[self.matched] == byte {
            self.matched += 1;
        }
        if self.matched == self.tag.len() {
            self.matched = 0;
            return true;
        }
        false
    }

    /// Length of the partial match ending at the last byte fed.
    #[inline]
    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn reset(&mut self) {
        self.matched = 0;
    }

    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    pub fn len(&self) -> usize {
        self.tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tag.is_empty()
    }
}

/// Position of the first occurrence of `needle` in `haystack`.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    let mut matcher = TagMatcher::new(needle);
    haystack
        .iter()
        .position(|&b| matcher.advance(b))
        .map(|end| end + 1 - needle.len())
}
