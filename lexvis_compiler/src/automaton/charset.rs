//! Code point sets as sorted, merged, inclusive intervals

use crate::artifact::schema::MAX_CHAR;

/// Ranges wider than this are not scanned for case variants
const CASE_FOLD_SCAN_LIMIT: u32 = 0x3_0000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharSet {
    ranges: Vec<(u32, u32)>,
}

impl CharSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_char(c: char) -> Self {
        Self::from_range(c as u32, c as u32)
    }

    pub fn from_range(lo: u32, hi: u32) -> Self {
        let mut set = Self::new();
        set.add_range(lo, hi);
        set
    }

    pub fn full() -> Self {
        Self::from_range(0, MAX_CHAR)
    }

    pub fn add_range(&mut self, lo: u32, hi: u32) {
        if lo > hi {
            return;
        }
        self.ranges.push((lo, hi.min(MAX_CHAR)));
        self.normalize();
    }

    pub fn union(&mut self, other: &CharSet) {
        self.ranges.extend_from_slice(&other.ranges);
        self.normalize();
    }

    /// Everything in `0..=MAX_CHAR` not in this set
    pub fn complement(&self) -> CharSet {
        let mut ranges = Vec::with_capacity(self.ranges.len() + 1);
        let mut next = 0u32;
        for &(lo, hi) in &self.ranges {
            if lo > next {
                ranges.push((next, lo - 1));
            }
            next = hi.saturating_add(1);
        }
        if next <= MAX_CHAR {
            ranges.push((next, MAX_CHAR));
        }
        CharSet { ranges }
    }

    /// Add the simple upper and lower case forms of every member
    pub fn case_folded(&self) -> CharSet {
        let mut extra = Vec::new();
        for &(lo, hi) in &self.ranges {
            if hi - lo > CASE_FOLD_SCAN_LIMIT {
                continue;
            }
            for c in (lo..=hi).filter_map(char::from_u32) {
                push_single(c.to_lowercase(), &mut extra);
                push_single(c.to_uppercase(), &mut extra);
            }
        }

        let mut folded = self.clone();
        folded.ranges.extend(extra.into_iter().map(|c| (c, c)));
        folded.normalize();
        folded
    }

    pub fn contains(&self, c: u32) -> bool {
        self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }

    pub fn into_ranges(self) -> Vec<(u32, u32)> {
        self.ranges
    }

    fn normalize(&mut self) {
        self.ranges.sort_unstable();
        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(self.ranges.len());
        for &(lo, hi) in &self.ranges {
            match merged.last_mut() {
                Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        self.ranges = merged;
    }
}

fn push_single(mut mapped: impl Iterator<Item = char>, out: &mut Vec<u32>) {
    if let (Some(c), None) = (mapped.next(), mapped.next()) {
        out.push(c as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cp(c: char) -> u32 {
        c as u32
    }

    #[test]
    fn test_merges_adjacent_and_overlapping() {
        let mut set = CharSet::from_range(cp('a'), cp('f'));
        set.add_range(cp('g'), cp('k'));
        set.add_range(cp('0'), cp('9'));
        set.add_range(cp('5'), cp('7'));
        assert_eq!(set.ranges(), &[(cp('0'), cp('9')), (cp('a'), cp('k'))]);
    }

    #[test]
    fn test_complement() {
        let set = CharSet::from_char('\n');
        let complement = set.complement();
        assert_eq!(complement.ranges(), &[(0, 9), (11, MAX_CHAR)]);
        assert!(CharSet::full().complement().is_empty());
        assert_eq!(CharSet::new().complement(), CharSet::full());
    }

    #[test]
    fn test_case_folding() {
        let folded = CharSet::from_range(cp('a'), cp('c')).case_folded();
        assert_eq!(folded.ranges(), &[(cp('A'), cp('C')), (cp('a'), cp('c'))]);
        assert!(CharSet::from_char('É').case_folded().contains(cp('é')));
        assert!(CharSet::from_char('1').case_folded() == CharSet::from_char('1'));
    }
}
