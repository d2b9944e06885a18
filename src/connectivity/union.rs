// src/connectivity/union.rs

use union_find::{QuickUnionUf, UnionBySize, UnionFind};

/// Disjoint sets over section indices, tracking how many connected
/// components are left.
pub struct SectionUnion {
    sets: QuickUnionUf<UnionBySize>,
    components: usize,
}

impl SectionUnion {
    pub fn new(len: usize) -> Self {
        SectionUnion {
            sets: QuickUnionUf::<UnionBySize>::new(len),
            components: len,
        }
    }

    /// Merge the sets holding `a` and `b`. Returns false if they were
    /// already merged.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let merged = self.sets.union(a, b);
        if merged {
            self.components -= 1;
        }
        merged
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.sets.find(a) == self.sets.find(b)
    }

    pub fn components(&self) -> usize {
        self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_counts_components() {
        let mut sets = SectionUnion::new(4);
        assert_eq!(sets.components(), 4);

        assert!(sets.union(0, 1));
        assert!(sets.union(2, 3));
        assert_eq!(sets.components(), 2);

        // Already merged.
        assert!(!sets.union(1, 0));
        assert_eq!(sets.components(), 2);

        assert!(sets.union(1, 3));
        assert_eq!(sets.components(), 1);
        assert!(sets.connected(0, 2));
    }

    #[test]
    fn test_empty_union_has_no_components() {
        let sets = SectionUnion::new(0);
        assert_eq!(sets.components(), 0);
    }
}
