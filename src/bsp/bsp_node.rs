//! src/bsp/bsp_node.rs

use rand::{Rng, RngCore};

use crate::utils::Rect;

/// Handle of a leaf inside its [`LeafTree`]. Only the tree hands these
/// out; a handle from another tree is simply not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafId(pub(crate) usize);

/// A node in the partition tree. Each leaf has:
/// - The rectangle it covers.
/// - Either two children (split) or none (terminal).
/// - A room, only ever set on terminal leaves.
#[derive(Debug, Clone)]
pub struct Leaf {
    pub bounds: Rect,
    pub children: Option<(LeafId, LeafId)>,
    pub room: Option<Rect>,
    pub depth: u32,
}

impl Leaf {
    fn new(bounds: Rect, depth: u32) -> Self {
        Leaf {
            bounds,
            children: None,
            room: None,
            depth,
        }
    }

    /// Returns `true` if the leaf was never split.
    pub fn is_terminal(&self) -> bool {
        self.children.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitAxis {
    /// Cut along x: children sit side by side.
    Vertical,
    /// Cut along y: children are stacked.
    Horizontal,
}

impl SplitAxis {
    fn other(self) -> SplitAxis {
        match self {
            SplitAxis::Vertical => SplitAxis::Horizontal,
            SplitAxis::Horizontal => SplitAxis::Vertical,
        }
    }
}

/// Binary space partition over a rectangle, stored as an arena. Children
/// are always pushed after their parent, so a leaf's index is greater than
/// its parent's.
#[derive(Debug, Clone)]
pub struct LeafTree {
    leaves: Vec<Leaf>,
}

impl LeafTree {
    pub fn new(bounds: Rect) -> Self {
        LeafTree {
            leaves: vec![Leaf::new(bounds, 0)],
        }
    }

    pub fn root(&self) -> LeafId {
        LeafId(0)
    }

    pub fn get(&self, id: LeafId) -> Option<&Leaf> {
        self.leaves.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LeafId, &Leaf)> {
        self.leaves.iter().enumerate().map(|(i, leaf)| (LeafId(i), leaf))
    }

    pub fn terminal_leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.leaves.iter().filter(|leaf| leaf.is_terminal())
    }

    /// Rooms of every terminal leaf, in arena order.
    pub fn rooms(&self) -> Vec<Rect> {
        self.terminal_leaves().filter_map(|leaf| leaf.room).collect()
    }

    /// Keep splitting terminal leaves wider or taller than `max_size` until
    /// a full pass makes no progress. Returns the number of splits.
    pub fn split_until_fit(&mut self, max_size: i32, min_size: i32, rng: &mut dyn RngCore) -> usize {
        let mut splits = 0;
        loop {
            let mut split_any = false;
            // Leaves pushed during the pass are visited in the same pass.
            let mut i = 0;
            while i < self.leaves.len() {
                let leaf = &self.leaves[i];
                if leaf.is_terminal()
                    && (leaf.bounds.width > max_size || leaf.bounds.height > max_size)
                    && self.split_leaf(LeafId(i), min_size, rng)
                {
                    split_any = true;
                    splits += 1;
                }
                i += 1;
            }
            if !split_any {
                break;
            }
        }
        splits
    }

    /// Try to split a terminal leaf in two, both halves at least `min_size`
    /// along the cut axis.
    pub fn split_leaf(&mut self, id: LeafId, min_size: i32, rng: &mut dyn RngCore) -> bool {
        let Some(leaf) = self.leaves.get(id.0) else {
            return false;
        };
        if !leaf.is_terminal() {
            return false;
        }
        let (bounds, depth) = (leaf.bounds, leaf.depth);

        let preferred = preferred_axis(&bounds, rng);
        let halves = split_rect(&bounds, preferred, min_size, rng)
            .or_else(|| split_rect(&bounds, preferred.other(), min_size, rng));
        let Some((first, second)) = halves else {
            return false;
        };

        let first_id = LeafId(self.leaves.len());
        self.leaves.push(Leaf::new(first, depth + 1));
        let second_id = LeafId(self.leaves.len());
        self.leaves.push(Leaf::new(second, depth + 1));
        self.leaves[id.0].children = Some((first_id, second_id));
        true
    }

    /// Give every terminal leaf a room between `min_size` and `max_size`
    /// on each side, clamped to what fits, keeping `margin` tiles free on
    /// every edge of the leaf. Leaves too small for a 3x3 room stay empty.
    pub fn place_rooms(&mut self, min_size: i32, max_size: i32, margin: i32, rng: &mut dyn RngCore) {
        for leaf in self.leaves.iter_mut().filter(|leaf| leaf.is_terminal()) {
            leaf.room = room_within(&leaf.bounds, min_size, max_size, margin, rng);
        }
    }

    /// A room somewhere in the subtree under `id`; picks a random side at
    /// each split and falls back to the other side when it has none.
    pub fn random_room(&self, id: LeafId, rng: &mut dyn RngCore) -> Option<Rect> {
        let leaf = self.leaves.get(id.0)?;
        match leaf.children {
            None => leaf.room,
            Some((a, b)) => {
                let (first, second) = if rng.random_bool(0.5) { (a, b) } else { (b, a) };
                self.random_room(first, rng)
                    .or_else(|| self.random_room(second, rng))
            }
        }
    }

    /// Sibling pairs, deepest first: every pair appears after all pairs
    /// inside either of its subtrees.
    pub fn sibling_pairs(&self) -> Vec<(LeafId, LeafId)> {
        self.leaves
            .iter()
            .rev()
            .filter_map(|leaf| leaf.children)
            .collect()
    }
}

/// Favour cutting across the longer side once it is 25% longer than the
/// other, otherwise flip a coin.
fn preferred_axis(bounds: &Rect, rng: &mut dyn RngCore) -> SplitAxis {
    if bounds.width * 4 >= bounds.height * 5 {
        SplitAxis::Vertical
    } else if bounds.height * 4 >= bounds.width * 5 {
        SplitAxis::Horizontal
    } else if rng.random_bool(0.5) {
        SplitAxis::Vertical
    } else {
        SplitAxis::Horizontal
    }
}

fn split_rect(
    bounds: &Rect,
    axis: SplitAxis,
    min_size: i32,
    rng: &mut dyn RngCore,
) -> Option<(Rect, Rect)> {
    let extent = match axis {
        SplitAxis::Vertical => bounds.width,
        SplitAxis::Horizontal => bounds.height,
    };
    if extent - min_size < min_size {
        return None;
    }
    let offset = rng.random_range(min_size..=extent - min_size);
    let halves = match axis {
        SplitAxis::Vertical => (
            Rect::new(bounds.x, bounds.y, offset, bounds.height),
            Rect::new(bounds.x + offset, bounds.y, bounds.width - offset, bounds.height),
        ),
        SplitAxis::Horizontal => (
            Rect::new(bounds.x, bounds.y, bounds.width, offset),
            Rect::new(bounds.x, bounds.y + offset, bounds.width, bounds.height - offset),
        ),
    };
    Some(halves)
}

fn room_within(
    bounds: &Rect,
    min_size: i32,
    max_size: i32,
    margin: i32,
    rng: &mut dyn RngCore,
) -> Option<Rect> {
    let free_width = bounds.width - 2 * margin;
    let free_height = bounds.height - 2 * margin;
    if free_width < 3 || free_height < 3 {
        return None;
    }

    let width = rng.random_range(min_size.min(free_width)..=max_size.min(free_width));
    let height = rng.random_range(min_size.min(free_height)..=max_size.min(free_height));
    let x = rng.random_range(bounds.x + margin..=bounds.right() - margin - width);
    let y = rng.random_range(bounds.y + margin..=bounds.bottom() - margin - height);
    Some(Rect::new(x, y, width, height))
}
