//! # Placement Allocator
//!
//! Picks a free canvas slot for a new process group by scanning a fixed-size grid.
//! NiFi does not expose the rendered size of canvas elements, so every element is
//! treated as a box of the same fixed width and height.

use crate::constants::layout;
use crate::models::Position;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementAllocator {
    pub element_width: f64,
    pub element_height: f64,
    pub max_x: f64,
}

impl Default for PlacementAllocator {
    fn default() -> Self {
        Self {
            element_width: layout::ELEMENT_WIDTH,
            element_height: layout::ELEMENT_HEIGHT,
            max_x: layout::MAX_X,
        }
    }
}

impl PlacementAllocator {
    /// First grid slot, scanning rows left to right from the origin, whose box overlaps
    /// no occupied box
    pub fn next_position(&self, occupied: &[Position]) -> Position {
        let mut x = 0.0;
        let mut y = 0.0;

        while occupied.iter().any(|taken| self.overlaps(*taken, x, y)) {
            if x + self.element_width > self.max_x {
                x = 0.0;
                y += self.element_height;
            } else {
                x += self.element_width;
            }
        }

        Position::new(x, y)
    }

    /// Closed-interval intersection of the two boxes on both axes
    fn overlaps(&self, taken: Position, x: f64, y: f64) -> bool {
        let w = self.element_width;
        let h = self.element_height;
        let horizontal = (taken.x <= x && x <= taken.x + w) || (taken.x <= x + w && x <= taken.x);
        let vertical = (taken.y <= y && y <= taken.y + h) || (taken.y <= y + h && y <= taken.y);
        horizontal && vertical
    }
}
