//! Greedy maximal-rectangle merging of boolean occupancy grids
//!
//! Used to turn a cell's collision bitmap into a small set of box colliders.
//! Each pass builds a column-height histogram, finds the largest rectangle
//! standing on any row (classic monotonic-stack "largest rectangle in a
//! histogram"), records it, clears it from a working copy and repeats. When
//! only isolated cells remain they are emitted as 1x1 rectangles.
//!
//! The result is not guaranteed to be optimal, but it always covers the
//! occupied cells exactly, without overlap.

use serde::{Deserialize, Serialize};

/// Row-major boolean grid, `y` indexes rows and `x` indexes columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Create an empty (all free) grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Build a grid from rows. Short rows are padded with free cells.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.as_ref().len()).max().unwrap_or(0);
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, &occupied) in row.as_ref().iter().enumerate() {
                grid.set(x, y, occupied);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get a cell (out of bounds reads as free)
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.cells[y * self.width + x]
    }

    /// Set a cell (out of bounds writes are ignored)
    pub fn set(&mut self, x: usize, y: usize, occupied: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = occupied;
        }
    }

    /// Number of occupied cells
    pub fn count_occupied(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// True if no cell is occupied
    pub fn is_clear(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }
}

/// Width and height of a merged rectangle, in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RectSize {
    pub width: usize,
    pub height: usize,
}

/// A merged rectangle expressed by its minimum corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergedRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl MergedRect {
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Output of [`find_rects`]: a grid the same shape as the input where each
/// rectangle's anchor cell holds its size.
///
/// The anchor is the rectangle's first column on its highest row; the
/// rectangle extends `height - 1` rows downward (toward `y = 0`) from there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectMap {
    width: usize,
    height: usize,
    anchors: Vec<Option<RectSize>>,
}

impl RectMap {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            anchors: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Size of the rectangle anchored at (x, y), if any
    pub fn anchor(&self, x: usize, y: usize) -> Option<RectSize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.anchors[y * self.width + x]
    }

    fn set_anchor(&mut self, x: usize, y: usize, size: RectSize) {
        self.anchors[y * self.width + x] = Some(size);
    }

    /// Number of rectangles
    pub fn len(&self) -> usize {
        self.anchors.iter().filter(|a| a.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All rectangles in row-major anchor order, converted to min-corner form
    pub fn rects(&self) -> Vec<MergedRect> {
        let mut rects = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some(size) = self.anchors[y * self.width + x] {
                    rects.push(MergedRect {
                        x,
                        y: y + 1 - size.height,
                        width: size.width,
                        height: size.height,
                    });
                }
            }
        }
        rects
    }
}

/// Per-cell result of the histogram pass
#[derive(Debug, Clone, Copy, Default)]
struct Span {
    area: usize,
    left: usize,
    right: usize,
}

/// Decompose the occupied cells of `grid` into axis-aligned rectangles.
///
/// The input is not modified; the search runs on a working copy.
pub fn find_rects(grid: &OccupancyGrid) -> RectMap {
    let (width, height) = (grid.width, grid.height);
    let mut work = grid.clone();
    let mut result = RectMap::new(width, height);

    loop {
        let heights = column_heights(&work);

        // Row-major scan, first maximum wins
        let mut best = (0usize, 0usize);
        let mut best_span = Span::default();
        for y in 0..height {
            let row = &heights[y * width..(y + 1) * width];
            for (x, span) in row_spans(row).into_iter().enumerate() {
                if span.area > best_span.area {
                    best_span = span;
                    best = (x, y);
                }
            }
        }

        if best_span.area < 2 {
            for y in 0..height {
                for x in 0..width {
                    if work.get(x, y) {
                        result.set_anchor(
                            x,
                            y,
                            RectSize {
                                width: 1,
                                height: 1,
                            },
                        );
                    }
                }
            }
            return result;
        }

        let rect_width = best_span.left + best_span.right + 1;
        let rect_height = best_span.area / rect_width;
        let (bx, by) = best;
        let min_x = bx - best_span.left;

        result.set_anchor(
            min_x,
            by,
            RectSize {
                width: rect_width,
                height: rect_height,
            },
        );

        for dy in 0..rect_height {
            for dx in 0..rect_width {
                work.set(min_x + dx, by - dy, false);
            }
        }
    }
}

/// `heights[y * width + x]` = run of occupied cells in column `x` ending at row `y`
fn column_heights(grid: &OccupancyGrid) -> Vec<usize> {
    let (width, height) = (grid.width, grid.height);
    let mut heights = vec![0usize; width * height];
    for y in 0..height {
        for x in 0..width {
            if grid.get(x, y) {
                heights[y * width + x] = if y == 0 {
                    1
                } else {
                    heights[(y - 1) * width + x] + 1
                };
            }
        }
    }
    heights
}

/// For each bar, how far it extends left/right while neighbours are at least
/// as tall, and the area of that rectangle
fn row_spans(heights: &[usize]) -> Vec<Span> {
    let n = heights.len();
    let mut spans = vec![Span::default(); n];
    let mut stack: Vec<usize> = Vec::with_capacity(n);

    for i in 0..n {
        while let Some(&top) = stack.last() {
            if heights[i] <= heights[top] {
                stack.pop();
            } else {
                break;
            }
        }
        spans[i].left = match stack.last() {
            Some(&t) => i - t - 1,
            None => i,
        };
        stack.push(i);
    }

    stack.clear();

    for i in (0..n).rev() {
        while let Some(&top) = stack.last() {
            if heights[i] <= heights[top] {
                stack.pop();
            } else {
                break;
            }
        }
        spans[i].right = match stack.last() {
            Some(&t) => t - i - 1,
            None => n - i - 1,
        };
        stack.push(i);
    }

    for (i, span) in spans.iter_mut().enumerate() {
        span.area = heights[i] * (span.left + span.right + 1);
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[u8]]) -> OccupancyGrid {
        let rows: Vec<Vec<bool>> = rows
            .iter()
            .map(|r| r.iter().map(|&c| c != 0).collect())
            .collect();
        OccupancyGrid::from_rows(&rows)
    }

    /// Every occupied cell covered exactly once, no free cell covered
    fn assert_exact_cover(input: &OccupancyGrid, map: &RectMap) {
        let rects = map.rects();
        for y in 0..input.height() {
            for x in 0..input.width() {
                let hits = rects.iter().filter(|r| r.contains(x, y)).count();
                if input.get(x, y) {
                    assert_eq!(hits, 1, "cell ({x}, {y}) covered {hits} times");
                } else {
                    assert_eq!(hits, 0, "free cell ({x}, {y}) covered");
                }
            }
        }
    }

    #[test]
    fn test_empty_grid_has_no_rects() {
        let input = OccupancyGrid::new(4, 3);
        let map = find_rects(&input);
        assert!(map.is_empty());
        assert!(map.rects().is_empty());
    }

    #[test]
    fn test_zero_sized_grid() {
        let input = OccupancyGrid::new(0, 0);
        assert!(find_rects(&input).is_empty());
    }

    #[test]
    fn test_single_cell() {
        let mut input = OccupancyGrid::new(3, 3);
        input.set(1, 2, true);
        let map = find_rects(&input);
        assert_eq!(
            map.rects(),
            vec![MergedRect {
                x: 1,
                y: 2,
                width: 1,
                height: 1
            }]
        );
    }

    #[test]
    fn test_two_by_two_block() {
        let input = grid(&[&[1, 1, 0], &[1, 1, 0], &[0, 0, 0]]);
        let map = find_rects(&input);

        assert_eq!(map.len(), 1);
        assert_eq!(
            map.anchor(0, 1),
            Some(RectSize {
                width: 2,
                height: 2
            })
        );
        assert_eq!(
            map.rects(),
            vec![MergedRect {
                x: 0,
                y: 0,
                width: 2,
                height: 2
            }]
        );
    }

    #[test]
    fn test_full_grid_is_one_rect() {
        let input = grid(&[&[1, 1, 1, 1], &[1, 1, 1, 1], &[1, 1, 1, 1]]);
        let map = find_rects(&input);
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.anchor(0, 2),
            Some(RectSize {
                width: 4,
                height: 3
            })
        );
    }

    #[test]
    fn test_l_shape() {
        let input = grid(&[&[1, 0, 0], &[1, 0, 0], &[1, 1, 1]]);
        let map = find_rects(&input);

        // Column and bottom row both have area 3; the column's bar at (0, 2) is
        // scanned first, leaving a 2x1 remainder
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.anchor(0, 2),
            Some(RectSize {
                width: 1,
                height: 3
            })
        );
        assert_eq!(
            map.anchor(1, 2),
            Some(RectSize {
                width: 2,
                height: 1
            })
        );
        assert_exact_cover(&input, &map);
    }

    #[test]
    fn test_checkerboard_emits_singles() {
        let input = grid(&[&[1, 0, 1], &[0, 1, 0], &[1, 0, 1]]);
        let map = find_rects(&input);
        assert_eq!(map.len(), 5);
        assert!(map.rects().iter().all(|r| r.area() == 1));
        assert_exact_cover(&input, &map);
    }

    #[test]
    fn test_exact_cover_on_irregular_shapes() {
        let shapes: Vec<OccupancyGrid> = vec![
            grid(&[
                &[1, 1, 0, 1, 1],
                &[1, 1, 1, 1, 0],
                &[0, 1, 1, 1, 0],
                &[1, 1, 0, 0, 1],
            ]),
            grid(&[&[0, 1, 1, 1, 1, 1], &[1, 1, 1, 0, 1, 1]]),
            grid(&[&[1], &[1], &[0], &[1]]),
            grid(&[
                &[1, 1, 1, 1],
                &[1, 0, 0, 1],
                &[1, 0, 0, 1],
                &[1, 1, 1, 1],
            ]),
        ];

        for input in &shapes {
            let map = find_rects(input);
            assert_exact_cover(input, &map);
            let covered: usize = map.rects().iter().map(|r| r.area()).sum();
            assert_eq!(covered, input.count_occupied());
        }
    }

    #[test]
    fn test_pseudo_random_grids_cover_exactly() {
        // Small xorshift so the test stays deterministic without extra crates
        let mut state: u32 = 0x9E37_79B9;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };

        for _ in 0..50 {
            let w = (next() % 9 + 1) as usize;
            let h = (next() % 9 + 1) as usize;
            let mut input = OccupancyGrid::new(w, h);
            for y in 0..h {
                for x in 0..w {
                    input.set(x, y, next() % 3 != 0);
                }
            }
            let map = find_rects(&input);
            assert_exact_cover(&input, &map);
        }
    }

    #[test]
    fn test_input_is_not_modified() {
        let input = grid(&[&[1, 1], &[1, 1]]);
        let copy = input.clone();
        let _ = find_rects(&input);
        assert_eq!(input, copy);
    }

    #[test]
    fn test_row_spans() {
        let spans = row_spans(&[2, 1, 5, 6, 2, 3]);
        let areas: Vec<usize> = spans.iter().map(|s| s.area).collect();
        assert_eq!(areas, vec![2, 6, 10, 6, 8, 3]);
        assert_eq!(spans[2].left, 0);
        assert_eq!(spans[2].right, 1);
    }
}
