//! Bounded undo/redo log of tile writes
//!
//! The log is a list of steps, each holding the prior state of every tile an
//! operation changed. `index` points at the step the next record goes into;
//! `-1` means there is nothing to undo. Undoing a step replays its records
//! through [`TilerMapEdit::change_tile`], which records the state being
//! overwritten into a fresh slot, and that slot becomes the redo step.

use crate::brush::Brush;
use crate::edit::TilerMapEdit;
use crate::map::TilerMap;
use crate::point::Point;

/// Default number of steps kept before the oldest is dropped
pub const MAX_UNDOS: usize = 10;

/// Prior state of one tile
#[derive(Debug, Clone)]
pub struct UndoRecord {
    /// Cell coordinate of the tile's cell
    pub cell: Point,
    /// Tile coordinate inside the cell
    pub local: Point,
    pub brush: Brush,
}

#[derive(Debug, Clone)]
pub struct UndoPaint {
    steps: Vec<Vec<UndoRecord>>,
    index: isize,
    capacity: usize,
}

impl Default for UndoPaint {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoPaint {
    pub fn new() -> Self {
        Self::with_capacity(MAX_UNDOS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            steps: Vec::new(),
            index: -1,
            capacity: capacity.max(1),
        }
    }

    pub fn clear(&mut self) {
        self.steps.clear();
        self.index = -1;
    }

    /// Open a new step for the next operation.
    ///
    /// Drops any redo history. If the current step is still empty it is
    /// reused. Past capacity the oldest step is evicted and the cursor stays
    /// on the new last step.
    pub fn new_undo(&mut self) {
        self.steps.truncate((self.index + 1) as usize);

        if self.current_is_empty() {
            return;
        }

        self.steps.push(Vec::new());
        if self.steps.len() > self.capacity {
            self.steps.remove(0);
            self.index = self.steps.len() as isize - 1;
        } else {
            self.index += 1;
        }
    }

    /// Record a tile's prior state in the current step, opening one if needed
    pub fn push(&mut self, cell: Point, local: Point, brush: Brush) {
        if self.index < 0 {
            self.new_undo();
        }
        if let Some(step) = self.steps.get_mut(self.index as usize) {
            step.push(UndoRecord { cell, local, brush });
        }
    }

    pub fn is_undo(&self) -> bool {
        self.index != -1
    }

    pub fn is_redo(&self) -> bool {
        self.index != self.steps.len() as isize - 1
    }

    /// Revert the current step. Returns the number of tiles restored.
    pub fn undo(&mut self, map: &mut TilerMap) -> usize {
        if self.index < 0 {
            return 0;
        }
        let slot = self.index as usize;
        let records = self.steps.remove(slot);
        self.steps.insert(slot, Vec::new());

        // Replay into the fresh slot so it collects the redo state
        let restored = self.replay(map, records);
        self.index -= 1;
        restored
    }

    /// Re-apply the step after the cursor. Returns the number of tiles changed.
    pub fn redo(&mut self, map: &mut TilerMap) -> usize {
        if !self.is_redo() {
            return 0;
        }
        let slot = (self.index + 1) as usize;
        let records = self.steps.remove(slot);
        self.steps.insert(slot, Vec::new());

        self.index = slot as isize;
        self.replay(map, records)
    }

    /// Newest records first, so a tile written twice in one step ends at its
    /// earliest prior state
    fn replay(&mut self, map: &mut TilerMap, records: Vec<UndoRecord>) -> usize {
        let mut edit = TilerMapEdit::new(map, self);
        let mut changed = 0;
        for record in records.into_iter().rev() {
            let Some(cell) = edit.map().find_cell_index(record.cell) else {
                tracing::warn!("Cell {} no longer exists, skipping undo record", record.cell);
                continue;
            };
            if edit.change_tile(cell, record.local, &record.brush).is_some() {
                changed += 1;
            }
        }
        edit.apply();
        changed
    }

    /// Number of steps held (undo and redo)
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Cursor position, `-1` when there is nothing to undo
    pub fn index(&self) -> isize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records in a step
    pub fn step_len(&self, step: usize) -> Option<usize> {
        self.steps.get(step).map(|s| s.len())
    }

    fn current_is_empty(&self) -> bool {
        self.index >= 0
            && self
                .steps
                .get(self.index as usize)
                .is_some_and(|s| s.is_empty())
    }
}
