//! Drawing tools and the brushes they accept

use tiler_core::{AnyBrush, NormalBrush, Point, Stamp, TilerMapEdit};

/// Which tool is active, without its brush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    #[default]
    Paint,
    Fill,
    Replace,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Paint => "Paint",
            ToolKind::Fill => "Fill",
            ToolKind::Replace => "Replace",
        }
    }
}

/// The active tool together with its brush.
///
/// Paint takes any brush. Fill and replace match on a single tile identity,
/// so they only hold a normal brush.
#[derive(Debug, Clone)]
pub enum DrawTool {
    Paint(AnyBrush),
    Fill(NormalBrush),
    Replace(NormalBrush),
}

impl DrawTool {
    pub fn new(kind: ToolKind, brush: AnyBrush, texture_size: u32) -> Self {
        match kind {
            ToolKind::Paint => DrawTool::Paint(brush),
            ToolKind::Fill => DrawTool::Fill(normal_or_empty(brush, texture_size)),
            ToolKind::Replace => DrawTool::Replace(normal_or_empty(brush, texture_size)),
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            DrawTool::Paint(_) => ToolKind::Paint,
            DrawTool::Fill(_) => ToolKind::Fill,
            DrawTool::Replace(_) => ToolKind::Replace,
        }
    }

    /// Switch tool kind, carrying the brush across where it is accepted
    pub fn switch(self, kind: ToolKind, texture_size: u32) -> Self {
        if self.kind() == kind {
            return self;
        }
        DrawTool::new(kind, self.into_brush(), texture_size)
    }

    /// Replace the brush. A copy brush given to fill or replace falls back to an empty brush.
    pub fn set_brush(&mut self, brush: AnyBrush, texture_size: u32) {
        *self = DrawTool::new(self.kind(), brush, texture_size);
    }

    pub fn brush(&self) -> &dyn Stamp {
        match self {
            DrawTool::Paint(b) => b as &dyn Stamp,
            DrawTool::Fill(b) | DrawTool::Replace(b) => b as &dyn Stamp,
        }
    }

    pub fn brush_mut(&mut self) -> &mut dyn Stamp {
        match self {
            DrawTool::Paint(b) => b as &mut dyn Stamp,
            DrawTool::Fill(b) | DrawTool::Replace(b) => b as &mut dyn Stamp,
        }
    }

    /// The single-tile brush, if that is what the tool holds
    pub fn normal_brush(&self) -> Option<&NormalBrush> {
        match self {
            DrawTool::Paint(AnyBrush::Normal(b)) | DrawTool::Fill(b) | DrawTool::Replace(b) => {
                Some(b)
            }
            DrawTool::Paint(AnyBrush::Copy(_)) => None,
        }
    }

    /// True when the shared brush size drives the footprint
    pub fn uses_brush_size(&self) -> bool {
        matches!(self, DrawTool::Paint(AnyBrush::Normal(_)))
    }

    pub fn into_brush(self) -> AnyBrush {
        match self {
            DrawTool::Paint(b) => b,
            DrawTool::Fill(b) | DrawTool::Replace(b) => AnyBrush::Normal(b),
        }
    }

    /// Run the tool at a world tile. Returns the number of tiles changed.
    pub fn apply(&self, edit: &mut TilerMapEdit<'_>, point: Point, brush_size: u32) -> usize {
        match self {
            DrawTool::Paint(brush) => edit.paint(point, brush, brush_size),
            DrawTool::Fill(brush) => edit.fill(point, brush),
            DrawTool::Replace(brush) => edit.replace(point, brush),
        }
    }
}

fn normal_or_empty(brush: AnyBrush, texture_size: u32) -> NormalBrush {
    match brush {
        AnyBrush::Normal(b) => b,
        AnyBrush::Copy(_) => NormalBrush::empty(texture_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiler_core::{Brush, CopyBrush, TileId, TileProperties};

    fn normal(id: u64) -> NormalBrush {
        NormalBrush::from_brush(Brush::new(
            vec![tiler_core::Rgba([1, 2, 3, 255]); 4],
            TileProperties::new(TileId(id)),
            vec![false],
        ))
    }

    fn copy() -> CopyBrush {
        CopyBrush::new(1, 2, vec![normal(1).brush().clone(), normal(2).brush().clone()]).unwrap()
    }

    #[test]
    fn test_switch_keeps_normal_brush() {
        let tool = DrawTool::new(ToolKind::Paint, normal(4).into(), 2);
        let fill = tool.switch(ToolKind::Fill, 2);
        assert_eq!(fill.kind(), ToolKind::Fill);
        assert_eq!(fill.normal_brush().unwrap().properties().id, TileId(4));
    }

    #[test]
    fn test_copy_brush_rejected_by_fill_and_replace() {
        let mut tool = DrawTool::new(ToolKind::Replace, normal(4).into(), 2);
        tool.set_brush(copy().into(), 2);
        assert_eq!(tool.kind(), ToolKind::Replace);
        assert!(tool.normal_brush().unwrap().properties().id.is_empty());

        let paint = DrawTool::new(ToolKind::Paint, copy().into(), 2);
        assert!(paint.normal_brush().is_none());
        assert!(!paint.uses_brush_size());
        assert_eq!(paint.brush().footprint(5).height, 2);
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(ToolKind::Paint.name(), "Paint");
        assert_eq!(ToolKind::default(), ToolKind::Paint);
    }
}
