//! Brushes: what gets stamped into the map at each offset of a footprint

use crate::error::TilerError;
use crate::point::Point;
use crate::tile::{isqrt, TileId, TileProperties, TileTexture};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Smallest footprint side a normal brush can have
pub const MIN_BRUSH_SIZE: u32 = 1;
/// Largest footprint side a normal brush can have
pub const MAX_BRUSH_SIZE: u32 = 9;

pub fn clamp_brush_size(size: u32) -> u32 {
    size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
}

/// Payload written into one tile: pixels, identity and collision
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    /// Square pixel patch, row-major
    pub colors: Vec<Rgba<u8>>,
    pub properties: TileProperties,
    /// Square collision sub-grid, row-major
    pub collision: Vec<bool>,
}

impl Brush {
    pub fn new(colors: Vec<Rgba<u8>>, properties: TileProperties, collision: Vec<bool>) -> Self {
        Self {
            colors,
            properties,
            collision,
        }
    }

    /// A transparent brush of the empty tile
    pub fn empty(texture_size: u32) -> Self {
        let side = texture_size.max(1) as usize;
        Self::new(
            vec![Rgba([0, 0, 0, 0]); side * side],
            TileProperties::new(TileId::EMPTY),
            vec![false],
        )
    }

    /// Side length of the pixel patch
    pub fn size(&self) -> usize {
        isqrt(self.colors.len())
    }

    /// Turn pixels and collision a quarter clockwise and advance the rotation
    pub fn rotate(&mut self) {
        self.colors = rotate_square(&self.colors);
        self.collision = rotate_square(&self.collision);
        self.properties.rot = self.properties.rot.next();
    }

    /// Pixels resampled to another side length (nearest neighbour)
    pub fn colors_at(&self, size: u32) -> Vec<Rgba<u8>> {
        let side = self.size();
        if side == size as usize {
            return self.colors.clone();
        }
        scale_square(&self.colors, side, size as usize)
    }

    pub fn to_image(&self) -> RgbaImage {
        let side = self.size() as u32;
        let mut image = RgbaImage::new(side, side);
        for (i, color) in self.colors.iter().enumerate() {
            image.put_pixel(i as u32 % side, i as u32 / side, *color);
        }
        image
    }
}

/// `new[(s-1-x)*s + y] = old[y*s + x]`
fn rotate_square<T: Copy>(old: &[T]) -> Vec<T> {
    let s = isqrt(old.len());
    if s * s != old.len() || s < 2 {
        return old.to_vec();
    }
    let mut rotated = old.to_vec();
    for y in 0..s {
        for x in 0..s {
            rotated[(s - 1 - x) * s + y] = old[y * s + x];
        }
    }
    rotated
}

/// Nearest-neighbour resample of a square row-major buffer
pub(crate) fn scale_square<T: Copy>(src: &[T], side: usize, new_side: usize) -> Vec<T> {
    if side == 0 || new_side == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(new_side * new_side);
    for y in 0..new_side {
        let sy = y * side / new_side;
        for x in 0..new_side {
            let sx = x * side / new_side;
            out.push(src[sy * side + sx]);
        }
    }
    out
}

/// Width and height of the region a brush covers, centered on the target tile.
///
/// Even sizes extend one further right/up than left/down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn left(&self) -> i32 {
        (self.width as i32 - 1) / 2
    }

    pub fn right(&self) -> i32 {
        self.width as i32 / 2
    }

    pub fn down(&self) -> i32 {
        (self.height as i32 - 1) / 2
    }

    pub fn up(&self) -> i32 {
        self.height as i32 / 2
    }

    /// Every offset from the target, bottom row first
    pub fn offsets(&self) -> impl Iterator<Item = Point> {
        let (left, right, down, up) = (self.left(), self.right(), self.down(), self.up());
        (-down..=up).flat_map(move |y| (-left..=right).map(move |x| Point::new(x, y)))
    }
}

/// Anything that can be stamped into the map
pub trait Stamp {
    /// Payload for an offset inside the footprint
    fn get_brush(&self, x: i32, y: i32) -> Option<&Brush>;

    /// The footprint. `shared_size` is the session-wide brush size, used by
    /// brushes without a fixed shape of their own.
    fn footprint(&self, shared_size: u32) -> Footprint;

    /// Preview image, generated on demand
    fn preview(&mut self) -> &RgbaImage;

    fn rotate(&mut self);

    /// Free the preview image. It is rebuilt on the next [`Stamp::preview`].
    fn release_preview(&mut self);
}

/// One tile repeated over the whole footprint
#[derive(Debug, Clone)]
pub struct NormalBrush {
    brush: Brush,
    preview: Option<RgbaImage>,
}

impl NormalBrush {
    /// Brush of a tileset entry, resized to the map's tile pixel size
    pub fn new(texture_size: u32, tile: &TileTexture) -> Self {
        let size = texture_size.max(1);
        let pixels = if tile.image.dimensions() == (size, size) {
            tile.image.clone()
        } else {
            imageops::resize(&tile.image, size, size, FilterType::Nearest)
        };
        let colors = pixels.pixels().copied().collect();
        Self::from_brush(Brush::new(
            colors,
            TileProperties::new(tile.id),
            tile.collision.clone(),
        ))
    }

    pub fn from_brush(brush: Brush) -> Self {
        Self {
            brush,
            preview: None,
        }
    }

    /// A brush that erases to the empty tile
    pub fn empty(texture_size: u32) -> Self {
        Self::from_brush(Brush::empty(texture_size))
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn properties(&self) -> TileProperties {
        self.brush.properties
    }

    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }
}

impl Stamp for NormalBrush {
    fn get_brush(&self, _x: i32, _y: i32) -> Option<&Brush> {
        Some(&self.brush)
    }

    fn footprint(&self, shared_size: u32) -> Footprint {
        let size = clamp_brush_size(shared_size);
        Footprint::new(size, size)
    }

    fn preview(&mut self) -> &RgbaImage {
        let brush = &self.brush;
        self.preview.get_or_insert_with(|| brush.to_image())
    }

    fn rotate(&mut self) {
        self.brush.rotate();
        self.preview = None;
    }

    fn release_preview(&mut self) {
        self.preview = None;
    }
}

/// A captured rectangle of tiles, stamped as a block
#[derive(Debug, Clone)]
pub struct CopyBrush {
    width: u32,
    height: u32,
    /// Row-major, bottom row first
    brushes: Vec<Brush>,
    preview: Option<RgbaImage>,
}

impl CopyBrush {
    pub fn new(width: u32, height: u32, brushes: Vec<Brush>) -> Result<Self, TilerError> {
        if width == 0 || height == 0 || brushes.is_empty() {
            return Err(TilerError::EmptyCopyBrush);
        }
        let len = (width * height) as usize;
        if brushes.len() != len {
            return Err(TilerError::TileOutOfRange {
                index: brushes.len() as i64,
                len,
            });
        }
        Ok(Self {
            width,
            height,
            brushes,
            preview: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn brushes(&self) -> &[Brush] {
        &self.brushes
    }

    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    fn build_preview(&self) -> RgbaImage {
        let side = self.brushes.iter().map(|b| b.size()).max().unwrap_or(1) as u32;
        let mut image = RgbaImage::new(self.width * side, self.height * side);
        for (i, brush) in self.brushes.iter().enumerate() {
            let x = (i as u32 % self.width) * side;
            // Bottom row of the brush is the bottom row of the image
            let y = (self.height - 1 - i as u32 / self.width) * side;
            let patch = RgbaImage::from_vec(side, side, brush.colors_at(side).iter().flat_map(|c| c.0).collect());
            if let Some(patch) = patch {
                imageops::replace(&mut image, &patch, x as i64, y as i64);
            }
        }
        image
    }
}

impl Stamp for CopyBrush {
    fn get_brush(&self, x: i32, y: i32) -> Option<&Brush> {
        let fp = Footprint::new(self.width, self.height);
        let (col, row) = (x + fp.left(), y + fp.down());
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return None;
        }
        self.brushes.get((row * self.width as i32 + col) as usize)
    }

    fn footprint(&self, _shared_size: u32) -> Footprint {
        Footprint::new(self.width, self.height)
    }

    fn preview(&mut self) -> &RgbaImage {
        let preview = match self.preview.take() {
            Some(preview) => preview,
            None => self.build_preview(),
        };
        self.preview.insert(preview)
    }

    fn rotate(&mut self) {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut rotated = self.brushes.clone();
        for y in 0..h {
            for x in 0..w {
                let mut brush = self.brushes[y * w + x].clone();
                brush.rotate();
                rotated[(w - 1 - x) * h + y] = brush;
            }
        }
        self.brushes = rotated;
        std::mem::swap(&mut self.width, &mut self.height);
        self.preview = None;
    }

    fn release_preview(&mut self) {
        self.preview = None;
    }
}

/// Either brush kind, as held by the paint tool
#[derive(Debug, Clone)]
pub enum AnyBrush {
    Normal(NormalBrush),
    Copy(CopyBrush),
}

impl From<NormalBrush> for AnyBrush {
    fn from(brush: NormalBrush) -> Self {
        AnyBrush::Normal(brush)
    }
}

impl From<CopyBrush> for AnyBrush {
    fn from(brush: CopyBrush) -> Self {
        AnyBrush::Copy(brush)
    }
}

impl Stamp for AnyBrush {
    fn get_brush(&self, x: i32, y: i32) -> Option<&Brush> {
        match self {
            AnyBrush::Normal(b) => b.get_brush(x, y),
            AnyBrush::Copy(b) => b.get_brush(x, y),
        }
    }

    fn footprint(&self, shared_size: u32) -> Footprint {
        match self {
            AnyBrush::Normal(b) => b.footprint(shared_size),
            AnyBrush::Copy(b) => b.footprint(shared_size),
        }
    }

    fn preview(&mut self) -> &RgbaImage {
        match self {
            AnyBrush::Normal(b) => b.preview(),
            AnyBrush::Copy(b) => b.preview(),
        }
    }

    fn rotate(&mut self) {
        match self {
            AnyBrush::Normal(b) => b.rotate(),
            AnyBrush::Copy(b) => b.rotate(),
        }
    }

    fn release_preview(&mut self) {
        match self {
            AnyBrush::Normal(b) => b.release_preview(),
            AnyBrush::Copy(b) => b.release_preview(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Rotation;

    fn patterned(side: usize, id: u64) -> Brush {
        let colors = (0..side * side)
            .map(|i| Rgba([i as u8, (i * 3) as u8, id as u8, 255]))
            .collect();
        let collision = (0..4).map(|i| i % 3 == 0).collect();
        Brush::new(colors, TileProperties::new(TileId(id)), collision)
    }

    #[test]
    fn test_rotate_square_quarter_turn() {
        // 0 1      1 3
        // 2 3  ->  0 2
        let rotated = rotate_square(&[0, 1, 2, 3]);
        assert_eq!(rotated, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_four_rotations_are_identity() {
        let original = patterned(4, 5);
        let mut brush = original.clone();
        for _ in 0..4 {
            brush.rotate();
        }
        assert_eq!(brush, original);

        brush.rotate();
        assert_eq!(brush.properties.rot, Rotation::Clockwise90);
        assert_ne!(brush.colors, original.colors);
    }

    #[test]
    fn test_footprint_bounds() {
        let odd = Footprint::new(3, 3);
        assert_eq!((odd.left(), odd.right(), odd.down(), odd.up()), (1, 1, 1, 1));

        let even = Footprint::new(4, 2);
        assert_eq!((even.left(), even.right(), even.down(), even.up()), (1, 2, 0, 1));

        let offsets: Vec<_> = Footprint::new(2, 1).offsets().collect();
        assert_eq!(offsets, vec![Point::new(0, 0), Point::new(1, 0)]);
        assert_eq!(Footprint::new(3, 3).offsets().count(), 9);
    }

    #[test]
    fn test_normal_brush_uses_shared_size() {
        let brush = NormalBrush::from_brush(patterned(2, 9));
        assert_eq!(brush.footprint(3), Footprint::new(3, 3));
        assert_eq!(brush.footprint(0), Footprint::new(1, 1));
        assert_eq!(brush.footprint(20), Footprint::new(9, 9));
        assert_eq!(brush.get_brush(-4, 4).unwrap().properties.id, TileId(9));
    }

    #[test]
    fn test_normal_brush_from_texture_resizes() {
        let tile = TileTexture::new(
            TileId::new(1, 1),
            "dirt",
            RgbaImage::from_pixel(8, 8, Rgba([9, 9, 9, 255])),
            2,
        );
        let brush = NormalBrush::new(4, &tile);
        assert_eq!(brush.brush().size(), 4);
        assert_eq!(brush.brush().collision.len(), 4);
        assert_eq!(brush.properties().id, tile.id);
    }

    #[test]
    fn test_preview_released_on_rotate() {
        let mut brush = NormalBrush::from_brush(patterned(2, 1));
        assert_eq!(brush.preview().dimensions(), (2, 2));
        assert!(brush.has_preview());
        brush.rotate();
        assert!(!brush.has_preview());
        brush.preview();
        brush.release_preview();
        assert!(!brush.has_preview());
    }

    #[test]
    fn test_copy_brush_indexing() {
        let brushes: Vec<_> = (1..=6).map(|id| patterned(2, id)).collect();
        let copy = CopyBrush::new(3, 2, brushes).unwrap();
        let fp = copy.footprint(7);
        assert_eq!(fp, Footprint::new(3, 2));

        // Offsets run -1..=1 in x and 0..=1 in y
        assert_eq!(copy.get_brush(-1, 0).unwrap().properties.id, TileId(1));
        assert_eq!(copy.get_brush(1, 0).unwrap().properties.id, TileId(3));
        assert_eq!(copy.get_brush(-1, 1).unwrap().properties.id, TileId(4));
        assert!(copy.get_brush(2, 0).is_none());
        assert!(copy.get_brush(0, -1).is_none());
    }

    #[test]
    fn test_copy_brush_rotation() {
        let brushes: Vec<_> = (1..=6).map(|id| patterned(2, id)).collect();
        let original = CopyBrush::new(3, 2, brushes).unwrap();
        let mut copy = original.clone();

        copy.rotate();
        assert_eq!((copy.width(), copy.height()), (2, 3));
        // old (x=0, y=0) lands at row w-1-x = 2, column y = 0
        assert_eq!(copy.brushes()[2 * 2].properties.id, TileId(1));
        assert_eq!(copy.brushes()[4].properties.rot, Rotation::Clockwise90);

        for _ in 0..3 {
            copy.rotate();
        }
        assert_eq!((copy.width(), copy.height()), (3, 2));
        assert_eq!(copy.brushes(), original.brushes());
    }

    #[test]
    fn test_copy_brush_rejects_empty() {
        assert_eq!(
            CopyBrush::new(0, 2, Vec::new()).unwrap_err(),
            TilerError::EmptyCopyBrush
        );
        assert!(CopyBrush::new(2, 2, vec![patterned(2, 1)]).is_err());
    }

    #[test]
    fn test_copy_brush_preview_size() {
        let brushes: Vec<_> = (1..=2).map(|id| patterned(4, id)).collect();
        let mut copy = AnyBrush::from(CopyBrush::new(2, 1, brushes).unwrap());
        assert_eq!(copy.preview().dimensions(), (8, 4));
    }

    #[test]
    fn test_copy_brush_preview_cached_until_released() {
        let brushes: Vec<_> = (1..=2).map(|id| patterned(4, id)).collect();
        let mut copy = CopyBrush::new(1, 2, brushes).unwrap();
        assert!(!copy.has_preview());

        let first = copy.preview().clone();
        assert!(copy.has_preview());
        assert_eq!(copy.preview(), &first);

        copy.release_preview();
        assert!(!copy.has_preview());
        assert_eq!(copy.preview().dimensions(), (4, 8));
    }

    #[test]
    fn test_scale_square() {
        let scaled = scale_square(&[1, 2, 3, 4], 2, 4);
        assert_eq!(scaled.len(), 16);
        assert_eq!(&scaled[0..4], &[1, 1, 2, 2]);
        assert_eq!(&scaled[12..16], &[3, 3, 4, 4]);
        assert_eq!(scale_square(&scaled, 4, 2), vec![1, 2, 3, 4]);
    }
}
