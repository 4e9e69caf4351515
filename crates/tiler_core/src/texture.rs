//! Backing image of a cell with region reads/writes and a deferred commit

use image::{Rgba, RgbaImage};

/// Fill colour of a freshly created cell: light grey, fully transparent
pub const CLEAR_COLOR: Rgba<u8> = Rgba([205, 205, 205, 0]);

/// One texture covering a whole cell. Tiles own square sub-regions of it.
///
/// Writes land in the pixel buffer immediately but are only considered
/// committed once [`CellTexture::apply`] runs, mirroring a GPU upload.
#[derive(Debug, Clone)]
pub struct CellTexture {
    image: RgbaImage,
    revision: u64,
    pending: usize,
}

impl CellTexture {
    /// A square texture filled with [`CLEAR_COLOR`]
    pub fn new(resolution: u32) -> Self {
        Self::from_image(RgbaImage::from_pixel(resolution, resolution, CLEAR_COLOR))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image,
            revision: 0,
            pending: 0,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Read a rectangular region row-major. Returns None if it leaves the image.
    pub fn get_pixels(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Vec<Rgba<u8>>> {
        if !self.contains(x, y, width, height) {
            return None;
        }
        let mut out = Vec::with_capacity((width * height) as usize);
        for py in y..y + height {
            for px in x..x + width {
                out.push(*self.image.get_pixel(px, py));
            }
        }
        Some(out)
    }

    /// Write a rectangular region row-major. Returns false (writing nothing)
    /// when the region leaves the image or the buffer has the wrong length.
    pub fn set_pixels(&mut self, x: u32, y: u32, width: u32, height: u32, colors: &[Rgba<u8>]) -> bool {
        if !self.contains(x, y, width, height) || colors.len() != (width * height) as usize {
            return false;
        }
        for (i, color) in colors.iter().enumerate() {
            let px = x + i as u32 % width;
            let py = y + i as u32 / width;
            self.image.put_pixel(px, py, *color);
        }
        self.pending += 1;
        true
    }

    /// Commit all region writes since the last apply
    pub fn apply(&mut self) {
        if self.pending > 0 {
            self.revision += 1;
            self.pending = 0;
        }
    }

    /// Number of region writes waiting for [`CellTexture::apply`]
    pub fn pending_writes(&self) -> usize {
        self.pending
    }

    /// Incremented once per apply that had pending writes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn contains(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        x.checked_add(width).is_some_and(|r| r <= self.image.width())
            && y.checked_add(height).is_some_and(|b| b <= self.image.height())
    }
}
