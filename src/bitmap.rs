/// Fixed-size binary grid for contour tracing.
///
/// Coordinates are raster order: x to the right, y downward, (0, 0) at the
/// top-left pixel. Out-of-bounds queries read as background rather than
/// erroring, which lets the boundary walk probe past the edges freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl Bitmap {
    /// Create an all-background bitmap. No resizing after construction.
    pub fn new(width: usize, height: usize) -> Self {
        Bitmap {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    /// Build a bitmap from row-major cell values (non-zero = foreground).
    ///
    /// Panics if `data.len() != width * height`.
    pub fn from_data(width: usize, height: usize, data: &[u8]) -> Self {
        assert_eq!(data.len(), width * height, "bitmap size mismatch");
        Bitmap {
            width,
            height,
            data: data.iter().map(|&v| v != 0).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the cell at (x, y) is foreground. Out of bounds = false.
    pub fn at(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        x < self.width && y < self.height && self.data[y * self.width + x]
    }

    /// Toggle the cell at (x, y). Out-of-bounds coordinates are ignored.
    pub fn flip(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.data[y * self.width + x] ^= true;
        }
    }

    /// Set the cell at (x, y) to foreground. Out of bounds is ignored.
    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Index of the first foreground cell at or after raster index `from`.
    pub(crate) fn find_next(&self, from: usize) -> Option<(i32, i32)> {
        let start = from.min(self.data.len());
        self.data[start..].iter().position(|&set| set).map(|offset| {
            let i = start + offset;
            ((i % self.width) as i32, (i / self.width) as i32)
        })
    }

    /// Raster index of (x, y). Caller guarantees the point is in bounds.
    pub(crate) fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width + x as usize
    }
}
