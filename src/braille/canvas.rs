/// Dot bit for pixel `(x % 2, y % 4)` inside a character cell:
/// ```text
/// (0,0) (1,0)   bits: 0x01 0x08
/// (0,1) (1,1)   bits: 0x02 0x10
/// (0,2) (1,2)   bits: 0x04 0x20
/// (0,3) (1,3)   bits: 0x40 0x80
/// ```
const DOTS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

/// Braille Unicode canvas: each character cell is a 2x4 pixel grid.
/// Cells hold raw dot patterns (U+2800 + bits); colouring is left to the
/// widget that reads them back with [`BrailleCanvas::cell`].
pub struct BrailleCanvas {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl BrailleCanvas {
    /// Canvas of `width` x `height` characters
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    pub fn pixel_width(&self) -> usize {
        self.width * 2
    }

    pub fn pixel_height(&self) -> usize {
        self.height * 4
    }

    /// Dot pattern of a character cell, 0 when blank or out of range
    pub fn cell(&self, col: usize, row: usize) -> u8 {
        if col >= self.width || row >= self.height {
            return 0;
        }
        self.cells[row * self.width + col]
    }

    /// Set one dot; pixels outside the canvas are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let (col, row) = (x / 2, y / 4);
        if col >= self.width || row >= self.height {
            return;
        }
        self.cells[row * self.width + col] |= DOTS[x % 2][y % 4];
    }

    /// Signed variant for projected coordinates
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    #[cfg(test)]
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells.chunks(self.width.max(1)).take(self.height).map(|row| {
            row.iter()
                .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
                .collect()
        })
    }

    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.rows().collect::<Vec<_>>().join("\n")
    }
}
