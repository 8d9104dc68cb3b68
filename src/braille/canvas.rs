/// One layer of 2x4 braille dots per terminal cell (U+2800 to U+28FF).
/// The map keeps outlines, dots and the highlight on separate canvases so
/// each can be colored on its own.
#[derive(Clone, Debug)]
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<u8>, // Bit pattern per char, row-major
}

/// Dot bit for pixel (column, row) inside a cell
const DOT_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

impl BrailleCanvas {
    /// Canvas of `width` x `height` characters, `width*2` x `height*4` pixels
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0u8; width * height],
        }
    }

    /// Set a pixel; anything off the canvas is ignored
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= DOT_BITS[x % 2][y % 4];
    }

    /// Signed variant for projected coordinates, which go negative off-screen
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Braille glyph of one character cell, `None` when no dot is set
    #[inline]
    pub fn glyph(&self, cx: usize, cy: usize) -> Option<char> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        match self.cells[cy * self.width + cx] {
            0 => None,
            b => char::from_u32(0x2800 + b as u32),
        }
    }

    #[cfg(test)]
    pub(crate) fn row_to_string(&self, row: usize) -> String {
        (0..self.width)
            .map(|cx| self.glyph(cx, row).unwrap_or('\u{2800}'))
            .collect()
    }
}
