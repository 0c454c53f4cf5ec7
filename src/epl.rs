use crate::graphics::Bitmap;

/// One bitmap row, `width_bytes` long, MSB = leftmost pixel, 1 = background.
pub type PackedRow = Vec<u8>;

/// Append a PPLB ASCII command line terminated with LF.
pub fn epl_line(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(b'\n');
}

/// Fold a bitmap into byte-aligned rows.
///
/// Bit `7 - b` of byte `c` in row `r` is set when pixel `(c*8 + b, r)` is
/// background. The printer treats a set bit as "leave unprinted", so an
/// all-white line packs to `0xFF` and solid ink packs to `0x00`.
pub fn pack(bitmap: &Bitmap) -> Vec<PackedRow> {
    let bpr = bitmap.width_bytes() as usize;
    let w = bitmap.width_px();

    (0..bitmap.height_px())
        .map(|y| {
            let mut row = vec![0u8; bpr];
            for x in 0..w {
                if bitmap.is_background(x, y) {
                    row[x as usize / 8] |= 1 << (7 - (x % 8));
                }
            }
            row
        })
        .collect()
}

/// Pack and flatten, ready to follow a GW header.
pub fn pack_flat(bitmap: &Bitmap) -> Vec<u8> {
    pack(bitmap).concat()
}

/// Header + raw binary rows + LF.
///
/// Rows are emitted verbatim: the printer reads exactly
/// `width_bytes * height` bytes after the header, whatever their values.
pub fn encode_gw(x: u32, y: u32, width_bytes: u32, height: u32, rows: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(24 + rows.len());
    epl_line(&mut buf, &gw_header(x, y, width_bytes, height));
    buf.extend_from_slice(rows);
    buf.push(b'\n');
    buf
}

fn gw_header(x: u32, y: u32, width_bytes: u32, height: u32) -> String {
    format!("GW{},{},{},{}", x, y, width_bytes, height)
}

/// A positioned graphics-write block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicsSegment {
    pub x: u32,
    pub y: u32,
    pub width_bytes: u32,
    pub height: u32,
    pub body: Vec<u8>,
}

impl GraphicsSegment {
    pub fn from_bitmap(x: u32, y: u32, bitmap: &Bitmap) -> Self {
        Self {
            x,
            y,
            width_bytes: bitmap.width_bytes(),
            height: bitmap.height_px(),
            body: pack_flat(bitmap),
        }
    }

    /// Stand-in for a line that could not be drawn. Encodes to nothing.
    pub fn blank(x: u32, y: u32) -> Self {
        Self { x, y, width_bytes: 0, height: 0, body: Vec::new() }
    }

    pub fn is_blank(&self) -> bool {
        self.body.is_empty()
    }

    pub fn header(&self) -> String {
        let mut header = gw_header(self.x, self.y, self.width_bytes, self.height);
        header.push('\n');
        header
    }

    pub fn encode(&self) -> Vec<u8> {
        if self.is_blank() {
            return Vec::new();
        }
        encode_gw(self.x, self.y, self.width_bytes, self.height, &self.body)
    }

    pub fn encoded_len(&self) -> usize {
        if self.is_blank() {
            0
        } else {
            self.header().len() + self.body.len() + 1
        }
    }
}
