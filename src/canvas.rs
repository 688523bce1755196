use std::io::Write;

pub type Rgb = (u8, u8, u8);

/// Terminal frame buffer.
///
/// Each terminal cell holds two vertically stacked pixels drawn with a
/// half-block glyph. Drawing calls take *logical* coordinates; one pixel
/// spans `scale` logical units in both axes.
pub struct Canvas {
    cols: usize,
    rows: usize, // pixel rows, twice the terminal rows
    scale: f32,
    pixels: Vec<[f32; 3]>,
    output_buf: Vec<u8>,
}

impl Canvas {
    pub fn new(cols: usize, rows: usize, scale: f32, bg: Rgb) -> Self {
        let mut canvas = Self {
            cols: 0,
            rows: 0,
            scale,
            pixels: Vec::new(),
            output_buf: Vec::new(),
        };
        canvas.resize(cols, rows, bg);
        canvas
    }

    /// Reallocates the buffer and clears it to `bg`.
    pub fn resize(&mut self, cols: usize, rows: usize, bg: Rgb) {
        self.cols = cols;
        self.rows = rows;
        self.pixels = vec![[bg.0 as f32, bg.1 as f32, bg.2 as f32]; cols * rows];
        self.output_buf = Vec::with_capacity(cols * rows * 25);
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn logical_width(&self) -> f32 {
        self.cols as f32 * self.scale
    }

    pub fn logical_height(&self) -> f32 {
        self.rows as f32 * self.scale
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let p = self.pixels[y * self.cols + x];
        (to_channel(p[0]), to_channel(p[1]), to_channel(p[2]))
    }

    /// Veils the whole frame with `color` at `alpha` (0-255).
    pub fn fade(&mut self, color: Rgb, alpha: f32) {
        let a = (alpha / 255.0).clamp(0.0, 1.0);
        for idx in 0..self.pixels.len() {
            self.blend(idx, color, a);
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32) {
        let a = (alpha / 255.0).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }

        let x0 = ((x / self.scale).round().max(0.0) as usize).min(self.cols);
        let x1 = (((x + w) / self.scale).round().max(0.0) as usize).min(self.cols);
        let y0 = ((y / self.scale).round().max(0.0) as usize).min(self.rows);
        let y1 = (((y + h) / self.scale).round().max(0.0) as usize).min(self.rows);

        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(py * self.cols + px, color, a);
            }
        }
    }

    /// Circles smaller than a pixel light the pixel under their center.
    pub fn fill_circle(&mut self, x: f32, y: f32, diameter: f32, color: Rgb, alpha: f32) {
        let a = (alpha / 255.0).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }

        let cx = x / self.scale;
        let cy = y / self.scale;
        let r = diameter * 0.5 / self.scale;

        if r < 0.5 {
            if cx >= 0.0 && cy >= 0.0 {
                let (px, py) = (cx as usize, cy as usize);
                if px < self.cols && py < self.rows {
                    self.blend(py * self.cols + px, color, a);
                }
            }
            return;
        }

        let x0 = (cx - r).floor().max(0.0) as usize;
        let y0 = (cy - r).floor().max(0.0) as usize;
        let x1 = ((cx + r).ceil().max(0.0) as usize).min(self.cols);
        let y1 = ((cy + r).ceil().max(0.0) as usize).min(self.rows);

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.blend(py * self.cols + px, color, a);
                }
            }
        }
    }

    fn blend(&mut self, idx: usize, color: Rgb, a: f32) {
        let p = &mut self.pixels[idx];
        p[0] = p[0] * (1.0 - a) + color.0 as f32 * a;
        p[1] = p[1] * (1.0 - a) + color.1 as f32 * a;
        p[2] = p[2] * (1.0 - a) + color.2 as f32 * a;
    }

    /// Writes the frame as 24-bit ANSI half-blocks.
    pub fn present<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top: Option<Rgb> = None;
        let mut prev_bot: Option<Rgb> = None;

        for y in (0..self.rows).step_by(2) {
            for x in 0..self.cols {
                let top = self.pixel(x, y);
                let bot = if y + 1 < self.rows { self.pixel(x, y + 1) } else { top };

                if prev_top != Some(top) {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = Some(top);
                }
                if prev_bot != Some(bot) {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = Some(bot);
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top = None;
            prev_bot = None;
            if y + 2 < self.rows {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }
}

fn to_channel(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}
