use super::font::Font;
use super::particles::random_color;
use crate::canvas::Rgb;
use fastrand::Rng;

/// Samples must be strictly more opaque than this.
pub const ALPHA_THRESHOLD: u8 = 128;

/// Where one message particle should come to rest.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphTarget {
    pub x: f32,
    pub y: f32,
    pub color: Rgb,
}

/// Off-screen 8-bit alpha raster.
#[derive(Clone, Debug, PartialEq)]
pub struct AlphaSurface {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
}

impl AlphaSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.alpha[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, alpha: u8) {
        self.alpha[y * self.width + x] = alpha;
    }

    /// Adds `coverage` (0..1) of full opacity, saturating.
    pub fn add(&mut self, x: usize, y: usize, coverage: f32) {
        let a = &mut self.alpha[y * self.width + x];
        *a = (*a as f32 + coverage * 255.0).round().min(255.0) as u8;
    }

    /// Fills a rectangle, weighting edge pixels by how much of them it covers.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (x1, y1) = (x + w, y + h);
        let px0 = x.floor().max(0.0) as usize;
        let py0 = y.floor().max(0.0) as usize;
        let px1 = (x1.ceil().max(0.0) as usize).min(self.width);
        let py1 = (y1.ceil().max(0.0) as usize).min(self.height);

        for py in py0..py1 {
            let cover_y = (y1.min(py as f32 + 1.0) - y.max(py as f32)).max(0.0);
            for px in px0..px1 {
                let cover_x = (x1.min(px as f32 + 1.0) - x.max(px as f32)).max(0.0);
                let coverage = cover_x * cover_y;
                if coverage > 0.0 {
                    self.add(px, py, coverage);
                }
            }
        }
    }
}

/// Turns a message into target points by rasterizing it off-screen and
/// sampling the opaque pixels on a fixed grid.
pub struct GlyphSampler {
    font: Font,
    stride: usize,
    font_scale: f32,
}

impl GlyphSampler {
    pub fn new(font: Font, stride: usize, font_scale: f32) -> Self {
        Self {
            font,
            stride: stride.max(1),
            font_scale,
        }
    }

    /// Targets for `message` centered on (cx, cy) of a `width` x `height`
    /// canvas. Positions depend only on the inputs; colors are random.
    pub fn prepare_targets(
        &self,
        message: &str,
        width: f32,
        height: f32,
        cx: f32,
        cy: f32,
        rng: &mut Rng,
    ) -> Vec<GlyphTarget> {
        let surface = self.render(message, width, height);
        self.sample(&surface, width, height, cx, cy, rng)
    }

    /// Draws the message centered on a surface twice the canvas size, so
    /// long messages are not clipped before the mapping back.
    pub fn render(&self, message: &str, width: f32, height: f32) -> AlphaSurface {
        let sw = (width * 2.0).max(0.0).ceil() as usize;
        let sh = (height * 2.0).max(0.0).ceil() as usize;
        let mut surface = AlphaSurface::new(sw, sh);
        if sw == 0 || sh == 0 {
            return surface;
        }

        let font_size = width.min(height) * self.font_scale;
        self.font.draw_centered(&mut surface, message, font_size, sw as f32 / 2.0, sh as f32 / 2.0);
        surface
    }

    /// Maps every `stride`-th opaque surface pixel into canvas space around
    /// (cx, cy), clamped to the canvas.
    pub fn sample(
        &self,
        surface: &AlphaSurface,
        width: f32,
        height: f32,
        cx: f32,
        cy: f32,
        rng: &mut Rng,
    ) -> Vec<GlyphTarget> {
        let mut targets = Vec::new();
        let (sw, sh) = (surface.width(), surface.height());
        if sw == 0 || sh == 0 {
            return targets;
        }

        let sx = width / sw as f32;
        let sy = height / sh as f32;
        let left = cx - width / 2.0;
        let top = cy - height / 2.0;

        for y in (0..sh).step_by(self.stride) {
            for x in (0..sw).step_by(self.stride) {
                if surface.get(x, y) <= ALPHA_THRESHOLD {
                    continue;
                }
                targets.push(GlyphTarget {
                    x: (left + x as f32 * sx).clamp(0.0, width),
                    y: (top + y as f32 * sy).clamp(0.0, height),
                    color: random_color(rng, 150.0),
                });
            }
        }
        targets
    }
}
