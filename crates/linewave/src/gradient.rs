//! Hex color parsing and gradient sampling for line colors.

/// Upper bound on gradient stops carried into the uniform block.
pub const MAX_GRADIENT_STOPS: usize = 8;

/// Color used for any hex string that fails to parse.
pub const FALLBACK_STOP: [f32; 3] = [1.0, 1.0, 1.0];

/// Resolved gradient: up to [`MAX_GRADIENT_STOPS`] linear RGB stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    stops: [[f32; 3]; MAX_GRADIENT_STOPS],
    count: usize,
}

impl Gradient {
    pub const fn empty() -> Self {
        Self {
            stops: [[0.0; 3]; MAX_GRADIENT_STOPS],
            count: 0,
        }
    }

    /// Builds a gradient from hex strings, keeping at most the first eight.
    pub fn from_hex<S: AsRef<str>>(values: &[S]) -> Self {
        let mut gradient = Self::empty();
        for (slot, value) in gradient.stops.iter_mut().zip(values) {
            *slot = parse_hex(value.as_ref());
        }
        gradient.count = values.len().min(MAX_GRADIENT_STOPS);
        gradient
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn stops(&self) -> &[[f32; 3]] {
        &self.stops[..self.count]
    }

    /// Fixed-size stop table, unused slots zeroed.
    pub fn raw_stops(&self) -> &[[f32; 3]; MAX_GRADIENT_STOPS] {
        &self.stops
    }

    /// Color at `t` in `[0, 1]` along the stops.
    ///
    /// No stops yields black, a single stop is flat, otherwise the two
    /// neighbouring stops are blended linearly.
    pub fn sample(&self, t: f32) -> [f32; 3] {
        match self.count {
            0 => [0.0; 3],
            1 => self.stops[0],
            count => {
                let clamped = t.clamp(0.0, 1.0);
                let position = clamped * (count - 1) as f32;
                let index = (position.floor() as usize).min(count - 2);
                let fraction = position - index as f32;
                mix(self.stops[index], self.stops[index + 1], fraction)
            }
        }
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::empty()
    }
}

/// Parses `#rgb`, `#rrggbb` (hash optional) into normalised RGB.
///
/// Anything else resolves to white.
pub fn parse_hex(value: &str) -> [f32; 3] {
    let digits = value.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return FALLBACK_STOP;
    }

    let channels = match digits.len() {
        3 => {
            let mut out = [0u8; 3];
            for (slot, ch) in out.iter_mut().zip(digits.chars()) {
                let nibble = ch.to_digit(16).unwrap_or(15) as u8;
                *slot = nibble * 17;
            }
            out
        }
        6 => {
            let mut out = [0u8; 3];
            for (index, slot) in out.iter_mut().enumerate() {
                let pair = &digits[index * 2..index * 2 + 2];
                *slot = u8::from_str_radix(pair, 16).unwrap_or(255);
            }
            out
        }
        _ => return FALLBACK_STOP,
    };

    channels.map(|c| f32::from(c) / 255.0)
}

fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}
