use super::classify::Extent;

/// 24-bit color, independent of any rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn hex(v: u32) -> Self {
        Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

const BLUES: [Rgb; 9] = [
    Rgb::hex(0xf7fbff),
    Rgb::hex(0xdeebf7),
    Rgb::hex(0xc6dbef),
    Rgb::hex(0x9ecae1),
    Rgb::hex(0x6baed6),
    Rgb::hex(0x4292c6),
    Rgb::hex(0x2171b5),
    Rgb::hex(0x08519c),
    Rgb::hex(0x08306b),
];

const ORANGES: [Rgb; 9] = [
    Rgb::hex(0xfff5eb),
    Rgb::hex(0xfee6ce),
    Rgb::hex(0xfdd0a2),
    Rgb::hex(0xfdae6b),
    Rgb::hex(0xfd8d3c),
    Rgb::hex(0xf16913),
    Rgb::hex(0xd94801),
    Rgb::hex(0xa63603),
    Rgb::hex(0x7f2704),
];

/// Sequential light-to-dark palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Blues,
    Oranges,
}

impl Palette {
    fn ramp(self) -> &'static [Rgb; 9] {
        match self {
            Palette::Blues => &BLUES,
            Palette::Oranges => &ORANGES,
        }
    }

    /// Exactly `n` colors spread evenly over the ramp, light to dark.
    /// A single color is the darkest step.
    pub fn colors(self, n: usize) -> Vec<Rgb> {
        let ramp = self.ramp();
        let last = ramp.len() - 1;
        match n {
            0 => Vec::new(),
            1 => vec![ramp[last]],
            _ => (0..n)
                .map(|i| {
                    let pos = i as f64 * last as f64 / (n - 1) as f64;
                    let lo = pos.floor() as usize;
                    let hi = (lo + 1).min(last);
                    ramp[lo].lerp(ramp[hi], pos - lo as f64)
                })
                .collect(),
        }
    }
}

/// Step function from magnitude bucket to color.
///
/// One bin per integer bucket in `[min, max]`; buckets outside the domain
/// clamp to the end bins. An empty bucket set gives one bin over `[0, 0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    min: i32,
    max: i32,
    colors: Vec<Rgb>,
}

impl ColorScale {
    pub fn new(extent: Option<Extent>, palette: Palette) -> Self {
        let Extent { min, max } = extent.unwrap_or(Extent { min: 0, max: 0 });
        let bins = (max - min) as usize + 1;
        Self {
            min,
            max,
            colors: palette.colors(bins),
        }
    }

    /// Build directly from the observed buckets
    pub fn from_buckets(buckets: impl IntoIterator<Item = i32>, palette: Palette) -> Self {
        Self::new(Extent::of(buckets.into_iter().map(Some)), palette)
    }

    pub fn domain(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    pub fn bins(&self) -> usize {
        self.colors.len()
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.colors
    }

    /// Palette index for a bucket
    pub fn bin(&self, bucket: i32) -> usize {
        let offset = bucket.clamp(self.min, self.max) - self.min;
        (offset as usize).min(self.colors.len() - 1)
    }

    pub fn color(&self, bucket: i32) -> Rgb {
        self.colors[self.bin(bucket)]
    }

    /// `(bucket, color)` for every bin, lowest first
    pub fn legend(&self) -> impl Iterator<Item = (i32, Rgb)> + '_ {
        (self.min..=self.max).zip(self.colors.iter().copied())
    }
}
