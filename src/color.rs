//! Named color schemes and scales used by the heatmap.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use palette::{Mix, Srgb};

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`, `rrggbb` or `rgb(r, g, b)`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
            let rgb = Rgb::new(parts.next()?.ok()?, parts.next()?.ok()?, parts.next()?.ok()?);
            return parts.next().is_none().then_some(rgb);
        }
        let hex: Srgb<u8> = s.parse().ok()?;
        let (r, g, b) = hex.into_components();
        Some(Rgb::new(r, g, b))
    }

    fn to_float(self) -> Srgb<f32> {
        Srgb::new(self.r, self.g, self.b).into_format::<f32>()
    }

    fn from_float(color: Srgb<f32>) -> Self {
        let (r, g, b) = color.into_components();
        let channel = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb::new(channel(r), channel(g), channel(b))
    }

    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0) as f32;
        Rgb::from_float(self.to_float().mix(other.to_float(), t))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interpolation {
    /// Uniform B-spline through the stops, smooth but not passing through them.
    Basis,
    /// Straight segments between neighbouring stops.
    Linear,
}

macro_rules! color_schemes {
    ($($name:ident => $interpolation:ident [$($stop:literal),+ $(,)?]),+ $(,)?) => {
        /// Built-in color schemes. Sequential and diverging schemes are smooth
        /// splines through their stops, the rest are piecewise linear.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ColorScheme {
            $($name,)+
        }

        impl ColorScheme {
            pub const ALL: &'static [ColorScheme] = &[$(ColorScheme::$name,)+];

            pub fn name(self) -> &'static str {
                match self {
                    $(ColorScheme::$name => stringify!($name),)+
                }
            }

            fn stops(self) -> &'static [u32] {
                match self {
                    $(ColorScheme::$name => &[$($stop),+],)+
                }
            }

            fn interpolation(self) -> Interpolation {
                match self {
                    $(ColorScheme::$name => Interpolation::$interpolation,)+
                }
            }
        }
    };
}

color_schemes! {
    Blues => Basis [0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b],
    Greens => Basis [0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c, 0x00441b],
    Greys => Basis [0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525, 0x000000],
    Oranges => Basis [0xfff5eb, 0xfee6ce, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xf16913, 0xd94801, 0xa63603, 0x7f2704],
    Purples => Basis [0xfcfbfd, 0xefedf5, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x54278f, 0x3f007d],
    Reds => Basis [0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15, 0x67000d],
    BuGn => Basis [0xf7fcfd, 0xe5f5f9, 0xccece6, 0x99d8c9, 0x66c2a4, 0x41ae76, 0x238b45, 0x006d2c, 0x00441b],
    BuPu => Basis [0xf7fcfd, 0xe0ecf4, 0xbfd3e6, 0x9ebcda, 0x8c96c6, 0x8c6bb1, 0x88419d, 0x810f7c, 0x4d004b],
    GnBu => Basis [0xf7fcf0, 0xe0f3db, 0xccebc5, 0xa8ddb5, 0x7bccc4, 0x4eb3d3, 0x2b8cbe, 0x0868ac, 0x084081],
    OrRd => Basis [0xfff7ec, 0xfee8c8, 0xfdd49e, 0xfdbb84, 0xfc8d59, 0xef6548, 0xd7301f, 0xb30000, 0x7f0000],
    PuBuGn => Basis [0xfff7fb, 0xece2f0, 0xd0d1e6, 0xa6bddb, 0x67a9cf, 0x3690c0, 0x02818a, 0x016c59, 0x014636],
    PuBu => Basis [0xfff7fb, 0xece7f2, 0xd0d1e6, 0xa6bddb, 0x74a9cf, 0x3690c0, 0x0570b0, 0x045a8d, 0x023858],
    PuRd => Basis [0xf7f4f9, 0xe7e1ef, 0xd4b9da, 0xc994c7, 0xdf65b0, 0xe7298a, 0xce1256, 0x980043, 0x67001f],
    RdPu => Basis [0xfff7f3, 0xfde0dd, 0xfcc5c0, 0xfa9fb5, 0xf768a1, 0xdd3497, 0xae017e, 0x7a0177, 0x49006a],
    YlGnBu => Basis [0xffffd9, 0xedf8b1, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x1d91c0, 0x225ea8, 0x253494, 0x081d58],
    YlGn => Basis [0xffffe5, 0xf7fcb9, 0xd9f0a3, 0xaddd8e, 0x78c679, 0x41ab5d, 0x238443, 0x006837, 0x004529],
    YlOrBr => Basis [0xffffe5, 0xfff7bc, 0xfee391, 0xfec44f, 0xfe9929, 0xec7014, 0xcc4c02, 0x993404, 0x662506],
    YlOrRd => Basis [0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xbd0026, 0x800026],
    BrBG => Basis [0x543005, 0x8c510a, 0xbf812d, 0xdfc27d, 0xf6e8c3, 0xf5f5f5, 0xc7eae5, 0x80cdc1, 0x35978f, 0x01665e, 0x003c30],
    PRGn => Basis [0x40004b, 0x762a83, 0x9970ab, 0xc2a5cf, 0xe7d4e8, 0xf7f7f7, 0xd9f0d3, 0xa6dba0, 0x5aae61, 0x1b7837, 0x00441b],
    PiYG => Basis [0x8e0152, 0xc51b7d, 0xde77ae, 0xf1b6da, 0xfde0ef, 0xf7f7f7, 0xe6f5d0, 0xb8e186, 0x7fbc41, 0x4d9221, 0x276419],
    PuOr => Basis [0x2d004b, 0x542788, 0x8073ac, 0xb2abd2, 0xd8daeb, 0xf7f7f7, 0xfee0b6, 0xfdb863, 0xe08214, 0xb35806, 0x7f3b08],
    RdBu => Basis [0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xf7f7f7, 0xd1e5f0, 0x92c5de, 0x4393c3, 0x2166ac, 0x053061],
    RdGy => Basis [0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xffffff, 0xe0e0e0, 0xbababa, 0x878787, 0x4d4d4d, 0x1a1a1a],
    RdYlBu => Basis [0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xffffbf, 0xe0f3f8, 0xabd9e9, 0x74add1, 0x4575b4, 0x313695],
    RdYlGn => Basis [0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a, 0x66bd63, 0x1a9850, 0x006837],
    Spectral => Basis [0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4, 0x66c2a5, 0x3288bd, 0x5e4fa2],
    Viridis => Linear [0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58, 0xb5de2b, 0xfde725],
    Inferno => Linear [0x000004, 0x1b0c41, 0x4a0c6b, 0x781c6d, 0xa52c60, 0xcf4446, 0xed6925, 0xfb9b06, 0xf7d13d, 0xfcffa4],
    Magma => Linear [0x000004, 0x180f3d, 0x440f76, 0x721f81, 0x9e2f7f, 0xcd4071, 0xf1605d, 0xfd9668, 0xfeca8d, 0xfcfdbf],
    Plasma => Linear [0x0d0887, 0x47039f, 0x7301a8, 0x9c179e, 0xbd3786, 0xd8576b, 0xed7953, 0xfa9e3b, 0xfdc926, 0xf0f921],
    Warm => Linear [0x6e40aa, 0x963db3, 0xbf3caf, 0xe4419d, 0xfe4b83, 0xff5e63, 0xff7847, 0xfb9633, 0xe2b72f, 0xc6d63c, 0xaff05b],
    Cool => Linear [0x6e40aa, 0x6054c8, 0x4c6edb, 0x368ce1, 0x23abd8, 0x1ac7c2, 0x1ddfa3, 0x30ef82, 0x52f667, 0x7ff658, 0xaff05b],
    Rainbow => Linear [0x6e40aa, 0xbe3caf, 0xfe4b83, 0xff7847, 0xe2b72f, 0xaff05b, 0x52f667, 0x1ddfa3, 0x23abd8, 0x4c6edb, 0x6e40aa],
    CubehelixDefault => Linear [0x000000, 0x1a1530, 0x163d4e, 0x1f6642, 0x54792f, 0xa07949, 0xd07e93, 0xcf9cda, 0xc1caf3, 0xd2eeef, 0xffffff],
}

fn hex_to_rgb(hex: u32) -> Rgb {
    Rgb::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

fn basis(t: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    ((1.0 - 3.0 * t + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

fn basis_channel(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let (t, i) = if t <= 0.0 {
        (0.0, 0)
    } else if t >= 1.0 {
        (1.0, n - 1)
    } else {
        (t, ((t * n as f64).floor() as usize).min(n - 1))
    };
    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 { values[i + 2] } else { 2.0 * v2 - v1 };
    basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn interpolate_basis(stops: &[Rgb], t: f64) -> Rgb {
    let r: Vec<f64> = stops.iter().map(|c| f64::from(c.r)).collect();
    let g: Vec<f64> = stops.iter().map(|c| f64::from(c.g)).collect();
    let b: Vec<f64> = stops.iter().map(|c| f64::from(c.b)).collect();
    Rgb::new(
        channel(basis_channel(&r, t)),
        channel(basis_channel(&g, t)),
        channel(basis_channel(&b, t)),
    )
}

/// Piecewise linear interpolation through evenly spaced stops.
pub fn interpolate_linear(stops: &[Rgb], t: f64) -> Rgb {
    match stops {
        [] => Rgb::default(),
        [only] => *only,
        _ => {
            let segments = (stops.len() - 1) as f64;
            let position = t.clamp(0.0, 1.0) * segments;
            let i = (position.floor() as usize).min(stops.len() - 2);
            stops[i].mix(stops[i + 1], position - i as f64)
        }
    }
}

impl ColorScheme {
    /// Color at `t`, clamped to [0, 1].
    pub fn interpolate(self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let stops: Vec<Rgb> = self.stops().iter().copied().map(hex_to_rgb).collect();
        match self.interpolation() {
            Interpolation::Basis => interpolate_basis(&stops, t),
            Interpolation::Linear => interpolate_linear(&stops, t),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::Blues
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScheme::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown color scheme '{s}'"))
    }
}

/// Maps a position in [0, 1] of the column's domain to a color.
#[derive(Clone)]
pub enum ColorScale {
    Scheme(ColorScheme),
    /// Evenly spaced colors, linearly interpolated.
    Stops(Vec<Rgb>),
    Custom(Arc<dyn Fn(f64) -> Rgb + Send + Sync>),
}

impl ColorScale {
    pub fn custom(f: impl Fn(f64) -> Rgb + Send + Sync + 'static) -> Self {
        ColorScale::Custom(Arc::new(f))
    }

    pub fn at(&self, t: f64) -> Rgb {
        match self {
            ColorScale::Scheme(scheme) => scheme.interpolate(t),
            ColorScale::Stops(stops) => interpolate_linear(stops, t),
            ColorScale::Custom(f) => f(t),
        }
    }
}

impl fmt::Debug for ColorScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorScale::Scheme(scheme) => f.debug_tuple("Scheme").field(scheme).finish(),
            ColorScale::Stops(stops) => f.debug_tuple("Stops").field(stops).finish(),
            ColorScale::Custom(_) => f.write_str("Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_rgb_strings() {
        assert_eq!(Rgb::parse("#08306b"), Some(Rgb::new(8, 48, 107)));
        assert_eq!(Rgb::parse("rgb(1, 2, 3)"), Some(Rgb::new(1, 2, 3)));
        assert_eq!(Rgb::parse("rgb(1, 2)"), None);
        assert_eq!(Rgb::parse("nope"), None);
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "rgb(1, 2, 3)");
    }

    #[test]
    fn scheme_names_round_trip() {
        assert_eq!(ColorScheme::ALL.len(), 35);
        for scheme in ColorScheme::ALL {
            assert_eq!(scheme.name().parse::<ColorScheme>(), Ok(*scheme));
        }
        assert_eq!("viridis".parse(), Ok(ColorScheme::Viridis));
        assert!("Nope".parse::<ColorScheme>().is_err());
    }

    #[test]
    fn basis_schemes_start_and_end_on_their_stops() {
        assert_eq!(ColorScheme::Blues.interpolate(0.0), Rgb::new(247, 251, 255));
        assert_eq!(ColorScheme::Blues.interpolate(1.0), Rgb::new(8, 48, 107));
        assert_eq!(ColorScheme::Greys.interpolate(-3.0), Rgb::new(255, 255, 255));
    }

    #[test]
    fn linear_schemes_pass_through_stops() {
        assert_eq!(ColorScheme::Viridis.interpolate(0.0), Rgb::new(0x44, 0x01, 0x54));
        assert_eq!(ColorScheme::Viridis.interpolate(1.0), Rgb::new(0xfd, 0xe7, 0x25));
        let grey = interpolate_linear(&[Rgb::new(0, 0, 0), Rgb::new(200, 100, 50)], 0.5);
        assert_eq!(grey, Rgb::new(100, 50, 25));
    }

    #[test]
    fn scales_map_positions() {
        let scale = ColorScale::Stops(vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]);
        assert_eq!(scale.at(1.0), Rgb::new(255, 255, 255));
        assert_eq!(scale.at(2.0), Rgb::new(255, 255, 255));
        let custom = ColorScale::custom(|t| Rgb::new((t * 10.0) as u8, 0, 0));
        assert_eq!(custom.at(0.5), Rgb::new(5, 0, 0));
    }
}
