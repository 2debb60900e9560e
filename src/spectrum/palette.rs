/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Composite `self` at `alpha`/255 opacity over `background`.
    pub fn blend_over(self, background: Rgb, alpha: u8) -> Rgb {
        let mix = |fg: u8, bg: u8| -> u8 {
            let a = u32::from(alpha);
            ((u32::from(fg) * a + u32::from(bg) * (255 - a) + 127) / 255) as u8
        };
        Rgb::new(mix(self.r, background.r), mix(self.g, background.g), mix(self.b, background.b))
    }
}

pub const BACKGROUND: Rgb = Rgb::new(0, 0, 0);
pub const FOREGROUND: Rgb = Rgb::new(255, 255, 255);

/// Opacity of the fill drawn under the selected network.
pub const FILL_ALPHA: u8 = 80;

/// Contrasting colors assigned to networks by rank, cycling after the last.
pub const NETWORK_PALETTE: [Rgb; 30] = [
    Rgb::new(255, 0, 0),     // red
    Rgb::new(0, 255, 0),     // green
    Rgb::new(255, 165, 0),   // orange
    Rgb::new(255, 0, 255),   // purple
    Rgb::new(0, 255, 255),   // cyan
    Rgb::new(255, 255, 0),   // yellow
    Rgb::new(255, 20, 147),  // pink
    Rgb::new(0, 191, 255),   // blue
    Rgb::new(50, 205, 50),   // lime
    Rgb::new(220, 20, 60),   // crimson
    Rgb::new(128, 0, 128),   // violet
    Rgb::new(255, 140, 0),   // dark orange
    Rgb::new(32, 178, 170),  // light sea green
    Rgb::new(255, 69, 0),    // red-orange
    Rgb::new(138, 43, 226),  // blue-violet
    Rgb::new(0, 128, 0),     // dark green
    Rgb::new(255, 105, 180), // hot pink
    Rgb::new(30, 144, 255),  // dodger blue
    Rgb::new(255, 215, 0),   // gold
    Rgb::new(128, 128, 0),   // olive
    Rgb::new(255, 0, 127),   // rose
    Rgb::new(0, 255, 127),   // spring green
    Rgb::new(255, 127, 80),  // coral
    Rgb::new(148, 0, 211),   // dark violet
    Rgb::new(0, 206, 209),   // dark turquoise
    Rgb::new(255, 192, 203), // light pink
    Rgb::new(154, 205, 50),  // yellow green
    Rgb::new(255, 99, 71),   // tomato
    Rgb::new(72, 61, 139),   // dark slate blue
    Rgb::new(255, 228, 181), // moccasin
];

pub fn network_color(rank: usize) -> Rgb {
    NETWORK_PALETTE[rank % NETWORK_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_color_cycles() {
        assert_eq!(network_color(0), Rgb::new(255, 0, 0));
        assert_eq!(network_color(29), Rgb::new(255, 228, 181));
        assert_eq!(network_color(30), network_color(0));
        assert_eq!(network_color(61), network_color(1));
    }

    #[test]
    fn test_blend_over() {
        let red = Rgb::new(255, 0, 0);
        assert_eq!(red.blend_over(BACKGROUND, 255), red);
        assert_eq!(red.blend_over(BACKGROUND, 0), BACKGROUND);
        assert_eq!(red.blend_over(BACKGROUND, FILL_ALPHA), Rgb::new(80, 0, 0));
    }
}
