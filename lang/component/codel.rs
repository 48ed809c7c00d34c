use std::fmt;

/// A cell coordinate in a codel grid. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codel {
    pub x: usize,
    pub y: usize,
}

impl Codel {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Codel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hue {
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
}

impl Hue {
    pub const ALL: [Hue; 6] = [
        Hue::Red,
        Hue::Yellow,
        Hue::Green,
        Hue::Cyan,
        Hue::Blue,
        Hue::Magenta,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lightness {
    Light,
    Normal,
    Dark,
}

impl Lightness {
    pub const ALL: [Lightness; 3] = [Lightness::Light, Lightness::Normal, Lightness::Dark];

    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Color of a single codel.
///
/// Only chromatic colors carry a hue and a lightness. White is the neutral
/// color the pointer slides through, black is a wall and never belongs to a
/// color block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Chromatic { hue: Hue, lightness: Lightness },
    White,
    Black,
}

// rows are lightness (light, normal, dark), columns are hues in cycle order
const CHROMATIC_RGB: [[(u8, u8, u8); 6]; 3] = [
    [
        (0xFF, 0xC0, 0xC0),
        (0xFF, 0xFF, 0xC0),
        (0xC0, 0xFF, 0xC0),
        (0xC0, 0xFF, 0xFF),
        (0xC0, 0xC0, 0xFF),
        (0xFF, 0xC0, 0xFF),
    ],
    [
        (0xFF, 0x00, 0x00),
        (0xFF, 0xFF, 0x00),
        (0x00, 0xFF, 0x00),
        (0x00, 0xFF, 0xFF),
        (0x00, 0x00, 0xFF),
        (0xFF, 0x00, 0xFF),
    ],
    [
        (0xC0, 0x00, 0x00),
        (0xC0, 0xC0, 0x00),
        (0x00, 0xC0, 0x00),
        (0x00, 0xC0, 0xC0),
        (0x00, 0x00, 0xC0),
        (0xC0, 0x00, 0xC0),
    ],
];

impl Color {
    pub fn new(hue: Hue, lightness: Lightness) -> Self {
        Color::Chromatic { hue, lightness }
    }

    /// Returns `(hue index, lightness index)` for chromatic colors.
    pub fn indices(self) -> Option<(u8, u8)> {
        match self {
            Color::Chromatic { hue, lightness } => Some((hue.index(), lightness.index())),
            Color::White | Color::Black => None,
        }
    }

    pub fn is_white(self) -> bool {
        self == Color::White
    }

    pub fn is_black(self) -> bool {
        self == Color::Black
    }

    /// Hue and lightness steps needed to get from `self` to `dst`, both
    /// counted forward around their cycles. `None` if either side has no
    /// hue, i.e. is white or black.
    pub fn steps_to(self, dst: Color) -> Option<(u8, u8)> {
        let (src_hue, src_light) = self.indices()?;
        let (dst_hue, dst_light) = dst.indices()?;

        Some((
            forward_steps(src_hue, dst_hue, Hue::ALL.len() as u8),
            forward_steps(src_light, dst_light, Lightness::ALL.len() as u8),
        ))
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Chromatic { hue, lightness } => {
                CHROMATIC_RGB[lightness.index() as usize][hue.index() as usize]
            }
            Color::White => (0xFF, 0xFF, 0xFF),
            Color::Black => (0x00, 0x00, 0x00),
        }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Option<Self> {
        match (r, g, b) {
            (0xFF, 0xFF, 0xFF) => return Some(Color::White),
            (0x00, 0x00, 0x00) => return Some(Color::Black),
            _ => (),
        }

        for lightness in Lightness::ALL {
            for hue in Hue::ALL {
                if CHROMATIC_RGB[lightness.index() as usize][hue.index() as usize] == (r, g, b) {
                    return Some(Color::new(hue, lightness));
                }
            }
        }

        None
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.rgb();
        write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
    }
}

fn forward_steps(src: u8, dst: u8, modulus: u8) -> u8 {
    if dst >= src {
        dst - src
    } else {
        dst + modulus - src
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_wrap_around_cycles() {
        let dark_magenta = Color::new(Hue::Magenta, Lightness::Dark);
        let light_red = Color::new(Hue::Red, Lightness::Light);
        assert_eq!(Some((1, 1)), dark_magenta.steps_to(light_red));
        assert_eq!(Some((5, 2)), light_red.steps_to(dark_magenta));
        assert_eq!(Some((0, 0)), light_red.steps_to(light_red));
    }

    #[test]
    fn test_steps_undefined_for_neutral_colors() {
        let red = Color::new(Hue::Red, Lightness::Normal);
        assert_eq!(None, red.steps_to(Color::White));
        assert_eq!(None, Color::White.steps_to(red));
        assert_eq!(None, Color::Black.steps_to(red));
    }

    #[test]
    fn test_rgb_catalogue() {
        assert_eq!(
            Some(Color::new(Hue::Cyan, Lightness::Light)),
            Color::from_rgb(0xC0, 0xFF, 0xFF)
        );
        assert_eq!(
            Some(Color::new(Hue::Yellow, Lightness::Dark)),
            Color::from_rgb(0xC0, 0xC0, 0x00)
        );
        assert_eq!(Some(Color::White), Color::from_rgb(0xFF, 0xFF, 0xFF));
        assert_eq!(None, Color::from_rgb(0x12, 0x34, 0x56));
        assert_eq!("#FF00FF", Color::new(Hue::Magenta, Lightness::Normal).to_string());
    }
}
