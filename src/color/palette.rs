//! The active colour scheme: note colours, light colours and their boost variants.

use serde::{Deserialize, Serialize};

use super::Rgba;
use crate::timeline::event::LightHue;

/// A difficulty's colour scheme. Swappable at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPalette {
    pub left_note_color: Rgba,
    pub right_note_color: Rgba,
    pub light_color1: Rgba,
    pub light_color2: Rgba,
    pub white_light_color: Rgba,
    pub boost_light_color1: Rgba,
    pub boost_light_color2: Rgba,
    pub boost_white_light_color: Rgba,
    pub wall_color: Rgba,
}

impl ColorPalette {
    /// The light colour for `hue`, honouring the boost flag.
    pub fn light(&self, hue: LightHue, boost: bool) -> Rgba {
        match (hue, boost) {
            (LightHue::Red, false) => self.light_color1,
            (LightHue::Red, true) => self.boost_light_color1,
            (LightHue::Blue, false) => self.light_color2,
            (LightHue::Blue, true) => self.boost_light_color2,
            (LightHue::White, false) => self.white_light_color,
            (LightHue::White, true) => self.boost_white_light_color,
        }
    }

    /// Note colour for a raw colour code (0 = left, anything else = right).
    pub fn note(&self, color: i32) -> Rgba {
        if color == 0 {
            self.left_note_color
        } else {
            self.right_note_color
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        let red = Rgba::new(0.7843, 0.0784, 0.0784, 1.0);
        let blue = Rgba::new(0.1569, 0.5569, 0.8235, 1.0);
        let white = Rgba::new(1.0, 1.0, 1.0, 1.0);
        Self {
            left_note_color: Rgba::new(0.7843, 0.0784, 0.0784, 1.0),
            right_note_color: Rgba::new(0.1569, 0.5569, 0.8235, 1.0),
            light_color1: red,
            light_color2: blue,
            white_light_color: white,
            boost_light_color1: red,
            boost_light_color2: blue,
            boost_white_light_color: white,
            wall_color: Rgba::new(1.0, 0.1882, 0.1882, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_swaps_palette() {
        let palette = ColorPalette {
            boost_light_color1: Rgba::new(1.0, 0.0, 1.0, 1.0),
            ..ColorPalette::default()
        };
        assert_eq!(palette.light(LightHue::Red, false), palette.light_color1);
        assert_eq!(
            palette.light(LightHue::Red, true),
            Rgba::new(1.0, 0.0, 1.0, 1.0)
        );
        assert_eq!(palette.light(LightHue::Blue, true), palette.boost_light_color2);
    }

    #[test]
    fn note_colour_codes() {
        let palette = ColorPalette::default();
        assert_eq!(palette.note(0), palette.left_note_color);
        assert_eq!(palette.note(1), palette.right_note_color);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "light_color1: { r: 0.0, g: 1.0, b: 0.0 }\n";
        let palette: ColorPalette = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(palette.light_color1, Rgba::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(palette.light_color2, ColorPalette::default().light_color2);
    }
}
