use serde::{Serialize, Deserialize};

/// Linear RGB color, each channel 0.0 to 1.0
///
/// Configuration spells colors either as an integer (`0x87CEEB` or its
/// decimal value) or as a CSS-style string (`"#87CEEB"`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(u32),
    Css(String),
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parse `#RRGGBB` (leading `#` optional)
    pub fn parse(s: &str) -> Result<Self, String> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(format!("Color '{}' must have six hex digits", s));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|e| format!("Color '{}' is not hex: {}", s, e))
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl TryFrom<ColorRepr> for Color {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(hex) if hex <= 0xff_ffff => Ok(Self::from_hex(hex)),
            ColorRepr::Hex(hex) => Err(format!("Color {:#x} exceeds 24 bits", hex)),
            ColorRepr::Css(s) => Self::parse(&s),
        }
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        format!("#{:06X}", c.to_hex())
    }
}

/// Surface appearance baked into each vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    /// 1.0 is opaque; a scene part holding any lower value is drawn blended
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Strength of the Phong highlight; 0.0 gives a matte (Lambert) surface
    #[serde(default)]
    pub specular: f32,
}

fn default_opacity() -> f32 {
    1.0
}

impl Material {
    pub const fn matte(color: Color) -> Self {
        Self { color, opacity: 1.0, specular: 0.0 }
    }

    pub const fn glossy(color: Color, specular: f32) -> Self {
        Self { color, opacity: 1.0, specular }
    }

    pub const fn translucent(color: Color, opacity: f32) -> Self {
        Self { color, opacity, specular: 0.0 }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}
