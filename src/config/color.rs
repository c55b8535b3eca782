use crate::foundation::core::Rgb8;
use serde::{Deserialize, Serialize};

impl Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b))
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Channels are 0..=255 in object/array form; HSL takes degrees and 0..=1 fractions.
        // Colors are opaque, so an alpha channel is an error rather than silently dropped.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            RgbObj {
                r: f64,
                g: f64,
                b: f64,
                a: Option<f64>,
            },
            HslObj { h: f64, s: f64, l: f64 },
            Arr(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::RgbObj { a: Some(_), .. } => Err(serde::de::Error::custom(
                "rgb object must not carry alpha; opacity is set per layer",
            )),
            Repr::RgbObj { r, g, b, a: None } => Ok(from_channels(r, g, b)),
            Repr::HslObj { h, s, l } => Ok(hsl_to_rgb(h, s, l)),
            Repr::Arr(v) => {
                if v.len() == 3 {
                    Ok(from_channels(v[0], v[1], v[2]))
                } else {
                    Err(serde::de::Error::custom(
                        "rgb array must have len 3 ([r,g,b], channels 0..=255)",
                    ))
                }
            }
        }
    }
}

fn channel(x: f64) -> u8 {
    if x.is_finite() {
        x.round().clamp(0.0, 255.0) as u8
    } else {
        0
    }
}

fn from_channels(r: f64, g: f64, b: f64) -> Rgb8 {
    Rgb8::new(channel(r), channel(g), channel(b))
}

pub(crate) fn parse_hex(s: &str) -> Result<Rgb8, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() {
        return Err(format!("invalid hex color \"{s}\""));
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    match s.len() {
        3 => {
            let nib = |i: usize| -> Result<u8, String> {
                let v = hex_byte(&s[i..i + 1])?;
                Ok(v * 17)
            };
            Ok(Rgb8::new(nib(0)?, nib(1)?, nib(2)?))
        }
        6 => Ok(Rgb8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        _ => Err("hex color must be #RGB or #RRGGBB (case-insensitive)".to_owned()),
    }
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb8 {
    let h = h.rem_euclid(360.0) / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        let v = l * 255.0;
        return from_channels(v, v, v);
    }

    fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    from_channels(
        hue_to_rgb(p, q, h + 1.0 / 3.0) * 255.0,
        hue_to_rgb(p, q, h) * 255.0,
        hue_to_rgb(p, q, h - 1.0 / 3.0) * 255.0,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/config/color.rs"]
mod tests;
