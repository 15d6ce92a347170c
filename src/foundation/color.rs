use crate::foundation::core::Rgba8;
use crate::foundation::error::{AdError, AdResult};

/// Parse a CSS color string as used in template backgrounds and element styles.
///
/// Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()` with 0-255 or
/// percentage channels, `hsl()`/`hsla()`, `transparent` and common named colors. Matching is
/// case-insensitive.
pub fn parse_css_color(input: &str) -> AdResult<Rgba8> {
    let s = input.trim().to_ascii_lowercase();
    if s.is_empty() {
        return Err(AdError::validation("color must be non-empty"));
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = function_args(&s, "rgba").or_else(|| function_args(&s, "rgb")) {
        return parse_rgb_args(args);
    }
    if let Some(args) = function_args(&s, "hsla").or_else(|| function_args(&s, "hsl")) {
        return parse_hsl_args(args);
    }
    named_color(&s).ok_or_else(|| AdError::validation(format!("unknown color \"{input}\"")))
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_hex(s: &str) -> AdResult<Rgba8> {
    fn nibble(c: u8) -> AdResult<u8> {
        (c as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| AdError::validation(format!("invalid hex digit '{}'", c as char)))
    }
    fn byte(pair: &[u8]) -> AdResult<u8> {
        Ok(nibble(pair[0])? * 16 + nibble(pair[1])?)
    }

    let b = s.as_bytes();
    match b.len() {
        3 | 4 => {
            let mut ch = [255u8; 4];
            for (i, c) in b.iter().enumerate() {
                let n = nibble(*c)?;
                ch[i] = n * 16 + n;
            }
            Ok(Rgba8::new(ch[0], ch[1], ch[2], ch[3]))
        }
        6 | 8 => {
            let mut ch = [255u8; 4];
            for (i, pair) in b.chunks_exact(2).enumerate() {
                ch[i] = byte(pair)?;
            }
            Ok(Rgba8::new(ch[0], ch[1], ch[2], ch[3]))
        }
        _ => Err(AdError::validation(
            "hex color must be #rgb, #rgba, #rrggbb or #rrggbbaa",
        )),
    }
}

fn split_args(args: &str) -> Vec<&str> {
    // Both `rgb(1, 2, 3)` and `rgb(1 2 3 / 0.5)` are valid CSS.
    args.split([',', '/', ' '])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_number(part: &str) -> AdResult<f64> {
    part.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AdError::validation(format!("invalid color component \"{part}\"")))
}

fn parse_alpha(part: Option<&&str>) -> AdResult<u8> {
    let Some(part) = part else {
        return Ok(255);
    };
    let a = match part.strip_suffix('%') {
        Some(p) => parse_number(p)? / 100.0,
        None => parse_number(part)?,
    };
    Ok(unit_to_u8(a))
}

fn unit_to_u8(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_rgb_args(args: &str) -> AdResult<Rgba8> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err(AdError::validation("rgb() takes 3 or 4 components"));
    }
    let mut ch = [0u8; 3];
    for (i, part) in parts.iter().take(3).enumerate() {
        ch[i] = match part.strip_suffix('%') {
            Some(p) => unit_to_u8(parse_number(p)? / 100.0),
            None => parse_number(part)?.clamp(0.0, 255.0).round() as u8,
        };
    }
    Ok(Rgba8::new(ch[0], ch[1], ch[2], parse_alpha(parts.get(3))?))
}

fn parse_hsl_args(args: &str) -> AdResult<Rgba8> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err(AdError::validation("hsl() takes 3 or 4 components"));
    }
    let h = parse_number(parts[0].trim_end_matches("deg"))?;
    let s = parse_number(parts[1].trim_end_matches('%'))? / 100.0;
    let l = parse_number(parts[2].trim_end_matches('%'))? / 100.0;
    let (r, g, b) = hsl_to_rgb(h, s, l);
    Ok(Rgba8::new(
        unit_to_u8(r),
        unit_to_u8(g),
        unit_to_u8(b),
        parse_alpha(parts.get(3))?,
    ))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return (l, l, l);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn named_color(name: &str) -> Option<Rgba8> {
    let c = match name {
        "transparent" => return Some(Rgba8::TRANSPARENT),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "navy" => (0, 0, 128),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "orange" => (255, 165, 0),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "gold" => (255, 215, 0),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        "coral" => (255, 127, 80),
        "crimson" => (220, 20, 60),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "whitesmoke" => (245, 245, 245),
        _ => return None,
    };
    Some(Rgba8::opaque(c.0, c.1, c.2))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
