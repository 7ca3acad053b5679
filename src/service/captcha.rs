use axum_extra::extract::{cookie::Cookie, SignedCookieJar};
use rand::Rng;
use subtle::ConstantTimeEq;

use crate::error::{ErrorMessage, HttpError};

pub const CAPTCHA_COOKIE: &str = "captcha";
pub const CAPTCHA_LENGTH: usize = 5;
pub const CAPTCHA_MAX_AGE_MINUTES: i64 = 5;

// No 0/O, 1/I/L.
const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

const WIDTH: u32 = 150;
const HEIGHT: u32 = 50;
const NOISE_LINES: usize = 6;

#[derive(Debug, Clone)]
pub struct Captcha {
    pub code: String,
    pub svg: String,
}

pub fn generate() -> Captcha {
    let mut rng = rand::rng();

    let code: String = (0..CAPTCHA_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();

    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="100%" height="100%" fill="#f4f4f4"/>"##,
        w = WIDTH,
        h = HEIGHT
    );

    for _ in 0..NOISE_LINES {
        svg.push_str(&format!(
            r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#{:06x}" stroke-width="1"/>"##,
            rng.random_range(0..WIDTH),
            rng.random_range(0..HEIGHT),
            rng.random_range(0..WIDTH),
            rng.random_range(0..HEIGHT),
            rng.random_range(0x404040..0xb0b0b0u32),
        ));
    }

    let step = WIDTH / (CAPTCHA_LENGTH as u32 + 1);
    for (i, ch) in code.chars().enumerate() {
        let x = step * (i as u32 + 1) + rng.random_range(0..6);
        let y = HEIGHT / 2 + 8 + rng.random_range(0..8) - 4;
        let rotate: i32 = rng.random_range(-25..=25);
        svg.push_str(&format!(
            r##"<text x="{x}" y="{y}" font-family="monospace" font-size="28" fill="#{color:06x}" transform="rotate({rotate} {x} {y})">{ch}</text>"##,
            color = rng.random_range(0x101010..0x606060u32),
        ));
    }

    svg.push_str("</svg>");

    Captcha { code, svg }
}

pub fn captcha_cookie(code: &str) -> Cookie<'static> {
    Cookie::build((CAPTCHA_COOKIE, code.to_lowercase()))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::minutes(CAPTCHA_MAX_AGE_MINUTES))
        .build()
}

/// Removal cookie; the path must match the one the code was issued with.
pub fn expired_captcha_cookie() -> Cookie<'static> {
    Cookie::build((CAPTCHA_COOKIE, "")).path("/").build()
}

/// Case-insensitive, constant-time comparison. A missing side never matches.
pub fn captcha_matches(expected: Option<&str>, submitted: Option<&str>) -> bool {
    let (Some(expected), Some(submitted)) = (expected, submitted) else {
        return false;
    };

    let expected = expected.trim().to_lowercase();
    let submitted = submitted.trim().to_lowercase();
    if expected.is_empty() || submitted.is_empty() {
        return false;
    }

    expected.as_bytes().ct_eq(submitted.as_bytes()).into()
}

pub fn verify_captcha(jar: &SignedCookieJar, submitted: Option<&str>) -> Result<(), HttpError> {
    let expected = jar.get(CAPTCHA_COOKIE);
    if captcha_matches(expected.as_ref().map(|c| c.value()), submitted) {
        Ok(())
    } else {
        Err(HttpError::bad_request(ErrorMessage::InvalidCaptcha.to_string()))
    }
}
