//! BER encoded REAL values.
//!
//! See clause 8.5 of ITU Recommendation X.690 for the encoding. The content
//! octets start with an information octet that selects one of three forms.
//! If bit 8 is set, the value is binary encoded. If bit 7 is set instead,
//! it is one of the special values. Otherwise the value is given as decimal
//! characters as defined in ISO 6093.

use std::str;
use crate::decode::ContentError;


//------------ Configuration Constants ---------------------------------------

/// The largest binary exponent we care about.
///
/// Every exponent beyond this results in infinity or zero for an `f64`.
const MAX_EXPONENT: i64 = 2200;


//------------ Decoding ------------------------------------------------------

/// Decodes the content octets of a REAL value into an `f64`.
///
/// Empty content octets are the value zero.
pub fn decode_f64(content: &[u8]) -> Result<f64, ContentError> {
    let Some((&first, rest)) = content.split_first() else {
        return Ok(0.)
    };
    if first & 0x80 != 0 {
        decode_binary(first, rest)
    }
    else if first & 0x40 != 0 {
        decode_special(first, rest)
    }
    else {
        decode_decimal(first, rest)
    }
}

/// Decodes the content octets of a REAL value into an `f32`.
pub fn decode_f32(content: &[u8]) -> Result<f32, ContentError> {
    decode_f64(content).map(|value| value as f32)
}

/// Decodes the binary form.
///
/// The information octet is `1 S BB FF EE`: the sign, the base, the scaling
/// factor, and the format of the exponent. The value is
/// `S × N × 2^F × base^E` with the mantissa `N` following the exponent `E`.
fn decode_binary(first: u8, rest: &[u8]) -> Result<f64, ContentError> {
    let negative = first & 0x40 != 0;
    let base_bits = match (first >> 4) & 0x03 {
        0 => 1,
        1 => 3,
        2 => 4,
        _ => return Err(ContentError::from_static("reserved REAL base")),
    };
    let scale = i64::from((first >> 2) & 0x03);

    let (exp_len, rest) = match first & 0x03 {
        3 => match rest.split_first() {
            Some((&len, rest)) => (usize::from(len), rest),
            None => {
                return Err(ContentError::from_static("missing REAL exponent"))
            }
        },
        n => (usize::from(n) + 1, rest)
    };
    if exp_len == 0 || exp_len > rest.len() {
        return Err(ContentError::from_static("missing REAL exponent"))
    }
    let (exp, mantissa) = rest.split_at(exp_len);
    let exp = decode_exponent(exp)?;

    // Leading zeros don’t add anything to the mantissa.
    let start = mantissa.iter().position(|&x| x != 0).unwrap_or(
        mantissa.len()
    );
    let mantissa = &mantissa[start..];
    if mantissa.len() > 8 {
        return Err(ContentError::from_static("REAL mantissa too large"))
    }
    let mut buf = [0u8; 8];
    buf[8 - mantissa.len()..].copy_from_slice(mantissa);
    let mantissa = u64::from_be_bytes(buf);

    let exp = exp.saturating_mul(base_bits).saturating_add(scale);
    let value = scale_by_power_of_two(mantissa as f64, exp);
    Ok(if negative { -value } else { value })
}

/// Decodes a two’s complement exponent.
///
/// Exponents too large for an `i64` are clamped since they lead to infinity
/// or zero anyway.
fn decode_exponent(exp: &[u8]) -> Result<i64, ContentError> {
    let negative = exp[0] & 0x80 != 0;
    let mut res: i64 = if negative { -1 } else { 0 };
    for &octet in exp {
        if res > MAX_EXPONENT {
            return Ok(MAX_EXPONENT + 1)
        }
        if res < -MAX_EXPONENT {
            return Ok(-MAX_EXPONENT - 1)
        }
        res = (res << 8) | i64::from(octet);
    }
    Ok(res)
}

/// Returns `value × 2^exp` without losing subnormal results.
fn scale_by_power_of_two(value: f64, exp: i64) -> f64 {
    if value == 0. {
        return 0.
    }
    let exp = exp.clamp(-MAX_EXPONENT, MAX_EXPONENT) as i32;

    // A single power of two over- or underflows before the product does, so
    // split the exponent in two halves.
    let half = exp / 2;
    value * 2f64.powi(half) * 2f64.powi(exp - half)
}

/// Decodes the special values.
fn decode_special(first: u8, rest: &[u8]) -> Result<f64, ContentError> {
    if !rest.is_empty() {
        return Err(ContentError::from_static("trailing data in special REAL"))
    }
    match first {
        0x40 => Ok(f64::INFINITY),
        0x41 => Ok(f64::NEG_INFINITY),
        0x42 => Ok(f64::NAN),
        0x43 => Ok(-0.),
        _ => Err(ContentError::from_static("unknown special REAL value"))
    }
}

/// Decodes the decimal form.
///
/// The lower six bits of the information octet name the ISO 6093 number
/// representation, NR1, NR2, or NR3. We accept any of them for any
/// representation.
fn decode_decimal(first: u8, rest: &[u8]) -> Result<f64, ContentError> {
    if !(1..=3).contains(&(first & 0x3F)) {
        return Err(ContentError::from_static("unknown decimal REAL form"))
    }
    let text = str::from_utf8(rest).map_err(|_| {
        ContentError::from_static("invalid decimal REAL")
    })?;
    let text = text.trim_start_matches(' ').replace(',', ".");
    // Rust’s float parser also understands things like "inf" and "NaN".
    let is_letter = |ch: char| ch.is_alphabetic() && ch != 'e' && ch != 'E';
    if text.is_empty() || text.contains(is_letter) {
        return Err(ContentError::from_static("invalid decimal REAL"))
    }
    text.parse().map_err(|_| {
        ContentError::from_static("invalid decimal REAL")
    })
}


//============ Tests =========================================================
