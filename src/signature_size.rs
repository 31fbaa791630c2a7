//! Bloom filter dimensioning, ported directly from
//! `cobs/util/calc_signature_size.cpp`: given an element count, hash
//! count, and target false-positive rate, compute the signature size in
//! bits, plus a diagnostic for the expected fraction of set bits.

use crate::error::Error;

/// `ratio = -k / ln(1 - p^(1/k))`, the number of signature bits needed
/// per inserted element to hit false-positive rate `p` with `k` hash
/// functions.
pub fn calc_signature_size_ratio(num_hashes: u32, false_positive_rate: f64) -> Result<f64, Error> {
    if !(0.0..1.0).contains(&false_positive_rate) || false_positive_rate <= 0.0 {
        return Err(Error::OutOfRange(format!(
            "false_positive_rate must be in (0, 1), got {false_positive_rate}"
        )));
    }
    if num_hashes == 0 {
        return Err(Error::OutOfRange("num_hashes must be positive".into()));
    }
    let k = num_hashes as f64;
    let inner = 1.0 - false_positive_rate.powf(1.0 / k);
    if inner <= 0.0 || inner >= 1.0 {
        return Err(Error::OutOfRange(format!(
            "signature size ratio undefined for num_hashes={num_hashes}, p={false_positive_rate}"
        )));
    }
    let ratio = -k / inner.ln();
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(Error::OutOfRange("computed ratio is non-positive or non-finite".into()));
    }
    Ok(ratio)
}

/// `m = ceil(n * ratio)`, the signature size in bits for `n` elements.
pub fn calc_signature_size(
    num_elements: u64,
    num_hashes: u32,
    false_positive_rate: f64,
) -> Result<u64, Error> {
    let ratio = calc_signature_size_ratio(num_hashes, false_positive_rate)?;
    let m = (num_elements as f64 * ratio).ceil();
    if !m.is_finite() || m <= 0.0 || m > u64::MAX as f64 {
        return Err(Error::OutOfRange(format!(
            "computed signature size {m} is out of range"
        )));
    }
    Ok(m as u64)
}

/// Expected fraction of set bits in a signature of size `signature_size`
/// after inserting `num_elements` elements with `num_hashes` hash
/// functions each: `1 - (1 - 1/m)^(k*n)`.
pub fn calc_average_set_bit_ratio(
    signature_size: u64,
    num_hashes: u32,
    num_elements: u64,
) -> Result<f64, Error> {
    if signature_size == 0 {
        return Err(Error::OutOfRange("signature_size must be positive".into()));
    }
    let m = signature_size as f64;
    let exponent = num_hashes as f64 * num_elements as f64;
    let ratio = 1.0 - (1.0 - 1.0 / m).powf(exponent);
    Ok(ratio)
}
