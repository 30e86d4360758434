//! Size tokens such as `128M`, `4G` or `4096`

use sortjudge_common::{HarnessError, HarnessResult};

/// Element size of the sorted data
pub const INT_SIZE: u64 = 4;

/// Element count used for `8G`, which would overflow a C `int`
pub const INT_MAX_COUNT: u64 = i32::MAX as u64;

/// Default sizes for a full benchmark sweep
pub const DEFAULT_SIZES: [&str; 7] = ["128M", "256M", "512M", "1G", "2G", "4G", "8G"];

/// Binary unit multiplier for a size suffix
fn unit_bytes(suffix: char) -> Option<u64> {
    match suffix {
        'K' => Some(1 << 10),
        'M' => Some(1 << 20),
        'G' => Some(1 << 30),
        _ => None,
    }
}

/// A requested input size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSpec {
    /// Token as the user typed it; names fixtures and report rows
    pub label: String,
    /// Number of 4-byte integers
    pub int_count: u64,
}

impl SizeSpec {
    pub fn parse(token: &str) -> HarnessResult<Self> {
        Ok(Self {
            label: token.to_string(),
            int_count: parse_int_count(token)?,
        })
    }

    /// Expected byte length of fixture files
    pub fn byte_len(&self) -> u64 {
        self.int_count * INT_SIZE
    }
}

/// Convert a size token into a number of 4-byte integers.
///
/// Suffixed values are bytes divided by four, truncating. Bare values must
/// be a multiple of four. `8G` maps to `i32::MAX`.
pub fn parse_int_count(token: &str) -> HarnessResult<u64> {
    let normalized = token.trim().to_uppercase();
    if normalized == "8G" {
        return Ok(INT_MAX_COUNT);
    }

    let invalid = || HarnessError::InvalidSize(normalized.clone());

    let last = normalized.chars().last().ok_or_else(invalid)?;
    if let Some(unit) = unit_bytes(last) {
        let value = parse_decimal(&normalized[..normalized.len() - 1]).ok_or_else(invalid)?;
        let bytes = value.checked_mul(unit).ok_or_else(invalid)?;
        return Ok(bytes / INT_SIZE);
    }

    let bytes = parse_decimal(&normalized).ok_or_else(invalid)?;
    if bytes % INT_SIZE != 0 {
        return Err(HarnessError::NotIntMultiple(normalized));
    }
    Ok(bytes / INT_SIZE)
}

fn parse_decimal(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
