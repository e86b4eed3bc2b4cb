//! Size Conversion
//!
//! Converts user size strings such as `512M` or `2G` into megabytes and
//! aligns them to the volume group's physical partition size.

use crate::error::{Error, Result};

/// Units accepted as size suffixes, each 1024 times the previous one
const UNITS: [char; 3] = ['M', 'G', 'T'];

/// Parse a size string (e.g. "512M", "2g", "1T") into megabytes
pub fn convert_size(size: &str) -> Result<u64> {
    let size = size.trim();
    let unit = size
        .chars()
        .last()
        .ok_or_else(|| Error::InvalidSize { size: size.into() })?
        .to_ascii_uppercase();

    let index = UNITS
        .iter()
        .position(|u| *u == unit)
        .ok_or_else(|| Error::InvalidSizeUnit { size: size.into() })?;

    let prefix = &size[..size.len() - 1];
    let value: u64 = prefix
        .parse()
        .map_err(|_| Error::InvalidSize { size: size.into() })?;
    if value == 0 {
        return Err(Error::InvalidSize { size: size.into() });
    }

    value
        .checked_mul(1024u64.pow(index as u32))
        .ok_or_else(|| Error::InvalidSize { size: size.into() })
}

/// Round `value` to a multiple of `base`, never below `value`.
///
/// The quotient is rounded half-to-even first; a result that lands below
/// the request is bumped by one more `base`. `None` when the aligned size
/// does not fit in a `u64`.
pub fn round_to_allocation_unit(value: u64, base: u64) -> Option<u64> {
    if base == 0 {
        return Some(value);
    }

    let quotient = value / base;
    let remainder = value % base;
    let rounded_quotient = match remainder.cmp(&(base - remainder)) {
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal if quotient % 2 == 1 => quotient + 1,
        _ => quotient,
    };

    let rounded = rounded_quotient.checked_mul(base)?;
    if rounded < value {
        return rounded.checked_add(base);
    }
    Some(rounded)
}

/// Convert a size string and align it to the partition size
pub fn target_size(size: &str, allocation_unit_size: u64) -> Result<u64> {
    round_to_allocation_unit(convert_size(size)?, allocation_unit_size)
        .ok_or_else(|| Error::InvalidSize { size: size.into() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_convert_size() {
        assert_eq!(convert_size("512M").unwrap(), 512);
        assert_eq!(convert_size("512m").unwrap(), 512);
        assert_eq!(convert_size("1G").unwrap(), 1024);
        assert_eq!(convert_size("3g").unwrap(), 3 * 1024);
        assert_eq!(convert_size("2T").unwrap(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_convert_size_rejects_bad_input() {
        assert_matches!(convert_size("512K"), Err(Error::InvalidSizeUnit { .. }));
        assert_matches!(convert_size("512"), Err(Error::InvalidSizeUnit { .. }));
        assert_matches!(convert_size("1P"), Err(Error::InvalidSizeUnit { .. }));
        assert_matches!(convert_size(""), Err(Error::InvalidSize { .. }));
        assert_matches!(convert_size("M"), Err(Error::InvalidSize { .. }));
        assert_matches!(convert_size("1.5G"), Err(Error::InvalidSize { .. }));
        assert_matches!(convert_size("0G"), Err(Error::InvalidSize { .. }));
    }

    #[test]
    fn test_round_to_allocation_unit() {
        assert_eq!(round_to_allocation_unit(512, 4), Some(512));
        assert_eq!(round_to_allocation_unit(1200, 16), Some(1200));
        assert_eq!(round_to_allocation_unit(1201, 16), Some(1216));
        // below the half-way point still rounds up
        assert_eq!(round_to_allocation_unit(17, 16), Some(32));
        // exact half with an even quotient
        assert_eq!(round_to_allocation_unit(40, 16), Some(48));
        assert_eq!(round_to_allocation_unit(1, 256), Some(256));
    }

    #[test]
    fn test_rounding_never_under_allocates() {
        for base in [1u64, 2, 4, 8, 16, 32, 64, 128, 256, 3, 7] {
            for value in 1..=1000u64 {
                let rounded = round_to_allocation_unit(value, base).unwrap();
                assert_eq!(rounded % base, 0, "value={} base={}", value, base);
                assert!(rounded >= value, "value={} base={}", value, base);
                assert!(rounded < value + base, "value={} base={}", value, base);
            }
        }
    }

    #[test]
    fn test_target_size() {
        assert_eq!(target_size("512M", 4).unwrap(), 512);
        assert_eq!(target_size("1G", 64).unwrap(), 1024);
        assert_eq!(target_size("100M", 64).unwrap(), 128);
    }

    #[test]
    fn test_alignment_overflow_is_invalid() {
        assert_eq!(round_to_allocation_unit(u64::MAX, 4), None);
        assert_eq!(round_to_allocation_unit(u64::MAX - 1, 4), None);
        assert_eq!(round_to_allocation_unit(u64::MAX, 1), Some(u64::MAX));
        assert_eq!(round_to_allocation_unit(u64::MAX - 3, 4), Some(u64::MAX - 3));

        assert_matches!(
            target_size("18446744073709551615M", 4),
            Err(Error::InvalidSize { size }) if size == "18446744073709551615M"
        );
    }
}
