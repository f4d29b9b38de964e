//! Pure display-unit conversion helpers
//!
//! All conversions run on integer math; the smallest-unit strings in
//! the canonical model never pass through floats.

/// Nanoton precision of the native asset.
pub const NATIVE_DECIMALS: u32 = 9;

/// Format a nanoton amount for display with 4 fractional digits,
/// rounding half up. Unparseable input formats as zero.
pub fn format_nano(nano: &str) -> String {
    let n: u128 = match nano.parse() {
        Ok(n) => n,
        Err(_) => return "0.0000".to_string(),
    };
    let unit = 10u128.pow(NATIVE_DECIMALS);
    let mut whole = n / unit;
    let rem = n % unit;
    // Keep 4 digits, round on the 5th
    let scale = unit / 10_000;
    let mut frac = rem / scale;
    if rem % scale >= scale / 2 {
        frac += 1;
    }
    if frac == 10_000 {
        whole += 1;
        frac = 0;
    }
    format!("{}.{:04}", whole, frac)
}

/// Convert a smallest-unit amount to display units for an asset with
/// the given decimal count, trimming trailing fractional zeros.
pub fn to_display_units(amount: &str, decimals: u32) -> String {
    let n: u128 = match amount.parse() {
        Ok(n) => n,
        Err(_) => return "0".to_string(),
    };
    if decimals == 0 {
        return n.to_string();
    }
    let unit = 10u128.pow(decimals);
    let whole = n / unit;
    let rem = n % unit;
    if rem == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", rem, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Shorten an address for display: first `start` and last `end` chars.
pub fn truncate_address(address: &str, start: usize, end: usize) -> String {
    if address.len() <= start + end {
        return address.to_string();
    }
    format!("{}...{}", &address[..start], &address[address.len() - end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_tons() {
        assert_eq!(format_nano("1000000000"), "1.0000");
        assert_eq!(format_nano("0"), "0.0000");
    }

    #[test]
    fn rounds_half_up_on_fifth_digit() {
        assert_eq!(format_nano("1234567890"), "1.2346");
        assert_eq!(format_nano("1234549999"), "1.2345");
    }

    #[test]
    fn rounding_carries_into_the_whole_part() {
        assert_eq!(format_nano("1999999999"), "2.0000");
    }

    #[test]
    fn garbage_formats_as_zero() {
        assert_eq!(format_nano("not-a-number"), "0.0000");
        assert_eq!(format_nano("-5"), "0.0000");
    }

    #[test]
    fn display_units_trim_trailing_zeros() {
        assert_eq!(to_display_units("1500000000", 9), "1.5");
        assert_eq!(to_display_units("1000000000", 9), "1");
        assert_eq!(to_display_units("123", 0), "123");
    }

    #[test]
    fn truncates_long_addresses() {
        let addr = "EQAvDfWFG0oYX19jwNDNBBL1rKNT9XfaGP9HyTb5nb2Eml6y";
        assert_eq!(truncate_address(addr, 6, 4), "EQAvDf...ml6y");
        assert_eq!(truncate_address("short", 6, 4), "short");
    }
}
