use crate::constants::{TOKEN_DECIMALS, UNITS_PER_TOKEN};
use crate::error::PotfiError;
use crate::types::Balance;

/// Parse a non-negative decimal token amount ("50", "0.01", "12.5") into base units.
pub fn parse_token_amount(s: &str) -> Result<Balance, PotfiError> {
    let invalid = |why: &str| PotfiError::InvalidRequest(format!("invalid amount {s:?}: {why}"));

    let s = s.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("empty"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("expected decimal digits"));
    }
    if frac.len() > TOKEN_DECIMALS as usize {
        return Err(invalid("too many fractional digits"));
    }

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .ok()
            .and_then(|w| w.checked_mul(UNITS_PER_TOKEN))
            .ok_or_else(|| invalid("too large"))?
    };
    let frac_units = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = TOKEN_DECIMALS as usize);
        padded.parse::<u128>().map_err(|_| invalid("bad fraction"))?
    };

    whole_units
        .checked_add(frac_units)
        .ok_or_else(|| invalid("too large"))
}

/// Render base units as a decimal token amount without trailing zeros.
pub fn format_token_amount(units: Balance) -> String {
    let whole = units / UNITS_PER_TOKEN;
    let frac = units % UNITS_PER_TOKEN;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{frac:0>width$}", width = TOKEN_DECIMALS as usize);
    format!("{whole}.{}", frac_str.trim_end_matches('0'))
}
