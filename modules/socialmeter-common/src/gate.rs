//! Final validation before a follower value may overwrite stored state.
//!
//! Deliberately stricter than the value parser: the parser can interpret
//! `"1.5M"` as a number, the gate refuses to let that interpretation reach
//! storage. Only fully-resolved integer counts persist.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    /// Abbreviated K/M figures are inherently imprecise and must never
    /// silently overwrite a previously exact stored count. The message is a
    /// preserved source contract: tell the operator to enter the exact
    /// number by hand.
    #[error("估算值不可覆寫精確數字，請改用手動輸入精確數字")]
    Estimate,

    #[error("not a numeric follower count")]
    NotNumeric,
}

/// Accept only a pure-digit string, optionally with `,` separators.
pub fn validate(raw: &str) -> Result<(), GateRejection> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(GateRejection::NotNumeric);
    }

    if raw.chars().all(|c| c.is_ascii_digit() || c == ',')
        && raw.chars().any(|c| c.is_ascii_digit())
    {
        return Ok(());
    }

    // A K/M suffix over an otherwise numeric mantissa is an estimate, which
    // gets its own rejection so callers can prompt for manual entry.
    if let Some(mantissa) = raw.strip_suffix(['K', 'k', 'M', 'm']) {
        let mantissa = mantissa.trim();
        if !mantissa.is_empty()
            && mantissa
                .chars()
                .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        {
            return Err(GateRejection::Estimate);
        }
    }

    Err(GateRejection::NotNumeric)
}
