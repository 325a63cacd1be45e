//! Money Conversion Module
//!
//! Unified conversion between the internal minor-unit `u64` representation
//! and client-facing strings. All amount conversions MUST go through this
//! module.
//!
//! ## Design Principles
//! 1. Explicit Error Handling: no silent truncation, no zero-defaulting
//! 2. Internal representation is minor units (`10^decimals`, e.g. pennies)
//! 3. Parsing is strict: user input either round-trips exactly or errors

use rust_decimal::prelude::*;
use std::str::FromStr;
use thiserror::Error;

/// Decimal places for GBP amounts (pennies)
pub const GBP_DECIMALS: u32 = 2;

// ============================================================================
// Error Types
// ============================================================================

/// Money conversion errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Parse: Client → Internal (String → u64)
// ============================================================================

/// Convert a client amount string to internal minor units.
///
/// # Errors
/// * `InvalidFormat` - not a number
/// * `InvalidAmount` - zero or negative
/// * `PrecisionOverflow` - more decimal places than the currency allows
/// * `Overflow` - result would not fit in u64
pub fn parse_amount(amount_str: &str, decimals: u32) -> Result<u64, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    let value = Decimal::from_str(amount_str)
        .map_err(|e| MoneyError::InvalidFormat(e.to_string()))?;

    if value.is_sign_negative() || value.is_zero() {
        return Err(MoneyError::InvalidAmount);
    }

    let normalized = value.normalize();
    if normalized.scale() > decimals {
        return Err(MoneyError::PrecisionOverflow {
            provided: normalized.scale(),
            max: decimals,
        });
    }

    let scale_factor = Decimal::from(10u64.pow(decimals));
    let scaled = normalized
        .checked_mul(scale_factor)
        .ok_or(MoneyError::Overflow)?;

    scaled.to_u64().ok_or(MoneyError::Overflow)
}

// ============================================================================
// Format: Internal → Client (u64 → String)
// ============================================================================

/// Format internal minor units as a plain decimal string ("50.00").
pub fn format_amount(amount: u64, decimals: u32) -> String {
    let divisor = 10u64.pow(decimals);
    let whole = amount / divisor;
    let frac = amount % divisor;
    format!("{}.{:0>width$}", whole, frac, width = decimals as usize)
}

/// Format internal minor units with thousands separators ("1,250.75").
///
/// Used by the confirmation summary where amounts are shown to a human.
pub fn format_amount_grouped(amount: u64, decimals: u32) -> String {
    let divisor = 10u64.pow(decimals);
    let whole = amount / divisor;
    let frac = amount % divisor;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}.{:0>width$}", grouped, frac, width = decimals as usize)
}

// ============================================================================
// Tests
// ============================================================================
