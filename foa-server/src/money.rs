//! Money calculation utilities using rust_decimal for precision
//!
//! Documents store prices as `f64` (the clients treat them as JS numbers).
//! Every sum, fee and tax is computed in `Decimal` and rounded to 2 places
//! before it is written back.

use rust_decimal::prelude::*;
use shared::error::{AppError, AppResult, ErrorCode};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price for a food, topping or delivery fee
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Cart line quantity bounds
pub const MIN_QUANTITY: i64 = 1;
pub const MAX_QUANTITY: i64 = 9999;

/// Tax rate applied in the revenue report (7%)
pub const TAX_RATE: Decimal = Decimal::from_parts(7, 0, 0, false, 2);

/// Validate a catalog price: finite, non-negative, bounded
pub fn validate_price(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::with_message(
            ErrorCode::FoodInvalidPrice,
            format!("{field} must be a finite number, got {value}"),
        ));
    }
    if value < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::FoodInvalidPrice,
            format!("{field} must be non-negative, got {value}"),
        ));
    }
    if value > MAX_PRICE {
        return Err(AppError::with_message(
            ErrorCode::FoodInvalidPrice,
            format!("{field} exceeds maximum allowed ({MAX_PRICE}), got {value}"),
        ));
    }
    Ok(())
}

/// Validate a cart quantity and narrow it to `u32`
pub fn validate_quantity(quantity: i64) -> AppResult<u32> {
    if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!("quantity must be between {MIN_QUANTITY} and {MAX_QUANTITY}, got {quantity}"),
        )
        .with_detail("quantity", quantity));
    }
    Ok(quantity as u32)
}

/// Convert f64 to Decimal; non-finite values become zero
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round to 2 decimal places, half away from zero
#[inline]
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_default()
}

/// Unit price of a cart line: food price plus every topping price
pub fn unit_price(food_price: f64, topping_prices: impl IntoIterator<Item = f64>) -> Decimal {
    let toppings: Decimal = topping_prices.into_iter().map(to_decimal).sum();
    round(to_decimal(food_price) + toppings)
}

/// Σ unit price × quantity
pub fn subtotal(lines: impl IntoIterator<Item = (f64, u32)>) -> Decimal {
    round(
        lines
            .into_iter()
            .map(|(price, qty)| to_decimal(price) * Decimal::from(qty))
            .sum(),
    )
}

/// Amount in minor units (pesewas) for the payment provider
pub fn to_minor_units(value: Decimal) -> i64 {
    (round(value) * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .unwrap_or_default()
}

/// Share of `part` in `total` as a percentage with 2 decimals; 0 when total is 0
pub fn percentage(part: Decimal, total: Decimal) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    to_f64(part / total * Decimal::ONE_HUNDRED)
}

/// `GH₵ 12.50`
pub fn format_cedis(value: f64) -> String {
    format!("GH₵ {:.2}", to_decimal(value).round_dp(DECIMAL_PLACES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_price_adds_toppings() {
        let price = unit_price(12.5, [1.25, 0.75]);
        assert_eq!(to_f64(price), 14.5);
    }

    #[test]
    fn test_subtotal_rounds_to_cents() {
        // 0.1 + 0.2 style drift must not leak
        let total = subtotal([(0.1, 1), (0.2, 1)]);
        assert_eq!(to_f64(total), 0.3);

        let total = subtotal([(15.0, 2)]);
        assert_eq!(to_f64(total), 30.0);

        let total = subtotal([(3.333, 3)]);
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(to_minor_units(to_decimal(30.0)), 3000);
        assert_eq!(to_minor_units(to_decimal(12.346)), 1235);
        assert_eq!(to_minor_units(Decimal::ZERO), 0);
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.0, "price").is_ok());
        assert!(validate_price(25.5, "price").is_ok());
        assert!(validate_price(-1.0, "price").is_err());
        assert!(validate_price(f64::NAN, "price").is_err());
        assert!(validate_price(f64::INFINITY, "price").is_err());
        assert!(validate_price(MAX_PRICE + 1.0, "price").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity(1).unwrap(), 1);
        assert_eq!(validate_quantity(9999).unwrap(), 9999);
        let err = validate_quantity(0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(10_000).is_err());
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(Decimal::from(1), Decimal::from(3)), 33.33);
        assert_eq!(percentage(Decimal::from(5), Decimal::ZERO), 0.0);
        assert_eq!(percentage(Decimal::from(4), Decimal::from(4)), 100.0);
    }

    #[test]
    fn test_format_cedis() {
        assert_eq!(format_cedis(12.5), "GH₵ 12.50");
        assert_eq!(format_cedis(0.0), "GH₵ 0.00");
    }

    #[test]
    fn test_tax_rate() {
        assert_eq!(to_f64(TAX_RATE * Decimal::from(100)), 7.0);
    }
}
