// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversions between [`Money`] and the gateway's decimal amounts.

use fieldbook_domain::Money;
use num_traits::ToPrimitive;

/// Converts an amount to the gateway's decimal representation.
#[must_use]
pub fn money_to_amount(money: Money) -> f64 {
    money.cents().to_f64().unwrap_or_default() / 100.0
}

/// Converts a gateway decimal amount to [`Money`], rounding to the cent.
///
/// Returns `None` for negative or non-finite amounts.
#[must_use]
pub fn amount_to_money(amount: f64) -> Option<Money> {
    if !amount.is_finite() {
        return None;
    }
    let cents: i64 = (amount * 100.0).round().to_i64()?;
    Money::from_cents(cents).ok()
}
