//! Progressive PAYE tax computation.
//!
//! The monthly gross is annualized, run through the bracket table, and the
//! annual tax is spread back over the pay periods.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::config::TaxTable;

/// The tax charged in one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxBandCharge {
    /// Annual lower bound of the bracket.
    pub lower: Decimal,
    /// Annual upper bound, `None` for the top bracket.
    pub upper: Option<Decimal>,
    /// Marginal rate.
    pub rate: Decimal,
    /// Income that fell into this bracket.
    pub taxable: Decimal,
    /// `taxable x rate`.
    pub tax: Decimal,
}

/// The result of a tax computation, including the per-bracket breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxComputation {
    /// Monthly gross multiplied by the periods per year.
    pub annual_gross: Decimal,
    /// Sum of bracket charges, rounded half-up to 2 dp.
    pub annual_tax: Decimal,
    /// Annual tax divided by the periods per year, rounded half-up to 2 dp.
    pub monthly_tax: Decimal,
    /// Charges of the brackets the income reached.
    pub bands: Vec<TaxBandCharge>,
}

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes the monthly tax on `monthly_gross`.
///
/// # Examples
///
/// ```
/// use settlement_engine::calculation::compute_monthly_tax;
/// use settlement_engine::config::TaxTable;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let tax = compute_monthly_tax(Decimal::new(250_000, 0), &TaxTable::default());
/// assert_eq!(tax.annual_gross, Decimal::new(3_000_000, 0));
/// assert_eq!(tax.annual_tax, Decimal::new(350_000, 0));
/// assert_eq!(tax.monthly_tax, Decimal::from_str("29166.67").unwrap());
/// ```
pub fn compute_monthly_tax(monthly_gross: Decimal, table: &TaxTable) -> TaxComputation {
    let periods = Decimal::from(table.periods_per_year.max(1));
    let annual_gross = monthly_gross * periods;

    let mut bands = Vec::new();
    for (i, bracket) in table.brackets.iter().enumerate() {
        if annual_gross <= bracket.threshold {
            break;
        }
        let upper = table.brackets.get(i + 1).map(|next| next.threshold);
        let ceiling = upper.map_or(annual_gross, |u| u.min(annual_gross));
        let taxable = ceiling - bracket.threshold;
        bands.push(TaxBandCharge {
            lower: bracket.threshold,
            upper,
            rate: bracket.rate,
            taxable,
            tax: taxable * bracket.rate,
        });
    }

    let annual_tax = round_money(bands.iter().map(|b| b.tax).sum());
    let monthly_tax = round_money(annual_tax / periods);

    TaxComputation {
        annual_gross,
        annual_tax,
        monthly_tax,
        bands,
    }
}
