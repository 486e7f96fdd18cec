//! Headline business metrics for a selection

use std::fmt;

use serde::Serialize;

use crate::filter::Selection;

/// Scalar KPIs shown above the charts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Kpis {
    /// Sum of `Total`, truncated to whole currency units
    pub total_sales: i64,
    /// Mean `Rating`, rounded to 1 decimal place
    pub average_rating: f64,
    /// Mean `Total`, rounded to 2 decimal places
    pub average_transaction_value: f64,
    /// Sum of `gross income`
    pub gross_profit: f64,
    /// Mean `gross margin percentage`
    pub average_margin_percent: f64,
    /// Number of stars to draw for the average rating
    pub star_rating: u32,
}

/// Reduce a selection to its KPIs.
///
/// An empty selection yields the all-zero value.
pub fn summarize(selection: &Selection<'_>) -> Kpis {
    if selection.is_empty() {
        return Kpis::default();
    }

    let count = selection.len() as f64;
    let mut total = 0.0;
    let mut rating = 0.0;
    let mut gross_income = 0.0;
    let mut margin = 0.0;
    for record in selection.iter() {
        total += record.total;
        rating += record.rating;
        gross_income += record.gross_income;
        margin += record.gross_margin_percentage;
    }

    let average_rating = round_to(rating / count, 1);
    Kpis {
        total_sales: total.trunc() as i64,
        average_rating,
        average_transaction_value: round_to(total / count, 2),
        gross_profit: gross_income,
        average_margin_percent: margin / count,
        star_rating: star_count(average_rating),
    }
}

/// Round to the given number of decimal places
///
/// Works on the exact binary value, so `2.675` (stored just below) rounds
/// down and exact ties such as `0.25` round half to even.
pub fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

/// Whole stars for a rating; non-positive ratings get none
pub fn star_count(rating: f64) -> u32 {
    if rating > 0.0 {
        rating.round_ties_even() as u32
    } else {
        0
    }
}

/// Integer with comma thousands separators
pub(crate) fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

fn money(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    format!(
        "{}{}.{:02}",
        if cents < 0 && cents / 100 == 0 { "-" } else { "" },
        group_thousands(cents / 100),
        (cents % 100).abs()
    )
}

impl fmt::Display for Kpis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Sales: US $ {}", group_thousands(self.total_sales))?;
        writeln!(
            f,
            "Average Rating: {} {}",
            self.average_rating,
            "*".repeat(self.star_rating as usize)
        )?;
        writeln!(
            f,
            "Average Sales Per Transaction: US $ {}",
            self.average_transaction_value
        )?;
        writeln!(f, "Gross Profit: US $ {}", money(self.gross_profit))?;
        write!(f, "Avg Margin %: {:.1}%", self.average_margin_percent)
    }
}
