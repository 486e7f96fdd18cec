//! Shared fixtures for integration tests
//!
//! Builds small in-memory datasets through the same raw-table path the file
//! readers use.

#![allow(dead_code)]

use chrono::NaiveDate;
use salesdash::io::{RawCell, RawTable};
use salesdash::{CityCoordinates, Dataset};

pub const HEADER: [&str; 12] = [
    "Invoice ID",
    "Branch",
    "City",
    "Customer_type",
    "Gender",
    "Product line",
    "Total",
    "Date",
    "Time",
    "gross margin percentage",
    "gross income",
    "Rating",
];

/// One transaction of a fixture table
#[derive(Debug, Clone)]
pub struct Tx {
    pub city: &'static str,
    pub customer_type: &'static str,
    pub gender: &'static str,
    pub product_line: &'static str,
    pub total: f64,
    pub date: &'static str,
    pub time: &'static str,
    pub gross_income: f64,
    pub rating: f64,
}

impl Tx {
    pub fn new(city: &'static str, date: &'static str, total: f64) -> Self {
        Tx {
            city,
            customer_type: "Member",
            gender: "Female",
            product_line: "Health and beauty",
            total,
            date,
            time: "10:30:00",
            gross_income: total * 0.05 / 1.05,
            rating: 7.0,
        }
    }

    pub fn customer(mut self, customer_type: &'static str, gender: &'static str) -> Self {
        self.customer_type = customer_type;
        self.gender = gender;
        self
    }

    pub fn product(mut self, product_line: &'static str) -> Self {
        self.product_line = product_line;
        self
    }

    pub fn at(mut self, time: &'static str) -> Self {
        self.time = time;
        self
    }

    pub fn rated(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn income(mut self, gross_income: f64) -> Self {
        self.gross_income = gross_income;
        self
    }

    pub fn cells(&self, index: usize) -> Vec<RawCell> {
        let text = |s: &str| RawCell::Text(s.to_string());
        vec![
            text(&format!("INV-{:04}", index)),
            text(branch(self.city)),
            text(self.city),
            text(self.customer_type),
            text(self.gender),
            text(self.product_line),
            RawCell::Number(self.total),
            text(self.date),
            text(self.time),
            RawCell::Number(4.761904762),
            RawCell::Number(self.gross_income),
            RawCell::Number(self.rating),
        ]
    }
}

fn branch(city: &str) -> &'static str {
    match city {
        "Yangon" => "A",
        "Mandalay" => "B",
        "Naypyitaw" => "C",
        _ => "X",
    }
}

pub fn raw_table(transactions: &[Tx]) -> RawTable {
    RawTable {
        header: HEADER.iter().map(|s| s.to_string()).collect(),
        rows: transactions
            .iter()
            .enumerate()
            .map(|(i, tx)| tx.cells(i + 1))
            .collect(),
    }
}

pub fn dataset(transactions: &[Tx]) -> Dataset {
    Dataset::from_raw(raw_table(transactions), &CityCoordinates::default()).unwrap()
}

/// A week of mixed transactions across the three branches
pub fn sample_dataset() -> Dataset {
    dataset(&[
        Tx::new("Yangon", "2019-01-01", 548.97).at("13:08:00").rated(9.1),
        Tx::new("Naypyitaw", "2019-01-01", 80.22)
            .product("Electronic accessories")
            .at("10:29:00")
            .rated(9.6)
            .customer("Normal", "Female"),
        Tx::new("Yangon", "2019-01-02", 340.53)
            .product("Home and lifestyle")
            .at("13:23:00")
            .rated(7.4)
            .customer("Normal", "Male"),
        Tx::new("Mandalay", "2019-01-03", 489.05)
            .at("20:33:00")
            .rated(8.4)
            .customer("Member", "Male"),
        Tx::new("Yangon", "2019-01-04", 634.38)
            .product("Sports and travel")
            .at("10:37:00")
            .rated(5.3)
            .customer("Normal", "Male"),
        Tx::new("Naypyitaw", "2019-01-05", 627.62)
            .product("Electronic accessories")
            .at("18:30:00")
            .rated(4.1)
            .customer("Normal", "Male"),
        Tx::new("Mandalay", "2019-01-06", 433.69)
            .product("Electronic accessories")
            .at("14:36:00")
            .rated(5.8),
        Tx::new("Yangon", "2019-01-07", 772.38)
            .product("Home and lifestyle")
            .at("11:38:00")
            .rated(8.0)
            .customer("Normal", "Female"),
    ])
}

pub fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}
