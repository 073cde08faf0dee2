//! Currency and date rendering for goal summaries.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn symbol(&self) -> &str {
        match self.as_str() {
            "USD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" => "¥",
            "AUD" => "A$",
            other => other,
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

/// Formats `amount` with the currency symbol, grouped thousands, and
/// `precision` fraction digits, e.g. `-$1,250`.
pub fn format_currency(amount: f64, code: &CurrencyCode, precision: u8) -> String {
    let body = format_number(amount.abs(), precision);
    let symbol = code.symbol();
    let spaced = if symbol.chars().all(char::is_alphabetic) {
        format!("{} {}", symbol, body)
    } else {
        format!("{}{}", symbol, body)
    };
    // Rounding can turn a tiny negative into zero; no sign for that.
    if amount < 0.0 && body.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        format!("-{}", spaced)
    } else {
        spaced
    }
}

pub fn format_number(value: f64, precision: u8) -> String {
    let body = format!("{:.*}", precision as usize, value);
    match body.split_once('.') {
        Some((int_part, fraction)) => format!("{}.{}", group_digits(int_part), fraction),
        None => group_digits(&body),
    }
}

fn group_digits(int_part: &str) -> String {
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index != 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}

/// Medium date style, e.g. `05 Mar 2025`.
pub fn format_date(date: DateTime<Utc>) -> String {
    format!(
        "{:02} {} {}",
        date.day(),
        month_label(date.month()),
        date.year()
    )
}

fn month_label(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "",
    }
}
