//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::NaiveDate;

/// Format a price with its currency for display
pub fn format_price(amount: f64, currency: &str) -> String {
    match currency {
        "EUR" => format!("{amount:.2} €"),
        "GBP" => format!("£{amount:.2}"),
        "PLN" => format!("{amount:.2} zł"),
        other => format!("{amount:.2} {other}"),
    }
}

/// Short English month name for keyboard labels
pub fn month_name(month: u32) -> &'static str {
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
        _ => "???",
    }
}

/// Number of days in a given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next {
        Some(first_of_next) => first_of_next.pred_opt().map(|d| {
            use chrono::Datelike;
            d.day()
        }),
        None => None,
    }
    .unwrap_or(31)
}

/// Format a date for headers and labels
pub fn format_date(date: NaiveDate) -> String {
    date.format("%a %d %b %Y").to_string()
}
