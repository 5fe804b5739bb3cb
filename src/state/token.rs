//! Callback-token vocabulary
//!
//! Inline keyboard buttons carry tokens of the form `prefix_field_value`
//! (e.g. `std_dep_year_2025`, `flex_ret_date_2025-08-11`). The prefix names
//! the flow, the middle segments the field being set, the suffix the value.
//! Parsing is strict: anything malformed is `None` and treated as a
//! validation failure by the machine, never a crash.

use chrono::NaiveDate;
use super::context::{Leg, SearchFlow, SearchState};

/// Choice made at the shared price step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceChoice {
    Custom,
    Cheapest,
    All,
}

/// A parsed callback token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Main-menu flow selection
    Menu(SearchFlow),
    Trip { flow: SearchFlow, one_way: bool },
    Country { flow: SearchFlow, leg: Leg, name: String },
    City { flow: SearchFlow, leg: Leg, iata: String },
    Year { flow: SearchFlow, leg: Leg, year: i32 },
    Month { flow: SearchFlow, leg: Leg, month: u32 },
    Range { flow: SearchFlow, leg: Leg, start: u32, end: u32 },
    Date { flow: SearchFlow, leg: Leg, date: NaiveDate },
    DateMode { flow: SearchFlow, with_dates: bool },
    Price { flow: SearchFlow, choice: PriceChoice },
    /// Back-transition registered by the state it leaves
    Back { flow: SearchFlow, from: SearchState },
    /// Reply to the alternative-airports offer
    Alternatives(bool),
    /// Start a new search from the outcome step
    Again,
    /// End the session from the outcome step
    End,
    /// Disabled button; answers a toast and transitions nowhere
    Noop,
}

impl Token {
    pub fn encode(&self) -> String {
        match self {
            Token::Menu(flow) => format!("menu_{}", flow.prefix()),
            Token::Trip { flow, one_way } => {
                format!("{}_trip_{}", flow.prefix(), if *one_way { "oneway" } else { "round" })
            }
            Token::Country { flow, leg, name } => {
                format!("{}_{}_country_{}", flow.prefix(), leg.tag(), name)
            }
            Token::City { flow, leg, iata } => {
                format!("{}_{}_city_{}", flow.prefix(), leg.tag(), iata)
            }
            Token::Year { flow, leg, year } => {
                format!("{}_{}_year_{}", flow.prefix(), leg.tag(), year)
            }
            Token::Month { flow, leg, month } => {
                format!("{}_{}_month_{:02}", flow.prefix(), leg.tag(), month)
            }
            Token::Range { flow, leg, start, end } => {
                format!("{}_{}_range_{}-{}", flow.prefix(), leg.tag(), start, end)
            }
            Token::Date { flow, leg, date } => {
                format!("{}_{}_date_{}", flow.prefix(), leg.tag(), date.format("%Y-%m-%d"))
            }
            Token::DateMode { flow, with_dates } => {
                format!("{}_dates_{}", flow.prefix(), if *with_dates { "pick" } else { "any" })
            }
            Token::Price { flow, choice } => {
                let value = match choice {
                    PriceChoice::Custom => "custom",
                    PriceChoice::Cheapest => "cheapest",
                    PriceChoice::All => "all",
                };
                format!("{}_price_{}", flow.prefix(), value)
            }
            Token::Back { flow, from } => format!("{}_back_{}", flow.prefix(), from.slug()),
            Token::Alternatives(yes) => format!("alt_{}", if *yes { "yes" } else { "no" }),
            Token::Again => "again".to_string(),
            Token::End => "end".to_string(),
            Token::Noop => "noop".to_string(),
        }
    }

    pub fn parse(data: &str) -> Option<Token> {
        match data {
            "again" => return Some(Token::Again),
            "end" => return Some(Token::End),
            "noop" => return Some(Token::Noop),
            "alt_yes" => return Some(Token::Alternatives(true)),
            "alt_no" => return Some(Token::Alternatives(false)),
            _ => {}
        }

        if let Some(prefix) = data.strip_prefix("menu_") {
            return SearchFlow::from_prefix(prefix).map(Token::Menu);
        }

        let mut parts = data.splitn(2, '_');
        let flow = SearchFlow::from_prefix(parts.next()?)?;
        let rest = parts.next()?;

        if let Some(value) = rest.strip_prefix("trip_") {
            let one_way = match value {
                "oneway" => true,
                "round" => false,
                _ => return None,
            };
            return Some(Token::Trip { flow, one_way });
        }
        if let Some(value) = rest.strip_prefix("dates_") {
            let with_dates = match value {
                "pick" => true,
                "any" => false,
                _ => return None,
            };
            return Some(Token::DateMode { flow, with_dates });
        }
        if let Some(value) = rest.strip_prefix("price_") {
            let choice = match value {
                "custom" => PriceChoice::Custom,
                "cheapest" => PriceChoice::Cheapest,
                "all" => PriceChoice::All,
                _ => return None,
            };
            return Some(Token::Price { flow, choice });
        }
        if let Some(slug) = rest.strip_prefix("back_") {
            return SearchState::from_slug(slug).map(|from| Token::Back { flow, from });
        }

        // Leg-scoped field tokens: {leg}_{field}_{value}
        let mut parts = rest.splitn(3, '_');
        let leg = Leg::from_tag(parts.next()?)?;
        let field = parts.next()?;
        let value = parts.next()?;

        match field {
            "country" => Some(Token::Country { flow, leg, name: value.to_string() }),
            "city" => Some(Token::City { flow, leg, iata: value.to_string() }),
            "year" => value.parse().ok().map(|year| Token::Year { flow, leg, year }),
            "month" => {
                // Months are always zero-padded two digits on the wire
                if value.len() != 2 || !value.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let month: u32 = value.parse().ok()?;
                (1..=12).contains(&month).then_some(Token::Month { flow, leg, month })
            }
            "range" => {
                let (start, end) = value.split_once('-')?;
                let start: u32 = start.parse().ok()?;
                let end: u32 = end.parse().ok()?;
                (start <= end).then_some(Token::Range { flow, leg, start, end })
            }
            "date" => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| Token::Date { flow, leg, date }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_parse_round_trip() {
        let tokens = vec![
            Token::Menu(SearchFlow::Top3),
            Token::Trip { flow: SearchFlow::Standard, one_way: false },
            Token::Country {
                flow: SearchFlow::Flexible,
                leg: Leg::Departure,
                name: "United Kingdom".to_string(),
            },
            Token::City { flow: SearchFlow::Standard, leg: Leg::Return, iata: "STN".to_string() },
            Token::Year { flow: SearchFlow::Standard, leg: Leg::Departure, year: 2025 },
            Token::Month { flow: SearchFlow::Flexible, leg: Leg::Return, month: 8 },
            Token::Range { flow: SearchFlow::Top3, leg: Leg::Departure, start: 11, end: 20 },
            Token::Date {
                flow: SearchFlow::Flexible,
                leg: Leg::Return,
                date: NaiveDate::from_ymd_opt(2025, 8, 11).unwrap(),
            },
            Token::DateMode { flow: SearchFlow::FlexibleAnywhere, with_dates: false },
            Token::Price { flow: SearchFlow::Standard, choice: PriceChoice::Cheapest },
            Token::Back {
                flow: SearchFlow::Standard,
                from: SearchState::SelectingReturnDayRange,
            },
            Token::Alternatives(true),
            Token::Again,
            Token::End,
            Token::Noop,
        ];
        for token in tokens {
            assert_eq!(Token::parse(&token.encode()), Some(token));
        }
    }

    #[test]
    fn test_example_wire_formats() {
        assert_eq!(
            Token::parse("std_dep_year_2025"),
            Some(Token::Year { flow: SearchFlow::Standard, leg: Leg::Departure, year: 2025 })
        );
        assert_eq!(
            Token::parse("flex_ret_date_2025-08-11"),
            Some(Token::Date {
                flow: SearchFlow::Flexible,
                leg: Leg::Return,
                date: NaiveDate::from_ymd_opt(2025, 8, 11).unwrap(),
            })
        );
    }

    #[test]
    fn test_month_must_be_zero_padded() {
        assert!(Token::parse("std_dep_month_8").is_none());
        assert!(Token::parse("std_dep_month_13").is_none());
        assert!(Token::parse("std_dep_month_08").is_some());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        assert!(Token::parse("").is_none());
        assert!(Token::parse("std").is_none());
        assert!(Token::parse("xyz_dep_year_2025").is_none());
        assert!(Token::parse("std_dep_date_2025-13-01").is_none());
        assert!(Token::parse("std_dep_range_20-11").is_none());
        assert!(Token::parse("std_back_nowhere").is_none());
    }
}
