//! Pure step rendering
//!
//! One render function per conversation state, pure in the upstream fields it
//! depends on. Forward transitions and back-navigation both go through
//! `render_step`, so a reconstructed prior step is always pixel-identical to
//! the prompt the forward path produced.

use chrono::{Datelike, NaiveDate};
use crate::catalog::AirportCatalog;
use crate::utils::errors::{FareBuddyError, Result};
use crate::utils::helpers::{days_in_month, month_name};
use super::context::{Leg, SearchParameters, SearchState};
use super::token::{PriceChoice, Token};

/// A single inline button: label plus encoded callback token
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    fn new(label: impl Into<String>, token: Token) -> Self {
        Self { label: label.into(), token: token.encode() }
    }

    /// Disabled button: shown but inert, press answers a toast
    fn noop(label: impl Into<String>) -> Self {
        Self { label: label.into(), token: Token::Noop.encode() }
    }
}

/// Rendered prompt for one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepView {
    pub text: String,
    pub keyboard: Vec<Vec<Button>>,
}

/// The main menu shown by /start and after "new search"
pub fn render_main_menu() -> StepView {
    StepView {
        text: "Hi! I can help you find cheap flights.\n\nPick a search mode:".to_string(),
        keyboard: vec![
            vec![Button::new("✈️ Standard search", Token::Menu(super::context::SearchFlow::Standard))],
            vec![Button::new("🔀 Flexible search", Token::Menu(super::context::SearchFlow::Flexible))],
            vec![Button::new("🌍 Anywhere", Token::Menu(super::context::SearchFlow::FlexibleAnywhere))],
            vec![Button::new("🏆 Top-3 destinations", Token::Menu(super::context::SearchFlow::Top3))],
        ],
    }
}

/// Render the prompt and keyboard for a state, given the fields chosen so far
pub fn render_step(
    state: SearchState,
    params: &SearchParameters,
    catalog: &AirportCatalog,
    today: NaiveDate,
) -> Result<StepView> {
    use SearchState::*;
    let mut view = match state {
        MainMenu => render_main_menu(),
        SelectingTripType => render_trip_type(params),
        SelectingDepartureCountry => render_country(params, catalog, Leg::Departure),
        SelectingDepartureCity => render_city(params, catalog, Leg::Departure)?,
        SelectingArrivalCountry => render_country(params, catalog, Leg::Return),
        SelectingArrivalCity => render_city(params, catalog, Leg::Return)?,
        SelectingDateMode => render_date_mode(params),
        SelectingDepartureYear => render_year(params, Leg::Departure, today),
        SelectingDepartureMonth => render_month(params, Leg::Departure, today)?,
        SelectingDepartureDayRange => render_day_range(params, Leg::Departure, today)?,
        SelectingDepartureDay => render_day(params, Leg::Departure, today)?,
        SelectingReturnYear => render_year(params, Leg::Return, today),
        SelectingReturnMonth => render_month(params, Leg::Return, today)?,
        SelectingReturnDayRange => render_day_range(params, Leg::Return, today)?,
        SelectingReturnDay => render_day(params, Leg::Return, today)?,
        SelectingPriceMode => render_price_mode(params),
        AwaitingCustomPrice => render_custom_price(params),
        OfferingAlternatives => render_alternatives_offer(params)?,
        ShowingOutcome => render_outcome(),
    };

    if let Some(row) = back_row(params, state) {
        view.keyboard.push(row);
    }
    Ok(view)
}

fn back_row(params: &SearchParameters, state: SearchState) -> Option<Vec<Button>> {
    params.previous_state(state)?;
    Some(vec![Button::new("« Back", Token::Back { flow: params.flow, from: state })])
}

fn render_trip_type(params: &SearchParameters) -> StepView {
    StepView {
        text: "One-way or round trip?".to_string(),
        keyboard: vec![vec![
            Button::new("➡️ One-way", Token::Trip { flow: params.flow, one_way: true }),
            Button::new("🔄 Round trip", Token::Trip { flow: params.flow, one_way: false }),
        ]],
    }
}

fn render_country(params: &SearchParameters, catalog: &AirportCatalog, leg: Leg) -> StepView {
    let text = match leg {
        Leg::Departure => {
            "Where are you flying from?\n\nPick a country, then a city.".to_string()
        }
        Leg::Return => "Where to?\n\nPick a destination country.".to_string(),
    };
    let buttons: Vec<Button> = catalog
        .countries()
        .map(|name| {
            Button::new(name, Token::Country { flow: params.flow, leg, name: name.to_string() })
        })
        .collect();
    StepView { text, keyboard: rows(buttons, 2) }
}

fn render_city(
    params: &SearchParameters,
    catalog: &AirportCatalog,
    leg: Leg,
) -> Result<StepView> {
    let (country, text) = match leg {
        Leg::Departure => (
            params
                .departure_country
                .as_deref()
                .ok_or(FareBuddyError::MissingField("departure country"))?,
            "Pick a departure city, or type its name.",
        ),
        Leg::Return => (
            params
                .arrival_country
                .as_deref()
                .ok_or(FareBuddyError::MissingField("arrival country"))?,
            "Pick a destination city, or type its name.",
        ),
    };

    let cities = catalog
        .cities(country)
        .ok_or_else(|| FareBuddyError::InvalidInput(format!("Unknown country: {country}")))?;

    let buttons: Vec<Button> = cities
        .into_iter()
        // The destination may never equal the departure airport
        .filter(|(_, iata)| {
            leg == Leg::Departure || params.departure_iata.as_deref() != Some(*iata)
        })
        .map(|(city, iata)| {
            Button::new(city, Token::City { flow: params.flow, leg, iata: iata.to_string() })
        })
        .collect();

    let keyboard = if buttons.is_empty() {
        vec![vec![Button::noop("No airports available")]]
    } else {
        rows(buttons, 2)
    };
    Ok(StepView { text: format!("{country}: {text}"), keyboard })
}

fn render_date_mode(params: &SearchParameters) -> StepView {
    StepView {
        text: "Do you want to pick exact dates?".to_string(),
        keyboard: vec![vec![
            Button::new("📅 Pick dates", Token::DateMode { flow: params.flow, with_dates: true }),
            Button::new("🤷 Any date", Token::DateMode { flow: params.flow, with_dates: false }),
        ]],
    }
}

fn render_year(params: &SearchParameters, leg: Leg, today: NaiveDate) -> StepView {
    let text = match leg {
        Leg::Departure => "Pick a departure year:".to_string(),
        Leg::Return => "Pick a return year:".to_string(),
    };
    // Current and next calendar year only
    let min_year = match leg {
        Leg::Departure => today.year(),
        Leg::Return => params.departure_date.map(|d| d.year()).unwrap_or(today.year()),
    };
    let row = (today.year()..=today.year() + 1)
        .map(|year| {
            if year < min_year {
                Button::noop(format!("✖ {year}"))
            } else {
                Button::new(year.to_string(), Token::Year { flow: params.flow, leg, year })
            }
        })
        .collect();
    StepView { text, keyboard: vec![row] }
}

/// First selectable month in the given year for this leg
pub(crate) fn min_month(
    params: &SearchParameters,
    leg: Leg,
    year: i32,
    today: NaiveDate,
) -> Result<u32> {
    match leg {
        Leg::Departure => Ok(if year == today.year() { today.month() } else { 1 }),
        Leg::Return => {
            let departure = params
                .departure_date
                .ok_or(FareBuddyError::MissingField("departure date"))?;
            Ok(if year == departure.year() { departure.month() } else { 1 })
        }
    }
}

/// Earliest selectable day for this leg
pub(crate) fn min_date(params: &SearchParameters, leg: Leg, today: NaiveDate) -> Result<NaiveDate> {
    match leg {
        Leg::Departure => Ok(today),
        Leg::Return => params
            .departure_date
            .ok_or(FareBuddyError::MissingField("departure date")),
    }
}

fn render_month(params: &SearchParameters, leg: Leg, today: NaiveDate) -> Result<StepView> {
    let year = selected_year(params, leg)?;
    let min = min_month(params, leg, year, today)?;

    let buttons: Vec<Button> = (1..=12)
        .map(|month| {
            if month < min {
                Button::noop(format!("✖ {}", month_name(month)))
            } else {
                Button::new(month_name(month), Token::Month { flow: params.flow, leg, month })
            }
        })
        .collect();

    let keyboard = if min > 12 {
        vec![vec![Button::noop("No available months")]]
    } else {
        rows(buttons, 4)
    };

    let text = match leg {
        Leg::Departure => format!("Departure in {year} — pick a month:"),
        Leg::Return => format!("Return in {year} — pick a month:"),
    };
    Ok(StepView { text, keyboard })
}

fn render_day_range(params: &SearchParameters, leg: Leg, today: NaiveDate) -> Result<StepView> {
    let year = selected_year(params, leg)?;
    let month = selected_month(params, leg)?;
    let min = min_date(params, leg, today)?;
    let last = days_in_month(year, month);

    let buttons: Vec<Button> = [(1u32, 10u32), (11, 20), (21, last)]
        .into_iter()
        .map(|(start, end)| {
            let label = format!("{start} – {end}");
            // A range is dead when even its last day precedes the minimum
            let range_end = NaiveDate::from_ymd_opt(year, month, end);
            match range_end {
                Some(date) if date >= min => {
                    Button::new(label, Token::Range { flow: params.flow, leg, start, end })
                }
                _ => Button::noop(format!("✖ {label}")),
            }
        })
        .collect();

    let all_disabled = buttons.iter().all(|b| b.token == Token::Noop.encode());
    let keyboard = if all_disabled {
        vec![vec![Button::noop("No available days")]]
    } else {
        vec![buttons]
    };

    Ok(StepView {
        text: format!("{} {year} — pick a day range:", month_name(month)),
        keyboard,
    })
}

fn render_day(params: &SearchParameters, leg: Leg, today: NaiveDate) -> Result<StepView> {
    let year = selected_year(params, leg)?;
    let month = selected_month(params, leg)?;
    let (start, end) = match leg {
        Leg::Departure => params.dep_range,
        Leg::Return => params.ret_range,
    }
    .ok_or(FareBuddyError::MissingField("day range"))?;
    let min = min_date(params, leg, today)?;

    let mut buttons = Vec::new();
    for day in start..=end {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        if date < min {
            buttons.push(Button::noop(format!("✖{day}")));
        } else {
            buttons.push(Button::new(
                day.to_string(),
                Token::Date { flow: params.flow, leg, date },
            ));
        }
    }

    let all_disabled = buttons.iter().all(|b| b.token == Token::Noop.encode());
    let keyboard = if buttons.is_empty() || all_disabled {
        vec![vec![Button::noop("No available days")]]
    } else {
        rows(buttons, 5)
    };

    Ok(StepView {
        text: format!("{} {year}, days {start}–{end} — pick a day:", month_name(month)),
        keyboard,
    })
}

fn render_price_mode(params: &SearchParameters) -> StepView {
    StepView {
        text: "How should I treat prices?".to_string(),
        keyboard: vec![
            vec![Button::new(
                "💰 Set a maximum price",
                Token::Price { flow: params.flow, choice: PriceChoice::Custom },
            )],
            vec![Button::new(
                "🪙 Cheapest only",
                Token::Price { flow: params.flow, choice: PriceChoice::Cheapest },
            )],
            vec![Button::new(
                "📋 All results",
                Token::Price { flow: params.flow, choice: PriceChoice::All },
            )],
        ],
    }
}

fn render_custom_price(_params: &SearchParameters) -> StepView {
    StepView {
        text: "Send me your maximum total price, e.g. 49.99".to_string(),
        keyboard: Vec::new(),
    }
}

fn render_alternatives_offer(params: &SearchParameters) -> Result<StepView> {
    let country = params
        .departure_country
        .as_deref()
        .ok_or(FareBuddyError::MissingField("departure country"))?;
    let city = params.departure_city.as_deref().unwrap_or("your airport");
    Ok(StepView {
        text: format!(
            "😔 Nothing found from {city}.\n\nSearch the other airports in {country} too?"
        ),
        keyboard: vec![vec![
            Button::new("🔁 Yes, try them", Token::Alternatives(true)),
            Button::new("❌ No, thanks", Token::Alternatives(false)),
        ]],
    })
}

fn render_outcome() -> StepView {
    StepView {
        text: "What next?".to_string(),
        keyboard: vec![vec![
            Button::new("🔍 New search", Token::Again),
            Button::new("👋 End", Token::End),
        ]],
    }
}

fn selected_year(params: &SearchParameters, leg: Leg) -> Result<i32> {
    match leg {
        Leg::Departure => params.dep_year.ok_or(FareBuddyError::MissingField("departure year")),
        Leg::Return => params.ret_year.ok_or(FareBuddyError::MissingField("return year")),
    }
}

fn selected_month(params: &SearchParameters, leg: Leg) -> Result<u32> {
    match leg {
        Leg::Departure => params.dep_month.ok_or(FareBuddyError::MissingField("departure month")),
        Leg::Return => params.ret_month.ok_or(FareBuddyError::MissingField("return month")),
    }
}

fn rows(buttons: Vec<Button>, per_row: usize) -> Vec<Vec<Button>> {
    let mut rows = Vec::new();
    let mut row = Vec::with_capacity(per_row);
    for button in buttons {
        row.push(button);
        if row.len() == per_row {
            rows.push(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::context::SearchFlow;
    use proptest::prelude::*;

    fn catalog() -> AirportCatalog {
        AirportCatalog::load().unwrap()
    }

    fn standard_params() -> SearchParameters {
        let mut params = SearchParameters::new(1);
        params.enter_flow(SearchFlow::Standard);
        params
    }

    fn noop() -> String {
        Token::Noop.encode()
    }

    #[test]
    fn test_elapsed_months_render_disabled() {
        let mut params = standard_params();
        params.dep_year = Some(2025);
        let today = NaiveDate::from_ymd_opt(2025, 8, 26).unwrap();

        let view = render_month(&params, Leg::Departure, today).unwrap();
        let buttons: Vec<&Button> = view.keyboard.iter().flatten().collect();
        assert_eq!(buttons.len(), 12);
        for (i, button) in buttons.iter().enumerate() {
            let month = i as u32 + 1;
            if month < 8 {
                assert_eq!(button.token, noop(), "month {month} should be inert");
            } else {
                assert_ne!(button.token, noop(), "month {month} should be live");
            }
        }
    }

    #[test]
    fn test_next_year_months_all_enabled() {
        let mut params = standard_params();
        params.dep_year = Some(2026);
        let today = NaiveDate::from_ymd_opt(2025, 8, 26).unwrap();

        let view = render_month(&params, Leg::Departure, today).unwrap();
        assert!(view.keyboard.iter().flatten().all(|b| b.token != noop()));
    }

    #[test]
    fn test_day_ranges_clip_to_month_length() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        for (year, month, last) in [(2025, 8, 31), (2025, 6, 30), (2025, 2, 28), (2024, 2, 29)] {
            let mut params = standard_params();
            params.dep_year = Some(year);
            params.dep_month = Some(month);
            let view = render_day_range(&params, Leg::Departure, today).unwrap();
            let labels: Vec<&str> =
                view.keyboard[0].iter().map(|b| b.label.as_str()).collect();
            assert_eq!(
                labels,
                vec![
                    "1 – 10".to_string(),
                    "11 – 20".to_string(),
                    format!("21 – {last}"),
                ]
            );
        }
    }

    #[test]
    fn test_return_months_respect_departure_minimum() {
        let mut params = standard_params();
        params.one_way = false;
        params.departure_date = NaiveDate::from_ymd_opt(2025, 10, 5);
        params.ret_year = Some(2025);
        let today = NaiveDate::from_ymd_opt(2025, 8, 26).unwrap();

        let view = render_month(&params, Leg::Return, today).unwrap();
        let buttons: Vec<&Button> = view.keyboard.iter().flatten().collect();
        // September is after "now" but before the departure month
        assert_eq!(buttons[8].token, noop());
        assert_ne!(buttons[9].token, noop());
    }

    #[test]
    fn test_return_days_before_departure_disabled() {
        let mut params = standard_params();
        params.one_way = false;
        params.departure_date = NaiveDate::from_ymd_opt(2025, 9, 15);
        params.ret_year = Some(2025);
        params.ret_month = Some(9);
        params.ret_range = Some((11, 20));
        let today = NaiveDate::from_ymd_opt(2025, 8, 26).unwrap();

        let view = render_day(&params, Leg::Return, today).unwrap();
        let buttons: Vec<&Button> = view.keyboard.iter().flatten().collect();
        // 11..=14 disabled, 15 (same day as departure) onwards enabled
        for button in &buttons[..4] {
            assert_eq!(button.token, noop());
        }
        for button in &buttons[4..] {
            assert_ne!(button.token, noop());
        }
    }

    #[test]
    fn test_dead_end_renders_sentinel() {
        let mut params = standard_params();
        params.one_way = false;
        // Departure on the last day of the month, return range fully before it
        params.departure_date = NaiveDate::from_ymd_opt(2025, 9, 30);
        params.ret_year = Some(2025);
        params.ret_month = Some(9);
        params.ret_range = Some((11, 20));
        let today = NaiveDate::from_ymd_opt(2025, 8, 26).unwrap();

        let view = render_day(&params, Leg::Return, today).unwrap();
        assert_eq!(view.keyboard.len(), 1);
        assert_eq!(view.keyboard[0][0].label, "No available days");
        assert_eq!(view.keyboard[0][0].token, noop());
    }

    #[test]
    fn test_arrival_city_excludes_departure_airport() {
        let mut params = standard_params();
        params.departure_country = Some("Ireland".into());
        params.departure_city = Some("Dublin".into());
        params.departure_iata = Some("DUB".into());
        params.arrival_country = Some("Ireland".into());

        let view = render_city(&params, &catalog(), Leg::Return).unwrap();
        let tokens: Vec<&str> =
            view.keyboard.iter().flatten().map(|b| b.token.as_str()).collect();
        assert!(!tokens.iter().any(|t| t.ends_with("_city_DUB")));
        assert!(tokens.iter().any(|t| t.ends_with("_city_ORK")));
    }

    proptest! {
        /// Range labels always partition [1, month length] in three pieces
        #[test]
        fn prop_ranges_cover_month(year in 2024i32..2027, month in 1u32..13) {
            let mut params = standard_params();
            params.dep_year = Some(year);
            params.dep_month = Some(month);
            let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let view = render_day_range(&params, Leg::Departure, today).unwrap();
            let last = days_in_month(year, month);
            prop_assert!(last >= 28);
            let labels: Vec<String> =
                view.keyboard[0].iter().map(|b| b.label.clone()).collect();
            prop_assert_eq!(labels.len(), 3);
            let expected = format!("21 – {last}");
            prop_assert!(labels[2].ends_with(&expected));
        }
    }
}
