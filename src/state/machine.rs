//! Conversation state machine
//!
//! Maps `(current state, incoming event)` to `(mutation, next state, render)`.
//! All flows share one transition table parameterised by `SearchFlow`; the
//! per-flow step order comes from `SearchParameters::flow_sequence`. Forward
//! progress happens only on valid input, and back-navigation reconstructs the
//! prior step through the same pure render functions the forward path uses.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use tracing::debug;

use crate::catalog::AirportCatalog;
use crate::utils::errors::{FareBuddyError, Result};
use crate::utils::helpers::days_in_month;
use super::context::{Leg, PriceMode, SearchParameters, SearchState};
use super::render::{self, StepView};
use super::token::{PriceChoice, Token};

/// An incoming conversation event
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// Button press carrying callback data
    Callback(&'a str),
    /// Free-text message
    Text(&'a str),
}

/// What the transport layer must do after a transition
#[derive(Debug)]
pub enum Action {
    /// Show this step: edit the tracked prompt for button presses, send a
    /// fresh message for free text
    Render(StepView),
    /// Answer the callback with a toast; nothing changed
    Toast(&'static str),
    /// All required fields are present; run the gateway search
    ExecuteSearch { include_alternatives: bool },
    /// Terminal: send this text and clear the stored parameters
    EndConversation(&'static str),
}

const STALE_TOAST: &str = "This button is no longer active.";
const NOOP_TOAST: &str = "That option is not available.";

/// The flow-parameterised transition engine
pub struct Machine<'a> {
    catalog: &'a AirportCatalog,
    today: NaiveDate,
}

impl<'a> Machine<'a> {
    pub fn new(catalog: &'a AirportCatalog, today: NaiveDate) -> Self {
        Self { catalog, today }
    }

    /// Render the current step without transitioning
    pub fn view(&self, params: &SearchParameters) -> Result<StepView> {
        render::render_step(params.state, params, self.catalog, self.today)
    }

    /// Process one event to completion
    pub fn apply(&self, params: &mut SearchParameters, event: Event<'_>) -> Result<Action> {
        match event {
            Event::Callback(data) => match Token::parse(data) {
                Some(token) => self.apply_token(params, token),
                // Malformed token: validation failure, re-prompt the same step
                None => {
                    debug!(user_id = params.user_id, data = data, "Unparseable callback token");
                    Ok(Action::Render(self.view(params)?))
                }
            },
            Event::Text(text) => self.apply_text(params, text),
        }
    }

    /// Route the search result back into the machine once the gateway ran
    pub fn after_search(&self, params: &mut SearchParameters, found_any: bool) -> Result<Action> {
        let offer_alternatives = !found_any
            && !params.already_searched_alternatives
            && params
                .departure_iata
                .as_deref()
                .map(|iata| !self.catalog.alternatives(iata).is_empty())
                .unwrap_or(false);

        if offer_alternatives {
            // One offer per conversation, never repeated
            params.already_searched_alternatives = true;
            params.state = SearchState::OfferingAlternatives;
        } else {
            params.state = SearchState::ShowingOutcome;
        }
        params.touch();
        Ok(Action::Render(self.view(params)?))
    }

    fn apply_token(&self, params: &mut SearchParameters, token: Token) -> Result<Action> {
        use SearchState::*;

        match token {
            Token::Noop => return Ok(Action::Toast(NOOP_TOAST)),
            Token::Menu(flow) => {
                if params.state != MainMenu && params.state != ShowingOutcome {
                    return Ok(Action::Toast(STALE_TOAST));
                }
                params.enter_flow(flow);
                return Ok(Action::Render(self.view(params)?));
            }
            Token::Again => {
                if params.state != ShowingOutcome {
                    return Ok(Action::Toast(STALE_TOAST));
                }
                params.reset();
                return Ok(Action::Render(self.view(params)?));
            }
            Token::End => {
                if params.state != ShowingOutcome {
                    return Ok(Action::Toast(STALE_TOAST));
                }
                return Ok(Action::EndConversation(
                    "Safe travels! ✈️ Send /start whenever you need me again.",
                ));
            }
            Token::Alternatives(yes) => {
                if params.state != OfferingAlternatives {
                    return Ok(Action::Toast(STALE_TOAST));
                }
                return if yes {
                    Ok(Action::ExecuteSearch { include_alternatives: true })
                } else {
                    params.state = ShowingOutcome;
                    params.touch();
                    Ok(Action::Render(self.view(params)?))
                };
            }
            Token::Back { flow, from } => {
                if flow != params.flow || from != params.state {
                    return Ok(Action::Toast(STALE_TOAST));
                }
                let Some(previous) = params.previous_state(from) else {
                    return Ok(Action::Toast(STALE_TOAST));
                };
                // The user will re-answer the predecessor, so its own field
                // and everything downstream is discarded; upstream fields
                // stay intact and drive the reconstructed prompt
                params.clear_from(previous);
                params.state = previous;
                return Ok(Action::Render(self.view(params)?));
            }
            _ => {}
        }

        // Field tokens: the flow prefix must match the active flow
        if token_flow(&token) != Some(params.flow) {
            return Ok(Action::Toast(STALE_TOAST));
        }

        match (params.state, token) {
            (SelectingTripType, Token::Trip { one_way, .. }) => {
                params.one_way = one_way;
                self.advance(params, SelectingTripType)
            }
            (SelectingDepartureCountry, Token::Country { leg: Leg::Departure, name, .. }) => {
                self.set_country(params, Leg::Departure, &name)
            }
            (SelectingDepartureCity, Token::City { leg: Leg::Departure, iata, .. }) => {
                self.set_city(params, Leg::Departure, &iata)
            }
            (SelectingArrivalCountry, Token::Country { leg: Leg::Return, name, .. }) => {
                self.set_country(params, Leg::Return, &name)
            }
            (SelectingArrivalCity, Token::City { leg: Leg::Return, iata, .. }) => {
                self.set_city(params, Leg::Return, &iata)
            }
            (SelectingDateMode, Token::DateMode { with_dates, .. }) => {
                params.with_dates = Some(with_dates);
                self.advance(params, SelectingDateMode)
            }
            (SelectingDepartureYear, Token::Year { leg: Leg::Departure, year, .. }) => {
                self.set_year(params, Leg::Departure, year)
            }
            (SelectingDepartureMonth, Token::Month { leg: Leg::Departure, month, .. }) => {
                self.set_month(params, Leg::Departure, month)
            }
            (SelectingDepartureDayRange, Token::Range { leg: Leg::Departure, start, end, .. }) => {
                self.set_range(params, Leg::Departure, start, end)
            }
            (SelectingDepartureDay, Token::Date { leg: Leg::Departure, date, .. }) => {
                self.set_date(params, Leg::Departure, date)
            }
            (SelectingReturnYear, Token::Year { leg: Leg::Return, year, .. }) => {
                self.set_year(params, Leg::Return, year)
            }
            (SelectingReturnMonth, Token::Month { leg: Leg::Return, month, .. }) => {
                self.set_month(params, Leg::Return, month)
            }
            (SelectingReturnDayRange, Token::Range { leg: Leg::Return, start, end, .. }) => {
                self.set_range(params, Leg::Return, start, end)
            }
            (SelectingReturnDay, Token::Date { leg: Leg::Return, date, .. }) => {
                self.set_date(params, Leg::Return, date)
            }
            (SelectingPriceMode, Token::Price { choice, .. }) => match choice {
                PriceChoice::Custom => {
                    params.state = AwaitingCustomPrice;
                    params.touch();
                    Ok(Action::Render(self.view(params)?))
                }
                PriceChoice::Cheapest => {
                    params.price_mode = Some(PriceMode::CheapestOnly);
                    params.touch();
                    Ok(Action::ExecuteSearch { include_alternatives: false })
                }
                PriceChoice::All => {
                    params.price_mode = Some(PriceMode::AllResults);
                    params.touch();
                    Ok(Action::ExecuteSearch { include_alternatives: false })
                }
            },
            // Known vocabulary arriving in the wrong state
            _ => Ok(Action::Toast(STALE_TOAST)),
        }
    }

    fn apply_text(&self, params: &mut SearchParameters, text: &str) -> Result<Action> {
        use SearchState::*;
        let input = text.trim();

        match params.state {
            SelectingDepartureCountry => match self.match_country(input) {
                Some(name) => self.set_country(params, Leg::Departure, &name),
                None => Ok(Action::Render(self.view(params)?)),
            },
            SelectingArrivalCountry => match self.match_country(input) {
                Some(name) => self.set_country(params, Leg::Return, &name),
                None => Ok(Action::Render(self.view(params)?)),
            },
            SelectingDepartureCity => {
                let country = params
                    .departure_country
                    .clone()
                    .ok_or(FareBuddyError::MissingField("departure country"))?;
                match self.catalog.find_city(&country, input) {
                    Some(airport) => self.set_city(params, Leg::Departure, &airport.iata),
                    None => Ok(Action::Render(self.view(params)?)),
                }
            }
            SelectingArrivalCity => {
                let country = params
                    .arrival_country
                    .clone()
                    .ok_or(FareBuddyError::MissingField("arrival country"))?;
                match self.catalog.find_city(&country, input) {
                    Some(airport) => self.set_city(params, Leg::Return, &airport.iata),
                    None => Ok(Action::Render(self.view(params)?)),
                }
            }
            AwaitingCustomPrice => self.set_custom_price(params, input),
            // Free text where buttons are expected re-prompts the same step
            _ => Ok(Action::Render(self.view(params)?)),
        }
    }

    fn match_country(&self, input: &str) -> Option<String> {
        let needle = input.to_lowercase();
        self.catalog
            .countries()
            .find(|name| name.to_lowercase() == needle)
            .map(str::to_string)
    }

    fn set_country(&self, params: &mut SearchParameters, leg: Leg, name: &str) -> Result<Action> {
        let state = params.state;
        if !self.catalog.has_country(name) {
            return Ok(Action::Render(self.view(params)?));
        }
        match leg {
            Leg::Departure => params.departure_country = Some(name.to_string()),
            Leg::Return => params.arrival_country = Some(name.to_string()),
        }
        self.advance(params, state)
    }

    fn set_city(&self, params: &mut SearchParameters, leg: Leg, iata: &str) -> Result<Action> {
        let state = params.state;
        let Some(airport) = self.catalog.locate(iata) else {
            return Ok(Action::Render(self.view(params)?));
        };

        match leg {
            Leg::Departure => {
                let country = params
                    .departure_country
                    .as_deref()
                    .ok_or(FareBuddyError::MissingField("departure country"))?;
                if airport.country != country {
                    return Ok(Action::Render(self.view(params)?));
                }
                params.departure_city = Some(airport.city);
                params.departure_iata = Some(airport.iata);
            }
            Leg::Return => {
                let country = params
                    .arrival_country
                    .as_deref()
                    .ok_or(FareBuddyError::MissingField("arrival country"))?;
                if airport.country != country
                    || params.departure_iata.as_deref() == Some(iata)
                {
                    return Ok(Action::Render(self.view(params)?));
                }
                params.arrival_city = Some(airport.city);
                params.arrival_iata = Some(airport.iata);
            }
        }
        self.advance(params, state)
    }

    fn set_year(&self, params: &mut SearchParameters, leg: Leg, year: i32) -> Result<Action> {
        let state = params.state;
        let min_year = match leg {
            Leg::Departure => self.today.year(),
            Leg::Return => params
                .departure_date
                .ok_or(FareBuddyError::MissingField("departure date"))?
                .year(),
        };
        if year < min_year || year > self.today.year() + 1 {
            return Ok(Action::Render(self.view(params)?));
        }
        match leg {
            Leg::Departure => params.dep_year = Some(year),
            Leg::Return => params.ret_year = Some(year),
        }
        self.advance(params, state)
    }

    fn set_month(&self, params: &mut SearchParameters, leg: Leg, month: u32) -> Result<Action> {
        let state = params.state;
        let year = match leg {
            Leg::Departure => params.dep_year,
            Leg::Return => params.ret_year,
        }
        .ok_or(FareBuddyError::MissingField("year"))?;
        let min = render::min_month(params, leg, year, self.today)?;
        if month < min {
            return Ok(Action::Render(self.view(params)?));
        }
        match leg {
            Leg::Departure => params.dep_month = Some(month),
            Leg::Return => params.ret_month = Some(month),
        }
        self.advance(params, state)
    }

    fn set_range(
        &self,
        params: &mut SearchParameters,
        leg: Leg,
        start: u32,
        end: u32,
    ) -> Result<Action> {
        let state = params.state;
        let (year, month) = match leg {
            Leg::Departure => (params.dep_year, params.dep_month),
            Leg::Return => (params.ret_year, params.ret_month),
        };
        let year = year.ok_or(FareBuddyError::MissingField("year"))?;
        let month = month.ok_or(FareBuddyError::MissingField("month"))?;

        let last = days_in_month(year, month);
        let valid = matches!((start, end), (1, 10) | (11, 20)) || (start == 21 && end == last);
        let min = render::min_date(params, leg, self.today)?;
        let alive = NaiveDate::from_ymd_opt(year, month, end).map(|d| d >= min).unwrap_or(false);
        if !valid || !alive {
            return Ok(Action::Render(self.view(params)?));
        }

        match leg {
            Leg::Departure => params.dep_range = Some((start, end)),
            Leg::Return => params.ret_range = Some((start, end)),
        }
        self.advance(params, state)
    }

    fn set_date(&self, params: &mut SearchParameters, leg: Leg, date: NaiveDate) -> Result<Action> {
        let state = params.state;
        let (year, month, range) = match leg {
            Leg::Departure => (params.dep_year, params.dep_month, params.dep_range),
            Leg::Return => (params.ret_year, params.ret_month, params.ret_range),
        };
        let year = year.ok_or(FareBuddyError::MissingField("year"))?;
        let month = month.ok_or(FareBuddyError::MissingField("month"))?;
        let (start, end) = range.ok_or(FareBuddyError::MissingField("day range"))?;
        let min = render::min_date(params, leg, self.today)?;

        let in_step = date.year() == year
            && date.month() == month
            && (start..=end).contains(&date.day());
        if !in_step || date < min {
            return Ok(Action::Render(self.view(params)?));
        }

        match leg {
            Leg::Departure => params.departure_date = Some(date),
            Leg::Return => params.return_date = Some(date),
        }
        self.advance(params, state)
    }

    fn set_custom_price(&self, params: &mut SearchParameters, input: &str) -> Result<Action> {
        let pattern = Regex::new(r"^\d+(?:[.,]\d{1,2})?$")
            .map_err(|_| FareBuddyError::Config("Invalid price pattern".to_string()))?;

        let amount = if pattern.is_match(input) {
            input.replace(',', ".").parse::<f64>().ok()
        } else {
            None
        };

        match amount {
            Some(value) if value > 0.0 => {
                params.price_mode = Some(PriceMode::Custom(value));
                params.touch();
                Ok(Action::ExecuteSearch { include_alternatives: false })
            }
            // Bad amount re-prompts the price-option step; max price untouched
            _ => {
                params.state = SearchState::SelectingPriceMode;
                params.touch();
                Ok(Action::Render(self.view(params)?))
            }
        }
    }

    /// Move past `completed`, defensively clearing everything later steps own
    fn advance(&self, params: &mut SearchParameters, completed: SearchState) -> Result<Action> {
        params.clear_after(completed);
        let seq = params.flow_sequence();
        let idx = seq.iter().position(|s| *s == completed).ok_or_else(|| {
            FareBuddyError::InvalidStateTransition {
                from: format!("{completed:?}"),
                to: "?".to_string(),
            }
        })?;
        let next = *seq.get(idx + 1).ok_or_else(|| FareBuddyError::InvalidStateTransition {
            from: format!("{completed:?}"),
            to: "end-of-sequence".to_string(),
        })?;
        params.state = next;
        params.touch();
        Ok(Action::Render(self.view(params)?))
    }
}

fn token_flow(token: &Token) -> Option<crate::state::SearchFlow> {
    match token {
        Token::Trip { flow, .. }
        | Token::Country { flow, .. }
        | Token::City { flow, .. }
        | Token::Year { flow, .. }
        | Token::Month { flow, .. }
        | Token::Range { flow, .. }
        | Token::Date { flow, .. }
        | Token::DateMode { flow, .. }
        | Token::Price { flow, .. }
        | Token::Back { flow, .. } => Some(*flow),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::context::SearchFlow;
    use assert_matches::assert_matches;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 26).unwrap()
    }

    fn setup() -> (AirportCatalog, SearchParameters) {
        let catalog = AirportCatalog::load().unwrap();
        let params = SearchParameters::new(7);
        (catalog, params)
    }

    fn press(machine: &Machine<'_>, params: &mut SearchParameters, data: &str) -> Action {
        machine.apply(params, Event::Callback(data)).unwrap()
    }

    #[test]
    fn test_menu_enters_flow() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());

        let action = press(&machine, &mut params, "menu_std");
        assert_matches!(action, Action::Render(_));
        assert_eq!(params.flow, SearchFlow::Standard);
        assert_eq!(params.state, SearchState::SelectingTripType);
    }

    #[test]
    fn test_disabled_month_press_is_noop_toast() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        let action = press(&machine, &mut params, "noop");
        assert_matches!(action, Action::Toast(_));
        assert_eq!(params.state, SearchState::MainMenu);
    }

    #[test]
    fn test_past_month_token_re_prompts_without_mutation() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        params.enter_flow(SearchFlow::Top3);
        params.departure_country = Some("Ireland".into());
        params.departure_city = Some("Dublin".into());
        params.departure_iata = Some("DUB".into());
        params.dep_year = Some(2025);
        params.state = SearchState::SelectingDepartureMonth;

        // March 2025 has elapsed relative to "now" (2025-08-26)
        let action = press(&machine, &mut params, "top3_dep_month_03");
        assert_matches!(action, Action::Render(_));
        assert_eq!(params.state, SearchState::SelectingDepartureMonth);
        assert!(params.dep_month.is_none());
    }

    #[test]
    fn test_return_before_departure_rejected_equal_accepted() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        params.enter_flow(SearchFlow::Standard);
        params.one_way = false;
        params.departure_date = NaiveDate::from_ymd_opt(2025, 9, 15);
        params.ret_year = Some(2025);
        params.ret_month = Some(9);
        params.ret_range = Some((11, 20));
        params.state = SearchState::SelectingReturnDay;

        // D2 < D1 must re-prompt
        let action = press(&machine, &mut params, "std_ret_date_2025-09-14");
        assert_matches!(action, Action::Render(_));
        assert!(params.return_date.is_none());
        assert_eq!(params.state, SearchState::SelectingReturnDay);

        // D2 == D1 must be accepted
        let action = press(&machine, &mut params, "std_ret_date_2025-09-15");
        assert_matches!(action, Action::Render(_));
        assert_eq!(params.return_date, NaiveDate::from_ymd_opt(2025, 9, 15));
        assert_eq!(params.state, SearchState::SelectingPriceMode);
    }

    #[test]
    fn test_final_range_must_end_on_last_day_of_month() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        params.enter_flow(SearchFlow::Standard);
        params.dep_year = Some(2025);
        params.dep_month = Some(9);
        params.state = SearchState::SelectingDepartureDayRange;

        // September has 30 days, so 21-31 is not a generated range
        let action = press(&machine, &mut params, "std_dep_range_21-31");
        assert_matches!(action, Action::Render(_));
        assert!(params.dep_range.is_none());
        assert_eq!(params.state, SearchState::SelectingDepartureDayRange);

        let action = press(&machine, &mut params, "std_dep_range_21-30");
        assert_matches!(action, Action::Render(_));
        assert_eq!(params.dep_range, Some((21, 30)));
        assert_eq!(params.state, SearchState::SelectingDepartureDay);
    }

    #[test]
    fn test_invalid_custom_price_re_prompts_price_step() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        params.enter_flow(SearchFlow::Standard);
        params.state = SearchState::AwaitingCustomPrice;

        for bad in ["abc", "0", "-5", "12.345", ""] {
            params.state = SearchState::AwaitingCustomPrice;
            let action = machine.apply(&mut params, Event::Text(bad)).unwrap();
            assert_matches!(action, Action::Render(_));
            assert_eq!(params.state, SearchState::SelectingPriceMode);
            assert!(params.price_mode.is_none());
            assert!(params.max_price().is_none());
        }
    }

    #[test]
    fn test_valid_custom_price_triggers_search() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        params.enter_flow(SearchFlow::Standard);
        params.state = SearchState::AwaitingCustomPrice;

        let action = machine.apply(&mut params, Event::Text("49,99")).unwrap();
        assert_matches!(action, Action::ExecuteSearch { include_alternatives: false });
        assert_eq!(params.max_price(), Some(49.99));
    }

    #[test]
    fn test_alternatives_offered_exactly_once() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        params.enter_flow(SearchFlow::Standard);
        params.departure_country = Some("Ireland".into());
        params.departure_city = Some("Dublin".into());
        params.departure_iata = Some("DUB".into());
        params.state = SearchState::SelectingPriceMode;

        let action = machine.after_search(&mut params, false).unwrap();
        assert_matches!(action, Action::Render(_));
        assert_eq!(params.state, SearchState::OfferingAlternatives);
        assert!(params.already_searched_alternatives);

        // Accept the offer, then come back empty again: no second offer
        let action = press(&machine, &mut params, "alt_yes");
        assert_matches!(action, Action::ExecuteSearch { include_alternatives: true });
        let action = machine.after_search(&mut params, false).unwrap();
        assert_matches!(action, Action::Render(_));
        assert_eq!(params.state, SearchState::ShowingOutcome);
    }

    #[test]
    fn test_no_alternatives_offer_without_siblings() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        params.enter_flow(SearchFlow::Standard);
        params.departure_country = Some("Austria".into());
        params.departure_city = Some("Vienna".into());
        params.departure_iata = Some("VIE".into()); // only airport in Austria
        params.state = SearchState::SelectingPriceMode;

        machine.after_search(&mut params, false).unwrap();
        assert_eq!(params.state, SearchState::ShowingOutcome);
    }

    #[test]
    fn test_back_reconstructs_forward_render() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        params.enter_flow(SearchFlow::Standard);
        params.one_way = false;
        params.departure_country = Some("Ireland".into());
        params.departure_city = Some("Dublin".into());
        params.departure_iata = Some("DUB".into());
        params.arrival_country = Some("Spain".into());
        params.arrival_city = Some("Malaga".into());
        params.arrival_iata = Some("AGP".into());
        params.departure_date = NaiveDate::from_ymd_opt(2025, 9, 15);
        params.ret_year = Some(2025);
        params.ret_month = Some(9);
        params.state = SearchState::SelectingReturnDayRange;

        // Capture the forward rendering of the range step, walk forward, then back
        let forward = machine.view(&params).unwrap();
        let action = press(&machine, &mut params, "std_ret_range_21-30");
        assert_matches!(action, Action::Render(_));
        assert_eq!(params.state, SearchState::SelectingReturnDay);

        let action = press(&machine, &mut params, "std_back_retday");
        let Action::Render(reconstructed) = action else {
            panic!("expected a render");
        };
        assert_eq!(params.state, SearchState::SelectingReturnDayRange);
        assert!(params.ret_range.is_none());
        assert_eq!(reconstructed, forward);
    }

    #[test]
    fn test_stale_token_answers_toast() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        params.enter_flow(SearchFlow::Standard);
        params.state = SearchState::SelectingDepartureCountry;

        // Valid vocabulary, wrong state
        let action = press(&machine, &mut params, "std_dep_year_2025");
        assert_matches!(action, Action::Toast(_));
        assert_eq!(params.state, SearchState::SelectingDepartureCountry);

        // Wrong flow prefix entirely
        let action = press(&machine, &mut params, "flex_dep_country_Ireland");
        assert_matches!(action, Action::Toast(_));
        assert!(params.departure_country.is_none());
    }

    #[test]
    fn test_arrival_must_differ_from_departure() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        params.enter_flow(SearchFlow::Standard);
        params.departure_country = Some("Ireland".into());
        params.departure_city = Some("Dublin".into());
        params.departure_iata = Some("DUB".into());
        params.arrival_country = Some("Ireland".into());
        params.state = SearchState::SelectingArrivalCity;

        let action = press(&machine, &mut params, "std_ret_city_DUB");
        assert_matches!(action, Action::Render(_));
        assert!(params.arrival_iata.is_none());

        let action = press(&machine, &mut params, "std_ret_city_ORK");
        assert_matches!(action, Action::Render(_));
        assert_eq!(params.arrival_iata.as_deref(), Some("ORK"));
    }

    #[test]
    fn test_forward_revisit_clears_stale_descendants() {
        let (catalog, mut params) = setup();
        let machine = Machine::new(&catalog, today());
        params.enter_flow(SearchFlow::Top3);
        params.departure_country = Some("Ireland".into());
        params.departure_city = Some("Dublin".into());
        params.departure_iata = Some("DUB".into());
        params.dep_year = Some(2025);
        params.dep_month = Some(12);
        params.dep_range = Some((1, 10));
        params.departure_date = NaiveDate::from_ymd_opt(2025, 12, 5);
        params.state = SearchState::SelectingDepartureMonth;

        // Picking a new month discards the stale range and day downstream
        let action = press(&machine, &mut params, "top3_dep_month_10");
        assert_matches!(action, Action::Render(_));
        assert_eq!(params.dep_month, Some(10));
        assert!(params.dep_range.is_none());
        assert!(params.departure_date.is_none());
    }
}
