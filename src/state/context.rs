//! Conversation context management
//!
//! This module defines the per-conversation parameter bag that the search
//! state machine fills in step by step, together with the flow-dependent
//! step ordering and the defensive field-clearing rules.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which search flow drives the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchFlow {
    Standard,
    Flexible,
    FlexibleAnywhere,
    Top3,
}

impl SearchFlow {
    /// Callback-token prefix for this flow
    pub fn prefix(&self) -> &'static str {
        match self {
            SearchFlow::Standard => "std",
            SearchFlow::Flexible => "flex",
            SearchFlow::FlexibleAnywhere => "any",
            SearchFlow::Top3 => "top3",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "std" => Some(SearchFlow::Standard),
            "flex" => Some(SearchFlow::Flexible),
            "any" => Some(SearchFlow::FlexibleAnywhere),
            "top3" => Some(SearchFlow::Top3),
            _ => None,
        }
    }

    /// Stable name used in persistence and stats
    pub fn name(&self) -> &'static str {
        match self {
            SearchFlow::Standard => "standard",
            SearchFlow::Flexible => "flexible",
            SearchFlow::FlexibleAnywhere => "anywhere",
            SearchFlow::Top3 => "top3",
        }
    }
}

/// Price preference recorded at the shared price step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PriceMode {
    /// User-entered maximum, always positive
    Custom(f64),
    /// Keep only offers at the global minimum total price
    CheapestOnly,
    /// No filtering
    AllResults,
}

/// Which leg of the trip a date step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Leg {
    Departure,
    Return,
}

impl Leg {
    pub fn tag(&self) -> &'static str {
        match self {
            Leg::Departure => "dep",
            Leg::Return => "ret",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "dep" => Some(Leg::Departure),
            "ret" => Some(Leg::Return),
            _ => None,
        }
    }
}

/// Conversation states, shared across flows and parameterised by
/// `SearchParameters::flow`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchState {
    MainMenu,
    SelectingTripType,
    SelectingDepartureCountry,
    SelectingDepartureCity,
    SelectingArrivalCountry,
    SelectingArrivalCity,
    SelectingDateMode,
    SelectingDepartureYear,
    SelectingDepartureMonth,
    SelectingDepartureDayRange,
    SelectingDepartureDay,
    SelectingReturnYear,
    SelectingReturnMonth,
    SelectingReturnDayRange,
    SelectingReturnDay,
    SelectingPriceMode,
    AwaitingCustomPrice,
    OfferingAlternatives,
    ShowingOutcome,
}

impl SearchState {
    /// Short identifier embedded in back-transition tokens
    pub fn slug(&self) -> &'static str {
        match self {
            SearchState::MainMenu => "menu",
            SearchState::SelectingTripType => "trip",
            SearchState::SelectingDepartureCountry => "depcountry",
            SearchState::SelectingDepartureCity => "depcity",
            SearchState::SelectingArrivalCountry => "arrcountry",
            SearchState::SelectingArrivalCity => "arrcity",
            SearchState::SelectingDateMode => "datemode",
            SearchState::SelectingDepartureYear => "depyear",
            SearchState::SelectingDepartureMonth => "depmonth",
            SearchState::SelectingDepartureDayRange => "deprange",
            SearchState::SelectingDepartureDay => "depday",
            SearchState::SelectingReturnYear => "retyear",
            SearchState::SelectingReturnMonth => "retmonth",
            SearchState::SelectingReturnDayRange => "retrange",
            SearchState::SelectingReturnDay => "retday",
            SearchState::SelectingPriceMode => "price",
            SearchState::AwaitingCustomPrice => "customprice",
            SearchState::OfferingAlternatives => "alt",
            SearchState::ShowingOutcome => "outcome",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        use SearchState::*;
        let state = match slug {
            "menu" => MainMenu,
            "trip" => SelectingTripType,
            "depcountry" => SelectingDepartureCountry,
            "depcity" => SelectingDepartureCity,
            "arrcountry" => SelectingArrivalCountry,
            "arrcity" => SelectingArrivalCity,
            "datemode" => SelectingDateMode,
            "depyear" => SelectingDepartureYear,
            "depmonth" => SelectingDepartureMonth,
            "deprange" => SelectingDepartureDayRange,
            "depday" => SelectingDepartureDay,
            "retyear" => SelectingReturnYear,
            "retmonth" => SelectingReturnMonth,
            "retrange" => SelectingReturnDayRange,
            "retday" => SelectingReturnDay,
            "price" => SelectingPriceMode,
            "customprice" => AwaitingCustomPrice,
            "alt" => OfferingAlternatives,
            "outcome" => ShowingOutcome,
            _ => return None,
        };
        Some(state)
    }
}

/// The in-progress search of a single conversation, keyed by user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParameters {
    pub user_id: i64,
    pub flow: SearchFlow,
    pub state: SearchState,

    pub one_way: bool,
    /// `None` until the flexible date-mode step answers it
    pub with_dates: Option<bool>,

    pub departure_country: Option<String>,
    pub departure_city: Option<String>,
    pub departure_iata: Option<String>,
    pub arrival_country: Option<String>,
    pub arrival_city: Option<String>,
    pub arrival_iata: Option<String>,

    // Partial date selections, one set per leg
    pub dep_year: Option<i32>,
    pub dep_month: Option<u32>,
    pub dep_range: Option<(u32, u32)>,
    pub departure_date: Option<NaiveDate>,
    pub ret_year: Option<i32>,
    pub ret_month: Option<u32>,
    pub ret_range: Option<(u32, u32)>,
    pub return_date: Option<NaiveDate>,

    pub price_mode: Option<PriceMode>,
    pub already_searched_alternatives: bool,

    /// Message the bot edits in place on button-driven transitions
    pub prompt_message_id: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl SearchParameters {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            flow: SearchFlow::Standard,
            state: SearchState::MainMenu,
            one_way: true,
            with_dates: None,
            departure_country: None,
            departure_city: None,
            departure_iata: None,
            arrival_country: None,
            arrival_city: None,
            arrival_iata: None,
            dep_year: None,
            dep_month: None,
            dep_range: None,
            departure_date: None,
            ret_year: None,
            ret_month: None,
            ret_range: None,
            return_date: None,
            price_mode: None,
            already_searched_alternatives: false,
            prompt_message_id: None,
            expires_at: Some(Utc::now() + Duration::hours(24)),
            updated_at: Utc::now(),
        }
    }

    /// Enter a search flow, dropping anything a previous flow left behind
    pub fn enter_flow(&mut self, flow: SearchFlow) {
        let user_id = self.user_id;
        let prompt = self.prompt_message_id;
        *self = Self::new(user_id);
        self.flow = flow;
        self.prompt_message_id = prompt;
        self.state = Self::entry_state(flow);
    }

    /// Reset back to the main menu
    pub fn reset(&mut self) {
        let user_id = self.user_id;
        let prompt = self.prompt_message_id;
        *self = Self::new(user_id);
        self.prompt_message_id = prompt;
    }

    /// First state of a flow's subgraph
    pub fn entry_state(flow: SearchFlow) -> SearchState {
        match flow {
            SearchFlow::Standard | SearchFlow::Flexible => SearchState::SelectingTripType,
            SearchFlow::FlexibleAnywhere | SearchFlow::Top3 => {
                SearchState::SelectingDepartureCountry
            }
        }
    }

    /// Whether this conversation will ask for concrete dates
    pub fn uses_dates(&self) -> bool {
        match self.flow {
            SearchFlow::Standard | SearchFlow::Top3 => true,
            SearchFlow::Flexible | SearchFlow::FlexibleAnywhere => self.with_dates == Some(true),
        }
    }

    pub fn max_price(&self) -> Option<f64> {
        match self.price_mode {
            Some(PriceMode::Custom(amount)) => Some(amount),
            _ => None,
        }
    }

    /// The forward step order for the current flow and answers so far.
    ///
    /// The sequence ends at the price step; search execution and the outcome
    /// states are not part of the back-navigable path.
    pub fn flow_sequence(&self) -> Vec<SearchState> {
        use SearchState::*;
        let dep_dates = [
            SelectingDepartureYear,
            SelectingDepartureMonth,
            SelectingDepartureDayRange,
            SelectingDepartureDay,
        ];
        let ret_dates = [
            SelectingReturnYear,
            SelectingReturnMonth,
            SelectingReturnDayRange,
            SelectingReturnDay,
        ];

        let mut seq = Vec::with_capacity(16);
        match self.flow {
            SearchFlow::Standard => {
                seq.extend([
                    SelectingTripType,
                    SelectingDepartureCountry,
                    SelectingDepartureCity,
                    SelectingArrivalCountry,
                    SelectingArrivalCity,
                ]);
                seq.extend(dep_dates);
                if !self.one_way {
                    seq.extend(ret_dates);
                }
            }
            SearchFlow::Flexible => {
                seq.extend([
                    SelectingTripType,
                    SelectingDepartureCountry,
                    SelectingDepartureCity,
                    SelectingArrivalCountry,
                    SelectingArrivalCity,
                    SelectingDateMode,
                ]);
                if self.with_dates == Some(true) {
                    seq.extend(dep_dates);
                    if !self.one_way {
                        seq.extend(ret_dates);
                    }
                }
            }
            SearchFlow::FlexibleAnywhere => {
                seq.extend([
                    SelectingDepartureCountry,
                    SelectingDepartureCity,
                    SelectingDateMode,
                ]);
                if self.with_dates == Some(true) {
                    seq.extend(dep_dates);
                }
            }
            SearchFlow::Top3 => {
                seq.extend([SelectingDepartureCountry, SelectingDepartureCity]);
                seq.extend(dep_dates);
            }
        }
        seq.push(SelectingPriceMode);
        seq
    }

    /// The state preceding `state` in the forward order, if any
    pub fn previous_state(&self, state: SearchState) -> Option<SearchState> {
        if state == SearchState::AwaitingCustomPrice {
            return Some(SearchState::SelectingPriceMode);
        }
        let seq = self.flow_sequence();
        let idx = seq.iter().position(|s| *s == state)?;
        if idx == 0 {
            None
        } else {
            Some(seq[idx - 1])
        }
    }

    /// Clear the fields a single step owns
    fn clear_owned(&mut self, state: SearchState) {
        use SearchState::*;
        match state {
            MainMenu | OfferingAlternatives | ShowingOutcome => {}
            SelectingTripType => self.one_way = true,
            SelectingDepartureCountry => self.departure_country = None,
            SelectingDepartureCity => {
                self.departure_city = None;
                self.departure_iata = None;
            }
            SelectingArrivalCountry => self.arrival_country = None,
            SelectingArrivalCity => {
                self.arrival_city = None;
                self.arrival_iata = None;
            }
            SelectingDateMode => self.with_dates = None,
            SelectingDepartureYear => self.dep_year = None,
            SelectingDepartureMonth => self.dep_month = None,
            SelectingDepartureDayRange => self.dep_range = None,
            SelectingDepartureDay => self.departure_date = None,
            SelectingReturnYear => self.ret_year = None,
            SelectingReturnMonth => self.ret_month = None,
            SelectingReturnDayRange => self.ret_range = None,
            SelectingReturnDay => self.return_date = None,
            SelectingPriceMode | AwaitingCustomPrice => self.price_mode = None,
        }
    }

    /// Clear the fields owned by `state` and every later step.
    ///
    /// The sequence is computed before any field is touched, because clearing
    /// `one_way` or `with_dates` would itself shorten it.
    pub fn clear_from(&mut self, state: SearchState) {
        let seq = self.flow_sequence();
        let from = if state == SearchState::AwaitingCustomPrice {
            SearchState::SelectingPriceMode
        } else {
            state
        };
        if let Some(idx) = seq.iter().position(|s| *s == from) {
            for s in &seq[idx..] {
                self.clear_owned(*s);
            }
        }
        self.touch();
    }

    /// Clear only the steps after `state` (defensive clearing on forward moves)
    pub fn clear_after(&mut self, state: SearchState) {
        let seq = self.flow_sequence();
        if let Some(idx) = seq.iter().position(|s| *s == state) {
            for s in &seq[idx + 1..] {
                self.clear_owned(*s);
            }
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() > expires_at,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_parameters_start_at_menu() {
        let params = SearchParameters::new(42);
        assert_eq!(params.user_id, 42);
        assert_eq!(params.state, SearchState::MainMenu);
        assert!(params.departure_iata.is_none());
        assert!(!params.already_searched_alternatives);
    }

    #[test]
    fn test_standard_round_trip_sequence_includes_return() {
        let mut params = SearchParameters::new(1);
        params.enter_flow(SearchFlow::Standard);
        params.one_way = false;
        let seq = params.flow_sequence();
        assert!(seq.contains(&SearchState::SelectingReturnDay));
        assert_eq!(*seq.last().unwrap(), SearchState::SelectingPriceMode);
    }

    #[test]
    fn test_one_way_sequence_skips_return() {
        let mut params = SearchParameters::new(1);
        params.enter_flow(SearchFlow::Standard);
        params.one_way = true;
        assert!(!params
            .flow_sequence()
            .contains(&SearchState::SelectingReturnYear));
    }

    #[test]
    fn test_flexible_without_dates_skips_date_states() {
        let mut params = SearchParameters::new(1);
        params.enter_flow(SearchFlow::Flexible);
        params.with_dates = Some(false);
        let seq = params.flow_sequence();
        assert!(!seq.contains(&SearchState::SelectingDepartureYear));
        assert!(seq.contains(&SearchState::SelectingDateMode));
    }

    #[test]
    fn test_clear_from_drops_descendant_fields() {
        let mut params = SearchParameters::new(1);
        params.enter_flow(SearchFlow::Standard);
        params.one_way = false;
        params.departure_country = Some("Ireland".into());
        params.departure_city = Some("Dublin".into());
        params.departure_iata = Some("DUB".into());
        params.dep_year = Some(2025);
        params.dep_month = Some(8);
        params.departure_date = NaiveDate::from_ymd_opt(2025, 8, 11);

        params.clear_from(SearchState::SelectingDepartureMonth);

        // Month and everything downstream is gone, year and airports survive
        assert_eq!(params.dep_year, Some(2025));
        assert!(params.dep_month.is_none());
        assert!(params.departure_date.is_none());
        assert_eq!(params.departure_iata.as_deref(), Some("DUB"));
    }

    #[test]
    fn test_clear_after_keeps_current_step_fields() {
        let mut params = SearchParameters::new(1);
        params.enter_flow(SearchFlow::Standard);
        params.dep_year = Some(2025);
        params.dep_month = Some(8);
        params.clear_after(SearchState::SelectingDepartureYear);
        assert_eq!(params.dep_year, Some(2025));
        assert!(params.dep_month.is_none());
    }

    #[test]
    fn test_previous_state_follows_flow_sequence() {
        let mut params = SearchParameters::new(1);
        params.enter_flow(SearchFlow::Top3);
        assert_eq!(
            params.previous_state(SearchState::SelectingDepartureYear),
            Some(SearchState::SelectingDepartureCity)
        );
        assert_eq!(params.previous_state(SearchState::SelectingDepartureCountry), None);
        assert_eq!(
            params.previous_state(SearchState::AwaitingCustomPrice),
            Some(SearchState::SelectingPriceMode)
        );
    }

    #[test]
    fn test_state_slug_round_trip() {
        for state in [
            SearchState::SelectingDepartureMonth,
            SearchState::SelectingReturnDayRange,
            SearchState::SelectingPriceMode,
            SearchState::ShowingOutcome,
        ] {
            assert_eq!(SearchState::from_slug(state.slug()), Some(state));
        }
        assert_eq!(SearchState::from_slug("bogus"), None);
    }
}
