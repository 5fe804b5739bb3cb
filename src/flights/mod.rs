//! Flight search: gateway client, window orchestration, pure ranking

pub mod client;
pub mod models;
pub mod ranking;
pub mod search;

pub use client::{FareClient, FareQuery};
pub use models::{FlightLeg, FlightOffer};
pub use ranking::{OffersByDate, TopDestination};
pub use search::{run_alternatives_search, run_search};
