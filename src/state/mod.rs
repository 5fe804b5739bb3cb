//! Conversation state management
//!
//! One flow-parameterised machine drives every search conversation; the
//! parameters object is the single source of truth and lives in Redis
//! between updates.

pub mod context;
pub mod machine;
pub mod render;
pub mod storage;
pub mod token;

pub use context::{Leg, PriceMode, SearchFlow, SearchParameters, SearchState};
pub use machine::{Action, Event, Machine};
pub use render::{Button, StepView};
pub use storage::StateStorage;
pub use token::{PriceChoice, Token};
