//! Services module
//!
//! Business logic services bundled behind one factory.

pub mod history;
pub mod rates;
pub mod user;
pub mod weather;

pub use history::HistoryService;
pub use rates::{RatesService, RatesSnapshot};
pub use user::UserService;
pub use weather::{WeatherReport, WeatherService};

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::flights::FareClient;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub settings: Settings,
    pub database: DatabaseService,
    pub user_service: UserService,
    pub history_service: HistoryService,
    pub rates_service: RatesService,
    pub weather_service: WeatherService,
    pub fare_client: FareClient,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(
        settings: Settings,
        database: DatabaseService,
        redis_client: redis::Client,
    ) -> Result<Self> {
        let user_service = UserService::new(database.users.clone());
        let history_service = HistoryService::new(database.history.clone());
        let rates_service = RatesService::new(redis_client, settings.clone())?;
        let weather_service = WeatherService::new(settings.weather.clone())?;
        let fare_client = FareClient::new(&settings.flights)?;

        Ok(Self {
            settings,
            database,
            user_service,
            history_service,
            rates_service,
            weather_service,
            fare_client,
        })
    }

    pub fn is_admin(&self, telegram_id: i64) -> bool {
        self.settings.bot.admin_ids.contains(&telegram_id)
    }
}
