//! Airport catalog
//!
//! Static country -> city -> IATA mapping, loaded once at startup from an
//! embedded JSON asset and read-only afterwards.

use std::collections::{BTreeMap, HashMap};
use crate::utils::errors::Result;

const AIRPORTS_JSON: &str = include_str!("../../assets/airports.json");

/// An airport entry resolved from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Airport {
    pub country: String,
    pub city: String,
    pub iata: String,
}

/// Read-only airport catalog
#[derive(Debug, Clone)]
pub struct AirportCatalog {
    /// country -> city -> IATA, ordered for stable keyboard layouts
    countries: BTreeMap<String, BTreeMap<String, String>>,
    /// IATA -> (country, city) reverse index
    by_iata: HashMap<String, (String, String)>,
}

impl AirportCatalog {
    /// Load the embedded catalog
    pub fn load() -> Result<Self> {
        Self::from_json(AIRPORTS_JSON)
    }

    fn from_json(json: &str) -> Result<Self> {
        let countries: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_str(json)?;

        let mut by_iata = HashMap::new();
        for (country, cities) in &countries {
            for (city, iata) in cities {
                by_iata.insert(iata.clone(), (country.clone(), city.clone()));
            }
        }

        Ok(Self { countries, by_iata })
    }

    /// All country names in display order
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    pub fn has_country(&self, country: &str) -> bool {
        self.countries.contains_key(country)
    }

    /// (city, IATA) pairs for a country in display order
    pub fn cities(&self, country: &str) -> Option<Vec<(&str, &str)>> {
        self.countries.get(country).map(|cities| {
            cities
                .iter()
                .map(|(city, iata)| (city.as_str(), iata.as_str()))
                .collect()
        })
    }

    /// Resolve a typed city name within a country, case-insensitively
    pub fn find_city(&self, country: &str, input: &str) -> Option<Airport> {
        let needle = input.trim().to_lowercase();
        let cities = self.countries.get(country)?;
        cities
            .iter()
            .find(|(city, _)| city.to_lowercase() == needle)
            .map(|(city, iata)| Airport {
                country: country.to_string(),
                city: city.clone(),
                iata: iata.clone(),
            })
    }

    /// Resolve an IATA code back to its catalog entry
    pub fn locate(&self, iata: &str) -> Option<Airport> {
        self.by_iata.get(iata).map(|(country, city)| Airport {
            country: country.clone(),
            city: city.clone(),
            iata: iata.to_string(),
        })
    }

    /// Other airports in the same country as the given IATA code
    pub fn alternatives(&self, iata: &str) -> Vec<Airport> {
        let Some((country, _)) = self.by_iata.get(iata) else {
            return Vec::new();
        };
        self.countries
            .get(country)
            .map(|cities| {
                cities
                    .iter()
                    .filter(|(_, other)| other.as_str() != iata)
                    .map(|(city, other)| Airport {
                        country: country.clone(),
                        city: city.clone(),
                        iata: other.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = AirportCatalog::load().unwrap();
        assert!(catalog.has_country("Ireland"));
        assert!(catalog.countries().count() > 10);
    }

    #[test]
    fn test_find_city_case_insensitive() {
        let catalog = AirportCatalog::load().unwrap();
        let airport = catalog.find_city("Ireland", "dublin").unwrap();
        assert_eq!(airport.iata, "DUB");
        assert_eq!(airport.city, "Dublin");
        assert!(catalog.find_city("Ireland", "Atlantis").is_none());
    }

    #[test]
    fn test_locate_round_trips() {
        let catalog = AirportCatalog::load().unwrap();
        let airport = catalog.locate("KRK").unwrap();
        assert_eq!(airport.country, "Poland");
        assert_eq!(airport.city, "Krakow");
    }

    #[test]
    fn test_alternatives_exclude_self() {
        let catalog = AirportCatalog::load().unwrap();
        let alternatives = catalog.alternatives("DUB");
        assert!(!alternatives.is_empty());
        assert!(alternatives.iter().all(|a| a.iata != "DUB"));
        assert!(alternatives.iter().all(|a| a.country == "Ireland"));
    }

    #[test]
    fn test_alternatives_unknown_iata() {
        let catalog = AirportCatalog::load().unwrap();
        assert!(catalog.alternatives("XXX").is_empty());
    }
}
