use std::collections::HashSet;

use anyhow::Context;

use crate::{
    error::{AppError, AppResult},
    models::{Catalog, CityProfile, Importances, MAX_SCORE, MIN_SCORE},
};

/// Importance (and city value) assumed for any category without explicit data
pub const fn neutral_importance() -> f64 {
    5.0
}

/// Lays out a value per category in catalog order, falling back to neutral
pub fn assemble_vector<F>(categories: &[String], lookup: F) -> Vec<f64>
where
    F: Fn(&str) -> Option<f64>,
{
    categories
        .iter()
        .map(|category| lookup(category).unwrap_or_else(neutral_importance))
        .collect()
}

pub fn importance_vector(categories: &[String], importances: &Importances) -> Vec<f64> {
    assemble_vector(categories, |category| importances.get(category).copied())
}

pub fn city_vector(categories: &[String], city: &CityProfile) -> Vec<f64> {
    assemble_vector(categories, |category| city.value_of(category))
}

/// Checks a catalog before it is stored
///
/// Every city value must be within 1..=10 and refer to a listed category.
pub fn validate_catalog(catalog: &Catalog) -> AppResult<()> {
    let known: HashSet<&str> = catalog.categories.iter().map(String::as_str).collect();

    for city in &catalog.cities {
        if city.name.trim().is_empty() {
            return Err(AppError::InvalidInput("City name cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for entry in &city.categories {
            if !known.contains(entry.category.as_str()) {
                return Err(AppError::InvalidInput(format!(
                    "City {} rates unknown category {}",
                    city.name, entry.category
                )));
            }
            if !seen.insert(entry.category.as_str()) {
                return Err(AppError::InvalidInput(format!(
                    "City {} rates category {} twice",
                    city.name, entry.category
                )));
            }
            let value = f64::from(entry.value);
            if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                return Err(AppError::InvalidInput(format!(
                    "City {} has {} = {}, expected 1..=10",
                    city.name, entry.category, entry.value
                )));
            }
        }
    }

    Ok(())
}

/// Reads and validates a JSON catalog file
pub fn load_catalog_file(path: &str) -> anyhow::Result<Catalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path))?;
    let catalog: Catalog =
        serde_json::from_str(&raw).with_context(|| format!("Invalid catalog JSON in {}", path))?;
    validate_catalog(&catalog)?;

    tracing::info!(
        path = %path,
        categories = catalog.categories.len(),
        cities = catalog.cities.len(),
        "Catalog file loaded"
    );

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<String> {
        vec!["Beach".to_string(), "Food".to_string(), "Nightlife".to_string()]
    }

    #[test]
    fn test_importance_vector_defaults_to_neutral() {
        let mut importances = Importances::new();
        importances.insert("Food".to_string(), 10.0);

        let vector = importance_vector(&categories(), &importances);
        assert_eq!(vector, vec![5.0, 10.0, 5.0]);
    }

    #[test]
    fn test_city_vector_follows_catalog_order() {
        let city = CityProfile::new("Barcelona")
            .with_category("Nightlife", 9, "Late dinners")
            .with_category("Beach", 8, "Barceloneta");

        assert_eq!(city_vector(&categories(), &city), vec![8.0, 5.0, 9.0]);
    }

    #[test]
    fn test_validate_catalog_accepts_well_formed() {
        let catalog = Catalog {
            categories: categories(),
            cities: vec![CityProfile::new("Rome").with_category("Food", 10, "Carbonara")],
        };
        assert!(validate_catalog(&catalog).is_ok());
    }

    #[test]
    fn test_validate_catalog_rejects_out_of_range() {
        let catalog = Catalog {
            categories: categories(),
            cities: vec![CityProfile::new("Rome").with_category("Food", 11, "Too good")],
        };
        assert!(matches!(
            validate_catalog(&catalog),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_catalog_rejects_unknown_category() {
        let catalog = Catalog {
            categories: categories(),
            cities: vec![CityProfile::new("Rome").with_category("Skiing", 2, "None")],
        };
        assert!(validate_catalog(&catalog).is_err());
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let catalog = load_catalog_file(concat!(env!("CARGO_MANIFEST_DIR"), "/data/catalog.json"))
            .unwrap();
        assert!(!catalog.categories.is_empty());
        assert!(!catalog.cities.is_empty());
    }
}
