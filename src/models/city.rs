use serde::{Deserialize, Serialize};

/// A city's rating for one category, with the text explaining it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryValue {
    pub category: String,
    /// Rating between 1 and 10
    pub value: u8,
    pub descr: String,
}

/// A city and its category ratings
///
/// Also the shape of a recommendation: the engine returns profiles whose
/// `categories` are reordered by how much the caller cares about each one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityProfile {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<CategoryValue>,
}

impl CityProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
        }
    }

    /// Builder-style helper for seeding profiles
    pub fn with_category(mut self, category: &str, value: u8, descr: &str) -> Self {
        self.set_category(category, value, descr);
        self
    }

    /// Sets a category rating, replacing any previous rating for the same category
    pub fn set_category(&mut self, category: &str, value: u8, descr: &str) {
        if let Some(existing) = self.categories.iter_mut().find(|c| c.category == category) {
            existing.value = value;
            existing.descr = descr.to_string();
        } else {
            self.categories.push(CategoryValue {
                category: category.to_string(),
                value,
                descr: descr.to_string(),
            });
        }
    }

    /// Returns the city's rating for a category, if it has one
    pub fn value_of(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| f64::from(c.value))
    }
}

/// Reference data loaded once at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<String>,
    pub cities: Vec<CityProfile>,
}
