use clap::ValueEnum;
use thiserror::Error;
use tracing::debug;

use crate::models::{Difficulty, Light, Plant};

const BUNDLED_PLANTS: &str = include_str!("../data/plants.json");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("bundled catalog is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("bundled catalog repeats plant id {0}")]
    DuplicateId(u32),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Catalog order
    #[default]
    Default,
    /// Cheapest first
    PriceAsc,
    /// Most expensive first
    PriceDesc,
}

#[derive(Clone, Debug, Default)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub light: Option<Light>,
    pub sort: SortOrder,
}

impl CatalogQuery {
    fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn category_filter(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn matches(&self, plant: &Plant, needle: Option<&str>) -> bool {
        if let Some(needle) = needle {
            let hit = plant.name.to_lowercase().contains(needle)
                || plant.scientific_name.to_lowercase().contains(needle);
            if !hit {
                return false;
            }
        }
        if let Some(category) = self.category_filter() {
            if !plant.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if self.difficulty.is_some_and(|d| d != plant.difficulty) {
            return false;
        }
        if self.light.is_some_and(|l| l != plant.light) {
            return false;
        }
        true
    }
}

pub struct Catalog {
    plants: Vec<Plant>,
}

impl Catalog {
    /// Loads the catalog compiled into the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_PLANTS)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let plants: Vec<Plant> = serde_json::from_str(json)?;
        Self::new(plants)
    }

    pub fn new(plants: Vec<Plant>) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::with_capacity(plants.len());
        for plant in &plants {
            if !seen.insert(plant.id) {
                return Err(CatalogError::DuplicateId(plant.id));
            }
        }
        Ok(Self { plants })
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    /// Filters and sorts in a single pass over the catalog. An empty result is
    /// a normal outcome.
    pub fn query(&self, query: &CatalogQuery) -> Vec<&Plant> {
        let needle = query.search_needle();
        let mut found: Vec<&Plant> = self
            .plants
            .iter()
            .filter(|plant| query.matches(plant, needle.as_deref()))
            .collect();

        // sort_by is stable, ties keep catalog order
        match query.sort {
            SortOrder::Default => {}
            SortOrder::PriceAsc => found.sort_by(|a, b| a.price.total_cmp(&b.price)),
            SortOrder::PriceDesc => found.sort_by(|a, b| b.price.total_cmp(&a.price)),
        }

        debug!(?query, matched = found.len(), "catalog query");
        found
    }

    /// Detail lookup by the id segment of a path. Unknown or non-numeric ids
    /// are `None`.
    pub fn plant(&self, id: &str) -> Option<&Plant> {
        let id: u32 = id.trim().parse().ok()?;
        self.plants.iter().find(|plant| plant.id == id)
    }

    pub fn top_rated(&self, n: usize) -> Vec<&Plant> {
        let mut ranked: Vec<&Plant> = self.plants.iter().collect();
        ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        ranked.truncate(n);
        ranked
    }

    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for plant in &self.plants {
            if !categories.contains(&plant.category.as_str()) {
                categories.push(&plant.category);
            }
        }
        categories
    }
}
