//! Schema catalog: the browsing index over all known block types
//!
//! Built from `meta` level files alone so enumeration and filtering
//! never force a full per-type schema load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::Complexity;

/// Discovery metadata for one block type (the `meta` level).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMeta {
    /// Namespaced type name, e.g. "craft/heading"
    pub name: String,

    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Catalog category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Complexity tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,

    /// Use-case groups this type belongs to
    #[serde(rename = "useCases", default, skip_serializing_if = "Vec::is_empty")]
    pub use_cases: Vec<String>,

    /// One-line description for discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Category entry in the catalog summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub count: usize,
    pub types: Vec<String>,
}

/// Browsing summary: total count plus per-category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    #[serde(rename = "totalBlocks")]
    pub total_blocks: usize,
    pub categories: Vec<CategorySummary>,
}

/// Index of all known block types, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, TypeMeta>,
}

impl Catalog {
    /// Builds a catalog from discovery entries.
    pub fn from_entries(entries: Vec<TypeMeta>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.name.clone(), e)).collect(),
        }
    }

    /// Checks whether a type name is known.
    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Returns discovery metadata for one type.
    pub fn get(&self, type_name: &str) -> Option<&TypeMeta> {
        self.entries.get(type_name)
    }

    /// Returns all entries in name order.
    pub fn all(&self) -> impl Iterator<Item = &TypeMeta> {
        self.entries.values()
    }

    /// Returns the number of known types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Filters entries by category name.
    pub fn by_category(&self, category: &str) -> Vec<&TypeMeta> {
        self.all()
            .filter(|e| e.category.as_deref() == Some(category))
            .collect()
    }

    /// Filters entries by use-case group.
    pub fn by_use_case(&self, use_case: &str) -> Vec<&TypeMeta> {
        self.all()
            .filter(|e| e.use_cases.iter().any(|u| u == use_case))
            .collect()
    }

    /// Filters entries by complexity tier.
    pub fn by_complexity(&self, complexity: Complexity) -> Vec<&TypeMeta> {
        self.all()
            .filter(|e| e.complexity == Some(complexity))
            .collect()
    }

    /// Returns use-case groups with their member type names, group-sorted.
    pub fn use_case_groups(&self) -> Vec<(String, Vec<String>)> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in self.all() {
            for use_case in &entry.use_cases {
                groups
                    .entry(use_case.clone())
                    .or_default()
                    .push(entry.name.clone());
            }
        }
        groups.into_iter().collect()
    }

    /// Builds the browsing summary: total count plus categories.
    ///
    /// Types without a category are grouped under "uncategorized".
    pub fn summary(&self) -> CatalogSummary {
        let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in self.all() {
            let category = entry
                .category
                .clone()
                .unwrap_or_else(|| "uncategorized".to_string());
            categories.entry(category).or_default().push(entry.name.clone());
        }

        CatalogSummary {
            total_blocks: self.entries.len(),
            categories: categories
                .into_iter()
                .map(|(name, types)| CategorySummary {
                    name,
                    count: types.len(),
                    types,
                })
                .collect(),
        }
    }
}
