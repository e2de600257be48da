//! Deduplicated, insertion-ordered table of known locations.

use std::collections::HashMap;

use ridematch_types::{Location, LocationIndex, Result};

/// Outcome of registering a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The location was already known; nothing changed.
    Existing(LocationIndex),
    /// The location was appended; the distance matrix must be extended.
    Inserted(LocationIndex),
}

impl Registration {
    #[must_use]
    pub fn index(self) -> LocationIndex {
        match self {
            Self::Existing(idx) | Self::Inserted(idx) => idx,
        }
    }

    #[must_use]
    pub fn is_new(self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Ordered list of locations; position is the matrix index.
#[derive(Debug, Clone, Default)]
pub struct LocationRegistry {
    /// Locations in first-insertion order.
    locations: Vec<Location>,
    /// Fast lookup: `Location -> index`.
    index: HashMap<Location, LocationIndex>,
}

impl LocationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from an ordered sequence, collapsing duplicates.
    #[must_use]
    pub fn from_locations<'a>(locations: impl IntoIterator<Item = &'a Location>) -> Self {
        let mut registry = Self::new();
        for location in locations {
            registry.register(location.clone());
        }
        registry
    }

    /// Register a location, returning its index.
    ///
    /// Idempotent: a known location keeps its original index.
    pub fn register(&mut self, location: Location) -> Registration {
        if let Some(&idx) = self.index.get(&location) {
            return Registration::Existing(idx);
        }
        let idx = LocationIndex(self.locations.len());
        self.index.insert(location.clone(), idx);
        self.locations.push(location);
        Registration::Inserted(idx)
    }

    /// Validate a raw identifier, then register it.
    ///
    /// # Errors
    /// `InvalidLocation` if the identifier is empty or malformed.
    pub fn register_str(&mut self, id: &str) -> Result<Registration> {
        Ok(self.register(Location::new(id)?))
    }

    #[must_use]
    pub fn index_of(&self, location: &Location) -> Option<LocationIndex> {
        self.index.get(location).copied()
    }

    #[must_use]
    pub fn location(&self, idx: LocationIndex) -> Option<&Location> {
        self.locations.get(idx.0)
    }

    #[must_use]
    pub fn contains(&self, location: &Location) -> bool {
        self.index.contains_key(location)
    }

    /// Locations in index order.
    #[must_use]
    pub fn as_slice(&self) -> &[Location] {
        &self.locations
    }

    pub fn iter(&self) -> impl Iterator<Item = (LocationIndex, &Location)> {
        self.locations
            .iter()
            .enumerate()
            .map(|(i, loc)| (LocationIndex(i), loc))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
