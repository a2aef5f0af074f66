//! Property registry model.
//!
//! Properties are owned by an external registry. The timeline engine only
//! reads them for cross-property checks (moving a reservation to another
//! unit).

use serde::{Deserialize, Serialize};

/// A rentable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Registry record ID.
    pub id: String,
    /// Property key referenced by events.
    pub property_id: i64,
    /// City the unit is in.
    #[serde(default)]
    pub city: String,
    /// Maximum party size.
    pub max_guests: u32,
    /// Unit type (apartment, villa, …).
    #[serde(default, rename = "type")]
    pub property_type: String,
}

impl Property {
    /// Creates a property record.
    pub fn new(property_id: i64, max_guests: u32) -> Self {
        Self {
            id: property_id.to_string(),
            property_id,
            city: String::new(),
            max_guests,
            property_type: String::new(),
        }
    }

    /// Sets the city.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    /// Sets the unit type.
    pub fn with_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = property_type.into();
        self
    }

    /// Whether the unit can host `guests` people.
    #[inline]
    pub fn can_host(&self, guests: u32) -> bool {
        guests <= self.max_guests
    }
}

/// Read-only lookup over the property registry.
#[derive(Debug, Clone, Default)]
pub struct PropertyRegistry {
    properties: Vec<Property>,
}

impl PropertyRegistry {
    /// Creates a registry from a list of properties.
    pub fn new(properties: Vec<Property>) -> Self {
        Self { properties }
    }

    /// Finds a property by the key events reference.
    pub fn get(&self, property_id: i64) -> Option<&Property> {
        self.properties.iter().find(|p| p.property_id == property_id)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
