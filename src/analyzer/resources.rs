//! Resource maps: resource name to exact quantity.

use super::quantity::{Quantity, QuantityError};
use serde::Serialize;
use std::collections::BTreeMap;

/// Well-known resource names.
pub const CPU: &str = "cpu";
pub const MEMORY: &str = "memory";

/// Requested quantities keyed by resource name.
///
/// A missing key means zero of that resource. Operations build new maps and
/// never touch their inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResourceMap(BTreeMap<String, Quantity>);

impl ResourceMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Key-wise sum of several maps.
    ///
    /// The result holds exactly the keys present in any input; keys absent
    /// from a map simply do not contribute.
    pub fn sum<'a, I>(maps: I) -> Result<ResourceMap, QuantityError>
    where
        I: IntoIterator<Item = &'a ResourceMap>,
    {
        let mut totals: BTreeMap<String, Quantity> = BTreeMap::new();
        for map in maps {
            for (name, quantity) in &map.0 {
                let total = match totals.get(name) {
                    Some(current) => current.checked_add(quantity)?,
                    None => quantity.clone(),
                };
                totals.insert(name.clone(), total);
            }
        }
        Ok(Self(totals))
    }

    /// Multiply every quantity by a replication factor.
    ///
    /// A factor of zero is treated as one: an unset replica count must not
    /// erase the requests it multiplies.
    pub fn scale(&self, factor: u32) -> Result<ResourceMap, QuantityError> {
        let factor = u64::from(factor.max(1));
        self.0
            .iter()
            .map(|(name, quantity)| Ok((name.clone(), quantity.multiply_by_factor(factor)?)))
            .collect::<Result<BTreeMap<_, _>, QuantityError>>()
            .map(Self)
    }

    /// Set the quantity for a resource, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, quantity: Quantity) {
        self.0.insert(name.into(), quantity);
    }

    /// Quantity requested for a resource, if any.
    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.0.get(name)
    }

    /// Requested CPU, zero when absent.
    pub fn cpu(&self) -> Quantity {
        self.get(CPU).cloned().unwrap_or_default()
    }

    /// Requested memory, zero when absent.
    pub fn memory(&self) -> Quantity {
        self.get(MEMORY).cloned().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Quantity)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Quantity)> for ResourceMap {
    fn from_iter<T: IntoIterator<Item = (String, Quantity)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Sum the request maps of one pod template's containers.
///
/// Containers without requests are simply left out of `containers`; no
/// input yields an empty map.
pub fn requests_from_containers<'a, I>(containers: I) -> Result<ResourceMap, QuantityError>
where
    I: IntoIterator<Item = &'a ResourceMap>,
{
    ResourceMap::sum(containers)
}
