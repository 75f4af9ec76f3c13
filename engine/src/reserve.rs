//! The reserve set: which assets currently back the perp token.

use perp_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unordered set of reserve assets with O(1) insert, remove and lookup.
///
/// Backed by a vector plus a position index. Removal swaps the last element
/// into the vacated slot, so positions are not stable across removals. The
/// asset at index 0 is the underlying collateral; it is inserted on
/// construction and cannot be removed.
///
/// Persisted as the ordered token list; the position index is rebuilt on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct ReserveSet {
    tokens: Vec<Address>,
    positions: HashMap<Address, usize>,
}

impl ReserveSet {
    pub fn new(collateral: Address) -> Self {
        let mut positions = HashMap::new();
        positions.insert(collateral.clone(), 0);
        Self {
            tokens: vec![collateral],
            positions,
        }
    }

    /// The underlying collateral token (index 0).
    pub fn collateral(&self) -> &Address {
        &self.tokens[0]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Never true: the collateral is always present.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&Address> {
        self.tokens.get(index)
    }

    pub fn contains(&self, token: &Address) -> bool {
        self.positions.contains_key(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.tokens.iter()
    }

    /// Returns `false` if the token was already present.
    pub fn insert(&mut self, token: Address) -> bool {
        if self.contains(&token) {
            return false;
        }
        self.positions.insert(token.clone(), self.tokens.len());
        self.tokens.push(token);
        true
    }

    /// Returns `false` if the token was absent or is the collateral.
    pub fn remove(&mut self, token: &Address) -> bool {
        let index = match self.positions.get(token) {
            Some(&index) if index != 0 => index,
            _ => return false,
        };
        self.positions.remove(token);
        let last = self.tokens.len() - 1;
        self.tokens.swap(index, last);
        self.tokens.pop();
        if index != last {
            self.positions.insert(self.tokens[index].clone(), index);
        }
        true
    }
}

impl TryFrom<Vec<Address>> for ReserveSet {
    type Error = String;

    fn try_from(tokens: Vec<Address>) -> Result<Self, Self::Error> {
        let mut tokens = tokens.into_iter();
        let collateral = tokens
            .next()
            .ok_or_else(|| "reserve set has no collateral".to_string())?;
        let mut set = Self::new(collateral);
        for token in tokens {
            if !set.insert(token.clone()) {
                return Err(format!("duplicate reserve token {}", token));
            }
        }
        Ok(set)
    }
}

impl From<ReserveSet> for Vec<Address> {
    fn from(set: ReserveSet) -> Self {
        set.tokens
    }
}
