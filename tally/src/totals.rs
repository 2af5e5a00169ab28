use std::collections::HashMap;

use regimen::registry::RegimeRegistry;

/// Occurrence counts per regime, in regime definition order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Totals {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl Totals {
    /// Every known regime at zero.
    pub fn zeroed(regimes: &RegimeRegistry) -> Self {
        let mut totals = Totals::default();
        for name in regimes.names() {
            totals.index.insert(name.to_string(), totals.entries.len());
            totals.entries.push((name.to_string(), 0));
        }
        totals
    }

    /// Add `amount` to `name`. Returns the new total, or `None` on overflow.
    pub fn add(&mut self, name: &str, amount: u64) -> Option<u64> {
        let slot = match self.index.get(name) {
            Some(&slot) => slot,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), 0));
                self.entries.len() - 1
            }
        };
        let total = &mut self.entries[slot].1;
        *total = total.checked_add(amount)?;
        Some(*total)
    }

    /// Add `factor` times every count in `other`. `None` on overflow.
    pub fn add_scaled(&mut self, other: &Totals, factor: u64) -> Option<()> {
        for (name, count) in &other.entries {
            if *count != 0 {
                self.add(name, count.checked_mul(factor)?)?;
            }
        }
        Some(())
    }

    /// The total for `name`; unknown names count zero.
    pub fn get(&self, name: &str) -> u64 {
        self.index.get(name).map_or(0, |&slot| self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Names with a non-zero total.
    pub fn nonzero(&self) -> impl Iterator<Item = (&str, u64)> {
        self.iter().filter(|(_, count)| *count != 0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
