//! Rate tables: metal price per gram, gemstone price per carat, work
//! coefficients per product type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Work coefficient applied when the product type is unknown.
pub const DEFAULT_WORK_COEFFICIENT: f64 = 1.2;

/// A full set of pricing rates.
///
/// Metal keys combine metal and purity as `{metal}_{purity}`, e.g.
/// `gold_585`. Prices are in rubles.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateTable {
    /// metal+purity → price per gram
    pub metal_rates: BTreeMap<String, f64>,
    /// gemstone name → price per carat
    pub gemstone_rates: BTreeMap<String, f64>,
    /// product type → work coefficient
    pub work_coefficients: BTreeMap<String, f64>,
}

impl RateTable {
    /// The hard-coded local fallback, used whenever the external source is
    /// unreachable.
    pub fn local_fallback() -> Self {
        let metal_rates = BTreeMap::from(
            [
                // Gold (base price per gram, by purity)
                ("gold_999", 7500.0),
                ("gold_958", 7200.0),
                ("gold_916", 6900.0),
                ("gold_875", 6600.0),
                ("gold_750", 5700.0),
                ("gold_585", 4500.0),
                ("gold_583", 4450.0),
                ("gold_500", 3800.0),
                ("gold_375", 2900.0),
                ("gold_333", 2600.0),
                // Silver
                ("silver_999", 95.0),
                ("silver_960", 92.0),
                ("silver_925", 89.0),
                ("silver_875", 84.0),
                ("silver_830", 80.0),
                ("silver_800", 77.0),
                // Platinum
                ("platinum_950", 3200.0),
                ("platinum_900", 3050.0),
                ("platinum_850", 2900.0),
                ("platinum_585", 2000.0),
                // Palladium
                ("palladium_850", 3800.0),
                ("palladium_500", 2300.0),
            ]
            .map(|(k, v)| (k.to_string(), v)),
        );

        let gemstone_rates = BTreeMap::from(
            [
                ("diamond", 150000.0),
                ("ruby", 80000.0),
                ("sapphire", 60000.0),
                ("emerald", 70000.0),
                ("amethyst", 3000.0),
                ("topaz", 5000.0),
                ("pearl", 2000.0),
                ("garnet", 4000.0),
                ("aquamarine", 8000.0),
                ("opal", 6000.0),
                ("turquoise", 2500.0),
                ("cubic_zirconia", 500.0),
                ("meteorite", 10000.0), // per gram
                ("other", 1000.0),
            ]
            .map(|(k, v)| (k.to_string(), v)),
        );

        let work_coefficients = BTreeMap::from(
            [
                ("ring", 1.3),
                ("earrings", 1.4),
                ("pendant", 1.2),
                ("bracelet", 1.35),
                ("chain", 1.25),
                ("necklace", 1.4),
                ("set", 1.5),
                ("box", 1.1),
                ("jewelry", 1.3),
                ("gift", 1.2),
                ("other", 1.2),
            ]
            .map(|(k, v)| (k.to_string(), v)),
        );

        RateTable {
            metal_rates,
            gemstone_rates,
            work_coefficients,
        }
    }

    pub fn metal_rate(&self, metal_type: &str, metal_purity: &str) -> Option<f64> {
        let key = format!("{}_{}", metal_type, metal_purity);
        self.metal_rates.get(&key).copied().filter(|r| *r > 0.0)
    }

    pub fn gemstone_rate(&self, gemstone: &str) -> f64 {
        self.gemstone_rates.get(gemstone).copied().unwrap_or(0.0)
    }

    pub fn work_coefficient(&self, product_type: &str) -> f64 {
        self.work_coefficients
            .get(product_type)
            .copied()
            .unwrap_or(DEFAULT_WORK_COEFFICIENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_fallback_known_rates() {
        let table = RateTable::local_fallback();
        assert_eq!(table.metal_rate("gold", "585"), Some(4500.0));
        assert_eq!(table.metal_rate("silver", "925"), Some(89.0));
        assert_eq!(table.gemstone_rate("diamond"), 150000.0);
        assert_eq!(table.work_coefficient("ring"), 1.3);
    }

    #[test]
    fn test_unknown_metal_is_none() {
        let table = RateTable::local_fallback();
        assert_eq!(table.metal_rate("gold", "123"), None);
        assert_eq!(table.metal_rate("copper", "999"), None);
    }

    #[test]
    fn test_unknown_gemstone_and_work_defaults() {
        let table = RateTable::local_fallback();
        assert_eq!(table.gemstone_rate("kryptonite"), 0.0);
        assert_eq!(table.work_coefficient("spaceship"), 1.2);
    }

    #[test]
    fn test_table_json_roundtrip() {
        let table = RateTable::local_fallback();
        let json = serde_json::to_string(&table).unwrap();
        let back: RateTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metal_rates.len(), table.metal_rates.len());
        assert_eq!(back.metal_rate("gold", "999"), Some(7500.0));
    }
}
