//! Статические таблицы бакетов: строковая метка -> числовое значение

use std::fmt;

use serde::{Deserialize, Serialize};

pub struct BucketTable {
    pub name: &'static str,
    pub entries: &'static [(&'static str, f64)],
}

impl BucketTable {
    pub fn lookup(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, value)| *value)
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(label, _)| *label)
    }
}

pub static ENGINE_SIZE: BucketTable = BucketTable {
    name: "engine_size",
    entries: &[
        ("0 - 499 cc", 250.0),
        ("500 - 999 cc", 750.0),
        ("1,000 - 1,999 cc", 1500.0),
        ("2,000 - 2,999 cc", 2500.0),
        ("3,000 - 3,999 cc", 3500.0),
        ("4,000 - 4,999 cc", 4500.0),
        ("5,000 - 5,999 cc", 5500.0),
        ("More than 6,000 cc", 6500.0),
    ],
};

pub static YEAR: BucketTable = BucketTable {
    name: "year",
    entries: &[("Older than 1970", 1970.0)],
};

// Середина диапазона: (нижняя граница + верхняя + 1) / 2
pub static KILOMETERS: BucketTable = BucketTable {
    name: "kilometers",
    entries: &[
        ("0", 0.0),
        ("1 - 999", 500.0),
        ("1,000 - 9,999", 5500.0),
        ("10,000 - 19,999", 15000.0),
        ("20,000 - 29,999", 25000.0),
        ("30,000 - 39,999", 35000.0),
        ("40,000 - 49,999", 45000.0),
        ("50,000 - 59,999", 55000.0),
        ("60,000 - 69,999", 65000.0),
        ("70,000 - 79,999", 75000.0),
        ("80,000 - 89,999", 85000.0),
        ("90,000 - 99,999", 95000.0),
        ("100,000 - 109,999", 105000.0),
        ("110,000 - 119,999", 115000.0),
        ("120,000 - 129,999", 125000.0),
        ("130,000 - 139,999", 135000.0),
        ("140,000 - 149,999", 145000.0),
        ("150,000 - 159,999", 155000.0),
        ("160,000 - 169,999", 165000.0),
        ("170,000 - 179,999", 175000.0),
        ("180,000 - 189,999", 185000.0),
        ("190,000 - 199,999", 195000.0),
        ("+200,000", 200000.0),
    ],
};

pub static BATTERY_CAPACITY: BucketTable = BucketTable {
    name: "battery_capacity",
    entries: &[
        ("Less than 50 kWh", 30.0),
        ("50 - 69 kWh", 60.0),
        ("70 - 89 kWh", 80.0),
        ("90 - 99 kWh", 95.0),
        ("More than 100 kWh", 120.0),
    ],
};

pub static BATTERY_RANGE: BucketTable = BucketTable {
    name: "battery_range",
    entries: &[
        ("Less than 100 km", 50.0),
        ("100 - 199 km", 150.0),
        ("200 - 299 km", 250.0),
        ("300 - 399 km", 350.0),
        ("400 - 499 km", 450.0),
        ("More than 500 km", 550.0),
    ],
};

/// Чем заполнять пропуски и метки, которых нет в таблице
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FallbackPolicy {
    /// Фиксированное значение, данные не смотрим
    Constant(f64),
    /// Мода значений из обучающих данных; без данных - ошибка
    Mode,
    /// Мода, а если значений нет - константа
    ModeOr(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketDomain {
    EngineSize,
    Year,
    Kilometers,
    BatteryCapacity,
    BatteryRange,
}

impl BucketDomain {
    pub const ALL: [BucketDomain; 5] = [
        BucketDomain::EngineSize,
        BucketDomain::Year,
        BucketDomain::Kilometers,
        BucketDomain::BatteryCapacity,
        BucketDomain::BatteryRange,
    ];

    pub fn table(self) -> &'static BucketTable {
        match self {
            BucketDomain::EngineSize => &ENGINE_SIZE,
            BucketDomain::Year => &YEAR,
            BucketDomain::Kilometers => &KILOMETERS,
            BucketDomain::BatteryCapacity => &BATTERY_CAPACITY,
            BucketDomain::BatteryRange => &BATTERY_RANGE,
        }
    }

    pub fn fallback_policy(self) -> FallbackPolicy {
        match self {
            BucketDomain::EngineSize => FallbackPolicy::Constant(0.0),
            BucketDomain::Year => FallbackPolicy::ModeOr(1970.0),
            BucketDomain::Kilometers
            | BucketDomain::BatteryCapacity
            | BucketDomain::BatteryRange => FallbackPolicy::Mode,
        }
    }
}

impl fmt::Display for BucketDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown() {
        assert_eq!(ENGINE_SIZE.lookup("500 - 999 cc"), Some(750.0));
        assert_eq!(KILOMETERS.lookup("+200,000"), Some(200000.0));
        assert_eq!(ENGINE_SIZE.lookup("500-999 cc"), None);
    }

    #[test]
    fn test_tables_have_unique_labels_and_non_negative_values() {
        for domain in BucketDomain::ALL {
            let table = domain.table();
            let labels: Vec<&str> = table.labels().collect();
            for (i, label) in labels.iter().enumerate() {
                assert!(
                    !labels[i + 1..].contains(label),
                    "duplicate label {} in {}",
                    label,
                    table.name
                );
            }
            assert!(table.entries.iter().all(|(_, v)| *v >= 0.0));
        }
    }

    #[test]
    fn test_kilometer_bands_use_range_midpoints() {
        for (label, value) in KILOMETERS.entries.iter().skip(3).take(19) {
            let bounds: Vec<f64> = label
                .replace(',', "")
                .split(" - ")
                .map(|part| part.parse::<f64>().unwrap())
                .collect();
            assert_eq!((bounds[0] + bounds[1] + 1.0) / 2.0, *value, "{}", label);
        }
    }

    #[test]
    fn test_domain_display_and_serde_name() {
        assert_eq!(BucketDomain::BatteryRange.to_string(), "battery_range");
        assert_eq!(
            serde_json::to_string(&BucketDomain::EngineSize).unwrap(),
            "\"engine_size\""
        );
    }
}
