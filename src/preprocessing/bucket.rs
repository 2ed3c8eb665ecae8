//! Трансформеры бакетов: объём двигателя, год, пробег, ёмкость и запас хода батареи

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::pipeline::{persist_value, Component};
use crate::preprocessing::mappings::{BucketDomain, FallbackPolicy};

/// Необученный трансформер: знает только свою таблицу
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketTransformer {
    domain: BucketDomain,
}

impl BucketTransformer {
    pub fn new(domain: BucketDomain) -> Self {
        Self { domain }
    }

    pub fn engine_size() -> Self {
        Self::new(BucketDomain::EngineSize)
    }

    pub fn year() -> Self {
        Self::new(BucketDomain::Year)
    }

    pub fn kilometers() -> Self {
        Self::new(BucketDomain::Kilometers)
    }

    pub fn battery_capacity() -> Self {
        Self::new(BucketDomain::BatteryCapacity)
    }

    pub fn battery_range() -> Self {
        Self::new(BucketDomain::BatteryRange)
    }

    pub fn domain(&self) -> BucketDomain {
        self.domain
    }

    pub fn fit<S: AsRef<str>>(&self, values: &[Option<S>]) -> Result<FittedBucketTransformer> {
        let fallback = match self.domain.fallback_policy() {
            FallbackPolicy::Constant(value) => value,
            FallbackPolicy::Mode => {
                mode(&self.map_values(values)).ok_or(FeatureError::NoFallback {
                    domain: self.domain,
                    rows: values.len(),
                })?
            }
            FallbackPolicy::ModeOr(default) => mode(&self.map_values(values)).unwrap_or(default),
        };

        tracing::debug!(
            "{} transformer fitted on {} rows, fallback {}",
            self.domain,
            values.len(),
            fallback
        );

        Ok(FittedBucketTransformer {
            domain: self.domain,
            fallback,
        })
    }

    pub fn fit_transform<S: AsRef<str>>(&self, values: &[Option<S>]) -> Result<Array2<f64>> {
        Ok(self.fit(values)?.transform(values))
    }

    fn map_values<S: AsRef<str>>(&self, values: &[Option<S>]) -> Vec<f64> {
        let table = self.domain.table();
        values
            .iter()
            .filter_map(|v| v.as_ref().and_then(|label| table.lookup(label.as_ref())))
            .collect()
    }
}

/// Обученный трансформер с запасным значением для неизвестных меток
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedBucketTransformer {
    domain: BucketDomain,
    fallback: f64,
}

impl FittedBucketTransformer {
    pub fn domain(&self) -> BucketDomain {
        self.domain
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    /// Результат всегда (n, 1)
    pub fn transform<S: AsRef<str>>(&self, values: &[Option<S>]) -> Array2<f64> {
        let table = self.domain.table();
        let mapped: Array1<f64> = values
            .iter()
            .map(|v| {
                v.as_ref()
                    .and_then(|label| table.lookup(label.as_ref()))
                    .unwrap_or(self.fallback)
            })
            .collect();

        mapped.insert_axis(Axis(1))
    }
}

impl Component for BucketTransformer {
    fn persist(&self) -> Result<serde_json::Value> {
        persist_value(self)
    }

    fn attributes(&self) -> Vec<(&'static str, Result<serde_json::Value>)> {
        vec![("domain", persist_value(&self.domain))]
    }
}

impl Component for FittedBucketTransformer {
    fn persist(&self) -> Result<serde_json::Value> {
        persist_value(self)
    }

    fn attributes(&self) -> Vec<(&'static str, Result<serde_json::Value>)> {
        vec![
            ("domain", persist_value(&self.domain)),
            ("fallback", persist_value(&self.fallback)),
        ]
    }
}

/// Самое частое значение; при равенстве частот берём наименьшее
fn mode(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let run = sorted[i..].iter().take_while(|v| **v == value).count();
        if best.map_or(true, |(_, count)| run > count) {
            best = Some((value, run));
        }
        i += run;
    }

    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::mappings::{BATTERY_CAPACITY, ENGINE_SIZE, KILOMETERS};

    #[test]
    fn test_engine_size_maps_known_labels() {
        let fitted = BucketTransformer::engine_size().fit::<&str>(&[]).unwrap();
        let out = fitted.transform(&[Some("500 - 999 cc")]);
        assert_eq!(out.dim(), (1, 1));
        assert_eq!(out[[0, 0]], 750.0);
    }

    #[test]
    fn test_every_table_label_maps_to_its_value() {
        for domain in BucketDomain::ALL {
            let table = domain.table();
            let labels: Vec<Option<&str>> = table.labels().map(Some).collect();
            let fitted = BucketTransformer::new(domain).fit(&labels).unwrap();
            let out = fitted.transform(&labels);
            for (i, (_, value)) in table.entries.iter().enumerate() {
                assert_eq!(out[[i, 0]], *value, "{} row {}", domain, i);
            }
        }
    }

    #[test]
    fn test_fitted_keeps_domain() {
        let transformer = BucketTransformer::battery_capacity();
        assert_eq!(transformer.domain(), BucketDomain::BatteryCapacity);

        let fitted = transformer.fit(&[Some("70 - 89 kWh")]).unwrap();
        assert_eq!(fitted.domain(), BucketDomain::BatteryCapacity);
    }

    #[test]
    fn test_engine_size_fills_unknown_with_zero() {
        let train = [Some("More than 6,000 cc"), Some("More than 6,000 cc")];
        let fitted = BucketTransformer::engine_size().fit(&train).unwrap();
        assert_eq!(fitted.fallback(), 0.0);

        let out = fitted.transform(&[Some("electric"), None]);
        assert_eq!(out.column(0).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_engine_size_fit_never_fails() {
        let fitted = BucketTransformer::engine_size().fit(&[None::<&str>, Some("?")]);
        assert!(fitted.is_ok());
    }

    #[test]
    fn test_year_falls_back_to_1970() {
        let fitted = BucketTransformer::year()
            .fit(&[Some("Older than 1970"), Some("Older than 1970")])
            .unwrap();
        assert_eq!(fitted.fallback(), 1970.0);

        let out = fitted.transform(&[Some("2015"), None]);
        assert_eq!(out.column(0).to_vec(), vec![1970.0, 1970.0]);
    }

    #[test]
    fn test_year_fits_without_mapped_values() {
        let fitted = BucketTransformer::year().fit(&[Some("2019"), None]).unwrap();
        assert_eq!(fitted.fallback(), 1970.0);

        let empty = BucketTransformer::year().fit::<&str>(&[]).unwrap();
        assert_eq!(empty.fallback(), 1970.0);
    }

    #[test]
    fn test_kilometers_learns_mode() {
        let train = [
            Some("20,000 - 29,999"),
            Some("+200,000"),
            Some("+200,000"),
            None,
            Some("unknown"),
        ];
        let fitted = BucketTransformer::kilometers().fit(&train).unwrap();
        assert_eq!(fitted.fallback(), KILOMETERS.lookup("+200,000").unwrap());

        let out = fitted.transform(&train);
        assert_eq!(out.dim(), (5, 1));
        assert_eq!(
            out.column(0).to_vec(),
            vec![25000.0, 200000.0, 200000.0, 200000.0, 200000.0]
        );
    }

    #[test]
    fn test_mode_tie_prefers_smallest_value() {
        let train = [
            Some("More than 100 kWh"),
            Some("50 - 69 kWh"),
            Some("More than 100 kWh"),
            Some("50 - 69 kWh"),
        ];
        let fitted = BucketTransformer::battery_capacity().fit(&train).unwrap();
        assert_eq!(fitted.fallback(), BATTERY_CAPACITY.lookup("50 - 69 kWh").unwrap());
    }

    #[test]
    fn test_mode_domains_fail_without_mapped_values() {
        for transformer in [
            BucketTransformer::kilometers(),
            BucketTransformer::battery_capacity(),
            BucketTransformer::battery_range(),
        ] {
            let empty = transformer.fit::<&str>(&[]);
            assert!(matches!(empty, Err(FeatureError::NoFallback { rows: 0, .. })));

            let unmapped = transformer.fit(&[None, Some("n/a")]);
            assert!(matches!(unmapped, Err(FeatureError::NoFallback { rows: 2, .. })));
        }
    }

    #[test]
    fn test_transform_is_idempotent() {
        let train = [Some("100 - 199 km"), Some("Less than 100 km"), Some("100 - 199 km")];
        let fitted = BucketTransformer::battery_range().fit(&train).unwrap();
        let input = [Some("300 - 399 km"), None, Some("far")];
        assert_eq!(fitted.transform(&input), fitted.transform(&input));
    }

    #[test]
    fn test_fit_transform_matches_fit_then_transform() {
        let train = [Some("1,000 - 1,999 cc"), None];
        let direct = BucketTransformer::engine_size().fit_transform(&train).unwrap();
        let expected = ENGINE_SIZE.lookup("1,000 - 1,999 cc").unwrap();
        assert_eq!(direct.column(0).to_vec(), vec![expected, 0.0]);
    }

    #[test]
    fn test_fitted_state_round_trips_through_json() {
        let fitted = BucketTransformer::kilometers().fit(&[Some("0"), Some("0")]).unwrap();
        let json = serde_json::to_string(&fitted).unwrap();
        let restored: FittedBucketTransformer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, fitted);
    }

    #[test]
    fn test_mode_helper() {
        assert_eq!(mode(&[]), None);
        assert_eq!(mode(&[3.0, 1.0, 3.0, 1.0, 2.0]), Some(1.0));
        assert_eq!(mode(&[5.0, 4.0, 5.0]), Some(5.0));
    }
}
