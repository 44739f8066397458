//! Catalogue Seeder
//!
//! Deterministic sample catalogue for development and demos. The same RNG
//! seed always yields the same codes, dates and scan histories relative to
//! the given `today`.

use chrono::{Duration, NaiveDate};
use medverify_core::{BatchCode, BatchRecord, GeoPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::repo::BatchRegistry;

/// Default number of generated batches
pub const DEFAULT_SEED_COUNT: usize = 50;

/// Default RNG seed
pub const DEFAULT_RNG_SEED: u64 = 42;

/// Manufacturer name and reliability score on a 0–10 scale
pub const MANUFACTURERS: [(&str, f64); 10] = [
    ("PharmaCorp", 9.5),
    ("MediTech Industries", 8.8),
    ("HealthFirst Labs", 9.2),
    ("BioMed Solutions", 8.5),
    ("PharmaGlobal", 7.8),
    ("MedLife Corp", 9.0),
    ("GenericMeds Inc", 7.2),
    ("EuroPharma", 8.9),
    ("AsiaMed Ltd", 6.5),
    ("CounterfeitCorp", 3.2),
];

pub const MEDICINE_NAMES: [&str; 18] = [
    "Paracetamol 500mg",
    "Ibuprofen 200mg",
    "Amoxicillin 250mg",
    "Aspirin 75mg",
    "Metformin 500mg",
    "Omeprazole 20mg",
    "Atorvastatin 20mg",
    "Losartan 50mg",
    "Amlodipine 5mg",
    "Ciprofloxacin 500mg",
    "Doxycycline 100mg",
    "Prednisone 5mg",
    "Insulin Glargine",
    "Salbutamol Inhaler",
    "Vitamin D3 1000IU",
    "Folic Acid 5mg",
    "Iron Sulfate 200mg",
    "Calcium Carbonate 500mg",
];

const CODE_PREFIXES: [&str; 4] = ["MED", "PHR", "BTH", "LOT"];
const CODE_SUFFIXES: [char; 6] = ['A', 'B', 'C', 'X', 'Y', 'Z'];

/// Well-known demo code: long-dated, reputable manufacturer, few scans
pub const DEMO_VALID_CODE: &str = "MED597233X";
/// Demo code that expired yesterday
pub const DEMO_EXPIRED_CODE: &str = "LOT100001Z";
/// Demo code with a heavy, widely dispersed scan history
pub const DEMO_SUSPICIOUS_CODE: &str = "PHR777777Y";

/// Seeder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Number of random batches
    pub count: usize,
    /// RNG seed
    pub rng_seed: u64,
    /// Also insert the demo batches
    pub include_demo: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_SEED_COUNT,
            rng_seed: DEFAULT_RNG_SEED,
            include_demo: true,
        }
    }
}

/// Outcome of a seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
    pub expired: usize,
    pub near_expiry: usize,
    pub long_dated: usize,
}

/// Expiry bucket of a generated batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shelf {
    Expired,
    NearExpiry,
    LongDated,
}

/// Random catalogue generator
pub struct CatalogueSeeder {
    rng: StdRng,
    today: NaiveDate,
}

impl CatalogueSeeder {
    pub fn new(rng_seed: u64, today: NaiveDate) -> Self {
        Self {
            rng: StdRng::seed_from_u64(rng_seed),
            today,
        }
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.gen_range(0..items.len())]
    }

    fn code(&mut self) -> StoreResult<BatchCode> {
        let prefix = *self.pick(&CODE_PREFIXES);
        let number: u32 = self.rng.gen_range(100_000..=999_999);
        let suffix = *self.pick(&CODE_SUFFIXES);
        BatchCode::parse(&format!("{}{}{}", prefix, number, suffix))
            .map_err(|e| StoreError::Internal(e.to_string()))
    }

    fn shelf(index: usize, count: usize) -> Shelf {
        // First tenth expired, next tenth near expiry, remainder long-dated
        let bucket = (count / 10).max(1);
        if index < bucket {
            Shelf::Expired
        } else if index < bucket * 2 {
            Shelf::NearExpiry
        } else {
            Shelf::LongDated
        }
    }

    fn locations(&mut self, n: usize) -> StoreResult<Vec<GeoPoint>> {
        let base_lat: f64 = self.rng.gen_range(-40.0..60.0);
        let base_lng: f64 = self.rng.gen_range(-120.0..140.0);
        (0..n)
            .map(|_| {
                let lat = base_lat + self.rng.gen_range(-0.4..0.4);
                let lng = base_lng + self.rng.gen_range(-0.4..0.4);
                GeoPoint::new(lat, lng).map_err(|e| StoreError::Internal(e.to_string()))
            })
            .collect()
    }

    fn record(&mut self, index: usize, count: usize) -> StoreResult<(BatchRecord, Shelf)> {
        let (manufacturer, score) = *self.pick(&MANUFACTURERS);
        let medicine = *self.pick(&MEDICINE_NAMES);
        let shelf = Self::shelf(index, count);

        let offset = match shelf {
            Shelf::Expired => -self.rng.gen_range(1..=365),
            Shelf::NearExpiry => self.rng.gen_range(1..=30),
            Shelf::LongDated => self.rng.gen_range(31..=730),
        };
        let expiry = self.today + Duration::days(offset);
        let manufactured = expiry - Duration::days(self.rng.gen_range(365..=1095));

        let scan_count: u64 = self.rng.gen_range(0..=15);
        let located = (scan_count as usize).min(self.rng.gen_range(0..=3));
        let locations = self.locations(located)?;

        let record = BatchRecord::new(self.code()?, medicine, manufacturer, score / 10.0, expiry)
            .with_manufacturing_date(manufactured)
            .with_scan_count(scan_count)
            .with_scan_locations(locations);
        Ok((record, shelf))
    }

    /// Generate `count` random batches
    pub fn generate(&mut self, count: usize) -> StoreResult<Vec<(BatchRecord, Shelf)>> {
        (0..count).map(|i| self.record(i, count)).collect()
    }
}

fn demo_code(raw: &str) -> StoreResult<BatchCode> {
    BatchCode::parse(raw).map_err(|e| StoreError::Internal(e.to_string()))
}

/// Fixed demo batches used in walkthroughs and tests
pub fn demo_records(today: NaiveDate) -> StoreResult<Vec<BatchRecord>> {
    let valid = BatchRecord::new(
        demo_code(DEMO_VALID_CODE)?,
        "Paracetamol 500mg",
        "PharmaCorp",
        0.95,
        today + Duration::days(540),
    )
    .with_manufacturing_date(today - Duration::days(180))
    .with_scan_count(2)
    .with_scan_locations(vec![GeoPoint::new(40.71, -74.0)
        .map_err(|e| StoreError::Internal(e.to_string()))?]);

    let expired = BatchRecord::new(
        demo_code(DEMO_EXPIRED_CODE)?,
        "Amoxicillin 250mg",
        "MedLife Corp",
        0.90,
        today - Duration::days(1),
    )
    .with_manufacturing_date(today - Duration::days(730))
    .with_scan_count(4);

    // One scan per continent-scale cell
    let dispersed = [
        (40.7, -74.0),
        (51.5, -0.1),
        (35.7, 139.7),
        (-33.9, 151.2),
        (19.4, -99.1),
        (-23.5, -46.6),
        (55.8, 37.6),
        (28.6, 77.2),
        (1.3, 103.8),
        (30.0, 31.2),
        (6.5, 3.4),
        (-26.2, 28.0),
    ]
    .iter()
    .map(|(lat, lng)| GeoPoint::new(*lat, *lng))
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| StoreError::Internal(e.to_string()))?;

    let suspicious = BatchRecord::new(
        demo_code(DEMO_SUSPICIOUS_CODE)?,
        "Atorvastatin 20mg",
        "CounterfeitCorp",
        0.32,
        today + Duration::days(120),
    )
    .with_manufacturing_date(today - Duration::days(400))
    .with_scan_count(48)
    .with_scan_locations(dispersed);

    Ok(vec![valid, expired, suspicious])
}

/// Seed a registry; existing codes are skipped
pub async fn seed_registry(
    registry: &dyn BatchRegistry,
    config: SeedConfig,
    today: NaiveDate,
) -> StoreResult<SeedReport> {
    let mut report = SeedReport::default();

    let mut seeder = CatalogueSeeder::new(config.rng_seed, today);
    for (record, shelf) in seeder.generate(config.count)? {
        let code = record.code.clone();
        if registry.insert(record).await? {
            report.inserted += 1;
            match shelf {
                Shelf::Expired => report.expired += 1,
                Shelf::NearExpiry => report.near_expiry += 1,
                Shelf::LongDated => report.long_dated += 1,
            }
        } else {
            debug!(batch_code = %code, "Batch already registered, skipping");
            report.skipped += 1;
        }
    }

    if config.include_demo {
        for record in demo_records(today)? {
            let expired = record.expiry_date < today;
            if registry.insert(record).await? {
                report.inserted += 1;
                if expired {
                    report.expired += 1;
                } else {
                    report.long_dated += 1;
                }
            } else {
                report.skipped += 1;
            }
        }
    }

    info!(
        inserted = report.inserted,
        skipped = report.skipped,
        expired = report.expired,
        "Catalogue seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRegistry;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = CatalogueSeeder::new(7, today()).generate(20).unwrap();
        let b = CatalogueSeeder::new(7, today()).generate(20).unwrap();
        let codes_a: Vec<_> = a.iter().map(|(r, _)| r.code.clone()).collect();
        let codes_b: Vec<_> = b.iter().map(|(r, _)| r.code.clone()).collect();
        assert_eq!(codes_a, codes_b);
    }

    #[test]
    fn test_generated_records_are_well_formed() {
        let records = CatalogueSeeder::new(1, today()).generate(50).unwrap();
        for (record, shelf) in &records {
            let code = record.code.as_str();
            assert_eq!(code.len(), 10);
            assert!(CODE_PREFIXES.iter().any(|p| code.starts_with(p)));
            assert!(record.scan_count <= 15);
            assert!(record.scan_locations.len() as u64 <= record.scan_count);
            assert!((0.0..=1.0).contains(&record.manufacturer_reliability));

            let days = (record.expiry_date - today()).num_days();
            match shelf {
                Shelf::Expired => assert!(days < 0),
                Shelf::NearExpiry => assert!((1..=30).contains(&days)),
                Shelf::LongDated => assert!(days > 30),
            }
        }
        assert_eq!(
            records.iter().filter(|(_, s)| *s == Shelf::Expired).count(),
            5
        );
    }

    #[test]
    fn test_demo_records() {
        let records = demo_records(today()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].code.as_str(), DEMO_VALID_CODE);
        assert!(records[1].expiry_date < today());
        assert!(records[2].scan_locations.len() > 10);
    }

    #[tokio::test]
    async fn test_seed_registry_is_idempotent() {
        let registry = MemoryRegistry::new();
        let config = SeedConfig {
            count: 20,
            ..Default::default()
        };

        let first = seed_registry(&registry, config, today()).await.unwrap();
        let total = registry.count().await.unwrap();
        assert_eq!(first.inserted as u64, total);

        let second = seed_registry(&registry, config, today()).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, first.inserted + first.skipped);
        assert_eq!(registry.count().await.unwrap(), total);

        let demo = BatchCode::parse(DEMO_VALID_CODE).unwrap();
        assert!(registry.lookup(&demo).await.unwrap().is_some());
    }
}
