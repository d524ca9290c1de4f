use crate::error::RegistryError;
use crate::stats::GLOBAL_STATS;
use ahash::AHashMap;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

const BUILTIN_REGISTRY_DATA: &str = include_str!("../data/registry.txt");

static BUILTIN_REGISTRY: OnceCell<Arc<CountryRegistry>> = OnceCell::new();

/// Supplies the per-country IBAN metadata. Implementations must be immutable once built.
pub trait RegistryProvider: Send + Sync {
    /// `country` is a 2-letter upper case code.
    fn lookup(&self, country: &str) -> Option<&CountrySpec>;

    /// All registered country codes, sorted.
    fn countries(&self) -> Vec<&str>;
}

/// Inclusive `[start, stop]` character range inside a BBAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOffset {
    pub start: usize,
    pub stop: usize,
}

impl FieldOffset {
    pub fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    fn from_pair(start: Option<usize>, stop: Option<usize>) -> Option<Self> {
        match (start, stop) {
            (Some(start), Some(stop)) => Some(Self { start, stop }),
            _ => None,
        }
    }

    /// Slices the field out of a (machine format) BBAN. A BBAN that is too short yields
    /// whatever part of the field it does contain.
    pub fn slice<'a>(&self, bban: &'a str) -> &'a str {
        let start = self.start.min(bban.len());
        let stop = (self.stop + 1).min(bban.len());
        bban.get(start..stop).unwrap_or("")
    }
}

/// Registry metadata for a single IBAN country.
#[derive(Debug, Clone)]
pub struct CountrySpec {
    pub country: String,
    pub country_name: String,
    pub domestic_example: String,
    pub bban_example: String,
    pub bban_format_swift: String,
    pub bban_format_regex: String,
    pub bban_length: usize,
    pub iban_example: String,
    pub iban_format_swift: String,
    pub iban_format_regex: String,
    pub iban_length: usize,
    pub bank_id_offset: Option<FieldOffset>,
    pub branch_id_offset: Option<FieldOffset>,
    pub national_checksum_offset: Option<FieldOffset>,
    pub registry_edition: String,
    pub sepa: bool,
    pub swift_official: bool,
    pub iana: String,
    pub iso3166: String,
    iban_regex: Regex,
    bban_regex: Regex,
}

impl CountrySpec {
    /// Anchored full match of the IBAN format regex against a machine format IBAN.
    pub fn matches_iban_format(&self, machine_iban: &str) -> bool {
        self.iban_regex.is_match(machine_iban)
    }

    /// Anchored full match of the BBAN format regex.
    pub fn is_valid_bban(&self, bban: &str) -> bool {
        self.bban_regex.is_match(bban)
    }
}

/// One line of the pipe-delimited registry table.
#[derive(Debug, Deserialize)]
struct RegistryRecord {
    country: String,
    country_name: String,
    domestic_example: String,
    bban_example: String,
    bban_format_swift: String,
    bban_format_regex: String,
    bban_length: usize,
    iban_example: String,
    iban_format_swift: String,
    iban_format_regex: String,
    iban_length: usize,
    bban_bankid_start_offset: Option<usize>,
    bban_bankid_stop_offset: Option<usize>,
    bban_branchid_start_offset: Option<usize>,
    bban_branchid_stop_offset: Option<usize>,
    registry_edition: String,
    #[serde(deserialize_with = "deserialize_flag")]
    country_sepa: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    country_swift_official: bool,
    bban_checksum_start_offset: Option<usize>,
    bban_checksum_stop_offset: Option<usize>,
    country_iana: String,
    country_iso3166: String,
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = String::deserialize(deserializer)?;
    match value.trim() {
        "1" | "Y" | "y" => Ok(true),
        "0" | "N" | "n" | "" => Ok(false),
        other => Err(D::Error::custom(format!("expected a 1/0 flag, found {other:?}"))),
    }
}

fn malformed(line: u64, reason: impl ToString) -> RegistryError {
    RegistryError::Malformed {
        line,
        reason: reason.to_string(),
    }
}

fn error_line(err: &csv::Error) -> u64 {
    err.position().map(|p| p.line()).unwrap_or_default()
}

fn compile_anchored(country: &str, pattern: &str) -> Result<Regex, RegistryError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|_| RegistryError::InvalidRegex {
        country: country.to_string(),
        pattern: pattern.to_string(),
    })
}

fn check_offset(
    country: &str,
    field: &'static str,
    offset: Option<FieldOffset>,
    bban_length: usize,
) -> Result<Option<FieldOffset>, RegistryError> {
    match offset {
        Some(o) if o.start > o.stop || o.stop >= bban_length => {
            Err(RegistryError::OffsetOutOfRange {
                country: country.to_string(),
                field,
            })
        }
        _ => Ok(offset),
    }
}

impl TryFrom<RegistryRecord> for CountrySpec {
    type Error = RegistryError;

    fn try_from(record: RegistryRecord) -> Result<Self, Self::Error> {
        let country = record.country.trim().to_ascii_uppercase();

        if record.iban_length != record.bban_length + 4 {
            return Err(RegistryError::InconsistentLength { country });
        }

        let bank_id_offset = check_offset(
            &country,
            "bank id",
            FieldOffset::from_pair(record.bban_bankid_start_offset, record.bban_bankid_stop_offset),
            record.bban_length,
        )?;
        let branch_id_offset = check_offset(
            &country,
            "branch id",
            FieldOffset::from_pair(
                record.bban_branchid_start_offset,
                record.bban_branchid_stop_offset,
            ),
            record.bban_length,
        )?;
        let national_checksum_offset = check_offset(
            &country,
            "national checksum",
            FieldOffset::from_pair(
                record.bban_checksum_start_offset,
                record.bban_checksum_stop_offset,
            ),
            record.bban_length,
        )?;

        Ok(CountrySpec {
            iban_regex: compile_anchored(&country, &record.iban_format_regex)?,
            bban_regex: compile_anchored(&country, &record.bban_format_regex)?,
            country,
            country_name: record.country_name,
            domestic_example: record.domestic_example,
            bban_example: record.bban_example,
            bban_format_swift: record.bban_format_swift,
            bban_format_regex: record.bban_format_regex,
            bban_length: record.bban_length,
            iban_example: record.iban_example,
            iban_format_swift: record.iban_format_swift,
            iban_format_regex: record.iban_format_regex,
            iban_length: record.iban_length,
            bank_id_offset,
            branch_id_offset,
            national_checksum_offset,
            registry_edition: record.registry_edition,
            sepa: record.country_sepa,
            swift_official: record.country_swift_official,
            iana: record.country_iana,
            iso3166: record.country_iso3166,
        })
    }
}

/// The country registry, keyed by upper case country code.
#[derive(Debug, Clone, Default)]
pub struct CountryRegistry {
    countries: AHashMap<String, CountrySpec>,
}

impl CountryRegistry {
    /// Builds a registry from already assembled specs.
    pub fn from_specs(specs: impl IntoIterator<Item = CountrySpec>) -> Result<Self, RegistryError> {
        let mut countries = AHashMap::new();
        for spec in specs {
            if countries.contains_key(&spec.country) {
                return Err(RegistryError::DuplicateCountry(spec.country));
            }
            countries.insert(spec.country.clone(), spec);
        }
        if countries.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(Self { countries })
    }

    /// Parses the pipe-delimited registry table. The first line must be the header naming
    /// every column.
    pub fn from_registry_text(text: &str) -> Result<Self, RegistryError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .quoting(false)
            .has_headers(true)
            .trim(csv::Trim::Fields)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|err| malformed(error_line(&err), err))?
            .clone();

        let mut specs = vec![];
        for record in reader.records() {
            let record = record.map_err(|err| malformed(error_line(&err), err))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let record: RegistryRecord = record
                .deserialize(Some(&headers))
                .map_err(|err| malformed(line, err))?;
            if record.country.trim().len() != 2 {
                return Err(malformed(
                    line,
                    format!("{:?} is not a 2-letter country code", record.country),
                ));
            }
            specs.push(CountrySpec::try_from(record)?);
        }

        let registry = Self::from_specs(specs)?;
        GLOBAL_STATS.registry_loads.increment(1);
        Ok(registry)
    }

    /// The registry bundled with this crate. Parsed once per process, later calls share it.
    pub fn builtin() -> Result<Arc<CountryRegistry>, RegistryError> {
        BUILTIN_REGISTRY
            .get_or_try_init(|| Self::from_registry_text(BUILTIN_REGISTRY_DATA).map(Arc::new))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl RegistryProvider for CountryRegistry {
    fn lookup(&self, country: &str) -> Option<&CountrySpec> {
        self.countries.get(country)
    }

    fn countries(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.countries.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}
