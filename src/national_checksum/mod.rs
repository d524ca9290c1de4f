mod belgium;
mod france;
mod spain;

pub use crate::national_checksum::belgium::BelgiumNationalChecksum;
pub use crate::national_checksum::france::FranceNationalChecksum;
pub use crate::national_checksum::spain::SpainNationalChecksum;

use crate::checksum::set_machine_checksum;
use crate::error::IbanError;
use crate::parts::{splice_national_checksum, IbanParts};
use crate::registry::CountrySpec;
use ahash::AHashMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of a national checksum operation. `Unimplemented` means "cannot be checked", which
/// is neither valid nor invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NationalChecksum<T> {
    Implemented(T),
    Unimplemented,
}

impl<T> NationalChecksum<T> {
    pub fn is_implemented(&self) -> bool {
        matches!(self, NationalChecksum::Implemented(_))
    }

    pub fn implemented(self) -> Option<T> {
        match self {
            NationalChecksum::Implemented(value) => Some(value),
            NationalChecksum::Unimplemented => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> NationalChecksum<U> {
        match self {
            NationalChecksum::Implemented(value) => NationalChecksum::Implemented(f(value)),
            NationalChecksum::Unimplemented => NationalChecksum::Unimplemented,
        }
    }
}

/// A country's domestic checksum scheme. `find` is the source of truth; `verify` and `set`
/// derive from it unless a country needs otherwise (e.g. a scheme without a dedicated field).
pub trait NationalChecksumAlgorithm: Send + Sync {
    /// Computes the national checksum the IBAN should carry.
    fn find(&self, parts: &IbanParts) -> Result<String, IbanError>;

    fn verify(&self, parts: &IbanParts) -> Result<bool, IbanError> {
        Ok(self.find(parts)? == parts.national_checksum)
    }

    /// Returns the machine format IBAN with its national checksum field overwritten. The
    /// international checksum is not updated here.
    fn set(
        &self,
        machine_iban: &str,
        spec: &CountrySpec,
        parts: &IbanParts,
    ) -> Result<String, IbanError> {
        let national_checksum = self.find(parts)?;
        splice_national_checksum(machine_iban, spec, &national_checksum)
            .ok_or_else(|| IbanError::MissingNationalChecksumField(spec.country.clone()))
    }
}

/// Maps country codes to their national checksum algorithm.
#[derive(Clone)]
pub struct NationalChecksumRegistry {
    algorithms: AHashMap<String, Arc<dyn NationalChecksumAlgorithm>>,
}

impl NationalChecksumRegistry {
    pub fn empty() -> Self {
        Self {
            algorithms: AHashMap::new(),
        }
    }

    /// Registers (or replaces) the algorithm for a country. Returns the replaced algorithm.
    pub fn register(
        &mut self,
        country: &str,
        algorithm: Arc<dyn NationalChecksumAlgorithm>,
    ) -> Option<Arc<dyn NationalChecksumAlgorithm>> {
        self.algorithms
            .insert(country.to_ascii_uppercase(), algorithm)
    }

    pub fn get(&self, country: &str) -> Option<&dyn NationalChecksumAlgorithm> {
        self.algorithms.get(country).map(|algorithm| algorithm.as_ref())
    }

    /// Countries with an algorithm, sorted.
    pub fn countries(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.algorithms.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    // The three operations below expect an IBAN whose country and length were already
    // checked against `spec`.

    pub(crate) fn find(
        &self,
        machine_iban: &str,
        spec: &CountrySpec,
    ) -> Result<NationalChecksum<String>, IbanError> {
        match self.get(&spec.country) {
            Some(algorithm) => algorithm
                .find(&IbanParts::extract(machine_iban, spec))
                .map(NationalChecksum::Implemented),
            None => Ok(NationalChecksum::Unimplemented),
        }
    }

    pub(crate) fn verify(
        &self,
        machine_iban: &str,
        spec: &CountrySpec,
    ) -> Result<NationalChecksum<bool>, IbanError> {
        match self.get(&spec.country) {
            Some(algorithm) => algorithm
                .verify(&IbanParts::extract(machine_iban, spec))
                .map(NationalChecksum::Implemented),
            None => Ok(NationalChecksum::Unimplemented),
        }
    }

    /// Fixes the national checksum, then the international one (which the edit invalidates).
    pub(crate) fn set(
        &self,
        machine_iban: &str,
        spec: &CountrySpec,
    ) -> Result<NationalChecksum<String>, IbanError> {
        match self.get(&spec.country) {
            Some(algorithm) => {
                let parts = IbanParts::extract(machine_iban, spec);
                let fixed = algorithm.set(machine_iban, spec, &parts)?;
                Ok(NationalChecksum::Implemented(set_machine_checksum(&fixed)))
            }
            None => Ok(NationalChecksum::Unimplemented),
        }
    }
}

impl Default for NationalChecksumRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("BE", Arc::new(BelgiumNationalChecksum));
        registry.register("ES", Arc::new(SpainNationalChecksum));
        registry.register("FR", Arc::new(FranceNationalChecksum));
        // Monaco uses the French RIB key
        registry.register("MC", Arc::new(FranceNationalChecksum));
        registry
    }
}

impl fmt::Debug for NationalChecksumRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NationalChecksumRegistry")
            .field("countries", &self.countries())
            .finish()
    }
}

/// Parses a run of ASCII digits into their values.
fn ascii_digits(text: &str, country: &str) -> Result<Vec<u32>, IbanError> {
    text.chars()
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<u32>>>()
        .ok_or_else(|| IbanError::MalformedBban {
            country: country.to_string(),
        })
}
