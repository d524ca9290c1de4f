pub mod metrics;

#[cfg(test)]
mod test;

use crate::checksum::{
    find_machine_checksum, set_machine_checksum, verify_machine_checksum,
};
use crate::config::EngineConfig;
use crate::engine::metrics::EngineMetrics;
use crate::error::{DataUnavailable, IbanError};
use crate::mistranscription::{ConfusionMap, MistranscriptionProvider};
use crate::national_checksum::{
    NationalChecksum, NationalChecksumAlgorithm, NationalChecksumRegistry,
};
use crate::normalization::{group_for_humans, to_machine_format};
use crate::parts::{country_part, IbanParts};
use crate::registry::{CountryRegistry, CountrySpec, RegistryProvider};
use crate::stats::GLOBAL_STATS;
use crate::suggestion::suggest;
use std::sync::Arc;

/// Validates, decomposes and repairs IBANs against an immutable country registry and
/// mistranscription table. Cheap to share between threads.
pub struct IbanEngine {
    registry: Arc<dyn RegistryProvider>,
    mistranscriptions: Arc<dyn MistranscriptionProvider>,
    national_checksums: NationalChecksumRegistry,
    config: EngineConfig,
    metrics: EngineMetrics,
}

impl IbanEngine {
    /// An engine over the bundled registry and mistranscription table.
    pub fn new() -> Result<Self, DataUnavailable> {
        IbanEngineBuilder::new().build()
    }

    pub fn builder() -> IbanEngineBuilder {
        IbanEngineBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Checks length, format and MOD97-10 checksum of an IBAN in any printed form.
    pub fn verify(&self, text: &str) -> bool {
        self.record_verification(self.verify_machine(&to_machine_format(text)))
    }

    /// Same as [IbanEngine::verify], but the input must already be in machine format
    /// (no separators, no "IBAN" prefix, upper case).
    pub fn verify_machine_format(&self, text: &str) -> bool {
        self.record_verification(self.verify_machine(text))
    }

    fn verify_machine(&self, machine_iban: &str) -> bool {
        match self.registry.lookup(country_part(machine_iban)) {
            Some(spec) => {
                machine_iban.len() == spec.iban_length
                    && spec.matches_iban_format(machine_iban)
                    && verify_machine_checksum(machine_iban)
            }
            None => false,
        }
    }

    fn record_verification(&self, valid: bool) -> bool {
        if valid {
            self.metrics.valid.increment(1);
        } else {
            self.metrics.invalid.increment(1);
        }
        valid
    }

    pub fn to_machine_format(&self, text: &str) -> String {
        to_machine_format(text)
    }

    /// Prints a valid IBAN in groups of 4 characters.
    pub fn to_human_format(&self, text: &str) -> Result<String, IbanError> {
        let machine_iban = to_machine_format(text);
        if !self.record_verification(self.verify_machine(&machine_iban)) {
            return Err(IbanError::InvalidIban);
        }
        Ok(group_for_humans(&machine_iban))
    }

    /// Splits an IBAN into its fields. Only the country has to be known; fields of a
    /// truncated IBAN are truncated too.
    pub fn get_parts(&self, text: &str) -> Result<IbanParts, IbanError> {
        let machine_iban = to_machine_format(text);
        let spec = self.lookup_country(&machine_iban)?;
        Ok(IbanParts::extract(&machine_iban, spec))
    }

    pub fn verify_checksum(&self, text: &str) -> bool {
        verify_machine_checksum(&to_machine_format(text))
    }

    pub fn find_checksum(&self, text: &str) -> String {
        find_machine_checksum(&to_machine_format(text))
    }

    pub fn set_checksum(&self, text: &str) -> String {
        set_machine_checksum(&to_machine_format(text))
    }

    pub fn find_national_checksum(
        &self,
        text: &str,
    ) -> Result<NationalChecksum<String>, IbanError> {
        let machine_iban = to_machine_format(text);
        let spec = self.checked_country(&machine_iban)?;
        let outcome = self.national_checksums.find(&machine_iban, spec)?;
        Ok(self.record_national_checksum(outcome))
    }

    pub fn verify_national_checksum(
        &self,
        text: &str,
    ) -> Result<NationalChecksum<bool>, IbanError> {
        let machine_iban = to_machine_format(text);
        let spec = self.checked_country(&machine_iban)?;
        let outcome = self.national_checksums.verify(&machine_iban, spec)?;
        Ok(self.record_national_checksum(outcome))
    }

    /// Returns the IBAN (machine format) with both its national and international
    /// checksums corrected.
    pub fn set_national_checksum(
        &self,
        text: &str,
    ) -> Result<NationalChecksum<String>, IbanError> {
        let machine_iban = to_machine_format(text);
        let spec = self.checked_country(&machine_iban)?;
        let outcome = self.national_checksums.set(&machine_iban, spec)?;
        Ok(self.record_national_checksum(outcome))
    }

    fn record_national_checksum<T>(&self, outcome: NationalChecksum<T>) -> NationalChecksum<T> {
        if !outcome.is_implemented() {
            self.metrics.national_checksum_unimplemented.increment(1);
        }
        outcome
    }

    /// Valid IBANs the input may have been mistyped from, in machine format.
    pub fn suggest_corrections(&self, text: &str) -> Result<Vec<String>, IbanError> {
        let result = suggest(
            text,
            self.mistranscriptions.as_ref(),
            |candidate| self.verify_machine(&to_machine_format(candidate)),
            &self.config,
        );
        match &result {
            Ok(suggestions) => self.metrics.suggestion_count.record(suggestions.len() as f64),
            Err(_) => self.metrics.suggestion_inputs_rejected.increment(1),
        }
        result
    }

    /// Registered country codes, sorted.
    pub fn countries(&self) -> Vec<&str> {
        self.registry.countries()
    }

    pub fn country(&self, code: &str) -> Option<&CountrySpec> {
        self.registry.lookup(&code.to_ascii_uppercase())
    }

    /// Countries with a national checksum algorithm, sorted.
    pub fn national_checksum_countries(&self) -> Vec<&str> {
        self.national_checksums.countries()
    }

    fn lookup_country(&self, machine_iban: &str) -> Result<&CountrySpec, IbanError> {
        let country = country_part(machine_iban);
        self.registry
            .lookup(country)
            .ok_or_else(|| IbanError::UnknownCountry(country.to_string()))
    }

    /// Known country and exact length, the precondition of every national checksum algorithm.
    fn checked_country(&self, machine_iban: &str) -> Result<&CountrySpec, IbanError> {
        let spec = self.lookup_country(machine_iban)?;
        if machine_iban.len() != spec.iban_length {
            return Err(IbanError::InvalidLength {
                country: spec.country.clone(),
                expected: spec.iban_length,
                actual: machine_iban.len(),
            });
        }
        Ok(spec)
    }
}

#[derive(Default)]
pub struct IbanEngineBuilder {
    registry: Option<Arc<dyn RegistryProvider>>,
    mistranscriptions: Option<Arc<dyn MistranscriptionProvider>>,
    national_checksums: NationalChecksumRegistry,
    config: EngineConfig,
}

impl IbanEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses this registry instead of the bundled one.
    pub fn registry(mut self, registry: Arc<dyn RegistryProvider>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Uses this mistranscription table instead of the bundled one.
    pub fn mistranscriptions(mut self, mistranscriptions: Arc<dyn MistranscriptionProvider>) -> Self {
        self.mistranscriptions = Some(mistranscriptions);
        self
    }

    /// Adds (or replaces) the national checksum algorithm of a country.
    pub fn national_checksum(
        mut self,
        country: &str,
        algorithm: Arc<dyn NationalChecksumAlgorithm>,
    ) -> Self {
        self.national_checksums.register(country, algorithm);
        self
    }

    /// Replaces every national checksum registration, including the default ones.
    pub fn national_checksums(mut self, national_checksums: NationalChecksumRegistry) -> Self {
        self.national_checksums = national_checksums;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<IbanEngine, DataUnavailable> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => {
                let builtin: Arc<dyn RegistryProvider> = CountryRegistry::builtin()?;
                builtin
            }
        };
        let mistranscriptions = match self.mistranscriptions {
            Some(mistranscriptions) => mistranscriptions,
            None => {
                let builtin: Arc<dyn MistranscriptionProvider> = ConfusionMap::builtin()?;
                builtin
            }
        };

        GLOBAL_STATS.engine_creations.increment(1);
        Ok(IbanEngine {
            registry,
            mistranscriptions,
            national_checksums: self.national_checksums,
            metrics: EngineMetrics::new(&self.config.labels),
            config: self.config,
        })
    }
}
