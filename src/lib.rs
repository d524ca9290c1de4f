// This blocks accidental use of `println`. If one is actually needed, you can
// override with `#[allow(clippy::print_stdout)]`.
#![deny(clippy::print_stdout)]

mod checksum;
mod config;
mod engine;
mod error;
mod mistranscription;
mod national_checksum;
mod normalization;
mod observability;
mod parts;
mod registry;
mod stats;
mod suggestion;

// This is the public API of the IBAN core library
pub use checksum::{find_checksum, mod97_10, numeral_representation, set_checksum, verify_checksum};
pub use config::EngineConfig;
pub use engine::{IbanEngine, IbanEngineBuilder};
pub use error::{DataUnavailable, IbanError, MistranscriptionError, RegistryError};
pub use mistranscription::{ConfusionMap, MistranscriptionProvider};
pub use national_checksum::{
    BelgiumNationalChecksum, FranceNationalChecksum, NationalChecksum, NationalChecksumAlgorithm,
    NationalChecksumRegistry, SpainNationalChecksum,
};
pub use normalization::{to_machine_format, HUMAN_FORMAT_GROUP_SIZE};
pub use observability::labels::Labels;
pub use parts::IbanParts;
pub use registry::{CountryRegistry, CountrySpec, FieldOffset, RegistryProvider};
