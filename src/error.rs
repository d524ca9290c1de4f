use thiserror::Error;

/// The country registry could not be assembled from its source data.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum RegistryError {
    #[error("Registry line {line} is malformed: {reason}")]
    Malformed { line: u64, reason: String },

    #[error("Country {country} declares an invalid regex: {pattern}")]
    InvalidRegex { country: String, pattern: String },

    #[error("Country {country} declares a {field} offset outside of its BBAN")]
    OffsetOutOfRange {
        country: String,
        field: &'static str,
    },

    #[error("Country {country} declares inconsistent IBAN/BBAN lengths")]
    InconsistentLength { country: String },

    #[error("Country {0} appears more than once in the registry")]
    DuplicateCountry(String),

    #[error("The registry does not contain any country")]
    Empty,
}

/// The mistranscription table could not be assembled from its source data.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum MistranscriptionError {
    #[error("Mistranscription line {line} could not be parsed")]
    InvalidLine { line: usize },

    #[error("Mistranscription table has no entry for {missing:?}")]
    Incomplete { missing: Vec<char> },
}

/// A data provider failed to supply its table. This is a deployment problem, never a bad IBAN.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum DataUnavailable {
    #[error("IBAN registry unavailable: {0}")]
    Registry(#[from] RegistryError),

    #[error("Mistranscription table unavailable: {0}")]
    Mistranscriptions(#[from] MistranscriptionError),
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum IbanError {
    #[error("Country {0:?} is not present in the IBAN registry")]
    UnknownCountry(String),

    #[error("IBAN for {country} must have {expected} characters, found {actual}")]
    InvalidLength {
        country: String,
        expected: usize,
        actual: usize,
    },

    #[error("The input is not a valid IBAN")]
    InvalidIban,

    #[error("Input of {0} characters is too short or too long to be an IBAN")]
    ImplausibleLength(usize),

    #[error("The BBAN of this {country} IBAN contains characters the national checksum cannot use")]
    MalformedBban { country: String },

    #[error("Country {0} has no national checksum field")]
    MissingNationalChecksumField(String),

    #[error(transparent)]
    DataUnavailable(#[from] DataUnavailable),
}
