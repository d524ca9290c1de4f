use crate::checksum::mod97_10;
use crate::error::IbanError;
use crate::national_checksum::{ascii_digits, NationalChecksumAlgorithm};
use crate::parts::IbanParts;

const BELGIUM_CHECK_DIGITS: usize = 2;

/// Belgian account numbers end with `(first ten digits) mod 97`, where a zero remainder
/// is written as 97.
pub struct BelgiumNationalChecksum;

impl NationalChecksumAlgorithm for BelgiumNationalChecksum {
    fn find(&self, parts: &IbanParts) -> Result<String, IbanError> {
        let protected_len = parts.bban.len().saturating_sub(BELGIUM_CHECK_DIGITS);
        let protected = parts
            .bban
            .get(..protected_len)
            .filter(|protected| !protected.is_empty())
            .ok_or_else(|| IbanError::MalformedBban {
                country: parts.country.clone(),
            })?;
        ascii_digits(protected, &parts.country)?;

        let remainder = match mod97_10(protected) {
            // Belgian account number rule: check digits "00" are never issued, a zero
            // remainder is written as 97.
            0 => 97,
            remainder => remainder,
        };
        Ok(format!("{remainder:02}"))
    }
}
