use crate::error::IbanError;
use crate::national_checksum::{ascii_digits, NationalChecksumAlgorithm};
use crate::parts::IbanParts;

const SPAIN_WEIGHTS: [u32; 10] = [1, 2, 4, 8, 5, 10, 9, 7, 3, 6];
const SPAIN_CHECK_DIGITS: usize = 2;

/// Spanish "dígitos de control": one MOD11 digit over "00" + bank + branch, one over the
/// account number. Both are written into the two characters following the branch.
pub struct SpainNationalChecksum;

fn mod11_digit(digits: &[u32]) -> Option<u32> {
    if digits.len() != SPAIN_WEIGHTS.len() {
        return None;
    }
    let sum: u32 = digits
        .iter()
        .zip(SPAIN_WEIGHTS.iter())
        .map(|(digit, weight)| digit * weight)
        .sum();
    match 11 - (sum % 11) {
        11 => Some(0),
        10 => Some(1),
        check => Some(check),
    }
}

impl NationalChecksumAlgorithm for SpainNationalChecksum {
    fn find(&self, parts: &IbanParts) -> Result<String, IbanError> {
        let malformed = || IbanError::MalformedBban {
            country: parts.country.clone(),
        };

        let bank_and_branch =
            ascii_digits(&format!("00{}{}", parts.bank, parts.branch), &parts.country)?;
        let account = ascii_digits(
            parts.account.get(SPAIN_CHECK_DIGITS..).unwrap_or(""),
            &parts.country,
        )?;

        let first = mod11_digit(&bank_and_branch).ok_or_else(malformed)?;
        let second = mod11_digit(&account).ok_or_else(malformed)?;
        Ok(format!("{first}{second}"))
    }
}
