use crate::checksum::mod97_10;
use crate::error::IbanError;
use crate::national_checksum::NationalChecksumAlgorithm;
use crate::parts::IbanParts;

/// Digit value of each letter 'A'..='Z' in a French RIB.
const RIB_LETTER_VALUES: &[u8; 26] = b"12345678912345678923456789";

const BANK_CODE_LEN: usize = 5;
const BRANCH_CODE_LEN: usize = 5;
const ACCOUNT_NUMBER_LEN: usize = 11;

const BANK_CODE_WEIGHT: u32 = 89;
const BRANCH_CODE_WEIGHT: u32 = 15;
const ACCOUNT_NUMBER_WEIGHT: u32 = 3;

/// The French "clé RIB": `97 - ((89 * bank + 15 * branch + 3 * account) mod 97)`, after
/// letters in the BBAN are replaced by digits. Also used by Monaco.
pub struct FranceNationalChecksum;

fn rib_digits(bban: &str) -> Option<String> {
    bban.chars()
        .map(|c| {
            if c.is_ascii_digit() {
                Some(c)
            } else if c.is_ascii_alphabetic() {
                let index = (c.to_ascii_uppercase() as u8 - b'A') as usize;
                Some(RIB_LETTER_VALUES[index] as char)
            } else {
                None
            }
        })
        .collect()
}

impl NationalChecksumAlgorithm for FranceNationalChecksum {
    fn find(&self, parts: &IbanParts) -> Result<String, IbanError> {
        let malformed = || IbanError::MalformedBban {
            country: parts.country.clone(),
        };

        let digits = rib_digits(&parts.bban).ok_or_else(malformed)?;
        let account_end = BANK_CODE_LEN + BRANCH_CODE_LEN + ACCOUNT_NUMBER_LEN;
        if digits.len() < account_end {
            return Err(malformed());
        }
        let bank = &digits[..BANK_CODE_LEN];
        let branch = &digits[BANK_CODE_LEN..BANK_CODE_LEN + BRANCH_CODE_LEN];
        let account = &digits[BANK_CODE_LEN + BRANCH_CODE_LEN..account_end];

        // An 11-digit account times 3 overflows 32 bits, so reduce each operand first.
        let sum = BANK_CODE_WEIGHT * mod97_10(bank)
            + BRANCH_CODE_WEIGHT * mod97_10(branch)
            + ACCOUNT_NUMBER_WEIGHT * mod97_10(account);
        Ok(format!("{:02}", 97 - sum % 97))
    }
}
