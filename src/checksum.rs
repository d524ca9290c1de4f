//! ISO 7064 MOD97-10, the checksum protecting every IBAN.

use crate::normalization::to_machine_format;

/// The intermediate value of [mod97_10] never grows past this many decimal digits, so it
/// always fits in a `u32` no matter how long the numeral is.
const MAX_CHUNK_DIGITS: usize = 9;

const IBAN_CHECKSUM_MODULUS: u32 = 97;
const VALID_REMAINDER: u32 = 1;

/// Replaces every letter with its two-digit value ('A' = 10 ... 'Z' = 35). Digits are kept,
/// anything else is dropped.
pub fn numeral_representation(text: &str) -> String {
    let mut numeral = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if c.is_ascii_digit() {
            numeral.push(c);
        } else if c.is_ascii_alphabetic() {
            if let Some(value) = c.to_digit(36) {
                numeral.push_str(&value.to_string());
            }
        }
    }
    numeral
}

/// Computes `numeral mod 97` over a decimal string of any length.
///
/// The remainder is carried over in chunks: each round prepends the previous remainder to as
/// many new digits as keep the total at [MAX_CHUNK_DIGITS] digits. Non-digit characters are skipped.
pub fn mod97_10(numeral: &str) -> u32 {
    let digits: Vec<u32> = numeral.chars().filter_map(|c| c.to_digit(10)).collect();

    let mut rest = 0u32;
    let mut rest_len = 0usize;
    let mut position = 0usize;
    while position < digits.len() {
        let take = (MAX_CHUNK_DIGITS - rest_len).min(digits.len() - position);
        let value = digits[position..position + take]
            .iter()
            .fold(rest, |acc, digit| acc * 10 + digit);
        rest = value % IBAN_CHECKSUM_MODULUS;
        rest_len = decimal_len(rest);
        position += take;
    }
    rest
}

/// Number of digits of the unpadded decimal form of `value` ("0" counts as one digit).
#[inline]
fn decimal_len(value: u32) -> usize {
    let mut len = 1;
    let mut num = value / 10;
    while num > 0 {
        len += 1;
        num /= 10;
    }
    len
}

/// Moves the country code and checksum (first 4 characters) to the end.
fn rearrange(machine_iban: &str, checksum: &str) -> String {
    let country = machine_iban.get(..2).unwrap_or(machine_iban);
    let bban = machine_iban.get(4..).unwrap_or("");
    format!("{bban}{country}{checksum}")
}

pub(crate) fn verify_machine_checksum(machine_iban: &str) -> bool {
    let Some(checksum) = machine_iban.get(2..4) else {
        return false;
    };
    let rearranged = rearrange(machine_iban, checksum);
    mod97_10(&numeral_representation(&rearranged)) == VALID_REMAINDER
}

pub(crate) fn find_machine_checksum(machine_iban: &str) -> String {
    let rearranged = rearrange(machine_iban, "00");
    let remainder = mod97_10(&numeral_representation(&rearranged));
    // A remainder is at most 96, so the check digits are always within 02..=98.
    format!("{:02}", 98 - remainder)
}

pub(crate) fn set_machine_checksum(machine_iban: &str) -> String {
    let country = machine_iban.get(..2).unwrap_or(machine_iban);
    let bban = machine_iban.get(4..).unwrap_or("");
    format!("{country}{}{bban}", find_machine_checksum(machine_iban))
}

/// Checks the MOD97-10 checksum of an IBAN in any printed form.
pub fn verify_checksum(iban: &str) -> bool {
    verify_machine_checksum(&to_machine_format(iban))
}

/// Returns the two check digits the IBAN should carry.
pub fn find_checksum(iban: &str) -> String {
    find_machine_checksum(&to_machine_format(iban))
}

/// Returns the IBAN in machine format with its check digits replaced by the correct ones.
pub fn set_checksum(iban: &str) -> String {
    set_machine_checksum(&to_machine_format(iban))
}
