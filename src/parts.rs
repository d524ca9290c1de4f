use crate::registry::CountrySpec;
use serde::{Deserialize, Serialize};

/// The semantic fields of an IBAN. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbanParts {
    pub country: String,
    pub checksum: String,
    pub bban: String,
    pub bank: String,
    pub branch: String,
    pub account: String,
    pub national_checksum: String,
}

impl IbanParts {
    /// Splits a machine format IBAN using the offsets of its country. Fields whose offsets
    /// the country does not declare are empty.
    pub fn extract(machine_iban: &str, spec: &CountrySpec) -> Self {
        IbanParts {
            country: country_part(machine_iban).to_string(),
            checksum: checksum_part(machine_iban).to_string(),
            bban: bban_part(machine_iban).to_string(),
            bank: bank_part(machine_iban, spec).to_string(),
            branch: branch_part(machine_iban, spec).to_string(),
            account: account_part(machine_iban, spec).to_string(),
            national_checksum: national_checksum_part(machine_iban, spec).to_string(),
        }
    }
}

// A machine format IBAN is ASCII only, so byte offsets are character offsets. Every slice
// clamps to the input so a truncated IBAN never panics.

fn clamped(text: &str, start: usize, end: usize) -> &str {
    let start = start.min(text.len());
    let end = end.clamp(start, text.len());
    text.get(start..end).unwrap_or("")
}

pub(crate) fn country_part(machine_iban: &str) -> &str {
    clamped(machine_iban, 0, 2)
}

pub(crate) fn checksum_part(machine_iban: &str) -> &str {
    clamped(machine_iban, 2, 4)
}

pub(crate) fn bban_part(machine_iban: &str) -> &str {
    clamped(machine_iban, 4, machine_iban.len())
}

pub(crate) fn bank_part<'a>(machine_iban: &'a str, spec: &CountrySpec) -> &'a str {
    spec.bank_id_offset
        .map(|offset| offset.slice(bban_part(machine_iban)))
        .unwrap_or("")
}

pub(crate) fn branch_part<'a>(machine_iban: &'a str, spec: &CountrySpec) -> &'a str {
    spec.branch_id_offset
        .map(|offset| offset.slice(bban_part(machine_iban)))
        .unwrap_or("")
}

/// Everything after the branch id, or after the bank id when there is no branch id.
pub(crate) fn account_part<'a>(machine_iban: &'a str, spec: &CountrySpec) -> &'a str {
    let bban = bban_part(machine_iban);
    spec.branch_id_offset
        .or(spec.bank_id_offset)
        .map(|offset| clamped(bban, offset.stop + 1, bban.len()))
        .unwrap_or("")
}

pub(crate) fn national_checksum_part<'a>(machine_iban: &'a str, spec: &CountrySpec) -> &'a str {
    spec.national_checksum_offset
        .map(|offset| offset.slice(bban_part(machine_iban)))
        .unwrap_or("")
}

/// Overwrites the national checksum field of a machine format IBAN. The international
/// checksum is left untouched. Returns `None` when the country declares no such field.
pub(crate) fn splice_national_checksum(
    machine_iban: &str,
    spec: &CountrySpec,
    national_checksum: &str,
) -> Option<String> {
    let offset = spec.national_checksum_offset?;
    let bban = bban_part(machine_iban);
    Some(format!(
        "{}{}{}{}",
        clamped(machine_iban, 0, 4),
        clamped(bban, 0, offset.start),
        national_checksum,
        clamped(bban, offset.stop + 1, bban.len())
    ))
}
