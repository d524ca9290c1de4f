/// Number of characters per group when an IBAN is printed for humans.
pub const HUMAN_FORMAT_GROUP_SIZE: usize = 4;

// Longest prefix first, so "IIBAN" is never left as a stray "I".
const IBAN_PREFIXES: [&str; 2] = ["IIBAN", "IBAN"];

/// Converts any printed form of an IBAN ("IBAN gb82 west 1234...", "GB82-WEST-...")
/// into its machine form: upper case ASCII letters and digits only.
///
/// This never fails. Garbage in gives a machine string that verification will reject.
pub fn to_machine_format(raw: &str) -> String {
    let upper = raw.to_ascii_uppercase();
    let trimmed = upper.trim_start();
    let without_prefix = IBAN_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);

    without_prefix
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Inserts a space every [HUMAN_FORMAT_GROUP_SIZE] characters. The input must already be
/// in machine format (ASCII only).
pub(crate) fn group_for_humans(machine_iban: &str) -> String {
    machine_iban
        .as_bytes()
        .chunks(HUMAN_FORMAT_GROUP_SIZE)
        .map(|group| String::from_utf8_lossy(group))
        .collect::<Vec<_>>()
        .join(" ")
}
