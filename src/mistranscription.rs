use crate::error::MistranscriptionError;
use crate::stats::GLOBAL_STATS;
use ahash::AHashMap;
use nom::character::complete::{char, satisfy, space0};
use nom::combinator::eof;
use nom::multi::separated_list1;
use nom::sequence::{delimited, tuple};
use nom::IResult;
use once_cell::sync::OnceCell;
use std::sync::Arc;

const BUILTIN_MISTRANSCRIPTION_DATA: &str = include_str!("../data/mistranscriptions.txt");

/// Every character that can appear in a machine format IBAN.
const IBAN_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const ENTRY_PREFIX: &str = "c-";

static BUILTIN_CONFUSION_MAP: OnceCell<Arc<ConfusionMap>> = OnceCell::new();

/// Supplies, per character, the characters a human commonly writes instead of it.
pub trait MistranscriptionProvider: Send + Sync {
    /// Characters commonly confused with `character`, most likely first. Unknown characters
    /// have no confusions.
    fn confusions_for(&self, character: char) -> &[char];
}

/// The confusion relation over the 36 IBAN characters.
#[derive(Debug, Clone, Default)]
pub struct ConfusionMap {
    confusions: AHashMap<char, Vec<char>>,
}

impl ConfusionMap {
    /// Builds the map from `(character, confusions)` entries. Keys and confusions are upper-cased,
    /// a character is never listed as a confusion of itself, and every IBAN character must
    /// have an entry.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (char, Vec<char>)>,
    ) -> Result<Self, MistranscriptionError> {
        let mut confusions: AHashMap<char, Vec<char>> = AHashMap::new();
        for (character, candidates) in entries {
            let character = character.to_ascii_uppercase();
            let mut ordered: Vec<char> = Vec::with_capacity(candidates.len());
            for candidate in candidates.into_iter().map(|c| c.to_ascii_uppercase()) {
                if candidate != character && !ordered.contains(&candidate) {
                    ordered.push(candidate);
                }
            }
            // a later entry for the same character replaces the earlier one
            confusions.insert(character, ordered);
        }

        let missing: Vec<char> = IBAN_ALPHABET
            .chars()
            .filter(|c| !confusions.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(MistranscriptionError::Incomplete { missing });
        }
        Ok(Self { confusions })
    }

    /// Parses the `c-<x> = "A" / "B" / ...` table format. Lines that do not start with `c-`
    /// (after leading spaces) are commentary and skipped.
    pub fn parse(text: &str) -> Result<Self, MistranscriptionError> {
        let mut entries = vec![];
        for (index, line) in text.lines().enumerate() {
            if !line.trim_start().starts_with(ENTRY_PREFIX) {
                continue;
            }
            let (_, entry) =
                entry_line(line).map_err(|_| MistranscriptionError::InvalidLine { line: index + 1 })?;
            entries.push(entry);
        }
        let map = Self::from_entries(entries)?;
        GLOBAL_STATS.mistranscription_loads.increment(1);
        Ok(map)
    }

    /// The table bundled with this crate. Parsed once per process, later calls share it.
    pub fn builtin() -> Result<Arc<ConfusionMap>, MistranscriptionError> {
        BUILTIN_CONFUSION_MAP
            .get_or_try_init(|| Self::parse(BUILTIN_MISTRANSCRIPTION_DATA).map(Arc::new))
            .cloned()
    }
}

impl MistranscriptionProvider for ConfusionMap {
    fn confusions_for(&self, character: char) -> &[char] {
        self.confusions
            .get(&character.to_ascii_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn iban_char(input: &str) -> IResult<&str, char> {
    satisfy(|c| c.is_ascii_alphanumeric())(input)
}

fn quoted_char(input: &str) -> IResult<&str, char> {
    delimited(char('"'), iban_char, char('"'))(input)
}

fn separator(input: &str) -> IResult<&str, char> {
    delimited(space0, char('/'), space0)(input)
}

// ` c-0 = "O" / "Q" / "D"`
fn entry_line(input: &str) -> IResult<&str, (char, Vec<char>)> {
    let (input, (_, _, _, character, _, _, _)) = tuple((
        space0,
        char('c'),
        char('-'),
        iban_char,
        space0,
        char('='),
        space0,
    ))(input)?;
    let (input, candidates) = separated_list1(separator, quoted_char)(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = eof(input)?;
    Ok((input, (character, candidates)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_entry_line() {
        assert_eq!(
            entry_line(r#" c-0 = "O" / "Q" / "D""#).unwrap().1,
            ('0', vec!['O', 'Q', 'D'])
        );
        assert_eq!(entry_line(r#"c-b="8"/"3""#).unwrap().1, ('b', vec!['8', '3']));
        assert_eq!(entry_line(r#"  c-j = "I"   "#).unwrap().1, ('j', vec!['I']));
    }

    #[test]
    fn test_parse_rejects_malformed_entries() {
        let invalid_lines = vec![
            r#"c-0 ="#,
            r#"c-0 = O / Q"#,
            r#"c-0 = "O" "Q""#,
            r#"c-0 = "OQ""#,
            r#"c-% = "O""#,
            r#"c-0 = "O" / "Q" trailing"#,
        ];
        for line in invalid_lines {
            assert!(entry_line(line).is_err(), "line: {line:?}");
        }
    }

    #[test]
    fn test_builtin_table_is_complete_and_symmetric() {
        let map = ConfusionMap::builtin().unwrap();
        for character in IBAN_ALPHABET.chars() {
            let confusions = map.confusions_for(character);
            assert!(!confusions.is_empty(), "{character}");
            for confused in confusions {
                assert!(
                    map.confusions_for(*confused).contains(&character),
                    "{character} -> {confused} is not symmetric"
                );
            }
        }
    }

    #[test]
    fn test_builtin_table_is_shared() {
        let first = ConfusionMap::builtin().unwrap();
        let second = ConfusionMap::builtin().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let map = ConfusionMap::builtin().unwrap();
        assert_eq!(map.confusions_for('o'), map.confusions_for('O'));
        assert!(map.confusions_for('O').contains(&'0'));
        assert!(map.confusions_for(' ').is_empty());
        assert!(map.confusions_for('-').is_empty());
    }

    #[test]
    fn test_parse_reports_line_number() {
        let text = "# comment\n\n c-0 = \"O\"\n c-1 = I\n";
        assert_eq!(
            ConfusionMap::parse(text).unwrap_err(),
            MistranscriptionError::InvalidLine { line: 4 }
        );
    }

    #[test]
    fn test_incomplete_table() {
        let text = " c-0 = \"O\"\n c-o = \"0\"\n";
        match ConfusionMap::parse(text).unwrap_err() {
            MistranscriptionError::Incomplete { missing } => {
                assert_eq!(missing.len(), 34);
                assert!(!missing.contains(&'0'));
                assert!(!missing.contains(&'O'));
            }
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn test_entries_are_normalized() {
        let mut entries: Vec<(char, Vec<char>)> = IBAN_ALPHABET
            .chars()
            .map(|c| (c, vec!['0']))
            .collect();
        entries.push(('l', vec!['1', 'i', 'I', 'l', '1']));
        let map = ConfusionMap::from_entries(entries).unwrap();
        assert_eq!(map.confusions_for('L'), &['1', 'I']);
        // never a confusion of itself
        assert!(map.confusions_for('0').is_empty());
    }
}
