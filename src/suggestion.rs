use crate::config::EngineConfig;
use crate::error::IbanError;
use crate::mistranscription::MistranscriptionProvider;
use crate::normalization::to_machine_format;
use ahash::AHashSet;

// Position classes of the raw input: the country code only takes letters, the check digits
// only take digits.
const COUNTRY_CODE_END: usize = 2;
const CHECKSUM_END: usize = 4;

fn is_acceptable_at(position: usize, candidate: char) -> bool {
    if position < COUNTRY_CODE_END {
        candidate.is_ascii_alphabetic()
    } else if position < CHECKSUM_END {
        candidate.is_ascii_digit()
    } else {
        true
    }
}

/// Searches for valid IBANs the `incorrect` input may have been transcribed from. Every
/// returned suggestion (machine format) satisfies `is_valid`.
pub(crate) fn suggest(
    incorrect: &str,
    confusions: &dyn MistranscriptionProvider,
    is_valid: impl Fn(&str) -> bool,
    config: &EngineConfig,
) -> Result<Vec<String>, IbanError> {
    let chars: Vec<char> = incorrect.chars().collect();
    if chars.len() < config.min_suggestion_input_length
        || chars.len() > config.max_suggestion_input_length
    {
        return Err(IbanError::ImplausibleLength(chars.len()));
    }

    let mut suggestions = vec![];
    let mut keep_if_valid = |candidate: String| {
        if is_valid(&candidate) {
            suggestions.push(to_machine_format(&candidate));
        }
    };

    // A single character was mistranscribed.
    for (position, &character) in chars.iter().enumerate() {
        for &candidate in confusions.confusions_for(character) {
            if !is_acceptable_at(position, candidate) {
                continue;
            }
            let mut possible = chars.clone();
            possible[position] = candidate;
            keep_if_valid(possible.into_iter().collect());
        }
    }

    // Every occurrence of a repeated character was mistranscribed the same way.
    let mut visited = AHashSet::new();
    for &character in &chars {
        if !visited.insert(character) {
            continue;
        }
        if chars.iter().filter(|&&c| c == character).count() < 2 {
            continue;
        }
        for &candidate in confusions.confusions_for(character) {
            let possible: String = chars
                .iter()
                .map(|&c| if c == character { candidate } else { c })
                .collect();
            keep_if_valid(possible);
        }
    }

    if config.deduplicate_suggestions {
        let mut seen = AHashSet::new();
        suggestions.retain(|suggestion| seen.insert(suggestion.clone()));
    }
    Ok(suggestions)
}
