use afl::fuzz;
use dd_iban::{IbanEngine, IbanError};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg(not(feature = "manual_test"))]
fn main() {
    let engine = IbanEngine::new().unwrap();
    fuzz!(|data: &[u8]| {
        run_raw_fuzz(&engine, data);
    });
}

#[cfg(feature = "manual_test")]
fn main() {
    use std::io::{stdin, Read};

    let engine = IbanEngine::new().unwrap();
    let mut input = vec![];
    stdin().read_to_end(&mut input).unwrap();
    run_raw_fuzz(&engine, &input);
}

fn split_bytes_once(input: &[u8]) -> Option<(&[u8], &[u8])> {
    let i = input.iter().position(|b| *b == b',')?;
    Some((&input[0..i], &input[i + 1..]))
}

fn run_raw_fuzz(engine: &IbanEngine, bytes: &[u8]) -> Option<()> {
    let (input, rand_seed) = split_bytes_once(bytes)?;
    let input_str = std::str::from_utf8(input).ok()?;

    let mut rng_seed: u64 = 0;
    for byte in rand_seed.iter().take(8) {
        rng_seed <<= 8;
        rng_seed += *byte as u64;
    }

    let rng = StdRng::seed_from_u64(rng_seed);
    run_fuzz(engine, input_str, rng);

    Some(())
}

/// Randomly spaces out a machine format IBAN the way a human would print it.
fn gen_printed_form(machine: &str, rng: &mut StdRng) -> String {
    let mut printed = String::new();
    // a machine form starting with "IBAN" or "IIBAN" would lose those letters without
    // a prefix in front of it
    if machine.starts_with('I') || rng.gen_bool(0.2) {
        printed.push_str("IBAN ");
    }
    for (i, c) in machine.chars().enumerate() {
        if i > 0 && rng.gen_bool(0.2) {
            printed.push(' ');
        }
        if rng.gen_bool(0.5) {
            printed.push(c.to_ascii_lowercase());
        } else {
            printed.push(c);
        }
    }
    printed
}

fn run_fuzz(engine: &IbanEngine, input: &str, mut rng: StdRng) {
    let machine = engine.to_machine_format(input);
    let printed = gen_printed_form(&machine, &mut rng);

    #[cfg(feature = "manual_test")]
    {
        println!("Input: {:?}", input);
        println!("Printed form: {:?}", printed);
    }

    let valid = engine.verify(input);

    // printing must never change validity
    assert_eq!(engine.to_machine_format(&printed), machine);
    assert_eq!(engine.verify(&printed), valid);

    if valid {
        assert_eq!(engine.set_checksum(input), machine);
        let human = engine.to_human_format(input).unwrap();
        assert_eq!(engine.to_machine_format(&human), machine);
    }

    if machine.len() >= 4 {
        assert!(engine.verify_checksum(&engine.set_checksum(&machine)));
    }

    let _ = engine.get_parts(input);
    for outcome in [
        engine.verify_national_checksum(input).map(|_| ()),
        engine.find_national_checksum(input).map(|_| ()),
        engine.set_national_checksum(input).map(|_| ()),
    ] {
        assert!(!matches!(outcome, Err(IbanError::DataUnavailable(_))));
    }

    if let Ok(suggestions) = engine.suggest_corrections(input) {
        for suggestion in suggestions {
            assert!(engine.verify(&suggestion));
        }
    }

    // compare validity with an independent implementation
    #[cfg(feature = "differential")]
    {
        use iban::IbanLike;

        if let Ok(iban) = machine.parse::<iban::Iban>() {
            if engine.country(iban.country_code()).is_some() {
                assert!(valid, "{machine}");
            }
        }
    }
}
