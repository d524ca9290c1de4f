use super::*;
use crate::config::EngineConfig;
use crate::error::RegistryError;
use crate::observability::labels::Labels;
use crate::parts::IbanParts;
use ::metrics::{Key, Label};
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use metrics_util::CompositeKey;
use metrics_util::MetricKind::{Counter, Histogram};

const VALID_IBANS: &[&str] = &[
    "GB82WEST12345698765432",
    "GB82 WEST 1234 5698 7654 32",
    "IBAN GB82 WEST 1234 5698 7654 32",
    "gb82west12345698765432",
    "DE89370400440532013000",
    "BE68539007547034",
    "ES9121000418450200051332",
    "FR1420041010050500013M02606",
    "IT60X0542811101000000123456",
    "NL91ABNA0417164300",
    "CH9300762011623852957",
];

fn engine() -> IbanEngine {
    IbanEngine::new().unwrap()
}

#[test]
fn test_verify() {
    let engine = engine();
    for iban in VALID_IBANS {
        assert!(engine.verify(iban), "{iban}");
        assert!(engine.verify(&engine.to_machine_format(iban)), "{iban}");
        assert_eq!(engine.set_checksum(iban), engine.to_machine_format(iban));
    }

    // checksum
    assert!(!engine.verify("GB81WEST12345698765432"));
    // length
    assert!(!engine.verify("GB82WEST1234569876543"));
    // format: the GB bank id is 4 letters
    assert!(!engine.verify("GB29123412345698765432"));
    // country
    assert!(!engine.verify("XX82WEST12345698765432"));
    assert!(!engine.verify(""));
    assert!(!engine.verify("IBAN"));
}

#[test]
fn test_verify_machine_format_skips_normalization() {
    let engine = engine();
    assert!(engine.verify_machine_format("GB82WEST12345698765432"));
    assert!(!engine.verify_machine_format("GB82 WEST 1234 5698 7654 32"));
    assert!(!engine.verify_machine_format("IBANGB82WEST12345698765432"));
    assert!(!engine.verify_machine_format("gb82west12345698765432"));
}

#[test]
fn test_human_format() {
    let engine = engine();
    assert_eq!(
        engine.to_human_format("GB82WEST12345698765432").unwrap(),
        "GB82 WEST 1234 5698 7654 32"
    );
    assert_eq!(
        engine.to_human_format("iban be68 5390 0754 7034").unwrap(),
        "BE68 5390 0754 7034"
    );
    for iban in VALID_IBANS {
        let human = engine.to_human_format(iban).unwrap();
        assert_eq!(engine.to_machine_format(&human), engine.to_machine_format(iban));
    }
    assert_eq!(
        engine.to_human_format("GB81WEST12345698765432"),
        Err(IbanError::InvalidIban)
    );
}

#[test]
fn test_repair_international_checksum() {
    let engine = engine();
    let broken = "GB00WEST12345698765432";
    assert!(!engine.verify(broken));
    assert_eq!(engine.find_checksum(broken), "82");
    assert_eq!(engine.set_checksum(broken), "GB82WEST12345698765432");
    assert!(engine.verify(&engine.set_checksum(broken)));
    assert!(engine.verify_checksum("GB82 WEST 1234 5698 7654 32"));
    assert!(!engine.verify_checksum("GB00 WEST 1234 5698 7654 32"));
}

#[test]
fn test_get_parts() {
    let engine = engine();
    assert_eq!(
        engine.get_parts("IBAN GB82 WEST 1234 5698 7654 32").unwrap(),
        IbanParts {
            country: "GB".to_string(),
            checksum: "82".to_string(),
            bban: "WEST12345698765432".to_string(),
            bank: "WEST".to_string(),
            branch: "123456".to_string(),
            account: "98765432".to_string(),
            national_checksum: "".to_string(),
        }
    );
    // an invalid IBAN of a known country still decomposes
    assert_eq!(engine.get_parts("GB00WEST1234").unwrap().bank, "WEST");
    assert_eq!(
        engine.get_parts("XX00WEST1234"),
        Err(IbanError::UnknownCountry("XX".to_string()))
    );
}

#[test]
fn test_national_checksums() {
    let engine = engine();
    assert_eq!(
        engine.find_national_checksum("BE62510007547061"),
        Ok(NationalChecksum::Implemented("61".to_string()))
    );
    assert_eq!(
        engine.verify_national_checksum("BE62 5100 0754 7061"),
        Ok(NationalChecksum::Implemented(true))
    );
    assert_eq!(
        engine.verify_national_checksum("BE06510007547099"),
        Ok(NationalChecksum::Implemented(false))
    );
    let fixed = engine.set_national_checksum("BE06510007547099").unwrap();
    assert_eq!(
        fixed,
        NationalChecksum::Implemented("BE62510007547061".to_string())
    );
    assert!(engine.verify(&fixed.implemented().unwrap()));

    // a valid IBAN whose Belgian check digits should read 97, not 00
    assert!(engine.verify("BE54970000000000"));
    assert_eq!(
        engine.verify_national_checksum("BE54970000000000"),
        Ok(NationalChecksum::Implemented(false))
    );
    assert_eq!(
        engine.find_national_checksum("BE54970000000000"),
        Ok(NationalChecksum::Implemented("97".to_string()))
    );

    assert_eq!(
        engine.verify_national_checksum("ES9121000418450200051332"),
        Ok(NationalChecksum::Implemented(true))
    );
    assert_eq!(
        engine.find_national_checksum("FR1420041010050500013M02606"),
        Ok(NationalChecksum::Implemented("06".to_string()))
    );
}

#[test]
fn test_national_checksum_outcomes_are_distinct() {
    let engine = engine();
    // no algorithm for GB: neither valid nor invalid
    assert_eq!(
        engine.verify_national_checksum("GB82WEST12345698765432"),
        Ok(NationalChecksum::Unimplemented)
    );
    assert_eq!(
        engine.find_national_checksum("GB82WEST12345698765432"),
        Ok(NationalChecksum::Unimplemented)
    );
    assert_eq!(
        engine.set_national_checksum("GB82WEST12345698765432"),
        Ok(NationalChecksum::Unimplemented)
    );
    assert_eq!(
        engine.verify_national_checksum("XX82WEST12345698765432"),
        Err(IbanError::UnknownCountry("XX".to_string()))
    );
    assert_eq!(
        engine.find_national_checksum("BE6251000754706"),
        Err(IbanError::InvalidLength {
            country: "BE".to_string(),
            expected: 16,
            actual: 15,
        })
    );
}

#[test]
fn test_suggest_corrections() {
    let engine = engine();
    assert_eq!(
        engine.suggest_corrections("GB82WEST12345898765432").unwrap(),
        vec!["GB82WEST12345698765432".to_string()]
    );
    for suggestion in engine.suggest_corrections("DE8937O4OO44O532O13OOO").unwrap() {
        assert!(engine.verify(&suggestion));
    }
    assert_eq!(
        engine.suggest_corrections("GB8"),
        Err(IbanError::ImplausibleLength(3))
    );
    assert_eq!(
        engine.suggest_corrections(&"1".repeat(40)),
        Err(IbanError::ImplausibleLength(40))
    );
}

#[test]
fn test_country_lookup() {
    let engine = engine();
    let countries = engine.countries();
    assert_eq!(countries.len(), 89);
    assert!(countries.windows(2).all(|pair| pair[0] < pair[1]));

    let gb = engine.country("gb").unwrap();
    assert_eq!(gb.iban_length, 22);
    assert_eq!(gb.country_name, "United Kingdom");
    assert!(engine.country("XX").is_none());

    assert_eq!(engine.national_checksum_countries(), vec!["BE", "ES", "FR", "MC"]);
}

struct SingleCountry(CountrySpec);

impl RegistryProvider for SingleCountry {
    fn lookup(&self, country: &str) -> Option<&CountrySpec> {
        (country == self.0.country).then_some(&self.0)
    }

    fn countries(&self) -> Vec<&str> {
        vec![self.0.country.as_str()]
    }
}

#[test]
fn test_custom_registry_provider() {
    let belgium = CountryRegistry::builtin()
        .unwrap()
        .lookup("BE")
        .unwrap()
        .clone();
    let engine = IbanEngine::builder()
        .registry(Arc::new(SingleCountry(belgium)))
        .build()
        .unwrap();
    assert!(engine.verify("BE68539007547034"));
    assert!(!engine.verify("GB82WEST12345698765432"));
    assert_eq!(engine.countries(), vec!["BE"]);
}

struct AlwaysZero;

impl NationalChecksumAlgorithm for AlwaysZero {
    fn find(&self, _parts: &IbanParts) -> Result<String, IbanError> {
        Ok("00".to_string())
    }
}

#[test]
fn test_custom_national_checksum() {
    let engine = IbanEngine::builder()
        .national_checksum("pt", Arc::new(AlwaysZero))
        .build()
        .unwrap();
    assert_eq!(
        engine.verify_national_checksum("PT50000201231234567890154"),
        Ok(NationalChecksum::Implemented(false))
    );
    assert_eq!(
        engine.find_national_checksum("PT50000201231234567890154"),
        Ok(NationalChecksum::Implemented("00".to_string()))
    );
    // default registrations are kept
    assert!(engine.national_checksum_countries().contains(&"BE"));

    let without_defaults = IbanEngine::builder()
        .national_checksums(NationalChecksumRegistry::empty())
        .build()
        .unwrap();
    assert_eq!(
        without_defaults.verify_national_checksum("BE68539007547034"),
        Ok(NationalChecksum::Unimplemented)
    );
}

#[test]
fn test_unavailable_data_is_reported() {
    let error = CountryRegistry::from_registry_text(crate::registry::test::HEADER).unwrap_err();
    assert_eq!(error, RegistryError::Empty);

    let unavailable = DataUnavailable::from(error);
    let iban_error = IbanError::from(unavailable.clone());
    assert_eq!(iban_error.to_string(), unavailable.to_string());
    assert_eq!(
        iban_error,
        IbanError::DataUnavailable(DataUnavailable::Registry(RegistryError::Empty))
    );
}

#[test]
fn test_engine_is_shared_between_threads() {
    let engine = Arc::new(engine());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                VALID_IBANS.iter().all(|iban| engine.verify(iban))
                    && engine.suggest_corrections("GB82WEST12345898765432").unwrap().len() == 1
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_engine_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    ::metrics::with_local_recorder(&recorder, || {
        let engine = IbanEngine::builder()
            .config(EngineConfig::new().labels(Labels::new(&[("service", "payments")])))
            .build()
            .unwrap();
        engine.verify("GB82WEST12345698765432");
        engine.verify("BE68539007547034");
        engine.verify("GB81WEST12345698765432");
        engine.verify_national_checksum("GB82WEST12345698765432").unwrap();
        engine.suggest_corrections("GB8").unwrap_err();
        engine.suggest_corrections("GB82WEST12345898765432").unwrap();
    });

    let snapshot = snapshotter.snapshot().into_hashmap();
    let service = Label::new("service", "payments");

    let metric_value = snapshot
        .get(&CompositeKey::new(
            Counter,
            Key::from_parts(
                "iban.verify",
                vec![service.clone(), Label::new("outcome", "valid")],
            ),
        ))
        .expect("metric not found");
    assert_eq!(metric_value, &(None, None, DebugValue::Counter(2)));

    let metric_value = snapshot
        .get(&CompositeKey::new(
            Counter,
            Key::from_parts(
                "iban.verify",
                vec![service.clone(), Label::new("outcome", "invalid")],
            ),
        ))
        .expect("metric not found");
    assert_eq!(metric_value, &(None, None, DebugValue::Counter(1)));

    let metric_value = snapshot
        .get(&CompositeKey::new(
            Counter,
            Key::from_parts("iban.national_checksum.unimplemented", vec![service.clone()]),
        ))
        .expect("metric not found");
    assert_eq!(metric_value, &(None, None, DebugValue::Counter(1)));

    let metric_value = snapshot
        .get(&CompositeKey::new(
            Counter,
            Key::from_parts("iban.suggestions.rejected", vec![service.clone()]),
        ))
        .expect("metric not found");
    assert_eq!(metric_value, &(None, None, DebugValue::Counter(1)));

    let metric_value = snapshot
        .get(&CompositeKey::new(
            Histogram,
            Key::from_parts("iban.suggestions.count", vec![service]),
        ))
        .expect("metric not found");
    match &metric_value.2 {
        DebugValue::Histogram(values) => assert_eq!(values.len(), 1),
        _ => panic!("expected a histogram"),
    }
}
