use serde_json::json;
use txcode_codebook::{CodeRecord, Codebook, CodewordEntry};
use txcode_core::TxError;

fn actb_records() -> Vec<CodeRecord> {
    vec![
        CodeRecord::new(
            "ACTB_human",
            vec![CodewordEntry::new(0, 3, 1.0), CodewordEntry::new(1, 3, 1.0)],
        ),
        CodeRecord::new(
            "ACTB_mouse",
            vec![CodewordEntry::new(0, 3, 1.0), CodewordEntry::new(1, 1, 1.0)],
        ),
    ]
}

#[test]
fn actb_codebook_places_expected_cells() {
    let codebook = Codebook::from_code_array(&actb_records(), None, None).unwrap();
    assert_eq!(codebook.genes(), &["ACTB_human", "ACTB_mouse"]);
    assert_eq!(codebook.n_rounds(), 2);
    assert_eq!(codebook.n_channels(), 4);
    assert_eq!(codebook.code_length(), 8);

    for round in 0..2 {
        for channel in 0..4 {
            let human = codebook.value("ACTB_human", round, channel).unwrap();
            let expected = if channel == 3 { 1.0 } else { 0.0 };
            assert_eq!(human, expected, "human r{round} c{channel}");
        }
    }
    assert_eq!(codebook.value("ACTB_mouse", 0, 3), Some(1.0));
    assert_eq!(codebook.value("ACTB_mouse", 1, 1), Some(1.0));
    assert_eq!(codebook.value("ACTB_mouse", 1, 3), Some(0.0));
    assert_eq!(codebook.value("ACTB_rat", 0, 0), None);
}

#[test]
fn declared_dimensions_may_exceed_observed_indices() {
    let codebook = Codebook::from_code_array(&actb_records(), Some(4), Some(6)).unwrap();
    assert_eq!(codebook.n_rounds(), 4);
    assert_eq!(codebook.n_channels(), 6);
    assert_eq!(codebook.code_length(), 24);
}

#[test]
fn declared_round_smaller_than_codeword_fails() {
    let err = Codebook::from_code_array(&actb_records(), Some(1), None).unwrap_err();
    match err {
        TxError::Codebook(info) => {
            assert_eq!(info.code, "round-out-of-range");
            assert_eq!(info.context["dimension"], "round");
            assert_eq!(info.context["required"], "2");
            assert_eq!(info.context["declared"], "1");
        }
        other => panic!("unexpected error variant: {:?}", other),
    }

    let err = Codebook::from_code_array(&actb_records(), None, Some(3)).unwrap_err();
    assert_eq!(err.code(), "channel-out-of-range");
}

#[test]
fn records_missing_fields_are_rejected() {
    let value = json!([
        {"codeword": [{"r": 0, "c": 0, "v": 1}], "gene_name": "A"},
        {"codeword": [{"r": 0, "c": 1, "v": 1}]},
    ]);
    let err = Codebook::from_json_value(value, None, None).unwrap_err();
    match err {
        TxError::Codebook(info) => {
            assert_eq!(info.code, "missing-fields");
            assert_eq!(info.context["record"], "1");
            assert_eq!(info.context["missing"], "gene_name");
        }
        other => panic!("unexpected error variant: {:?}", other),
    }

    let err = Codebook::from_json_value(json!([{"gene_name": "A"}]), None, None).unwrap_err();
    assert_eq!(err.info().context["missing"], "codeword");
}

#[test]
fn non_record_entries_are_rejected() {
    let err = Codebook::from_json_value(json!([1, 2]), None, None).unwrap_err();
    assert_eq!(err.code(), "record-not-object");

    let err = Codebook::from_json_value(json!({"gene_name": "A"}), None, None).unwrap_err();
    assert_eq!(err.code(), "codebook-not-array");

    let err = Codebook::from_json_str("[{\"codeword\": 3, \"gene_name\": \"A\"}]", None, None)
        .unwrap_err();
    assert!(matches!(err, TxError::Serde(ref info) if info.code == "record-malformed"));
}

#[test]
fn codeword_entries_need_round_channel_and_value() {
    let value = json!([{"codeword": [{"r": 0, "c": 1, "v": 1}, {"r": 1, "c": 0}], "gene_name": "A"}]);
    let err = Codebook::from_json_value(value, None, None).unwrap_err();
    match err {
        TxError::Codebook(info) => {
            assert_eq!(info.code, "codeword-entry-incomplete");
            assert_eq!(info.context["record"], "0");
            assert_eq!(info.context["entry"], "1");
            assert_eq!(info.context["missing"], "v");
        }
        other => panic!("unexpected error variant: {:?}", other),
    }

    let value = json!([{"codeword": [{"v": 1}], "gene_name": "A"}]);
    let err = Codebook::from_json_value(value, None, None).unwrap_err();
    assert_eq!(err.info().context["missing"], "r,c");
}

#[test]
fn duplicate_genes_and_negative_values_are_rejected() {
    let mut records = actb_records();
    records[1].gene_name = "ACTB_human".into();
    let err = Codebook::from_code_array(&records, None, None).unwrap_err();
    assert_eq!(err.code(), "duplicate-gene");

    let records = vec![CodeRecord::new("A", vec![CodewordEntry::new(0, 0, -1.0)])];
    let err = Codebook::from_code_array(&records, None, None).unwrap_err();
    assert_eq!(err.code(), "invalid-code-value");
}

#[test]
fn empty_code_array_infers_unit_dimensions() {
    let codebook = Codebook::from_code_array(&[], None, None).unwrap();
    assert_eq!(codebook.n_genes(), 0);
    assert_eq!(codebook.code_length(), 1);

    let codebook = Codebook::from_code_array(&[], Some(3), Some(2)).unwrap();
    assert_eq!(codebook.code_length(), 6);
}
