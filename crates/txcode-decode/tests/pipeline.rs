use std::fs;

use tempfile::tempdir;
use txcode_codebook::{synthetic_one_hot_codebook, Codebook};
use txcode_core::{RngHandle, NO_GENE};
use txcode_decode::{
    gene_counts, DecodeConfig, DecodingStrategy, MatchTieBreak, MetricDecoder, PerRoundMaxDecoder,
};
use txcode_traces::{
    NearestNeighborBuilder, Spot, SpotAttributes, SpotFindingResults, TraceBuildingStrategy,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One spot per gene, placed 20 px apart, bright wherever the code is on.
/// Every `(round, channel)` table lists all spots so exact matching applies.
fn spots_for(codebook: &Codebook, brightness: f64) -> SpotFindingResults {
    let rounds: Vec<usize> = (0..codebook.n_rounds()).collect();
    let channels: Vec<usize> = (0..codebook.n_channels()).collect();
    let mut results = SpotFindingResults::new(rounds.clone(), channels.clone()).unwrap();
    for &round in &rounds {
        for &channel in &channels {
            let spots: Vec<Spot> = codebook
                .genes()
                .iter()
                .enumerate()
                .map(|(g, gene)| {
                    let on = codebook.value(gene, round, channel).unwrap();
                    Spot::new(20.0 * g as f64, 5.0, on * brightness)
                })
                .collect();
            results.insert(round, channel, spots).unwrap();
        }
    }
    results
}

/// Only the detections where a code is on, as a spot finder would report.
fn sparse_spots_for(codebook: &Codebook) -> SpotFindingResults {
    let tables = (0..codebook.n_rounds()).flat_map(|round| {
        (0..codebook.n_channels()).map(move |channel| {
            let spots: Vec<Spot> = codebook
                .genes()
                .iter()
                .enumerate()
                .filter(|(_, gene)| codebook.value(gene, round, channel) == Some(1.0))
                .map(|(g, _)| Spot::new(20.0 * g as f64, 5.0, 3.0))
                .collect();
            ((round, channel), SpotAttributes::new(spots))
        })
    });
    SpotFindingResults::from_tables(tables)
}

#[test]
fn synthetic_codebook_decodes_back_to_its_genes() {
    init_logging();
    let mut rng = RngHandle::from_seed(7);
    let codebook = synthetic_one_hot_codebook(3, 4, 6, None, &mut rng).unwrap();
    let spots = spots_for(&codebook, 10.0);

    for decoder in [
        DecodingStrategy::Metric(MetricDecoder::new(0.1, 1.0)),
        DecodingStrategy::PerRoundMax(PerRoundMaxDecoder::new(MatchTieBreak::First)),
    ] {
        let config = DecodeConfig {
            traces: TraceBuildingStrategy::ExactMatch,
            decoder,
        };
        let decoded = config.run(&codebook, &spots).unwrap();
        assert_eq!(decoded.gene_names().unwrap(), codebook.genes());
        assert_eq!(decoded.n_decoded(), 6);
    }
}

#[test]
fn dim_spots_count_as_unassigned() {
    let mut rng = RngHandle::from_seed(3);
    let codebook = synthetic_one_hot_codebook(2, 3, 4, None, &mut rng).unwrap();
    let config = DecodeConfig {
        traces: TraceBuildingStrategy::ExactMatch,
        decoder: DecodingStrategy::Metric(MetricDecoder::new(0.1, 5.0)),
    };
    let decoded = config.run(&codebook, &spots_for(&codebook, 1.0)).unwrap();
    assert_eq!(decoded.n_decoded(), 0);

    assert!(gene_counts(&decoded, false).is_empty());
    let with_none = gene_counts(&decoded, true);
    assert_eq!(with_none.len(), 1);
    assert_eq!(with_none[NO_GENE], 4);
}

#[test]
fn gene_counts_tally_each_label() {
    let mut rng = RngHandle::from_seed(11);
    let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let codebook = synthetic_one_hot_codebook(2, 2, 3, Some(names), &mut rng).unwrap();
    let decoded = DecodeConfig::default()
        .run(&codebook, &spots_for(&codebook, 2.0))
        .unwrap();
    let counts = gene_counts(&decoded, false);
    assert_eq!(counts.keys().cloned().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert!(counts.values().all(|&n| n == 1));
}

#[test]
fn yaml_config_selects_both_strategies() {
    let yaml = "
traces:
  strategy: nearest_neighbor
  anchor_round: 0
decoder:
  method: per_round_max
  tie_break: first
";
    let config = DecodeConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(
        config.traces,
        TraceBuildingStrategy::NearestNeighbor(NearestNeighborBuilder::new(0, 3.0))
    );
    assert_eq!(
        config.decoder,
        DecodingStrategy::PerRoundMax(PerRoundMaxDecoder::new(MatchTieBreak::First))
    );

    let mut rng = RngHandle::from_seed(5);
    let codebook = synthetic_one_hot_codebook(2, 3, 3, None, &mut rng).unwrap();
    let decoded = config.run(&codebook, &sparse_spots_for(&codebook)).unwrap();
    assert_eq!(decoded.n_features(), 3);
    // anchor features come out in channel order; the x coordinate names the gene
    for (spot, gene) in decoded.attributes().iter().zip(decoded.gene_names().unwrap()) {
        let g = (spot.x / 20.0) as usize;
        assert_eq!(gene, &codebook.genes()[g]);
    }
}

#[test]
fn config_files_load_by_extension() {
    let dir = tempdir().unwrap();
    let config = DecodeConfig {
        traces: TraceBuildingStrategy::NearestNeighbor(NearestNeighborBuilder::new(2, 1.5)),
        decoder: DecodingStrategy::Metric(MetricDecoder::new(0.4, 0.2)),
    };

    let yaml_path = dir.path().join("decode.yaml");
    fs::write(&yaml_path, config.to_yaml_string().unwrap()).unwrap();
    assert_eq!(DecodeConfig::load(&yaml_path).unwrap(), config);

    let json_path = dir.path().join("decode.json");
    fs::write(&json_path, serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(DecodeConfig::load(&json_path).unwrap(), config);

    let err = DecodeConfig::load(dir.path().join("missing.yaml")).unwrap_err();
    assert_eq!(err.code(), "config-read");
    assert!(err.info().context["path"].ends_with("missing.yaml"));
}

#[test]
fn unknown_strategy_is_a_serde_error() {
    let err = DecodeConfig::from_yaml_str("decoder:\n  method: brightest\n").unwrap_err();
    assert_eq!(err.code(), "yaml-deserialize");
}
