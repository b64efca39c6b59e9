#![allow(dead_code)]

use txcode_codebook::{CodeRecord, Codebook, CodewordEntry};
use txcode_core::LabeledTensor;
use txcode_traces::{IntensityTable, Spot};

/// Two genes over 2 rounds x 4 channels sharing their round-0 channel.
pub fn actb_codebook() -> Codebook {
    let records = vec![
        CodeRecord::new(
            "ACTB_human",
            vec![CodewordEntry::new(0, 3, 1.0), CodewordEntry::new(1, 3, 1.0)],
        ),
        CodeRecord::new(
            "ACTB_mouse",
            vec![CodewordEntry::new(0, 3, 1.0), CodewordEntry::new(1, 1, 1.0)],
        ),
    ];
    Codebook::from_code_array(&records, None, None).unwrap()
}

/// Builds a table from flattened channel-major features over `0..n` labels.
pub fn table_from_features(
    features: &[Vec<f64>],
    n_channels: usize,
    n_rounds: usize,
) -> IntensityTable {
    let data: Vec<f64> = features.iter().flatten().copied().collect();
    let intensities = LabeledTensor::from_data(
        features.len(),
        (0..n_channels).collect(),
        (0..n_rounds).collect(),
        data,
    )
    .unwrap();
    let spots = (0..features.len())
        .map(|i| Spot::new(i as f64, 0.0, 0.0))
        .collect();
    IntensityTable::new(spots, intensities).unwrap()
}

/// Flattened 2 x 4 feature with the given `(round, channel, value)` cells.
pub fn actb_feature(cells: &[(usize, usize, f64)]) -> Vec<f64> {
    let mut feature = vec![0.0; 8];
    for &(r, c, v) in cells {
        feature[c * 2 + r] = v;
    }
    feature
}
