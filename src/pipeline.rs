//! End-to-end entry points: load the data directory, extract, check, normalize,
//! encode and assemble.
//!
//! Extraction of the two populations runs concurrently; normalization waits for
//! both because its statistics are pooled.

use crate::bio::fasta::load_population;
use crate::bio::sequence::Dataset;
use crate::config::Config;
use crate::encoding::{
    encode_labels, encode_sequences, ClassDictionary, EncodedSequences, LabelEncoding,
    ResidueVocabulary, SequenceEncoding,
};
use crate::error::ProtlocResult;
use crate::features::assemble::{assemble, column_names};
use crate::features::composition::CompositionExtractor;
use crate::features::descriptors::{DescriptorProvider, ProtParam};
use crate::features::ngram::{DipeptideExtractor, DipeptideSelection};
use crate::features::normalize::normalize;
use crate::features::physicochemical::PhysicochemicalExtractor;
use ndarray::Array2;
use tracing::info;

/// Train (labelled) and blind (unlabelled) populations
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub train: Dataset,
    pub test: Dataset,
    pub max_len: usize,
}

/// Feature matrices ready for a classifier
#[derive(Debug, Clone)]
pub struct HandcraftedData {
    pub x_train: Array2<f64>,
    pub y_train: LabelEncoding,
    pub x_test: Array2<f64>,
    pub test_ids: Vec<String>,
    pub class_dict: ClassDictionary,
    /// One name per matrix column
    pub columns: Vec<String>,
}

/// Unnormalized feature tables with every dipeptide pair, for analysis
#[derive(Debug, Clone)]
pub struct RawData {
    pub train: Dataset,
    pub test: Dataset,
    pub y_train: LabelEncoding,
    pub class_dict: ClassDictionary,
}

#[derive(Debug, Clone)]
pub struct SequenceData {
    pub x_train: EncodedSequences,
    pub y_train: LabelEncoding,
    pub x_test: EncodedSequences,
    pub test_ids: Vec<String>,
    pub class_dict: ClassDictionary,
    pub vocabulary: ResidueVocabulary,
    pub max_len: usize,
}

/// Load the blind file, then one file per class in configuration order
pub fn load_data(config: &Config) -> ProtlocResult<LoadedData> {
    let data = &config.data;

    let blind = load_population(&data.data_dir, &data.blind, &data.extension, None)?;
    info!("Max sequence length test: {}", blind.max_len);
    let mut max_len = blind.max_len;

    let mut train_records = Vec::new();
    for class in &data.classes {
        let parsed = load_population(&data.data_dir, class, &data.extension, Some(class))?;
        info!(
            "Loaded {} {} sequences (max length {})",
            parsed.records.len(),
            class,
            parsed.max_len
        );
        max_len = max_len.max(parsed.max_len);
        train_records.extend(parsed.records);
    }

    let train = Dataset::new(train_records);
    let test = Dataset::new(blind.records);
    info!("Max sequence length: {}", max_len);
    info!("Train sequences: {}", train.len());
    info!("Test sequences: {}", test.len());
    info!("Class balance: {:?}", train.class_balance());

    Ok(LoadedData {
        train,
        test,
        max_len,
    })
}

struct Extractors<P> {
    composition: CompositionExtractor,
    physicochemical: PhysicochemicalExtractor<P>,
    dipeptides: DipeptideExtractor,
}

impl<P: DescriptorProvider> Extractors<P> {
    fn new(config: &Config, provider: P, selection: DipeptideSelection, expand: bool) -> Self {
        let features = &config.features;
        Self {
            composition: CompositionExtractor {
                window: features.composition_window,
                check_invariants: features.check_invariants,
                tolerance: features.frequency_tolerance,
            },
            physicochemical: PhysicochemicalExtractor::new(provider, features.composition_window)
                .with_expanded_vectors(expand),
            dipeptides: DipeptideExtractor::new(features.dipeptide_window(), selection),
        }
    }

    fn run(&self, dataset: &mut Dataset) -> ProtlocResult<()> {
        self.dipeptides.extract(dataset)?;
        self.composition.extract(dataset)?;
        self.physicochemical.extract(dataset)
    }

    /// Extract both populations; returns once both are complete
    fn run_both(&self, train: &mut Dataset, test: &mut Dataset) -> ProtlocResult<()> {
        let (a, b) = rayon::join(|| self.run(train), || self.run(test));
        a?;
        b
    }
}

pub fn handcrafted(config: &Config) -> ProtlocResult<HandcraftedData> {
    handcrafted_with(config, &ProtParam)
}

/// [`handcrafted`] with a caller-supplied descriptor provider
pub fn handcrafted_with<P: DescriptorProvider>(
    config: &Config,
    provider: &P,
) -> ProtlocResult<HandcraftedData> {
    config.validate()?;
    let features = config.assembly.feature_ids()?;
    let class_dict = ClassDictionary::new(config.data.classes.iter().cloned())?;

    let LoadedData {
        mut train,
        mut test,
        ..
    } = load_data(config)?;

    let extractors = Extractors::new(config, provider, config.features.dipeptide_selection, false);
    extractors.run_both(&mut train, &mut test)?;

    normalize(&mut train.features, &mut test.features, config)?;

    let y_train = encode_labels(&train.records, &class_dict, config.encoding.one_hot_labels)?;
    let x_train = assemble(&train.features, train.len(), &features)?;
    let x_test = assemble(&test.features, test.len(), &features)?;
    info!("Using {} features", x_test.ncols());

    Ok(HandcraftedData {
        x_train,
        y_train,
        x_test,
        test_ids: test.ids(),
        class_dict,
        columns: column_names(&features),
    })
}

pub fn handcrafted_raw(config: &Config) -> ProtlocResult<RawData> {
    handcrafted_raw_with(config, &ProtParam)
}

pub fn handcrafted_raw_with<P: DescriptorProvider>(
    config: &Config,
    provider: &P,
) -> ProtlocResult<RawData> {
    config.validate()?;
    let class_dict = ClassDictionary::new(config.data.classes.iter().cloned())?;

    let LoadedData {
        mut train,
        mut test,
        ..
    } = load_data(config)?;

    let extractors = Extractors::new(config, provider, DipeptideSelection::All, true);
    extractors.run_both(&mut train, &mut test)?;
    info!(
        "Raw feature tables with {} columns per population",
        train.features.len()
    );

    let y_train = encode_labels(&train.records, &class_dict, false)?;
    Ok(RawData {
        train,
        test,
        y_train,
        class_dict,
    })
}

/// Padded residue encodings of both populations with a shared vocabulary
pub fn sequences(config: &Config) -> ProtlocResult<SequenceData> {
    config.validate()?;
    let class_dict = ClassDictionary::new(config.data.classes.iter().cloned())?;
    let LoadedData {
        train,
        test,
        max_len,
    } = load_data(config)?;

    let vocabulary = ResidueVocabulary::default();
    let encoding = SequenceEncoding {
        one_hot: config.encoding.one_hot_sequences,
        pad: config.encoding.pad(),
        pad_code: config.encoding.pad_code,
    };

    let y_train = encode_labels(&train.records, &class_dict, config.encoding.one_hot_labels)?;
    let x_train = encode_sequences(&train.records, &vocabulary, &encoding)?;
    let x_test = encode_sequences(&test.records, &vocabulary, &encoding)?;
    info!(
        "Encoded {} train and {} test sequences (pad {:?})",
        x_train.len(),
        x_test.len(),
        encoding.pad
    );

    Ok(SequenceData {
        x_train,
        y_train,
        x_test,
        test_ids: test.ids(),
        class_dict,
        vocabulary,
        max_len,
    })
}
