//! Configuration types for protloc

use crate::bio::alphabet::AminoAcid;
use crate::error::{ProtlocError, ProtlocResult};
use crate::features::assemble::default_features;
use crate::features::ngram::{DipeptideExtractor, DipeptideSelection, CURATED_PAIRS};
use crate::features::{FeatureId, NormalizationMode, Scope};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub normalization: NormalizationConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub assembly: AssemblyConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Category names, in label-code order
    #[serde(default = "default_classes")]
    pub classes: Vec<String>,
    /// Unlabelled held-out population
    #[serde(default = "default_blind")]
    pub blind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default = "default_composition_window")]
    pub composition_window: usize,
    /// 0 disables the windowed dipeptide counts
    #[serde(default = "default_dipeptide_window")]
    pub dipeptide_window: usize,
    #[serde(default)]
    pub dipeptide_selection: DipeptideSelection,
    #[serde(default = "default_check_invariants")]
    pub check_invariants: bool,
    #[serde(default = "default_frequency_tolerance")]
    pub frequency_tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationConfig {
    /// Feature name to scaling mode
    #[serde(default = "default_normalized_features")]
    pub features: IndexMap<String, NormalizationMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    #[serde(default = "default_one_hot_labels")]
    pub one_hot_labels: bool,
    #[serde(default = "default_one_hot_sequences")]
    pub one_hot_sequences: bool,
    /// 0 keeps every sequence at its own length
    #[serde(default = "default_pad_length")]
    pub pad_length: usize,
    #[serde(default = "default_pad_code")]
    pub pad_code: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    #[serde(default = "default_assembly_features")]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// 0 uses every core
    #[serde(default = "default_threads")]
    pub threads: usize,
}

// Default value functions
fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_extension() -> String { "fasta".to_string() }
fn default_classes() -> Vec<String> {
    ["cyto", "mito", "nucleus", "secreted"].map(String::from).to_vec()
}
fn default_blind() -> String { "blind".to_string() }
fn default_composition_window() -> usize { 20 }
fn default_dipeptide_window() -> usize { 70 }
fn default_check_invariants() -> bool { true }
fn default_frequency_tolerance() -> f64 { 1e-7 }
fn default_one_hot_labels() -> bool { false }
fn default_one_hot_sequences() -> bool { true }
fn default_pad_length() -> usize { 2000 }
fn default_pad_code() -> usize { 0 }
fn default_threads() -> usize { 0 }

fn default_assembly_features() -> Vec<String> {
    default_features().iter().map(|f| f.to_string()).collect()
}

fn default_normalized_features() -> IndexMap<String, NormalizationMode> {
    let mut features = vec![
        FeatureId::SequenceLength,
        FeatureId::MolecularWeight(Scope::Global),
        FeatureId::IsoelectricPoint(Scope::Global),
        FeatureId::Aromaticity(Scope::Global),
        FeatureId::InstabilityIndex(Scope::Global),
        FeatureId::Flexibility(Scope::Global),
    ];
    for scope in Scope::LOCAL {
        features.push(FeatureId::MolecularWeight(scope));
        features.push(FeatureId::IsoelectricPoint(scope));
    }
    features.extend(FeatureId::pairs(&CURATED_PAIRS, &[Scope::Global]));
    // S-S and E-E are only scaled globally
    let local_pairs: Vec<_> = CURATED_PAIRS
        .into_iter()
        .filter(|pair| {
            !matches!(
                pair,
                (AminoAcid::Ser, AminoAcid::Ser) | (AminoAcid::Glu, AminoAcid::Glu)
            )
        })
        .collect();
    features.extend(FeatureId::pairs(&local_pairs, &Scope::LOCAL));

    features
        .into_iter()
        .map(|f| (f.to_string(), NormalizationMode::Standard))
        .collect()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            extension: default_extension(),
            classes: default_classes(),
            blind: default_blind(),
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            composition_window: default_composition_window(),
            dipeptide_window: default_dipeptide_window(),
            dipeptide_selection: DipeptideSelection::default(),
            check_invariants: default_check_invariants(),
            frequency_tolerance: default_frequency_tolerance(),
        }
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            features: default_normalized_features(),
        }
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            one_hot_labels: default_one_hot_labels(),
            one_hot_sequences: default_one_hot_sequences(),
            pad_length: default_pad_length(),
            pad_code: default_pad_code(),
        }
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            features: default_assembly_features(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
        }
    }
}

impl FeatureConfig {
    pub fn dipeptide_window(&self) -> Option<usize> {
        (self.dipeptide_window > 0).then_some(self.dipeptide_window)
    }

    pub fn dipeptide_extractor(&self) -> DipeptideExtractor {
        DipeptideExtractor::new(self.dipeptide_window(), self.dipeptide_selection)
    }
}

impl NormalizationConfig {
    /// Parsed `feature -> mode` entries, in configuration order
    pub fn plan(&self) -> ProtlocResult<Vec<(FeatureId, NormalizationMode)>> {
        self.features
            .iter()
            .map(|(name, &mode)| Ok((name.parse::<FeatureId>()?, mode)))
            .collect()
    }
}

impl EncodingConfig {
    pub fn pad(&self) -> Option<usize> {
        (self.pad_length > 0).then_some(self.pad_length)
    }
}

impl AssemblyConfig {
    pub fn feature_ids(&self) -> ProtlocResult<Vec<FeatureId>> {
        self.features.iter().map(|name| name.parse()).collect()
    }
}

impl Config {
    /// Check names and ranges before any data is read
    pub fn validate(&self) -> ProtlocResult<()> {
        if self.data.classes.is_empty() {
            return Err(ProtlocError::Configuration(
                "At least one class must be configured".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for class in &self.data.classes {
            if class.trim().is_empty() {
                return Err(ProtlocError::Configuration(
                    "Class names must not be empty".to_string(),
                ));
            }
            if !seen.insert(class.as_str()) {
                return Err(ProtlocError::Configuration(format!(
                    "Duplicate class: {}",
                    class
                )));
            }
        }
        if self.data.blind.trim().is_empty() {
            return Err(ProtlocError::Configuration(
                "The blind population needs a file name".to_string(),
            ));
        }
        if self.features.composition_window == 0 {
            return Err(ProtlocError::Configuration(
                "composition_window must be at least 1".to_string(),
            ));
        }
        if !(self.features.frequency_tolerance > 0.0) {
            return Err(ProtlocError::Configuration(format!(
                "frequency_tolerance must be positive, got {}",
                self.features.frequency_tolerance
            )));
        }
        self.normalization.plan()?;
        let assembly = self.assembly.feature_ids()?;
        if assembly.is_empty() {
            return Err(ProtlocError::Configuration(
                "The assembly feature list is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Normalization entries restricted to what the dipeptide settings produce.
    ///
    /// Pair entries for scopes or pairs that are not extracted are dropped; every
    /// other entry is kept as configured.
    pub fn normalization_plan(&self) -> ProtlocResult<Vec<(FeatureId, NormalizationMode)>> {
        let produced: HashSet<FeatureId> = self
            .features
            .dipeptide_extractor()
            .feature_ids()
            .into_iter()
            .collect();
        let plan = self.normalization.plan()?;
        let before = plan.len();
        let plan: Vec<_> = plan
            .into_iter()
            .filter(|(f, _)| !matches!(f, FeatureId::Pair(..)) || produced.contains(f))
            .collect();
        if plan.len() < before {
            debug!(
                "Dropped {} dipeptide normalization entries that are not extracted",
                before - plan.len()
            );
        }
        Ok(plan)
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> ProtlocResult<Config> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| ProtlocError::Configuration(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> ProtlocResult<()> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| ProtlocError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
