//! Rescaling with statistics pooled over the train and test populations.

use crate::config::Config;
use crate::error::{ProtlocError, ProtlocResult};
use crate::features::{FeatureId, FeatureTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    /// Zero mean, unit (population) standard deviation
    #[default]
    Standard,
    /// Rescale to [0, 1]
    MinMax,
}

/// Shift and scale derived from the pooled values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PooledStatistic {
    pub center: f64,
    pub scale: f64,
}

impl PooledStatistic {
    /// `None` for an empty population. Values are summed in sorted order so the
    /// result does not depend on how the populations are arranged.
    pub fn compute<'a, I>(values: I, mode: NormalizationMode) -> Option<Self>
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let mut values: Vec<f64> = values.into_iter().copied().collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let n = values.len() as f64;
        match mode {
            NormalizationMode::Standard => {
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
                Some(Self {
                    center: mean,
                    scale: var.sqrt(),
                })
            }
            NormalizationMode::MinMax => {
                let min = values[0];
                let max = values[values.len() - 1];
                Some(Self {
                    center: min,
                    scale: max - min,
                })
            }
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.scale.is_finite() && self.scale > 0.0)
    }

    pub fn apply(&self, x: f64) -> f64 {
        if self.is_degenerate() {
            x - self.center
        } else {
            (x - self.center) / self.scale
        }
    }
}

/// Rescale one feature in both tables with a shared pooled statistic
pub fn normalize_pooled(
    train: &mut FeatureTable,
    test: &mut FeatureTable,
    feature: FeatureId,
    mode: NormalizationMode,
) -> ProtlocResult<()> {
    let missing = |side: &str| {
        ProtlocError::Configuration(format!(
            "Feature {} is configured for normalization but missing from the {} population",
            feature, side
        ))
    };
    let stat = {
        let a = train.get(feature).ok_or_else(|| missing("train"))?;
        let b = test.get(feature).ok_or_else(|| missing("test"))?;
        PooledStatistic::compute(a.iter().chain(b.iter()), mode)
    };

    let Some(stat) = stat else {
        return Ok(());
    };
    if stat.is_degenerate() {
        warn!(
            "Feature {} has no spread (center {}), values are only centered",
            feature, stat.center
        );
    }

    for table in [train, test] {
        if let Some(column) = table.get_mut(feature) {
            column.mapv_inplace(|x| stat.apply(x));
        }
    }
    Ok(())
}

/// Apply every configured `feature -> mode` entry; unlisted features pass through.
/// Pair entries the dipeptide settings do not extract are skipped.
pub fn normalize(
    train: &mut FeatureTable,
    test: &mut FeatureTable,
    config: &Config,
) -> ProtlocResult<()> {
    normalize_features(train, test, &config.normalization_plan()?)
}

pub fn normalize_features(
    train: &mut FeatureTable,
    test: &mut FeatureTable,
    plan: &[(FeatureId, NormalizationMode)],
) -> ProtlocResult<()> {
    for &(feature, mode) in plan {
        normalize_pooled(train, test, feature, mode)?;
    }
    debug!("Normalized {} features", plan.len());
    Ok(())
}
