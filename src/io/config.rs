use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// What `matrix_to_quaternion` does when trace(R) + 1 is too close to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Switch to Shepperd's largest-diagonal extraction.
    #[default]
    Shepperd,
    /// Fail with `RotationError::Degenerate`.
    Reject,
}

/// Tolerances and policies for the rotation converter.
///
/// YAML layout (every key optional):
///
/// ```yaml
/// unit_norm_tolerance: 1.0e-6
/// orthonormal_tolerance: 1.0e-6
/// gimbal_epsilon: 1.0e-8
/// degenerate_threshold: 1.0e-6
/// degenerate_policy: shepperd   # or reject
/// validate_inputs: true
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Maximum |‖q‖ - 1| accepted for an input quaternion.
    pub unit_norm_tolerance: f64,
    /// Maximum entry of |RᵗR - I| and |det R - 1| accepted for an input matrix.
    pub orthonormal_tolerance: f64,
    /// Pitch within this many radians of ±π/2 is treated as gimbal lock.
    pub gimbal_epsilon: f64,
    /// trace(R) + 1 at or below this value counts as degenerate.
    pub degenerate_threshold: f64,
    pub degenerate_policy: DegeneratePolicy,
    /// Reject non-unit quaternions and non-orthonormal matrices.
    pub validate_inputs: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            unit_norm_tolerance: 1e-6,
            orthonormal_tolerance: 1e-6,
            gimbal_epsilon: 1e-8,
            degenerate_threshold: 1e-6,
            degenerate_policy: DegeneratePolicy::Shepperd,
            validate_inputs: true,
        }
    }
}

impl ConverterConfig {
    /// Parse a config from a YAML document and check its values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ConverterConfig =
            serde_yaml::from_str(yaml).context("Failed to parse converter config")?;
        config.check()?;
        Ok(config)
    }

    /// Load a config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config: ConverterConfig = serde_yaml::from_reader(
            File::open(path).with_context(|| format!("Failed to open {:?}", path))?,
        )
        .with_context(|| format!("Failed to parse converter config {:?}", path))?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        let tolerances = [
            ("unit_norm_tolerance", self.unit_norm_tolerance),
            ("orthonormal_tolerance", self.orthonormal_tolerance),
            ("gimbal_epsilon", self.gimbal_epsilon),
            ("degenerate_threshold", self.degenerate_threshold),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                bail!("Expected {} to be a finite non-negative number, got {}", name, value);
            }
        }
        // Exact ±π/2 pitch must land in the gimbal branch.
        if self.gimbal_epsilon == 0.0 {
            bail!("Expected gimbal_epsilon to be positive, got 0");
        }
        Ok(())
    }
}
