//! Pipeline configuration.
//!
//! There are no defaults: segmentation geometry depends on
//! the objective, camera binning and cell type, and the kinematic scale on
//! the acquisition protocol. A configuration file must name every value.

use std::path::Path;

use crate::error::TrackError;
use crate::kinematics::KinematicsConfig;
use crate::segment::SegmentConfig;

/// Full configuration of one tracking run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub segmentation: SegmentConfig,
    pub kinematics: KinematicsConfig,
}

impl PipelineConfig {
    /// Check every value for range and finiteness.
    pub fn validate(&self) -> Result<(), TrackError> {
        self.segmentation.validate()?;
        self.kinematics.validate()
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, TrackError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TrackError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "segmentation": {
            "edge_threshold_factor": 0.5,
            "first_dilation_radius": 3,
            "first_erosion_radius": 1,
            "halo_brightness_threshold": 180,
            "second_dilation_radius": 3,
            "second_erosion_radius": 2,
            "min_region_area": 50
        },
        "kinematics": { "frame_interval": 5.0, "pixel_size": 0.645 }
    }"#;

    #[test]
    fn parses_complete_document() {
        let config = PipelineConfig::from_json_str(VALID).unwrap();
        assert_eq!(config.segmentation.halo_brightness_threshold, 180);
        assert_eq!(config.segmentation.min_region_area, 50);
        assert_eq!(config.kinematics.pixel_size, 0.645);
    }

    #[test]
    fn missing_values_are_rejected() {
        let json = VALID.replace("\"min_region_area\": 50", "\"unused\": 1");
        let err = PipelineConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(err, TrackError::InvalidConfig(_)));

        let json = r#"{ "segmentation": {}, "kinematics": { "frame_interval": 1.0, "pixel_size": 1.0 } }"#;
        assert!(PipelineConfig::from_json_str(json).is_err());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let json = VALID.replace("\"frame_interval\": 5.0", "\"frame_interval\": 0.0");
        let err = PipelineConfig::from_json_str(&json).unwrap_err();
        assert_eq!(
            err,
            TrackError::InvalidConfig("frame_interval must be finite and > 0".to_string())
        );
    }

    #[test]
    fn round_trips_through_json() {
        let config = PipelineConfig::from_json_str(VALID).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(PipelineConfig::from_json_str(&json).unwrap(), config);
    }
}
