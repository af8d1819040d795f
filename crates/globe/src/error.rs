use formats::features::FeatureError;
use formats::topology::TopologyError;
use gpu::GpuError;

use crate::config::ConfigError;

#[derive(Debug)]
pub enum GlobeError {
    /// The drawing surface is gone; the viewer no longer renders.
    SurfaceLost,
    Gpu(GpuError),
    Topology(TopologyError),
    Feature(FeatureError),
    Config(ConfigError),
}

impl std::fmt::Display for GlobeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlobeError::SurfaceLost => write!(f, "rendering surface lost"),
            GlobeError::Gpu(e) => write!(f, "gpu error: {e}"),
            GlobeError::Topology(e) => write!(f, "topology error: {e}"),
            GlobeError::Feature(e) => write!(f, "feature error: {e}"),
            GlobeError::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for GlobeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlobeError::SurfaceLost => None,
            GlobeError::Gpu(e) => Some(e),
            GlobeError::Topology(e) => Some(e),
            GlobeError::Feature(e) => Some(e),
            GlobeError::Config(e) => Some(e),
        }
    }
}

impl From<GpuError> for GlobeError {
    fn from(e: GpuError) -> Self {
        match e {
            GpuError::ContextLost => GlobeError::SurfaceLost,
            other => GlobeError::Gpu(other),
        }
    }
}

impl From<TopologyError> for GlobeError {
    fn from(e: TopologyError) -> Self {
        GlobeError::Topology(e)
    }
}

impl From<FeatureError> for GlobeError {
    fn from(e: FeatureError) -> Self {
        GlobeError::Feature(e)
    }
}

impl From<ConfigError> for GlobeError {
    fn from(e: ConfigError) -> Self {
        GlobeError::Config(e)
    }
}
