/// Errors reported by the simulator facade.
///
/// Scanning without geometry is not an error (it yields an empty buffer), and
/// arithmetic edge cases inside the ray engine are absorbed by the
/// intersection epsilons, so the surface is small: bad configurations and bad
/// geometry buffers, both rejected synchronously on the call that supplies
/// them.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A sensor configuration field is out of range or non-finite.
    #[error("invalid sensor config: {reason}")]
    InvalidConfig { reason: String },
    /// The vertex/index buffers do not describe a valid indexed triangle mesh.
    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },
}

impl SimError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        SimError::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        SimError::InvalidGeometry {
            reason: reason.into(),
        }
    }
}
