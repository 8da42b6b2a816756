use std::fmt;

/// Fatal startup failure classes.
///
/// Attached as `anyhow` context at the step that failed, so the full cause chain
/// is kept while callers can still classify the failure with [`InitError::classify`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InitError {
    /// No graphics backend is compiled in or available on this platform.
    UnsupportedPlatform,
    /// No adapter or logical device could be obtained.
    DeviceAcquisition,
    /// The window is missing or cannot provide a drawable surface.
    SurfaceAcquisition,
    /// A buffer, shader module, pipeline or bind group could not be created.
    ResourceCreation,
}

impl InitError {
    /// Returns the failure class attached anywhere in `err`'s context chain.
    pub fn classify(err: &anyhow::Error) -> Option<InitError> {
        err.downcast_ref::<InitError>().copied()
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            InitError::UnsupportedPlatform => "graphics is not supported on this platform",
            InitError::DeviceAcquisition => "no GPU adapter or device is available",
            InitError::SurfaceAcquisition => "failed to acquire a drawable surface",
            InitError::ResourceCreation => "failed to create GPU resources",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for InitError {}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}
