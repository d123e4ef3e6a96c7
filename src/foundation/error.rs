/// Convenience result type used across pagevis.
pub type PagevisResult<T> = Result<T, PagevisError>;

/// Top-level error taxonomy used by the visualizer, renderers and validators.
#[derive(thiserror::Error, Debug)]
pub enum PagevisError {
    /// Malformed input payload, rejected at the validation boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// A unit, colour or similar string did not match its grammar.
    #[error("parse error: {0}")]
    Parse(String),

    /// Failure while painting a page onto a surface.
    #[error("rendering error: {message}")]
    Rendering {
        /// Human readable summary.
        message: String,
        /// The failure that aborted the render.
        #[source]
        source: Box<PagevisError>,
    },

    /// Image fetch or decode failure.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// Mode or format combination that is not implemented.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Operation attempted after the visualizer was destroyed.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Export requested before any page was rendered.
    #[error("no page to export")]
    NoPage,

    /// The renderer's drawing handle is gone (destroyed or never created).
    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PagevisError {
    /// Build a [`PagevisError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PagevisError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Wrap `cause` into a [`PagevisError::Rendering`] value.
    ///
    /// Already-wrapped rendering errors are returned unchanged so re-renders do not nest.
    pub fn rendering(cause: PagevisError) -> Self {
        match cause {
            Self::Rendering { .. } => cause,
            other => Self::Rendering {
                message: format!("failed to render page: {other}"),
                source: Box::new(other),
            },
        }
    }

    /// Build a [`PagevisError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`PagevisError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build a [`PagevisError::Lifecycle`] value.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build a [`PagevisError::SurfaceUnavailable`] value.
    pub fn surface_unavailable(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable(msg.into())
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Parse(_) => "PARSE_ERROR",
            Self::Rendering { .. } => "RENDERING_ERROR",
            Self::AssetLoad(_) => "ASSET_LOAD_ERROR",
            Self::Unsupported(_) => "UNSUPPORTED",
            Self::Lifecycle(_) => "DESTROYED",
            Self::NoPage => "NO_PAGE",
            Self::SurfaceUnavailable(_) => "SURFACE_UNAVAILABLE",
            Self::Other(_) => "INTERNAL",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
