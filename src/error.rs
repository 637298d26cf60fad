use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("item size must be positive and finite, got {width}x{height}")]
    InvalidItemSize { width: f64, height: f64 },

    #[error("flock must contain at least one item")]
    EmptyFlock,

    #[error("flock of {count} items exceeds the limit of {max}")]
    TooManyItems { count: usize, max: usize },

    #[error("margin must be in [0, 0.5), got {0}")]
    InvalidMargin(f64),

    #[error("viewport {width}x{height} has not been measured yet")]
    Unmeasured { width: f64, height: f64 },

    #[error("render of {width}x{height} px exceeds the pixel limit")]
    RenderTooLarge { width: f64, height: f64 },

    #[error("PNG encode failed: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
