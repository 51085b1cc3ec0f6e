//! Crate-wide error type.

use std::fmt;

/// Errors reported by the pipeline.
///
/// Configuration errors are contract violations between the caller and the
/// pipeline (wrong channel counts, regions outside their bitmap, exhausted
/// arenas). Asset errors wrap the decoder that failed.
#[derive(Debug)]
pub enum Error {
    /// The source/destination channel pairing cannot be blitted.
    UnsupportedBlit { src_channels: u32, dst_channels: u32 },
    /// The operation needs a bitmap with a different channel count.
    UnsupportedChannels { expected: u32, found: u32 },
    /// A region does not lie inside the bitmap it refers to.
    RegionOutOfBounds,
    /// Backing storage is shorter than `width * height * channels`.
    BufferTooSmall { needed: usize, found: usize },
    /// The depth plane does not match the destination dimensions.
    DepthSizeMismatch { expected: usize, found: usize },
    /// An arena allocation did not fit in the remaining capacity.
    ArenaExhausted { requested: usize, available: usize },
    /// An arena handle outlived the reset that invalidated it.
    StaleAllocation,
    /// The type needs a stricter alignment than arena blocks provide.
    UnsupportedAlignment { align: usize },
    Image(image::ImageError),
    Obj(tobj::LoadError),
    Font(String),
    Io(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedBlit {
                src_channels,
                dst_channels,
            } => write!(
                f,
                "cannot blit a {src_channels}-channel source onto a {dst_channels}-channel destination"
            ),
            Error::UnsupportedChannels { expected, found } => {
                write!(f, "expected a {expected}-channel bitmap, found {found}")
            }
            Error::RegionOutOfBounds => write!(f, "region lies outside its bitmap"),
            Error::BufferTooSmall { needed, found } => {
                write!(f, "bitmap storage holds {found} bytes, needs {needed}")
            }
            Error::DepthSizeMismatch { expected, found } => {
                write!(f, "depth plane has {found} entries, destination has {expected} pixels")
            }
            Error::ArenaExhausted {
                requested,
                available,
            } => write!(
                f,
                "arena exhausted: requested {requested} bytes, {available} available"
            ),
            Error::StaleAllocation => write!(f, "arena allocation used after reset"),
            Error::UnsupportedAlignment { align } => {
                write!(f, "arena cannot hold values aligned to {align} bytes")
            }
            Error::Image(e) => write!(f, "image error: {e}"),
            Error::Obj(e) => write!(f, "obj load error: {e}"),
            Error::Font(e) => write!(f, "font load error: {e}"),
            Error::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Image(e) => Some(e),
            Error::Obj(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e)
    }
}

impl From<tobj::LoadError> for Error {
    fn from(e: tobj::LoadError) -> Self {
        Error::Obj(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
