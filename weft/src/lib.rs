//! # Weft Runtime
//!
//! The half of weft that lives inside the rendered program.
//!
//! Programs import the two hooked modules:
//!
//! ```ignore
//! use weft::fmt::{println, eprintln};
//! use weft::show;
//! ```
//!
//! Built normally, `fmt` is plain `std` output and `show` writes image files.
//! When the program is rendered, the renderer rewrites those imports to
//! [`capture::fmt`] and [`capture::show`], which emit one JSON [`Event`] per
//! call on standard output instead.

pub mod callsite;
pub mod capture;
pub mod emit;
pub mod event;
pub mod fmt;
pub mod show;

pub use callsite::CallSite;
pub use event::{Event, ImageFormat, Stream};

/// Errors raised by the runtime.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("event serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("unknown image format: {0}")]
    UnknownImageFormat(String),

    #[error("invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Name of the enclosing function, for call-site attribution.
///
/// Expands to a `&'static str` such as `my_app::main`. Closure frames are
/// folded into the function that defines them.
#[doc(hidden)]
#[macro_export]
macro_rules! __function {
    () => {{
        fn __probe() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::callsite::trim_function_name(__type_name_of(__probe))
    }};
}

/// Capture the call site of the macro invocation.
#[doc(hidden)]
#[macro_export]
macro_rules! __callsite {
    () => {
        $crate::callsite::CallSite::new(::std::file!(), ::std::line!(), Some($crate::__function!()))
    };
}
