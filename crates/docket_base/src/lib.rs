/* 📖 # What belongs in docket_base?
docket_base holds what every other crate needs and nothing domain specific: the error
type, tracing setup and the platform abstraction layer (files and HTTP).
*/

pub mod error;
mod error_tests;
pub mod pal;
mod pal_tests;
pub mod tracing;

pub use error::{DocketError, DocketResult, ErrorKind, ResultExt};
pub use pal::{FilePath, MockPal, Pal, PalHandle, ReadSeek, RealPal};
