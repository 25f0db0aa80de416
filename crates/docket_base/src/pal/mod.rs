/* 📖 # What is the Platform Abstraction Layer?

The PAL is the only place that touches the real filesystem or network. Deployment
code reads unit file trees through `Pal` and serves documents through `HttpService`,
so the whole deployment pipeline runs against `MockPal` in tests.
*/

mod file_path;
pub mod http;
pub mod mock;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle, ReadSeek};
