pub mod analysis;
pub mod error;
pub mod event;
pub mod merge;
pub mod report;
pub mod request;
pub mod snapshot;
pub mod sort;
pub mod source;
pub mod tracker;
pub mod window;

pub use error::{Error, ErrorKind, Result};
pub use request::{Request, Stage};
