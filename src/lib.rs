//! # classpath-dupes
//!
//! Indexes Java classpath elements and finds classes and resources that
//! more than one element provides.
//!
//! ## Architecture
//!
//! - **element**: Classpath element identity and directory/archive detection
//! - **scan**: Directory walking and jar entry enumeration
//! - **policy**: Built-in and user resource ignore patterns
//! - **cache**: Scan results memoized per element
//! - **index**: Reverse index from class/resource names to owning elements
//! - **config**: Ignore configuration file and flag resolution
//! - **report**: Duplicate grouping and rendering

pub mod cache;
pub mod cli;
pub mod config;
pub mod element;
pub mod error;
pub mod index;
pub mod policy;
pub mod report;
pub mod scan;

pub use cache::ScanCache;
pub use element::Element;
pub use error::{IndexError, IndexResult};
pub use index::ClasspathIndex;
pub use policy::IgnorePolicy;
