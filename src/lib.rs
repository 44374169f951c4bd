//! jsm-modularize library for converting global-namespace examples into
//! ES module examples.
//!
//! This library provides programmatic access to the conversion. The core
//! workflow for one document involves four phases:
//!
//! 1. **Classification**: Locate the script elements and decide which one
//!    loads the core library, which load tools, and which is the main script
//! 2. **Rewriting**: Parse the main script and replace every
//!    `new THREE.X(...)` callee with a bare `X`, resolving each name against
//!    the [`SymbolRegistry`]
//! 3. **Import synthesis**: Prepend one import for the core module and one
//!    per tool inclusion
//! 4. **Assembly**: Cut the removed inclusions out of the document and swap
//!    the main script for a module script
//!
//! # Example
//!
//! ```no_run
//! use jsm_modularize::{ConversionOutcome, Conventions, SymbolRegistry, convert};
//! use std::path::Path;
//!
//! let conventions = Conventions::default();
//! let registry = SymbolRegistry::from_dirs(
//!     Path::new("examples/js"),
//!     Path::new("examples/jsm"),
//!     &conventions.exempt_paths,
//! )
//! .unwrap();
//!
//! let document = std::fs::read_to_string("examples/webgl_camera.html").unwrap();
//! match convert(&document, &registry, &conventions).unwrap() {
//!     ConversionOutcome::Converted(doc) => println!("{}", doc.text),
//!     ConversionOutcome::Rejected(missing) => println!("no module for {:?}", missing),
//!     ConversionOutcome::StructuralError(err) => println!("skipped: {}", err),
//! }
//! ```

pub mod assembler;
pub mod batch;
pub mod classifier;
pub mod conventions;
pub mod convert;
pub mod error;
pub mod imports;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod rewriter;
pub mod scanner;

// Re-export commonly used types at crate root
pub use conventions::Conventions;
pub use convert::{ConversionOutcome, ConvertedDocument, convert};
pub use error::{ManifestError, RegistryInconsistency, StructuralError};
pub use registry::SymbolRegistry;
