//! jimp - crude Java import solver.
//!
//! Infers the import statements a Java source file needs from a lexical scan
//! of the file and a cached short-name -> fully-qualified-name index built
//! from a classpath of source trees and jars. Good-enough symbol extraction
//! at editor speed, not a compiler front end.
//!
//! # Example
//!
//! ```ignore
//! use jimp::{index::PackageIndex, resolve, scan};
//!
//! let symbols = scan::scan(&std::fs::read_to_string("Main.java")?);
//! let mut index = PackageIndex::new();
//! index.insert_source("Helper", "com.example.util.Helper".to_string());
//! for import in resolve::solve(&symbols, &index) {
//!     println!("import {};", import);
//! }
//! ```

pub mod cache;
pub mod classpath;
pub mod config;
pub mod index;
pub mod project;
pub mod resolve;
pub mod scan;
