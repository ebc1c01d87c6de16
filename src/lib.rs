//! Protoparse: a Protocol Buffers schema parser producing a position-annotated AST.
//!
//! The parser turns `.proto` source text into a tree of plain data nodes.
//! Every node carries the byte offset, line and column of its first token and
//! the comments written directly above it, so code generators, linters and
//! formatters can work from the schema as written. No semantic checks are
//! made: duplicate field numbers or unknown type names parse fine.
//!
//! # Quick Start
//!
//! ```rust
//! use protoparse::parser::{self, ast::AstMember};
//!
//! let file = parser::parse_file(r#"
//!     syntax = "proto3";
//!     package example;
//!
//!     // A person.
//!     message Person {
//!         string name = 1;
//!         map<string, int32> scores = 2;
//!     }
//! "#).unwrap();
//!
//! assert_eq!(file.package(), Some("example"));
//! let person = file.messages().next().unwrap();
//! assert_eq!(person.comments[0].raw, "// A person.");
//! assert_eq!(person.position.line, 6);
//! assert!(matches!(person.body[1], AstMember::MapField(_)));
//! ```

pub mod error;
pub mod parser;

pub use error::{ParseError, Result};
pub use parser::ast::AstFile;
pub use parser::config::{ParseMode, ParseOptions};
pub use parser::{parse_file, parse_file_with};
