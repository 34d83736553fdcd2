//! JSONPath parsing and evaluation with match locations.
//!
//! Every match carries its normalized path from the document root, so a
//! caller can find the container that holds it and edit the document at
//! that spot.
//!
//! # Example
//!
//! ```
//! use jsonlib_json_path::{JsonPathEval, JsonPathParser, Segment};
//! use serde_json::json;
//!
//! let path = JsonPathParser::parse("$.store.books[*].author").unwrap();
//!
//! let doc = json!({
//!     "store": {
//!         "books": [
//!             {"author": "Nigel Rees", "title": "Sayings of the Century"},
//!             {"author": "Evelyn Waugh", "title": "Sword of Honour"}
//!         ]
//!     }
//! });
//!
//! let found = JsonPathEval::find(&path, &doc);
//! assert_eq!(found.len(), 2);
//! assert_eq!(found[1].value, &json!("Evelyn Waugh"));
//! assert_eq!(found[1].segment(), Some(&Segment::Field("author".into())));
//! assert_eq!(found[1].path.to_string(), "$['store']['books'][1]['author']");
//! ```

mod types;
pub use types::*;

mod parser;
pub use parser::{JsonPathParser, ParseError};

mod eval;
pub use eval::JsonPathEval;

mod util;
pub use util::json_path_to_string;
