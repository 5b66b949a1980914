//! vCard (2.1, 3.0, 4.0) and vCalendar (1.0, 2.0) codec.
//!
//! Text is parsed into a [`Component`] tree whose properties live in typed,
//! insertion-ordered collections. A static, version-aware registry decides
//! which properties exist, how many instances they allow and how their
//! values are shaped. Serializing a component and parsing the result yields
//! an equal component. Pure synchronous; no network or database.
//!
//! # Quick start
//!
//! ```no_run
//! use versit::{key::StringKey, part::NameInfo};
//!
//! let text = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:John Doe\r\nN:Doe;John;;;\r\nEND:VCARD\r\n";
//! let card = versit::parse(text).unwrap();
//! assert_eq!(card.string(StringKey::FullName), Some("John Doe"));
//! assert_eq!(card.parts_array::<NameInfo>()[0].given_name, "John");
//! let saved = card.save_to_string(true).unwrap();
//! assert_eq!(versit::parse(&saved).unwrap(), card);
//! ```

pub mod argument;
pub mod component;
pub mod diff;
pub mod error;
pub mod key;
mod parse;
pub mod part;
pub mod property;
pub mod registry;
mod serialize;
pub mod store;
pub mod text;
mod validate;
pub mod version;

pub use argument::Argument;
pub use component::{Component, ComponentKind};
pub use diff::{Change, Difference, diff};
pub use error::{Error, Result};
pub use parse::{
  ParseOptions, ParsePolicy, parse, parse_file, parse_many, parse_many_with,
  parse_with,
};
pub use property::Property;
pub use serialize::{LineEnding, SaveOptions, write_component};
pub use version::{Family, Version};

#[cfg(test)]
mod tests;
