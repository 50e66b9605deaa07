//! Domain models and types for hisseed.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`Uid`])
//! - **Metadata objects** ([`OrgUnit`], [`OrgUnitLevel`], [`User`], [`UserRole`],
//!   [`DataElement`], [`DataElementGroup`])
//! - **Observations** ([`Table`], [`LongRecord`], [`DataValueRecord`])
//! - **Error types** ([`SeedError`], [`ApiError`], [`ValidationError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are validated on construction, so a [`Uid`] that made it into
//! a payload is always syntactically acceptable to the target:
//!
//! ```rust
//! use hisseed::domain::Uid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let uid = Uid::new("ImspTQPwCqd")?;
//! assert!(Uid::new("9mspTQPwCqd").is_err());
//! # Ok(())
//! # }
//! ```
//!
//! # Builder Pattern
//!
//! ```rust
//! use hisseed::domain::{DataElement, Uid};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let element = DataElement::builder()
//!     .id(Uid::new("deE00000001")?)
//!     .code("e_inc_100k")
//!     .name("Estimated incidence (all forms) per 100 000 population")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod data_element;
pub mod data_value;
pub mod errors;
pub mod ids;
pub mod org_unit;
pub mod result;
pub mod table;
pub mod user;

// Re-export commonly used types for convenience
pub use data_element::{DataElement, DataElementBuilder, DataElementGroup, DictionaryEntry};
pub use data_value::DataValueRecord;
pub use errors::{ApiError, SeedError, ValidationError};
pub use ids::{Uid, DEFAULT_UID_LENGTH};
pub use org_unit::{OrgUnit, OrgUnitLevel, OrgUnitSource};
pub use result::Result;
pub use table::{LongRecord, Table};
pub use user::{User, UserRecord, UserRole};
