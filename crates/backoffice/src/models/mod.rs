//! Entity records mirrored from the remote tables.
//!
//! Each record maps one-to-one to a table row and carries its table name and
//! key column through [`Record`](crate::remote::Record). Records are plain
//! data: identifiers are generated by the caller at create time, never in a
//! constructor default.

pub mod brand;
pub mod customer;
pub mod sale;
pub mod sneaker;
pub mod staff;

pub use brand::Brand;
pub use customer::Customer;
pub use sale::{Sale, SaleDetail};
pub use sneaker::Sneaker;
pub use staff::Staff;

use serde::{Deserialize, Deserializer};

/// Read a nullable column, treating `null` as the type's default.
///
/// Pair with `#[serde(default)]` so a missing key reads the same way.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
