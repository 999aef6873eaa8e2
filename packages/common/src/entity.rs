use serde::{de::DeserializeOwned, Serialize};

/// Anything a draft or a grid row can hold.
///
/// Equality is structural: two values are "the same entity state" when
/// `==` says so, which is what drives the dirty flag.
pub trait Entity: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Entity for T where T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{}
