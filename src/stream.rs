//! Incremental decoding of the database indexes.
//!
//! The indexes are JSON arrays of small objects and can be large, so they are
//! decoded one element at a time. Once the caller has what it needs, the rest
//! of the array is only scanned for syntax, never decoded.

use std::fmt;
use std::marker::PhantomData;
use std::ops::ControlFlow;

use serde::de::{DeserializeOwned, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer as _};

/// Calls `f` with each element of the JSON array in `bytes`, in order, until
/// it returns [`ControlFlow::Break`].
///
/// A malformed document is an error even if the malformed part comes after
/// the element that stopped the walk.
pub(crate) fn for_each_element<T, F>(bytes: &[u8], f: F) -> serde_json::Result<()>
where
    T: DeserializeOwned,
    F: FnMut(T) -> ControlFlow<()>,
{
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    (&mut deserializer).deserialize_seq(Elements {
        f,
        marker: PhantomData,
    })?;
    deserializer.end()
}

struct Elements<T, F> {
    f: F,
    marker: PhantomData<fn() -> T>,
}

impl<'de, T, F> Visitor<'de> for Elements<T, F>
where
    T: Deserialize<'de>,
    F: FnMut(T) -> ControlFlow<()>,
{
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an array of index records")
    }

    fn visit_seq<A>(mut self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        while let Some(element) = seq.next_element::<T>()? {
            if (self.f)(element).is_break() {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                break;
            }
        }
        Ok(())
    }
}
