use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use bincode::{
    de::{BorrowDecoder, Decoder},
    enc::Encoder,
    error::{DecodeError, EncodeError},
    BorrowDecode, Decode, Encode,
};
use hashbrown::HashMap;

/// Hash map stored as a list of pairs, sorted by key so that encoded artifacts are stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SerializableHashMap<K, V>(pub HashMap<K, V>)
where
    K: Eq + Hash;

impl<K, V> Deref for SerializableHashMap<K, V>
where
    K: Eq + Hash,
{
    type Target = HashMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K, V> DerefMut for SerializableHashMap<K, V>
where
    K: Eq + Hash,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K, V> FromIterator<(K, V)> for SerializableHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<Context, K, V> Decode<Context> for SerializableHashMap<K, V>
where
    K: Decode<Context> + Eq + Hash,
    V: Decode<Context>,
{
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let raw: Vec<(K, V)> = Decode::decode(decoder)?;
        Ok(Self(raw.into_iter().collect()))
    }
}

impl<'de, Context, K, V> BorrowDecode<'de, Context> for SerializableHashMap<K, V>
where
    K: Decode<Context> + Eq + Hash,
    V: Decode<Context>,
{
    fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> Result<Self, DecodeError> {
        Decode::decode(decoder)
    }
}

impl<K, V> Encode for SerializableHashMap<K, V>
where
    K: Encode + Eq + Hash + Ord,
    V: Encode,
{
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        let mut raw: Vec<(&K, &V)> = self.0.iter().collect();
        raw.sort_unstable_by(|a, b| a.0.cmp(b.0));
        Encode::encode(&raw, encoder)?;
        Ok(())
    }
}

/// Returns the key with the highest count; ties go to the smallest key.
pub fn most_frequent<K>(counts: &HashMap<K, usize>) -> Option<(&K, usize)>
where
    K: Ord + Hash + Eq,
{
    counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then_with(|| kb.cmp(ka)))
        .map(|(k, &c)| (k, c))
}
