mod deserializer;

pub use deserializer::{Deserializer, SliceDeserializer};
