//! The chunk payload as seen by the region codec.
//!
//! A region file never looks inside a chunk beyond reading and writing one
//! integer array (the biome plane). Everything else is opaque, so the payload
//! type only needs to parse, serialize and expose path-based array access.

use fastnbt::{ByteArray, IntArray, Value};
use thiserror::Error;

/// Path of the legacy per-column biome array inside a chunk.
pub const BIOMES_PATH: &[&str] = &["Level", "Biomes"];

pub trait TagTree: Sized + Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Parse the uncompressed payload.
    fn parse(bytes: &[u8]) -> Result<Self, Self::Error>;

    /// Canonical uncompressed byte form, the input to compression.
    fn serialize(&self) -> Result<Vec<u8>, Self::Error>;

    /// Integer array leaf at `path`, if present.
    fn int_array(&self, path: &[&str]) -> Option<Vec<i32>>;

    /// Whether [`TagTree::set_int_array`] would accept `values` at `path`.
    /// Leaves the tree untouched.
    fn check_int_array(&self, path: &[&str], values: &[i32]) -> Result<(), Self::Error>;

    /// Overwrite (or create) the integer array leaf at `path`.
    /// Every compound above the leaf must already exist.
    fn set_int_array(&mut self, path: &[&str], values: &[i32]) -> Result<(), Self::Error>;
}

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("NBT error: {0}")]
    Nbt(#[from] fastnbt::error::Error),
    #[error("No compound at {0}")]
    MissingCompound(String),
    #[error("Empty path")]
    EmptyPath,
    #[error("Value {value} does not fit the byte array at {path}")]
    OutOfRange { path: String, value: i32 },
}

fn walk<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| match node {
        Value::Compound(map) => map.get(*key),
        _ => None,
    })
}

fn walk_mut<'a>(root: &'a mut Value, path: &[&str]) -> Option<&'a mut Value> {
    path.iter().try_fold(root, |node, key| match node {
        Value::Compound(map) => map.get_mut(*key),
        _ => None,
    })
}

impl TagTree for Value {
    type Error = TreeError;

    fn parse(bytes: &[u8]) -> Result<Self, TreeError> {
        Ok(fastnbt::from_bytes(bytes)?)
    }

    fn serialize(&self) -> Result<Vec<u8>, TreeError> {
        Ok(fastnbt::to_bytes(self)?)
    }

    fn int_array(&self, path: &[&str]) -> Option<Vec<i32>> {
        match walk(self, path)? {
            Value::IntArray(values) => Some(values.iter().copied().collect()),
            // pre-1.13 chunks store biome ids as unsigned bytes
            Value::ByteArray(values) => Some(values.iter().map(|&b| b as u8 as i32).collect()),
            _ => None,
        }
    }

    fn check_int_array(&self, path: &[&str], values: &[i32]) -> Result<(), TreeError> {
        let (leaf, parents) = path.split_last().ok_or(TreeError::EmptyPath)?;
        let Some(Value::Compound(parent)) = walk(self, parents) else {
            return Err(TreeError::MissingCompound(parents.join("/")));
        };
        if let Some(Value::ByteArray(_)) = parent.get(*leaf) {
            if let Some(&value) = values.iter().find(|&&v| u8::try_from(v).is_err()) {
                return Err(TreeError::OutOfRange {
                    path: path.join("/"),
                    value,
                });
            }
        }
        Ok(())
    }

    fn set_int_array(&mut self, path: &[&str], values: &[i32]) -> Result<(), TreeError> {
        self.check_int_array(path, values)?;
        let (leaf, parents) = path.split_last().ok_or(TreeError::EmptyPath)?;
        let Some(Value::Compound(parent)) = walk_mut(self, parents) else {
            return Err(TreeError::MissingCompound(parents.join("/")));
        };

        let replacement = match parent.get(*leaf) {
            // checked above, every value fits in 0..=255
            Some(Value::ByteArray(_)) => {
                Value::ByteArray(ByteArray::new(values.iter().map(|&v| v as u8 as i8).collect()))
            }
            _ => Value::IntArray(IntArray::new(values.to_vec())),
        };
        parent.insert(leaf.to_string(), replacement);
        Ok(())
    }
}
