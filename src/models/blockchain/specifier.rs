//! Block specifiers: either a concrete height or a named tag understood by the node.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Named block tags supported by execution clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTag {
	Latest,
	Safe,
	Finalized,
}

impl BlockTag {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Latest => "latest",
			Self::Safe => "safe",
			Self::Finalized => "finalized",
		}
	}
}

impl fmt::Display for BlockTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for BlockTag {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"latest" => Ok(Self::Latest),
			"safe" => Ok(Self::Safe),
			"finalized" => Ok(Self::Finalized),
			_ => Err(format!("unsupported block specifier {}", s)),
		}
	}
}

/// Parses a configured block specifier.
///
/// The empty string means "no specifier", in which case the listener falls back to the block
/// delay. Matching is case-insensitive.
pub fn parse_block_specifier(specifier: &str) -> Result<Option<BlockTag>, String> {
	if specifier.is_empty() {
		return Ok(None);
	}
	specifier.parse().map(Some)
}

/// Serde adapter for `Option<BlockTag>` using the configured string form (`""` for none).
pub mod specifier_serde {
	use super::*;

	pub fn serialize<S: Serializer>(value: &Option<BlockTag>, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(value.map(|tag| tag.as_str()).unwrap_or(""))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(
		deserializer: D,
	) -> Result<Option<BlockTag>, D::Error> {
		let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
		parse_block_specifier(&raw).map_err(serde::de::Error::custom)
	}
}

/// Identifies a block to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockId {
	Number(u64),
	Tag(BlockTag),
}

impl BlockId {
	/// Returns the JSON-RPC parameter form: a hex quantity or the tag name.
	pub fn to_rpc_param(&self) -> String {
		match self {
			Self::Number(n) => format!("{:#x}", n),
			Self::Tag(tag) => tag.as_str().to_string(),
		}
	}
}

impl fmt::Display for BlockId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Number(n) => write!(f, "{}", n),
			Self::Tag(tag) => write!(f, "{}", tag),
		}
	}
}

impl From<u64> for BlockId {
	fn from(number: u64) -> Self {
		Self::Number(number)
	}
}

impl From<BlockTag> for BlockId {
	fn from(tag: BlockTag) -> Self {
		Self::Tag(tag)
	}
}

impl Serialize for BlockId {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_rpc_param())
	}
}
