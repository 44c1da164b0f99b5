use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

pub const FORK_BYTES_LEN: usize = 4;

/// Strips an optional `0x` prefix.
fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

pub fn fork_from_hex_str<'de, D>(deserializer: D) -> Result<[u8; FORK_BYTES_LEN], D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    let decoded: Vec<u8> = hex::decode(strip_prefix(&s)).map_err(D::Error::custom)?;

    if decoded.len() != FORK_BYTES_LEN {
        return Err(D::Error::custom(format!(
            "expected {} fork version bytes, got {}",
            FORK_BYTES_LEN,
            decoded.len()
        )));
    }

    let mut array = [0; FORK_BYTES_LEN];
    array.copy_from_slice(&decoded);
    Ok(array)
}

#[allow(clippy::trivially_copy_pass_by_ref)] // Serde requires the `bytes` to be a ref.
pub fn fork_to_hex_str<S>(bytes: &[u8; FORK_BYTES_LEN], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut hex_string: String = "0x".to_string();
    hex_string.push_str(&hex::encode(bytes));

    serializer.serialize_str(&hex_string)
}
