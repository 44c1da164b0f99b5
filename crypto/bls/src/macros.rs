/// Implements `ssz::Encode` and `ssz::Decode` for a fixed-length byte wrapper.
macro_rules! impl_ssz {
    ($type: ident, $byte_size: expr) => {
        impl ssz::Encode for $type {
            fn is_ssz_fixed_len() -> bool {
                true
            }

            fn ssz_fixed_len() -> usize {
                $byte_size
            }

            fn ssz_bytes_len(&self) -> usize {
                $byte_size
            }

            fn ssz_append(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.bytes)
            }
        }

        impl ssz::Decode for $type {
            fn is_ssz_fixed_len() -> bool {
                true
            }

            fn ssz_fixed_len() -> usize {
                $byte_size
            }

            fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, ssz::DecodeError> {
                let len = bytes.len();
                let expected = <Self as ssz::Decode>::ssz_fixed_len();

                if len != expected {
                    Err(ssz::DecodeError::InvalidByteLength { len, expected })
                } else {
                    let mut array = [0; $byte_size];
                    array.copy_from_slice(bytes);
                    Ok(Self { bytes: array })
                }
            }
        }
    };
}

/// Implements `tree_hash::TreeHash` for a fixed-length byte wrapper, treating it as a vector of
/// bytes.
macro_rules! impl_tree_hash {
    ($type: ident) => {
        impl tree_hash::TreeHash for $type {
            fn tree_hash_type() -> tree_hash::TreeHashType {
                tree_hash::TreeHashType::Vector
            }

            fn tree_hash_packed_encoding(&self) -> tree_hash::PackedEncoding {
                unreachable!("Vector should never be packed.")
            }

            fn tree_hash_packing_factor() -> usize {
                unreachable!("Vector should never be packed.")
            }

            fn tree_hash_root(&self) -> tree_hash::Hash256 {
                // Each 32-byte chunk is a leaf; the final chunk is zero-padded.
                let minimum_leaf_count = (self.bytes.len() + 31) / 32;
                tree_hash::merkle_root(&self.bytes, minimum_leaf_count)
            }
        }
    };
}

/// Implements `serde` for a fixed-length byte wrapper as a `0x`-prefixed hex string.
macro_rules! impl_serde_hex {
    ($type: ident) => {
        impl serde::Serialize for $type {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.as_hex_string())
            }
        }

        impl<'de> serde::Deserialize<'de> for $type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let string = String::deserialize(deserializer)?;
                Self::from_hex_str(&string).map_err(|e| serde::de::Error::custom(format!("{:?}", e)))
            }
        }
    };
}

/// Defines a struct holding `$byte_size` bytes which may or may not be a valid BLS point.
///
/// Validation is deferred until the bytes are handed to a `SignatureVerifier`, so states and
/// attestations can carry (and hash) points without paying for decompression.
macro_rules! bytes_struct {
    ($name: ident, $byte_size: expr, $small_name: expr) => {
        #[doc = "Stores bytes which may or may not represent a valid BLS "]
        #[doc = $small_name]
        #[doc = "."]
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            bytes: [u8; $byte_size],
        }

        impl $name {
            /// Instantiates `Self` with all-zeros.
            pub fn empty() -> Self {
                Self {
                    bytes: [0; $byte_size],
                }
            }

            pub fn deserialize(bytes: &[u8]) -> Result<Self, $crate::Error> {
                if bytes.len() == $byte_size {
                    let mut array = [0; $byte_size];
                    array.copy_from_slice(bytes);
                    Ok(Self { bytes: array })
                } else {
                    Err($crate::Error::InvalidByteLength {
                        got: bytes.len(),
                        expected: $byte_size,
                    })
                }
            }

            pub fn serialize(&self) -> [u8; $byte_size] {
                self.bytes
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.bytes
            }

            pub fn as_hex_string(&self) -> String {
                format!("0x{}", hex::encode(self.bytes))
            }

            pub fn from_hex_str(s: &str) -> Result<Self, $crate::Error> {
                let stripped = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(stripped).map_err($crate::Error::InvalidHex)?;
                Self::deserialize(&bytes)
            }
        }

        impl From<[u8; $byte_size]> for $name {
            fn from(bytes: [u8; $byte_size]) -> Self {
                Self { bytes }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::empty()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", self.as_hex_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", self.as_hex_string())
            }
        }

        impl_ssz!($name, $byte_size);
        impl_tree_hash!($name);
        impl_serde_hex!($name);
    };
}
