use crate::SIGNATURE_BYTES_LEN;

bytes_struct!(SignatureBytes, SIGNATURE_BYTES_LEN, "signature");

impl SignatureBytes {
    /// Returns the compressed point at infinity, the aggregate of zero signatures.
    pub fn infinity() -> Self {
        let mut bytes = [0; SIGNATURE_BYTES_LEN];
        bytes[0] = 0xc0;
        Self::from(bytes)
    }
}
