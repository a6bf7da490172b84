use rand::RngCore;

/// Random bytes behind every verification code.
pub const CODE_BYTES: usize = 32;

/// Hex encoded CSPRNG output, `2 * byte_len` characters long.
pub fn random_token(byte_len: usize) -> String {
    let mut buf = vec![0u8; byte_len];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}
