use rand::{thread_rng, Rng};

/// Length of generated paste ids.
pub const PASTE_ID_LENGTH: usize = 8;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a random alphanumeric string.
///
/// Characters are sampled independently from the thread-local CSPRNG, so
/// concurrent callers never share a sequence.
pub fn generate_id(length: usize) -> String {
    let mut rng = thread_rng();
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

pub fn generate_paste_id() -> String {
    generate_id(PASTE_ID_LENGTH)
}
