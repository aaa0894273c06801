use rand::Rng;

const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Length of referral codes generated for members that did not bring one.
pub const REFERRAL_CODE_LENGTH: usize = 5;

/// Random lowercase code of exactly `length` characters.
///
/// Nothing checks the result against codes already handed out; callers
/// that need uniqueness rely on the `members.referral_code` constraint.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
