use rand::{Rng, distributions::Alphanumeric};

/// Length of opaque session identifiers.
pub const SESSION_ID_LENGTH: usize = 64;

/// Generates a random alphanumeric string of the specified length.
///
/// The generated string contains uppercase letters (A-Z), lowercase letters (a-z),
/// and digits (0-9). `thread_rng` is a CSPRNG, so the output is suitable for
/// unguessable identifiers such as session ids.
///
/// # Examples
///
/// ```ignore
/// let token = generate_random_string(32);
/// assert_eq!(token.len(), 32);
/// ```
pub fn generate_random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_alphabet() {
        let token = generate_random_string(SESSION_ID_LENGTH);
        assert_eq!(token.len(), SESSION_ID_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_differ() {
        assert_ne!(generate_random_string(32), generate_random_string(32));
    }
}
