use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;

const TOKEN_BYTES: usize = 24;

/// URL-safe share token with 24 bytes of OS entropy.
pub fn generate_share_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// The sharing state machine. Turning sharing off keeps the token, so the
/// same URL works again when the trip is re-shared; turning it on mints a
/// token only if the trip never had one.
pub fn toggle_sharing(
    is_public: bool,
    share_token: Option<String>,
) -> (bool, Option<String>) {
    if is_public {
        (false, share_token)
    } else {
        let token = share_token.unwrap_or_else(generate_share_token);
        (true, Some(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_share_mints_a_token() {
        let (public, token) = toggle_sharing(false, None);
        assert!(public);
        let token = token.expect("token must be set on first share");
        assert!(token.len() >= 22, "need at least 16 bytes of entropy");
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn unsharing_retains_the_token() {
        let (public, token) = toggle_sharing(true, Some("abc123".to_string()));
        assert!(!public);
        assert_eq!(token.as_deref(), Some("abc123"));
    }

    #[test]
    fn double_toggle_round_trips_with_stable_token() {
        let (public, token) = toggle_sharing(false, None);
        assert!(public);
        let minted = token.clone().unwrap();

        let (public, token) = toggle_sharing(public, token);
        assert!(!public);
        assert_eq!(token.as_deref(), Some(minted.as_str()));

        // Re-sharing reuses the original token rather than minting a new one.
        let (public, token) = toggle_sharing(public, token);
        assert!(public);
        assert_eq!(token.as_deref(), Some(minted.as_str()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_share_token(), generate_share_token());
    }
}
