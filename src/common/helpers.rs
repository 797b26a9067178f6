// Helper functions for safe logging

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    let parts: Vec<&str> = email.split('@').collect();
    if email.len() > 3 && parts.len() == 2 {
        // First char, not first byte: Kakao local parts are often multi-byte
        match parts[0].chars().next() {
            Some(first) => format!("{}***@{}", first, parts[1]),
            None => "***@***.***".to_string(),
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
///
/// # Example
/// ```
/// let masked = safe_token_log("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
/// // Returns: "eyJh...VCJ9"
/// ```
pub fn safe_token_log(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_the_email_local_part() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
    }

    #[test]
    fn masks_a_multibyte_local_part() {
        assert_eq!(safe_email_log("앤디@example.com"), "앤***@example.com");
    }

    #[test]
    fn malformed_emails_are_fully_masked() {
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
        assert_eq!(safe_email_log("a@b"), "***@***.***");
        assert_eq!(safe_email_log("@example.com"), "***@***.***");
    }

    #[test]
    fn shows_only_token_edges() {
        assert_eq!(safe_token_log("abcdefghijkl"), "abcd...ijkl");
    }

    #[test]
    fn masks_a_multibyte_token_on_char_boundaries() {
        assert_eq!(safe_token_log("토큰토큰토큰토큰토"), "토큰토큰...큰토큰토");
    }

    #[test]
    fn short_tokens_are_fully_masked() {
        assert_eq!(safe_token_log("short"), "***");
        assert_eq!(safe_token_log("토큰토큰토큰"), "***");
    }
}
