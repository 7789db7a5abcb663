//! User mention parsing.
//!
//! Mentions arrive as `<@id>` or, for members with a nickname, `<@!id>`.

/// Extract the user id from a mention token.
///
/// # Examples
///
/// ```
/// use keyward_proto::parse_user_mention;
///
/// assert_eq!(parse_user_mention("<@123>"), Some("123"));
/// assert_eq!(parse_user_mention("<@!123>"), Some("123"));
/// assert_eq!(parse_user_mention("123"), None);
/// ```
pub fn parse_user_mention(token: &str) -> Option<&str> {
    let inner = token.strip_prefix("<@")?.strip_suffix('>')?;
    let id = inner.strip_prefix('!').unwrap_or(inner);
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Some(id)
    } else {
        None
    }
}

/// Accept either a raw id or a mention where a user id is expected.
pub fn normalize_user_arg(token: &str) -> &str {
    parse_user_mention(token).unwrap_or(token)
}

/// Render a user mention.
pub fn user_mention(id: &str) -> String {
    format!("<@{}>", id)
}

/// Render a channel mention.
pub fn channel_mention(id: &str) -> String {
    format!("<#{}>", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_mentions_are_not_users() {
        assert_eq!(parse_user_mention("<@&99>"), None);
    }

    #[test]
    fn empty_and_malformed() {
        assert_eq!(parse_user_mention("<@>"), None);
        assert_eq!(parse_user_mention("<@12"), None);
        assert_eq!(parse_user_mention("@12>"), None);
    }

    #[test]
    fn normalize_passes_raw_ids_through() {
        assert_eq!(normalize_user_arg("555"), "555");
        assert_eq!(normalize_user_arg("<@!555>"), "555");
    }

    #[test]
    fn render() {
        assert_eq!(user_mention("1"), "<@1>");
        assert_eq!(channel_mention("2"), "<#2>");
    }
}
