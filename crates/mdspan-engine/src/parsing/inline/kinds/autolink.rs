use std::sync::OnceLock;

use regex::Regex;

/// `<scheme:...>` and `<user@host>` autolinks.
pub struct Autolink;

impl Autolink {
    pub const MIN_SCHEME: usize = 2;
    pub const MAX_SCHEME: usize = 32;

    /// Returns true if `content` (between the angle brackets) is an absolute URI.
    pub fn is_uri(content: &[char]) -> bool {
        let Some(colon) = content.iter().position(|c| *c == ':') else {
            return false;
        };
        let scheme = &content[..colon];

        (Self::MIN_SCHEME..=Self::MAX_SCHEME).contains(&scheme.len())
            && scheme[0].is_ascii_alphabetic()
            && scheme
                .iter()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
            && content[colon + 1..]
                .iter()
                .all(|c| !c.is_whitespace() && !c.is_control() && *c != '<' && *c != '>')
    }

    /// Returns true if `content` is an email address.
    pub fn is_email(content: &[char]) -> bool {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let email_regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(
                r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
            )
            .expect("Invalid email regex")
        });

        email_regex.is_match(&content.iter().collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[rstest]
    #[case("http://example.com/a?b=c", true)]
    #[case("irc://foo.bar:2233/baz", true)]
    #[case("a+b+c:d", true)]
    #[case("made-up-scheme://foo,bar", true)]
    #[case("m:abc", false)]
    #[case("http://a b", false)]
    #[case("localhost", false)]
    fn uris(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(Autolink::is_uri(&chars(input)), expected);
    }

    #[rstest]
    #[case("foo@bar.example.com", true)]
    #[case("foo+special@Bar.baz-bar0.com", true)]
    #[case("foo\\+@bar.example.com", false)]
    #[case("@bar", false)]
    fn emails(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(Autolink::is_email(&chars(input)), expected);
    }
}
