/// Split free-text tag input into symbol names.
///
/// Tokens are separated by commas, whitespace, or `#` — the convention the
/// journal UI advertises ("separate with commas, spaces, or # symbols").
/// Empty tokens are dropped; casing is preserved, since symbol names are
/// case-sensitive.
pub fn parse_tag_input(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c == '#' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_commas_whitespace_and_hash() {
        assert_eq!(
            parse_tag_input("flying, water #teeth  falling"),
            vec!["flying", "water", "teeth", "falling"]
        );
    }

    #[test]
    fn drops_empty_tokens() {
        assert_eq!(parse_tag_input(" ,, ##  "), Vec::<String>::new());
        assert_eq!(parse_tag_input(""), Vec::<String>::new());
    }

    #[test]
    fn preserves_case() {
        assert_eq!(parse_tag_input("Ocean ocean"), vec!["Ocean", "ocean"]);
    }
}
