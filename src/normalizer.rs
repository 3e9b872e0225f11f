/// Text canonicalization shared by training and scoring
///
/// Both the dataset rows and live scoring input go through `normalize`, so the
/// feature extractor always sees the same shape of text.
use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"#.*").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip `#` comments to end of line, collapse whitespace runs, trim.
pub fn normalize(text: &str) -> String {
    let without_comments = COMMENT.replace_all(text, " ");
    WHITESPACE
        .replace_all(&without_comments, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_comments_and_whitespace() {
        let raw = "# generated 2024-01-01\nresource \"azurerm_resource_group\" \"rg\" {\n  name     = \"rg\"  # inline\n}\n# eof\n";
        assert_eq!(
            normalize(raw),
            "resource \"azurerm_resource_group\" \"rg\" { name = \"rg\" }"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
        assert_eq!(normalize("# only a comment"), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "a  b\tc\n\nd",
            "x # y\n# z\n  w  ",
            "resource \"a\" \"b\" {\n  subnet_id = azurerm_subnet.s.id\n}",
            "####\n#\n",
            "  leading and trailing  ",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
