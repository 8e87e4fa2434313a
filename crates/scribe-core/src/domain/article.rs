//! Article model: slug derivation, fence cleanup, output file name.
//!
//! Pure functions only. Writing the file is the runner's job.

use chrono::NaiveDate;

/// Default maximum slug length in characters.
pub const DEFAULT_SLUG_MAX_LEN: usize = 50;

/// Used when a question has no usable characters at all.
const FALLBACK_SLUG: &str = "post";

const FENCE: &str = "```";

/// Derive a filesystem-safe slug from question text.
///
/// Keeps ASCII alphanumerics, whitespace and hyphens; trims; turns each
/// whitespace character into a hyphen; lowercases; truncates to `max_len`.
/// Hyphens left dangling by the truncation are dropped.
///
/// `"What is a Load Balancer?"` -> `"what-is-a-load-balancer"`
pub fn slugify(question: &str, max_len: usize) -> String {
    let kept: String = question
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let slug: String = kept
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() {
                '-'
            } else {
                c.to_ascii_lowercase()
            }
        })
        .take(max_len)
        .collect();

    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Remove an enclosing code fence the generation service may have added.
///
/// A leading fence line (with or without a language tag, e.g. ` ```markdown `)
/// is stripped together with the matching trailing ` ``` `. Text that does not
/// open with a fence is only trimmed, so an article ending in a code block
/// keeps its closing fence.
pub fn strip_fences(raw: &str) -> String {
    let text = raw.trim();
    if !text.starts_with(FENCE) {
        return text.to_string();
    }

    let body = match text.find('\n') {
        Some(newline) => &text[newline + 1..],
        None => "",
    };
    let body = body.trim_end();
    let body = body.strip_suffix(FENCE).unwrap_or(body);

    body.trim().to_string()
}

/// `{YYYY-MM-DD}-{slug}.md`
pub fn article_file_name(date: NaiveDate, question: &str, max_len: usize) -> String {
    format!("{}-{}.md", date.format("%Y-%m-%d"), slugify(question, max_len))
}

/// A cleaned article ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub file_name: String,
    pub content: String,
}

impl Article {
    pub fn new(date: NaiveDate, question: &str, generated: &str, slug_max_len: usize) -> Self {
        Self {
            file_name: article_file_name(date, question, slug_max_len),
            content: strip_fences(generated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::load_balancer("What is a Load Balancer?", "what-is-a-load-balancer")]
    #[case::punctuation("CAP theorem: C, A or P?", "cap-theorem-c-a-or-p")]
    #[case::hyphen_kept("Write-ahead logging", "write-ahead-logging")]
    #[case::padded("   Sharding  ", "sharding")]
    #[case::non_ascii("Qu'est-ce que le café?", "quest-ce-que-le-caf")]
    #[case::only_punctuation("???", "post")]
    fn slug_derivation(#[case] question: &str, #[case] expected: &str) {
        assert_eq!(slugify(question, DEFAULT_SLUG_MAX_LEN), expected);
    }

    #[test]
    fn slug_is_truncated() {
        let question = "How does a distributed consensus protocol like Raft handle leader election?";
        let slug = slugify(question, DEFAULT_SLUG_MAX_LEN);
        assert!(slug.len() <= DEFAULT_SLUG_MAX_LEN);
        assert!(slug.starts_with("how-does-a-distributed-consensus"));
        assert!(!slug.ends_with('-'));
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        );
    }

    #[test]
    fn slug_truncation_drops_dangling_hyphen() {
        assert_eq!(slugify("abc def", 4), "abc");
    }

    #[rstest]
    #[case::tagged("```markdown\n---\ntitle: x\n---\nbody\n```", "---\ntitle: x\n---\nbody")]
    #[case::bare("```\nbody\n```\n", "body")]
    #[case::none("  body text  \n", "body text")]
    #[case::only_opening("```md\nbody", "body")]
    #[case::inner_fence_kept(
        "```markdown\nintro\n```rust\nfn main() {}\n```\noutro\n```",
        "intro\n```rust\nfn main() {}\n```\noutro"
    )]
    #[case::closing_code_block_kept("intro\n```sh\nls\n```", "intro\n```sh\nls\n```")]
    fn fence_stripping(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(strip_fences(raw), expected);
    }

    #[test]
    fn file_name_uses_date_and_slug() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            article_file_name(date, "What is a Load Balancer?", DEFAULT_SLUG_MAX_LEN),
            "2024-03-09-what-is-a-load-balancer.md"
        );
    }

    #[test]
    fn article_cleans_generated_text() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let article = Article::new(date, "What is DNS?", "```markdown\n# DNS\n```", 50);
        assert_eq!(article.file_name, "2024-03-09-what-is-dns.md");
        assert_eq!(article.content, "# DNS");
    }
}
