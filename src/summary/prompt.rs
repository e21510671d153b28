//! Prompt assembly, category extraction and the fallback digest.

use std::fmt::Write as _;

use crate::feed::Article;

/// Content shorter than this is left out of the prompt.
const MIN_EXCERPT_CHARS: usize = 100;

/// Titles listed per source in the fallback digest.
const FALLBACK_TITLES_PER_SOURCE: usize = 5;

const CATEGORY_MARKERS: [&str; 3] = ["Categories", "分类", "类别"];

/// Format articles as a numbered list for the completion request.
///
/// Content longer than 100 characters is included as a plain-text excerpt of
/// at most `content_cap` characters.
pub fn format_articles(articles: &[Article], content_cap: usize) -> String {
    let mut out = String::from("Today's RSS articles:\n\n");

    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(out, "{}. Title: {}", i + 1, article.title);
        let _ = writeln!(out, "   Source: {}", article.source_name);
        let _ = writeln!(out, "   Link: {}", article.link);

        let text = plain_text(&article.content);
        if text.chars().count() > MIN_EXCERPT_CHARS {
            let _ = writeln!(out, "   Excerpt: {}", truncate_chars(&text, content_cap));
        }
        out.push('\n');
    }

    out
}

/// Truncate to `max` characters, marking the cut with "...".
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Strip HTML tags and decode common entities, collapsing whitespace.
pub fn plain_text(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut entity: Option<String> = None;

    for ch in html.chars() {
        if let Some(ref mut name) = entity {
            if ch == ';' {
                push_entity(&mut result, name);
                entity = None;
            } else if ch.is_ascii_alphanumeric() || ch == '#' {
                name.push(ch);
            } else {
                // Not an entity after all
                result.push('&');
                result.push_str(name);
                entity = None;
                if ch == '<' {
                    in_tag = true;
                } else {
                    result.push(ch);
                }
            }
            continue;
        }

        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                result.push(' ');
            }
            '&' if !in_tag => entity = Some(String::new()),
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    if let Some(name) = entity {
        result.push('&');
        result.push_str(&name);
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_entity(out: &mut String, name: &str) {
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse().ok(),
            };
            code.and_then(char::from_u32)
        }),
    };

    match decoded {
        Some(c) => out.push(c),
        None => {
            out.push('&');
            out.push_str(name);
            out.push(';');
        }
    }
}

/// Pull the category section out of a model summary.
///
/// After a line mentioning a category marker, bullet lines and `label: value`
/// lines are collected until the first line of another shape.
pub fn extract_categories(summary: &str) -> String {
    let mut categories: Vec<&str> = Vec::new();
    let mut in_section = false;

    for line in summary.lines().map(str::trim) {
        if CATEGORY_MARKERS.iter().any(|marker| line.contains(marker)) {
            in_section = true;
            continue;
        }
        if !in_section || line.is_empty() {
            continue;
        }

        let is_bullet = line.starts_with('-') || line.starts_with('•') || line.starts_with('*');
        if is_bullet || line.contains(':') || line.contains('：') {
            categories.push(line);
        } else if !categories.is_empty() {
            break;
        }
    }

    categories.join("\n")
}

/// Deterministic digest used when no completion is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackDigest {
    /// Markdown summary.
    pub summary: String,
    /// One `source: count` line per source.
    pub categories: String,
}

fn count_noun(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Group articles by source, listing counts and the first few titles.
pub fn fallback_digest(articles: &[Article]) -> FallbackDigest {
    let mut groups: Vec<(&str, Vec<&Article>)> = Vec::new();
    for article in articles {
        let source = if article.source_name.trim().is_empty() {
            "Unknown"
        } else {
            article.source_name.as_str()
        };
        match groups.iter_mut().find(|(name, _)| *name == source) {
            Some((_, list)) => list.push(article),
            None => groups.push((source, vec![article])),
        }
    }

    let mut summary = format!(
        "{} from {}.\n",
        count_noun(articles.len(), "article"),
        count_noun(groups.len(), "source")
    );
    let mut categories = Vec::with_capacity(groups.len());

    for (source, list) in &groups {
        let _ = write!(summary, "\n## {} ({})\n", source, list.len());
        for article in list.iter().take(FALLBACK_TITLES_PER_SOURCE) {
            let _ = writeln!(summary, "- [{}]({})", article.title, article.link);
        }
        if list.len() > FALLBACK_TITLES_PER_SOURCE {
            let _ = writeln!(
                summary,
                "- ... and {} more",
                list.len() - FALLBACK_TITLES_PER_SOURCE
            );
        }
        categories.push(format!("{}: {}", source, list.len()));
    }

    FallbackDigest {
        summary,
        categories: categories.join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, source: &str, content: &str) -> Article {
        Article {
            uid: title.to_string(),
            feed_id: 1,
            owner: "a@example.com".to_string(),
            source_name: source.to_string(),
            title: title.to_string(),
            link: format!("https://example.com/{title}"),
            content: content.to_string(),
            read: false,
            deleted: false,
            created_at: 0,
            published_at: 0,
        }
    }

    #[test]
    fn test_format_articles_excerpt_rules() {
        let long = format!("<p>{}</p>", "x".repeat(600));
        let articles = vec![
            article("Short", "Blog", "<p>tiny</p>"),
            article("Long", "News", &long),
        ];

        let text = format_articles(&articles, 500);
        assert!(text.contains("1. Title: Short\n   Source: Blog\n   Link: https://example.com/Short\n"));
        assert!(!text.contains("tiny"));

        let excerpt = text
            .lines()
            .find_map(|l| l.trim_start().strip_prefix("Excerpt: "))
            .unwrap();
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.matches('x').count(), 500);
        assert!(!excerpt.contains("<p>"));
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語...");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(plain_text("<p>Hello <b>World</b></p>"), "Hello World");
        assert_eq!(plain_text("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(plain_text("&#65;&#x42;"), "AB");
        assert_eq!(plain_text("fish & chips"), "fish & chips");
        assert_eq!(plain_text("&unknown;"), "&unknown;");
        assert_eq!(plain_text("line1<br/>line2"), "line1 line2");
    }

    #[test]
    fn test_extract_categories_bullets() {
        let summary = "Overview\nLots happened.\n\nCategories:\n- Rust: 3 articles\n- Go: 1 article\n\nHighlights\nsomething";
        assert_eq!(
            extract_categories(summary),
            "- Rust: 3 articles\n- Go: 1 article"
        );
    }

    #[test]
    fn test_extract_categories_label_lines_and_chinese_marker() {
        let summary = "## 分类整理\n技术：5篇\n生活：2篇\n重点摘要\n更多";
        assert_eq!(extract_categories(summary), "技术：5篇\n生活：2篇");
    }

    #[test]
    fn test_extract_categories_none() {
        assert_eq!(extract_categories("Just a summary\n- bullet"), "");
    }

    #[test]
    fn test_fallback_digest_groups_by_source() {
        let mut articles: Vec<Article> = (0..7)
            .map(|i| article(&format!("News {i}"), "Daily News", ""))
            .collect();
        articles.push(article("Post", "Blog", ""));
        articles.push(article("Orphan", "", ""));

        let digest = fallback_digest(&articles);
        assert!(digest.summary.starts_with("9 articles from 3 sources."));
        assert!(digest.summary.contains("## Daily News (7)"));
        assert!(digest.summary.contains("- [News 4](https://example.com/News 4)"));
        assert!(!digest.summary.contains("[News 5]"));
        assert!(digest.summary.contains("- ... and 2 more"));
        assert_eq!(digest.categories, "Daily News: 7\nBlog: 1\nUnknown: 1");
    }
}
