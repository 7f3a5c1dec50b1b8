// src/utils/html.rs

//! Rich-text HTML sanitization and plain-text validation.
//!
//! Admin clients submit editor-generated HTML for simulation and task
//! fields. Before anything reaches storage it passes through [`sanitize`],
//! which neutralizes script-execution vectors, and
//! [`validate_plain_text_length`], which gates content on its plain-text
//! character count.
//!
//! This is a pattern-based filter tuned to a narrow set of editor outputs,
//! not a general-purpose HTML parser. Malformed markup degrades gracefully
//! (partial stripping) instead of failing; only matched open/close pairs of
//! dangerous elements are guaranteed removed.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Formatting tags considered safe in stored content.
///
/// `a`, `span` and `div` are allowed without attributes in principle, but
/// enforcement is procedural: only `<a>` tags get their attributes rewritten
/// (see [`sanitize`]), so `span`/`div` keep attributes that no strip step
/// targets.
pub const ALLOWED_TAGS: [&str; 13] = [
    "b", "i", "u", "strong", "em", "br", "p", "ul", "ol", "li", "a", "span", "div",
];

/// Inline event-handler attributes removed from every tag.
pub const EVENT_HANDLERS: [&str; 15] = [
    "onclick",
    "onload",
    "onerror",
    "onchange",
    "onfocus",
    "onblur",
    "onmouseover",
    "onmouseout",
    "onkeypress",
    "onkeydown",
    "onkeyup",
    "ondblclick",
    "onmousedown",
    "onmouseup",
    "onwheel",
];

/// Elements removed wholesale, including their content.
const DANGEROUS_TAGS: [&str; 7] = [
    "script", "style", "iframe", "object", "embed", "form", "input",
];

static DANGEROUS_TAG_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DANGEROUS_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}[^>]*>.*?</{tag}>")).expect("valid tag pattern")
        })
        .collect()
});

static EVENT_HANDLER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    EVENT_HANDLERS
        .iter()
        .map(|handler| {
            Regex::new(&format!(r#"(?i){handler}\s*=\s*["']?[^"'\s>]*["']?"#))
                .expect("valid handler pattern")
        })
        .collect()
});

static URL_SCHEME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(href|src|xlink:href)\s*=\s*["']?(javascript:|data:|vbscript:)"#)
        .expect("valid scheme pattern")
});

static ANCHOR_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<a\s+([^>]*)>").expect("valid anchor pattern"));

static HREF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']?([^"'>\s]+)["']?"#).expect("valid href pattern")
});

static DANGEROUS_SCHEME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(javascript:|data:|vbscript:)").expect("valid scheme-prefix pattern")
});

static STYLE_ATTR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+style\s*=\s*["']?[^"']*["']?"#).expect("valid style pattern")
});

static DATA_ATTR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+data-[a-z]+\s*=\s*["']?[^"']*["']?"#).expect("valid data-attr pattern")
});

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);").expect("valid entity pattern")
});

/// Outcome of a plain-text length check. Constructed fresh per call and
/// consumed immediately; only the sanitized HTML survives into storage.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub plain_text: String,
    pub char_count: usize,
    pub message: String,
}

/// Sanitizes HTML to remove dangerous tags and attributes.
///
/// Applied as an ordered pipeline; each step operates on the output of the
/// previous one:
///
/// 1. strip `script`/`style`/`iframe`/`object`/`embed`/`form`/`input`
///    elements wholesale (matched open/close pairs, content included,
///    across lines),
/// 2. strip inline event-handler attributes,
/// 3. truncate `javascript:`/`data:`/`vbscript:` schemes out of
///    `href`/`src`/`xlink:href` values,
/// 4. rewrite every `<a ...>` opening tag to carry at most a safe,
///    entity-escaped `href` and nothing else,
/// 5. strip all `style="..."` attributes,
/// 6. strip all `data-*` attributes.
///
/// Never fails: empty input yields an empty string, malformed markup is
/// stripped as far as the patterns reach.
///
/// ```
/// use simhub_backend::utils::html::sanitize;
///
/// let input = r#"<p>Hello <script>alert("XSS")</script> World</p>"#;
/// assert_eq!(sanitize(input), "<p>Hello  World</p>");
/// ```
pub fn sanitize(html_content: &str) -> String {
    if html_content.is_empty() {
        return String::new();
    }

    let mut content = html_content.trim().to_string();

    for pattern in DANGEROUS_TAG_PATTERNS.iter() {
        content = pattern.replace_all(&content, "").into_owned();
    }

    for pattern in EVENT_HANDLER_PATTERNS.iter() {
        content = pattern.replace_all(&content, "").into_owned();
    }

    // Leaves the attribute present but defanged: href="javascript:x" -> href="x"
    content = URL_SCHEME_PATTERN
        .replace_all(&content, "${1}=\"")
        .into_owned();

    content = ANCHOR_TAG_PATTERN
        .replace_all(&content, |caps: &regex::Captures| {
            let attrs = &caps[1];
            if let Some(href) = HREF_PATTERN.captures(attrs).map(|c| c[1].to_string()) {
                if !DANGEROUS_SCHEME_PATTERN.is_match(&href) {
                    return format!("<a href=\"{}\">", escape_attribute(&href));
                }
            }
            "<a>".to_string()
        })
        .into_owned();

    content = STYLE_ATTR_PATTERN.replace_all(&content, "").into_owned();
    content = DATA_ATTR_PATTERN.replace_all(&content, "").into_owned();

    content.trim().to_string()
}

/// Extracts plain text from HTML for character validation.
///
/// Removes all tags, decodes HTML entities, and collapses whitespace runs
/// (including decoded non-breaking spaces) into single ASCII spaces.
///
/// ```
/// use simhub_backend::utils::html::extract_plain_text;
///
/// assert_eq!(extract_plain_text("<p>Hello <b>World</b></p>"), "Hello World");
/// ```
pub fn extract_plain_text(html_content: &str) -> String {
    if html_content.is_empty() {
        return String::new();
    }

    let plain = TAG_PATTERN.replace_all(html_content, "").into_owned();
    let plain = decode_entities(&plain);
    let plain = WHITESPACE_PATTERN.replace_all(&plain, " ").into_owned();

    plain.trim().to_string()
}

/// Validates the plain-text character count derived from HTML content.
///
/// The count is in Unicode code points, and both bounds are inclusive.
pub fn validate_plain_text_length(
    html_content: &str,
    min_length: usize,
    max_length: usize,
) -> ValidationResult {
    let plain_text = extract_plain_text(html_content);
    let char_count = plain_text.chars().count();

    if char_count < min_length {
        return ValidationResult {
            valid: false,
            message: format!(
                "Text is too short: {char_count} characters. Minimum is {min_length}."
            ),
            plain_text,
            char_count,
        };
    }

    if char_count > max_length {
        return ValidationResult {
            valid: false,
            message: format!(
                "Text is too long: {char_count} characters. Maximum is {max_length}."
            ),
            plain_text,
            char_count,
        };
    }

    ValidationResult {
        valid: true,
        message: format!("Valid text length: {char_count} characters."),
        plain_text,
        char_count,
    }
}

/// Entity-escapes a value for embedding in a double-quoted HTML attribute.
fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Decodes numeric (`&#160;`, `&#x27;`) and common named HTML entities back
/// to literal characters. Unknown entities pass through unchanged.
fn decode_entities(text: &str) -> String {
    ENTITY_PATTERN
        .replace_all(text, |caps: &regex::Captures| {
            let body = &caps[1];
            if let Some(numeric) = body.strip_prefix('#') {
                let parsed = if let Some(hex) = numeric.strip_prefix(['x', 'X']) {
                    u32::from_str_radix(hex, 16).ok()
                } else {
                    numeric.parse::<u32>().ok()
                };
                return match parsed.and_then(char::from_u32) {
                    Some(c) => c.to_string(),
                    None => caps[0].to_string(),
                };
            }
            match named_entity(body) {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Named entities the rich-text editor is known to emit.
fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "hellip" => '\u{2026}',
        "bull" => '\u{2022}',
        "middot" => '\u{b7}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        _ => return None,
    };
    Some(c)
}
