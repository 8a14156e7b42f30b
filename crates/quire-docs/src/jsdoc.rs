use crate::model::DocTag;

/// Doc comment split into free text and tags.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocBlock {
    /// Text before the first tag.
    pub summary: Option<String>,
    /// Tags in source order. Continuation lines belong to the preceding tag.
    pub tags: Vec<DocTag>,
}

impl DocBlock {
    pub fn tag(&self, name: &str) -> Option<&DocTag> {
        self.tags.iter().find(|tag| tag.tag == name)
    }

    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DocTag> + 'a {
        self.tags.iter().filter(move |tag| tag.tag == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.tag(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.tags.is_empty()
    }
}

/// Leading `name`, `[name]` or `[name=default]` of a tag body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSpec {
    pub name: String,
    pub optional: bool,
    pub default: Option<String>,
}

/// Parse a doc comment body (without `/*` `*/` delimiters) into a [`DocBlock`].
///
/// Lines starting with `@` open a tag; `{...}` right after the tag name is
/// its type. Everything else is appended to the open tag, or to the summary
/// while no tag has been seen.
pub fn parse_doc_comment(raw: &str) -> DocBlock {
    let mut summary_lines: Vec<String> = Vec::new();
    let mut tags: Vec<(DocTag, Vec<String>)> = Vec::new();

    for line in normalize_lines(raw) {
        if let Some(rest) = line.strip_prefix('@') {
            let (name, payload) = split_tag_payload(rest);
            if name.is_empty() {
                continue;
            }
            let mut tag = DocTag::new(name);
            let (type_hint, rest) = parse_type_and_rest(payload);
            tag.type_hint = type_hint;
            let mut lines = Vec::new();
            if let Some(rest) = rest {
                lines.push(rest);
            }
            tags.push((tag, lines));
        } else if let Some((_, lines)) = tags.last_mut() {
            lines.push(line);
        } else {
            summary_lines.push(line);
        }
    }

    DocBlock {
        summary: compose_text(summary_lines),
        tags: tags
            .into_iter()
            .map(|(mut tag, lines)| {
                tag.body = compose_text(lines).unwrap_or_default();
                tag
            })
            .collect(),
    }
}

/// Splits a tag body into its leading name and the remaining description.
pub fn split_name(body: &str) -> (Option<NameSpec>, Option<String>) {
    let body = body.trim_start();
    if let Some(stripped) = body.strip_prefix('[') {
        if let Some(end) = stripped.find(']') {
            let inner = &stripped[..end];
            let rest = non_empty(&stripped[end + 1..]);
            let (name, default) = match inner.split_once('=') {
                Some((name, default)) => (name.trim(), non_empty(default)),
                None => (inner.trim(), None),
            };
            if name.is_empty() {
                return (None, rest);
            }
            let spec = NameSpec {
                name: name.to_string(),
                optional: true,
                default,
            };
            return (Some(spec), rest);
        }
    }

    let mut parts = body.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    if first.is_empty() {
        return (None, None);
    }
    let rest = parts.next().and_then(non_empty);
    let spec = NameSpec {
        name: first.to_string(),
        optional: false,
        default: None,
    };
    (Some(spec), rest)
}

fn normalize_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            // keep one level of indentation inside code examples
            line.strip_prefix(' ').unwrap_or(line).trim_end().to_string()
        })
        .collect()
}

fn compose_text(lines: Vec<String>) -> Option<String> {
    let text = lines.join("\n");
    non_empty(&text)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn split_tag_payload(input: &str) -> (&str, &str) {
    let mut parts = input.splitn(2, char::is_whitespace);
    let tag = parts.next().unwrap_or("");
    let payload = parts.next().unwrap_or("").trim();
    (tag, payload)
}

/// Reads a `{Type}` prefix, allowing nested braces inside the type.
fn parse_type_and_rest(payload: &str) -> (Option<String>, Option<String>) {
    let trimmed = payload.trim();
    if !trimmed.starts_with('{') {
        return (None, non_empty(trimmed));
    }

    let mut depth = 0usize;
    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let ty = non_empty(&trimmed[1..idx]);
                    let rest = non_empty(&trimmed[idx + 1..]);
                    return (ty, rest);
                }
            }
            _ => {}
        }
    }
    (None, non_empty(trimmed))
}
