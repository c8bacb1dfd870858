//! # Frontmatter Store
//!
//! Line-level reader and editor for the YAML block at the top of a note.
//!
//! The raw lines are the source of truth. The parsed property table is
//! re-derived from them after every edit, so the two can never drift apart.
//! Edits touch only the lines of the property being changed: untouched keys,
//! their order, comments and quoting survive byte-for-byte.
//!
//! Values are decoded with `serde_yaml`, one property span at a time, so
//! quoting, escapes, flow lists and block scalars follow YAML. Unquoted
//! wikilinks (`up: [[A]]`, `RELATED_TO: [[A]], [[B]]`) are kept as written.
//!
//! Reading is tolerant: every property that can be located is returned.
//! Writing is strict: a block with an unterminated delimiter, an unparseable
//! line, a value YAML rejects, or a property that mixes an inline value with
//! `- item` lines is refused with a [`FrontmatterDefect`].

use crate::primitives::{LIST_ITEM_PREFIX, RELATIONSHIP_PROPERTIES};
use crate::{FrontmatterDefect, PropertyValue, wikilink};

const DELIMITER: &str = "---";

// =============================================================================
// BLOCK STATE
// =============================================================================

/// Where the delimiters of a frontmatter block were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Opening and closing `---` lines found.
    Present,
    /// The file does not start with `---`; the whole file is body.
    Absent,
    /// The file starts with `---` but no closing line follows.
    Unterminated,
}

// =============================================================================
// PROPERTY
// =============================================================================

/// One `- item` line of a multi-line list.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ListItem {
    line: usize,
    value: String,
}

/// A top-level property and the lines it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name, case preserved.
    pub name: String,
    /// Parsed value.
    pub value: PropertyValue,
    key_line: usize,
    end_line: usize,
    inline: String,
    items: Vec<ListItem>,
    continuation: Vec<String>,
}

impl Property {
    /// True when the value sits on the key line (`key: value`, `key: [a, b]`).
    #[must_use]
    pub fn is_inline(&self) -> bool {
        !self.inline.is_empty()
    }

    /// True when the property has an inline value and `- item` lines at once.
    #[must_use]
    pub fn is_mixed(&self) -> bool {
        self.is_inline() && !self.items.is_empty()
    }

    /// True for a plain scalar whose value runs onto indented lines.
    fn is_foldable(&self) -> bool {
        self.is_inline()
            && self.items.is_empty()
            && !self.continuation.is_empty()
            && !self.inline.starts_with(['|', '>'])
    }

    /// Values as list entries: list items, or the wikilinks of an inline
    /// string, or the scalar itself.
    fn entries(&self) -> Vec<String> {
        match &self.value {
            PropertyValue::List(items) => items.clone(),
            PropertyValue::Scalar(s) => {
                let links: Vec<String> = wikilink::extract(s).map(|l| l.raw).collect();
                if links.is_empty() {
                    vec![s.clone()]
                } else {
                    links
                }
            }
            PropertyValue::Absent => Vec::new(),
        }
    }
}

// =============================================================================
// FRONTMATTER
// =============================================================================

/// The frontmatter block of one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    state: BlockState,
    opening: String,
    closing: String,
    newline: &'static str,
    lines: Vec<String>,
    properties: Vec<Property>,
    defects: Vec<FrontmatterDefect>,
}

impl Frontmatter {
    /// Split note text into its frontmatter block and body.
    ///
    /// The block is the text between a `---` line at the very start of the
    /// file (a BOM is tolerated) and the next `---` line. Without an opening
    /// delimiter the whole text is body.
    pub fn split(text: &str) -> (Self, String) {
        let (first_line, rest_start) = match text.find('\n') {
            Some(idx) => (&text[..idx], Some(idx + 1)),
            None => (text, None),
        };
        let newline = if first_line.ends_with('\r') { "\r\n" } else { "\n" };

        if first_line.trim_start_matches('\u{feff}').trim_end() != DELIMITER {
            return (Self::empty(BlockState::Absent, newline), text.to_string());
        }
        let Some(mut pos) = rest_start else {
            return (Self::empty(BlockState::Unterminated, newline), text.to_string());
        };

        let opening = text[..pos].to_string();
        let mut lines = Vec::new();
        while pos < text.len() {
            let segment_end = text[pos..].find('\n').map_or(text.len(), |i| pos + i + 1);
            let segment = &text[pos..segment_end];
            let content = segment.trim_end_matches('\n').trim_end_matches('\r');

            if content.trim_end() == DELIMITER {
                let mut fm = Self {
                    state: BlockState::Present,
                    opening,
                    closing: segment.to_string(),
                    newline,
                    lines,
                    properties: Vec::new(),
                    defects: Vec::new(),
                };
                fm.reindex();
                return (fm, text[segment_end..].to_string());
            }
            lines.push(content.to_string());
            pos = segment_end;
        }

        (Self::empty(BlockState::Unterminated, newline), text.to_string())
    }

    fn empty(state: BlockState, newline: &'static str) -> Self {
        Self {
            state,
            opening: String::new(),
            closing: String::new(),
            newline,
            lines: Vec::new(),
            properties: Vec::new(),
            defects: Vec::new(),
        }
    }

    /// Reassemble the full note text from this block and `body`.
    #[must_use]
    pub fn render(&self, body: &str) -> String {
        match self.state {
            BlockState::Present => {
                let mut out = self.opening.clone();
                for line in &self.lines {
                    out.push_str(line);
                    out.push_str(self.newline);
                }
                out.push_str(&self.closing);
                out.push_str(body);
                out
            }
            BlockState::Absent | BlockState::Unterminated => body.to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // READ ACCESS
    // -------------------------------------------------------------------------

    /// Where the block's delimiters were found.
    #[must_use]
    pub fn state(&self) -> BlockState {
        self.state
    }

    /// The raw block text between the delimiters, verbatim.
    #[must_use]
    pub fn raw(&self) -> String {
        self.lines.join(self.newline)
    }

    /// Problems that make the block unsafe to mutate.
    #[must_use]
    pub fn defects(&self) -> Vec<FrontmatterDefect> {
        let mut defects = Vec::new();
        if self.state == BlockState::Unterminated {
            defects.push(FrontmatterDefect::Unterminated);
        }
        defects.extend(self.defects.iter().cloned());
        defects
    }

    /// True when the block can be read and written without guessing.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.state != BlockState::Unterminated && self.defects.is_empty()
    }

    /// All properties in file order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    /// Value of the first property named `name` (names are case-sensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.property(name).map(|p| &p.value)
    }

    /// True if a property named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// The property named `name`, with its line span.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Names of list-valued properties with at least one wikilink item.
    #[must_use]
    pub fn wikilink_list_properties(&self) -> Vec<String> {
        self.properties
            .iter()
            .filter(|p| {
                p.value
                    .as_list()
                    .is_some_and(|items| items.iter().any(|i| wikilink::extract(i).next().is_some()))
            })
            .map(|p| p.name.clone())
            .collect()
    }

    // -------------------------------------------------------------------------
    // MUTATION
    // -------------------------------------------------------------------------

    /// Replace the value of `name` in place, or insert `name: value`.
    ///
    /// `value` is written verbatim after `name: `. A new property goes just
    /// before the first relationship property, or at the end of the block.
    pub fn set_scalar(&mut self, name: &str, value: &str) -> Result<bool, FrontmatterDefect> {
        self.check_mutable(name)?;
        let line = format!("{name}: {value}");

        if let Some(prop) = self.property(name) {
            let (start, end) = (prop.key_line, prop.end_line);
            if end == start + 1 && self.lines.get(start) == Some(&line) {
                return Ok(false);
            }
            self.lines.splice(start..end, [line]);
        } else {
            let at = self
                .properties
                .iter()
                .find(|p| RELATIONSHIP_PROPERTIES.contains(&p.name.as_str()))
                .map_or(self.lines.len(), |p| p.key_line);
            self.lines.insert(at, line);
        }
        self.commit();
        Ok(true)
    }

    /// Replace `name` with a multi-line list of `items`, or append it.
    pub fn set_list(&mut self, name: &str, items: &[String]) -> Result<bool, FrontmatterDefect> {
        self.check_mutable(name)?;
        let mut replacement = vec![format!("{name}:")];
        replacement.extend(items.iter().map(|i| format!("{LIST_ITEM_PREFIX}{}", quote_item(i))));

        match self.property(name) {
            Some(prop) => {
                let (start, end) = (prop.key_line, prop.end_line);
                if self.lines[start..end] == replacement[..] {
                    return Ok(false);
                }
                self.lines.splice(start..end, replacement);
            }
            None => self.lines.extend(replacement),
        }
        self.commit();
        Ok(true)
    }

    /// Append each of `items` not already present to the list `name`.
    ///
    /// Creates the property when missing and converts inline or empty forms
    /// to the multi-line form. Existing item lines are kept as written and
    /// new items copy their indentation.
    pub fn append_to_list(&mut self, name: &str, items: &[String]) -> Result<bool, FrontmatterDefect> {
        self.check_mutable(name)?;
        let existing = self.property(name).map(Property::entries).unwrap_or_default();

        let mut fresh: Vec<String> = Vec::new();
        for item in items {
            if !existing.contains(item) && !fresh.contains(item) {
                fresh.push(item.clone());
            }
        }
        if fresh.is_empty() {
            return Ok(false);
        }

        match self.property(name).cloned() {
            None => {
                self.lines.push(format!("{name}:"));
                self.lines
                    .extend(fresh.iter().map(|i| format!("{LIST_ITEM_PREFIX}{}", quote_item(i))));
            }
            Some(prop) => match prop.items.last() {
                Some(last) if !prop.is_inline() => {
                    let prefix = item_prefix(&self.lines[last.line]);
                    let new_lines: Vec<String> = fresh
                        .iter()
                        .map(|i| format!("{prefix}{}", quote_item(i)))
                        .collect();
                    self.lines.splice(last.line + 1..last.line + 1, new_lines);
                }
                _ => {
                    let mut all = existing;
                    all.extend(fresh);
                    self.rewrite_as_list(&prop, &all);
                }
            },
        }
        self.commit();
        Ok(true)
    }

    /// Remove every list entry equal to one of `items`.
    pub fn remove_from_list(&mut self, name: &str, items: &[String]) -> Result<bool, FrontmatterDefect> {
        self.check_mutable(name)?;
        let Some(prop) = self.property(name) else {
            return Ok(false);
        };
        let doomed: Vec<usize> = prop
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, v)| items.contains(v))
            .map(|(i, _)| i)
            .collect();
        self.remove_indices(name, &doomed)
    }

    /// Remove the list entries at `indices` (positions in the parsed list).
    pub fn remove_list_indices(&mut self, name: &str, indices: &[usize]) -> Result<bool, FrontmatterDefect> {
        self.check_mutable(name)?;
        self.remove_indices(name, indices)
    }

    /// Rewrite an inline value holding wikilinks (`[[A]], [[B]]`,
    /// `"[[A]]"`, `["[[A]]"]`) as a multi-line list.
    pub fn normalize_inline_links(&mut self, name: &str) -> Result<bool, FrontmatterDefect> {
        let Some(prop) = self.property(name).cloned() else {
            return Ok(false);
        };
        if !prop.is_inline() || wikilink::extract(&prop.inline).next().is_none() {
            return Ok(false);
        }
        self.check_mutable(name)?;
        let entries = prop.entries();
        self.rewrite_as_list(&prop, &entries);
        self.commit();
        Ok(true)
    }

    /// Join indented continuation lines of plain scalars onto the key line.
    ///
    /// `summary: first\n  second` becomes `summary: first second`. Block
    /// scalars (`|`, `>`) and lists are left alone. Returns the names of the
    /// rewritten properties.
    pub fn fold_continuations(&mut self) -> Result<Vec<String>, FrontmatterDefect> {
        if self.properties.iter().all(|p| !p.is_foldable()) {
            return Ok(Vec::new());
        }
        if let Some(defect) = self.defects().into_iter().next() {
            return Err(defect);
        }
        let mut folded = Vec::new();
        for prop in self.properties.iter().rev().filter(|p| p.is_foldable()) {
            let line = format!("{}: {} {}", prop.name, prop.inline, prop.continuation.join(" "));
            self.lines.splice(prop.key_line..prop.end_line, [line]);
            folded.push(prop.name.clone());
        }
        folded.reverse();
        self.commit();
        Ok(folded)
    }

    fn remove_indices(&mut self, name: &str, indices: &[usize]) -> Result<bool, FrontmatterDefect> {
        let Some(prop) = self.property(name).cloned() else {
            return Ok(false);
        };
        let entries = prop.entries();
        if !indices.iter().any(|&i| i < entries.len()) {
            return Ok(false);
        }

        if prop.is_inline() || prop.items.len() != entries.len() {
            let kept: Vec<String> = entries
                .into_iter()
                .enumerate()
                .filter(|(i, _)| !indices.contains(i))
                .map(|(_, v)| v)
                .collect();
            self.rewrite_as_list(&prop, &kept);
        } else {
            let mut lines: Vec<usize> = indices
                .iter()
                .filter_map(|&i| prop.items.get(i).map(|item| item.line))
                .collect();
            lines.sort_unstable();
            lines.dedup();
            for line in lines.into_iter().rev() {
                self.lines.remove(line);
            }
        }
        self.commit();
        Ok(true)
    }

    fn rewrite_as_list(&mut self, prop: &Property, values: &[String]) {
        let mut replacement = vec![format!("{}:", prop.name)];
        replacement.extend(values.iter().map(|v| format!("{LIST_ITEM_PREFIX}{}", quote_item(v))));
        self.lines.splice(prop.key_line..prop.end_line, replacement);
    }

    fn check_mutable(&self, name: &str) -> Result<(), FrontmatterDefect> {
        if let Some(defect) = self.defects().into_iter().next() {
            return Err(defect);
        }
        match self.property(name) {
            Some(prop) if prop.is_mixed() => Err(FrontmatterDefect::MixedListSyntax(name.to_string())),
            _ => Ok(()),
        }
    }

    fn commit(&mut self) {
        if self.state == BlockState::Absent && !self.lines.is_empty() {
            self.state = BlockState::Present;
            self.opening = format!("{DELIMITER}{}", self.newline);
            self.closing = format!("{DELIMITER}{}", self.newline);
        }
        self.reindex();
    }

    fn reindex(&mut self) {
        let (properties, defects) = parse_properties(&self.lines);
        self.properties = properties;
        self.defects = defects;
    }
}

// =============================================================================
// LINE PARSING
// =============================================================================

fn parse_properties(lines: &[String]) -> (Vec<Property>, Vec<FrontmatterDefect>) {
    let mut properties = Vec::new();
    let mut defects = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            i += 1;
            continue;
        }

        let Some((name, rest)) = split_key(line) else {
            defects.push(FrontmatterDefect::UnparseableLine {
                line: i + 1,
                text: line.clone(),
            });
            i += 1;
            continue;
        };

        let mut items = Vec::new();
        let mut continuation = Vec::new();
        let mut last = i;
        let mut j = i + 1;
        while j < lines.len() {
            let next = &lines[j];
            let t = next.trim();
            if t.is_empty() || t.starts_with('#') {
                j += 1;
                continue;
            }
            if let Some(item) = list_item(t) {
                let value = decode_scalar(item).unwrap_or_else(|reason| {
                    defects.push(FrontmatterDefect::InvalidValue {
                        property: name.to_string(),
                        reason,
                    });
                    strip_comment(item)
                });
                items.push(ListItem { line: j, value });
            } else if next.starts_with([' ', '\t']) {
                continuation.push(t.to_string());
            } else {
                break;
            }
            last = j;
            j += 1;
        }

        let inline = strip_comment(rest.trim());
        let value = property_value(&lines[i..=last], &inline, &items).unwrap_or_else(|reason| {
            defects.push(FrontmatterDefect::InvalidValue {
                property: name.to_string(),
                reason,
            });
            PropertyValue::Scalar(inline.clone())
        });
        properties.push(Property {
            name: name.to_string(),
            value,
            key_line: i,
            end_line: last + 1,
            inline,
            items,
            continuation,
        });
        i = last + 1;
    }

    (properties, defects)
}

/// Typed value of one property spanning `span`.
///
/// Unquoted wikilinks are kept verbatim: YAML would read `[[A]]` as a
/// nested sequence and `[[A]], [[B]]` not at all. Everything else is
/// decoded by the YAML parser.
fn property_value(span: &[String], inline: &str, items: &[ListItem]) -> Result<PropertyValue, String> {
    if inline.starts_with("[[") {
        return Ok(PropertyValue::Scalar(inline.to_string()));
    }
    if !items.is_empty() {
        let mut values = Vec::with_capacity(items.len() + 1);
        if !inline.is_empty() {
            values.push(decode_scalar(inline)?);
        }
        values.extend(items.iter().map(|i| i.value.clone()));
        return Ok(PropertyValue::List(values));
    }

    let mut doc = span.join("\n");
    doc.push('\n');
    let mapping: serde_yaml::Mapping = serde_yaml::from_str(&doc).map_err(|e| e.to_string())?;
    Ok(mapping
        .into_iter()
        .next()
        .map_or(PropertyValue::Absent, |(_, value)| from_yaml(&value)))
}

fn from_yaml(value: &serde_yaml::Value) -> PropertyValue {
    match value {
        serde_yaml::Value::Null => PropertyValue::Absent,
        serde_yaml::Value::Sequence(seq) => PropertyValue::List(seq.iter().map(item_text).collect()),
        serde_yaml::Value::Tagged(tagged) => from_yaml(&tagged.value),
        other => PropertyValue::Scalar(item_text(other)),
    }
}

/// Text of a YAML node used as a scalar or a list entry.
fn item_text(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Tagged(tagged) => item_text(&tagged.value),
        serde_yaml::Value::Sequence(outer) => match outer.as_slice() {
            // `[[A]]` inside a flow list
            [serde_yaml::Value::Sequence(inner)] => match inner.as_slice() {
                [serde_yaml::Value::String(target)] => wikilink::format_link(target),
                _ => yaml_text(value),
            },
            _ => yaml_text(value),
        },
        serde_yaml::Value::Mapping(_) => yaml_text(value),
    }
}

fn yaml_text(value: &serde_yaml::Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_default()
}

/// Decode a single list item or inline value.
fn decode_scalar(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    if raw.starts_with("[[") {
        return Ok(strip_comment(raw));
    }
    let value: serde_yaml::Value = serde_yaml::from_str(raw).map_err(|e| e.to_string())?;
    Ok(item_text(&value))
}

/// Split a top-level `key: rest` line. Indented lines, list items and
/// comments are not keys.
fn split_key(line: &str) -> Option<(&str, &str)> {
    if line.starts_with([' ', '\t', '-', '#']) {
        return None;
    }
    let bytes = line.as_bytes();
    for (idx, &b) in bytes.iter().enumerate() {
        if b != b':' {
            continue;
        }
        let at_end = idx + 1 == bytes.len();
        if at_end || matches!(bytes[idx + 1], b' ' | b'\t') {
            let name = line[..idx].trim_end();
            if name.is_empty() {
                return None;
            }
            return Some((name, &line[idx + 1..]));
        }
    }
    None
}

/// The text after `- ` of a trimmed list item line.
fn list_item(trimmed: &str) -> Option<&str> {
    if trimmed == "-" {
        Some("")
    } else {
        trimmed.strip_prefix("- ").map(str::trim)
    }
}

/// Leading whitespace plus `- ` of an existing item line.
fn item_prefix(line: &str) -> String {
    let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
    format!("{indent}- ")
}

/// Drop a trailing ` # comment` from an unquoted value.
fn strip_comment(value: &str) -> String {
    if value.starts_with(['"', '\'']) {
        return value.to_string();
    }
    match value.find(" #") {
        Some(idx) => value[..idx].trim_end().to_string(),
        None => value.to_string(),
    }
}

/// Quote a list item or scalar when plain YAML would misread it.
///
/// Wikilinks always start with `[` and are therefore always quoted.
#[must_use]
pub fn quote_item(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.starts_with([
            '[', '{', '"', '\'', '*', '&', '!', '|', '>', '%', '@', '`', '#', '-', '?', ',',
        ])
        || value.contains(": ")
        || value.contains(" #")
        || value.ends_with(':')
        || value.trim() != value;
    if needs_quotes {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str) -> Frontmatter {
        Frontmatter::split(text).0
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_finds_block_and_body() {
        let (fm, body) = Frontmatter::split("---\ntitle: A\n---\n# Heading\n");
        assert_eq!(fm.state(), BlockState::Present);
        assert_eq!(fm.raw(), "title: A");
        assert_eq!(body, "# Heading\n");
    }

    #[test]
    fn no_opening_delimiter_means_all_body() {
        let (fm, body) = Frontmatter::split("# Title\n---\nx: 1\n---\n");
        assert_eq!(fm.state(), BlockState::Absent);
        assert_eq!(body, "# Title\n---\nx: 1\n---\n");
        assert!(fm.properties().next().is_none());
    }

    #[test]
    fn unterminated_block_is_read_as_body_and_refuses_writes() {
        let text = "---\ntitle: A\nno closing\n";
        let (mut fm, body) = Frontmatter::split(text);
        assert_eq!(fm.state(), BlockState::Unterminated);
        assert_eq!(body, text);
        assert_eq!(fm.set_scalar("x", "1"), Err(FrontmatterDefect::Unterminated));
    }

    #[test]
    fn render_is_identity_without_edits() {
        for text in [
            "---\na: 1\n# comment\nlist:\n  - \"[[X]]\"\n---\nbody\n",
            "---\r\na: 1\r\n---\r\nbody\r\n",
            "\u{feff}---\nk: v\n---",
            "---\n---\n",
            "plain body",
            "---\nunterminated",
        ] {
            let (fm, body) = Frontmatter::split(text);
            assert_eq!(fm.render(&body), text);
        }
    }

    #[test]
    fn parses_scalars_lists_and_absent() {
        let fm = block(
            "---\ntitle: \"Deep Work\"\nrating: 4 # out of 5\naliases:\n  - DW\n  - 'deep work'\nempty:\nnothing: ~\nflow: [a, \"b, c\"]\n---\n",
        );
        assert_eq!(fm.get("title"), Some(&PropertyValue::Scalar("Deep Work".into())));
        assert_eq!(fm.get("rating"), Some(&PropertyValue::Scalar("4".into())));
        assert_eq!(fm.get("aliases"), Some(&PropertyValue::List(strings(&["DW", "deep work"]))));
        assert_eq!(fm.get("empty"), Some(&PropertyValue::Absent));
        assert_eq!(fm.get("nothing"), Some(&PropertyValue::Absent));
        assert_eq!(fm.get("flow"), Some(&PropertyValue::List(strings(&["a", "b, c"]))));
        assert!(fm.is_well_formed());
    }

    #[test]
    fn comma_joined_wikilinks_are_tolerated() {
        let fm = block("---\nRELATED_TO: [[A]], [[B]]\n---\n");
        assert_eq!(
            fm.get("RELATED_TO"),
            Some(&PropertyValue::Scalar("[[A]], [[B]]".into()))
        );
        assert!(fm.is_well_formed());
    }

    #[test]
    fn column_zero_items_belong_to_the_key() {
        let fm = block("---\ntags:\n- a\n- b\nnext: x\n---\n");
        assert_eq!(fm.get("tags"), Some(&PropertyValue::List(strings(&["a", "b"]))));
        assert_eq!(fm.get("next"), Some(&PropertyValue::Scalar("x".into())));
    }

    #[test]
    fn block_scalars_are_joined() {
        let fm = block("---\nsummary: >\n  first\n  second\nnote: |\n  l1\n  l2\n---\n");
        assert_eq!(fm.get("summary"), Some(&PropertyValue::Scalar("first second\n".into())));
        assert_eq!(fm.get("note"), Some(&PropertyValue::Scalar("l1\nl2\n".into())));
    }

    #[test]
    fn double_quoted_escapes_are_decoded() {
        let fm = block("---\ntitle: \"caf\\u00e9\"\ntabbed: \"a\\tb\"\n---\n");
        assert_eq!(fm.get("title"), Some(&PropertyValue::Scalar("caf\u{e9}".into())));
        assert_eq!(fm.get("tabbed"), Some(&PropertyValue::Scalar("a\tb".into())));
    }

    #[test]
    fn plain_continuation_lines_are_joined() {
        let fm = block("---\nsummary: first\n  second\n---\n");
        assert_eq!(fm.get("summary"), Some(&PropertyValue::Scalar("first second".into())));
    }

    #[test]
    fn unquoted_links_in_flow_lists_stay_links() {
        let fm = block("---\nup: [\"[[A]]\", [[B]]]\n---\n");
        assert_eq!(fm.get("up"), Some(&PropertyValue::List(strings(&["[[A]]", "[[B]]"]))));
    }

    #[test]
    fn invalid_yaml_value_is_a_defect() {
        let mut fm = block("---\ntitle: Part: two\nok: 1\n---\n");
        assert!(!fm.is_well_formed());
        assert!(matches!(
            fm.defects().as_slice(),
            [FrontmatterDefect::InvalidValue { property, .. }] if property == "title"
        ));
        assert_eq!(fm.get("ok"), Some(&PropertyValue::Scalar("1".into())));
        assert!(fm.set_scalar("ok", "2").is_err());
    }

    #[test]
    fn fold_continuations_rewrites_plain_scalars_only() {
        let text = "---\nsummary: first\n  second\n  third\nnote: |\n  kept\ntags:\n  - a\n---\nbody";
        let (mut fm, body) = Frontmatter::split(text);
        assert_eq!(fm.fold_continuations(), Ok(vec!["summary".to_string()]));
        assert_eq!(
            fm.render(&body),
            "---\nsummary: first second third\nnote: |\n  kept\ntags:\n  - a\n---\nbody"
        );
        assert_eq!(fm.get("summary"), Some(&PropertyValue::Scalar("first second third".into())));
        assert_eq!(fm.fold_continuations(), Ok(Vec::new()));
    }

    #[test]
    fn stray_line_is_a_defect() {
        let fm = block("---\ntitle: A\njust words\n---\n");
        assert!(!fm.is_well_formed());
        assert_eq!(
            fm.defects(),
            vec![FrontmatterDefect::UnparseableLine {
                line: 2,
                text: "just words".into()
            }]
        );
    }

    #[test]
    fn set_scalar_replaces_in_place() {
        let text = "---\ntitle: Old\n# keep me\ntags:\n  - x\n---\nbody";
        let (mut fm, body) = Frontmatter::split(text);
        assert_eq!(fm.set_scalar("title", "New"), Ok(true));
        assert_eq!(fm.render(&body), "---\ntitle: New\n# keep me\ntags:\n  - x\n---\nbody");
        assert_eq!(fm.set_scalar("title", "New"), Ok(false));
    }

    #[test]
    fn set_scalar_inserts_before_relationship_group() {
        let (mut fm, body) = Frontmatter::split("---\ntitle: A\nNEXT:\n  - \"[[B]]\"\n---\n");
        fm.set_scalar("summary", "\"text\"").expect("set");
        assert_eq!(
            fm.render(&body),
            "---\ntitle: A\nsummary: \"text\"\nNEXT:\n  - \"[[B]]\"\n---\n"
        );
    }

    #[test]
    fn set_scalar_appends_without_relationship_group() {
        let (mut fm, body) = Frontmatter::split("---\ntitle: A\n---\n");
        fm.set_scalar("status", "draft").expect("set");
        assert_eq!(fm.render(&body), "---\ntitle: A\nstatus: draft\n---\n");
    }

    #[test]
    fn set_scalar_creates_block_when_absent() {
        let (mut fm, body) = Frontmatter::split("# Note\n");
        fm.set_scalar("status", "draft").expect("set");
        assert_eq!(fm.state(), BlockState::Present);
        assert_eq!(fm.render(&body), "---\nstatus: draft\n---\n# Note\n");
    }

    #[test]
    fn append_keeps_existing_item_style() {
        let (mut fm, body) = Frontmatter::split("---\nRELATED_TO:\n    - '[[A]]'\ntitle: x\n---\n");
        assert_eq!(fm.append_to_list("RELATED_TO", &strings(&["[[B]]"])), Ok(true));
        assert_eq!(
            fm.render(&body),
            "---\nRELATED_TO:\n    - '[[A]]'\n    - \"[[B]]\"\ntitle: x\n---\n"
        );
    }

    #[test]
    fn append_skips_present_items() {
        let mut fm = block("---\nRELATED_TO:\n  - \"[[A]]\"\n---\n");
        assert_eq!(fm.append_to_list("RELATED_TO", &strings(&["[[A]]"])), Ok(false));
    }

    #[test]
    fn append_to_missing_property_adds_it_at_the_end() {
        let (mut fm, body) = Frontmatter::split("---\ntitle: B\n---\nbody\n");
        fm.append_to_list("RELATED_TO", &strings(&["[[A]]"])).expect("append");
        assert_eq!(fm.render(&body), "---\ntitle: B\nRELATED_TO:\n  - \"[[A]]\"\n---\nbody\n");
    }

    #[test]
    fn append_converts_inline_and_empty_forms() {
        let (mut fm, body) = Frontmatter::split("---\nPRIOR: []\nNEXT: \"[[C]]\"\n---\n");
        fm.append_to_list("PRIOR", &strings(&["[[A]]"])).expect("append");
        fm.append_to_list("NEXT", &strings(&["[[D]]"])).expect("append");
        assert_eq!(
            fm.render(&body),
            "---\nPRIOR:\n  - \"[[A]]\"\nNEXT:\n  - \"[[C]]\"\n  - \"[[D]]\"\n---\n"
        );
    }

    #[test]
    fn mixed_syntax_refuses_mutation_but_reads() {
        let mut fm = block("---\nRELATED_TO: \"[[A]]\"\n  - \"[[B]]\"\n---\n");
        assert_eq!(
            fm.get("RELATED_TO"),
            Some(&PropertyValue::List(strings(&["[[A]]", "[[B]]"])))
        );
        assert_eq!(
            fm.append_to_list("RELATED_TO", &strings(&["[[C]]"])),
            Err(FrontmatterDefect::MixedListSyntax("RELATED_TO".into()))
        );
    }

    #[test]
    fn remove_touches_only_item_lines() {
        let (mut fm, body) =
            Frontmatter::split("---\nup:\n  - \"[[a]]\"\n  # note\n  - \"[[B]]\"\n---\n");
        assert_eq!(fm.remove_from_list("up", &strings(&["[[a]]"])), Ok(true));
        assert_eq!(fm.render(&body), "---\nup:\n  # note\n  - \"[[B]]\"\n---\n");
        assert_eq!(fm.remove_from_list("missing", &strings(&["x"])), Ok(false));
    }

    #[test]
    fn remove_indices_in_inline_list_rewrites_it() {
        let (mut fm, body) = Frontmatter::split("---\ntags: [a, b, c]\n---\n");
        fm.remove_list_indices("tags", &[1]).expect("remove");
        assert_eq!(fm.render(&body), "---\ntags:\n  - a\n  - c\n---\n");
    }

    #[test]
    fn set_list_replaces_whole_property() {
        let (mut fm, body) = Frontmatter::split("---\ntags: one\nx: 1\n---\n");
        fm.set_list("tags", &strings(&["a", "[[B]]"])).expect("set");
        assert_eq!(fm.render(&body), "---\ntags:\n  - a\n  - \"[[B]]\"\nx: 1\n---\n");
    }

    #[test]
    fn normalize_inline_links_to_multiline() {
        let (mut fm, body) = Frontmatter::split("---\nRELATED_TO: [[A]], [[B|b]]\n---\n");
        assert_eq!(fm.normalize_inline_links("RELATED_TO"), Ok(true));
        assert_eq!(
            fm.render(&body),
            "---\nRELATED_TO:\n  - \"[[A]]\"\n  - \"[[B|b]]\"\n---\n"
        );
        assert_eq!(fm.normalize_inline_links("RELATED_TO"), Ok(false));
    }

    #[test]
    fn normalize_ignores_plain_scalars() {
        let mut fm = block("---\nRELATED_TO: nothing here\n---\n");
        assert_eq!(fm.normalize_inline_links("RELATED_TO"), Ok(false));
    }

    #[test]
    fn wikilink_list_properties_detected() {
        let fm = block("---\ntags:\n  - a\nup:\n  - \"[[X]]\"\n---\n");
        assert_eq!(fm.wikilink_list_properties(), vec!["up".to_string()]);
    }

    #[test]
    fn quoting_rules() {
        assert_eq!(quote_item("plain"), "plain");
        assert_eq!(quote_item("[[A]]"), "\"[[A]]\"");
        assert_eq!(quote_item("say \"hi\""), "say \"hi\"");
        assert_eq!(quote_item("key: v"), "\"key: v\"");
        assert_eq!(decode_scalar("\"a \\\"b\\\"\""), Ok("a \"b\"".to_string()));
        assert_eq!(decode_scalar("'it''s'"), Ok("it's".to_string()));
        assert_eq!(decode_scalar("[[A]] # c"), Ok("[[A]]".to_string()));
    }
}
