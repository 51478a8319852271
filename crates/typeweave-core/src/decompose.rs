//! Type-reference decomposition.
//!
//! Turns the raw type text a parser pulled out of a field, variant payload or
//! heritage clause into a [`TypeRef`]. The rules are language-agnostic: every
//! parser feeds its signatures through [`decompose`], so `Option<T>`, `T?`,
//! `T | null`, `Optional[T]`, `Vec<T>`, `[]T`, `T[]` and `repeated T` all land
//! in the same shape.
//!
//! Order of application:
//! 1. optionality wrappers, repeatedly (sets `optional`)
//! 2. collection wrappers (first match wins, sets `is_collection`)
//! 3. `Identifier<Args>` / `Identifier[Args]` generic split, one level deep
//! 4. residual generic syntax truncated from the name
//!
//! Decomposition never fails: text that matches nothing comes back with
//! `name` equal to the trimmed input.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::TypeRef;

/// Nullability wrappers. Each pattern captures the wrapped text as `inner`.
static OPTIONAL_WRAPPERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // Option<T>, Optional<T>, Nullable<T>, Maybe<T>
        r"^\s*(?:\w+(?:\.|::))*(?:Option|Optional|Nullable|Maybe)\s*<\s*(?P<inner>.+?)\s*>\s*$",
        // Optional[T]
        r"^\s*(?:typing\.)?Optional\s*\[\s*(?P<inner>.+?)\s*\]\s*$",
        // Union[T, None] / Union[None, T]
        r"^\s*(?:typing\.)?Union\s*\[\s*(?P<inner>.+?)\s*,\s*None\s*\]\s*$",
        r"^\s*(?:typing\.)?Union\s*\[\s*None\s*,\s*(?P<inner>.+?)\s*\]\s*$",
        // T | null | undefined, T | None
        r"^\s*(?P<inner>.+?)(?:\s*\|\s*(?:null|undefined|None))+\s*$",
        // null | T
        r"^\s*(?:(?:null|undefined|None)\s*\|\s*)+(?P<inner>.+?)\s*$",
        // T?
        r"^\s*(?P<inner>.+?)\s*\?\s*$",
        // ?T
        r"^\s*\?\s*(?P<inner>.+?)\s*$",
        // *T
        r"^\s*\*\s*(?P<inner>[A-Za-z_\[].*?)\s*$",
    ])
});

/// Collection wrappers. Each pattern captures the element text as `inner`.
static COLLECTION_WRAPPERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // Vec<T>, List<T>, Set<T>, IEnumerable<T>, ...
        r"^\s*(?:\w+(?:\.|::))*(?:Vec|VecDeque|HashSet|BTreeSet|IndexSet|LinkedList|List|ArrayList|Array|ReadonlyArray|Set|SortedSet|HashSet|TreeSet|Collection|Iterable|IEnumerable|ICollection|IList|IReadOnlyList|IReadOnlyCollection|ISet|ImmutableList|ImmutableArray|Seq|Sequence)\s*<\s*(?P<inner>.+?)\s*>\s*$",
        // list[T], List[T], Set[T], Sequence[T]
        r"^\s*(?:typing\.)?(?:list|List|set|Set|frozenset|FrozenSet|Sequence|MutableSequence|Iterable|Collection|Deque|deque)\s*\[\s*(?P<inner>.+?)\s*\]\s*$",
        // []T, [4]T
        r"^\s*\[\s*\d*\s*\]\s*(?P<inner>.+?)\s*$",
        // [T], [T; 4]
        r"^\s*\[\s*(?P<inner>[^;\]]+?)\s*(?:;\s*[^\]]+)?\]\s*$",
        // T[]
        r"^\s*(?P<inner>.+?)\s*\[\s*\]\s*$",
        // repeated T
        r"^\s*repeated\s+(?P<inner>.+?)\s*$",
    ])
});

/// Leading reference sigils that never change the referenced type: `&`, `&'a`, `&mut`.
static REFERENCE_SIGIL: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"^\s*&\s*(?:'\w+\s+)?(?:mut\s+)?"]));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(r) => Some(r),
            Err(e) => {
                tracing::error!("invalid type wrapper pattern {}: {}", p, e);
                None
            }
        })
        .collect()
}

/// Decompose a raw type signature into a [`TypeRef`].
///
/// Pure and stateless: the same input always yields the same output.
pub fn decompose(raw: &str) -> TypeRef {
    let mut working = strip_reference(raw);
    let mut optional = false;
    let mut is_collection = false;

    // Nested markers (`Option<T | null>`) collapse into one flag. Every
    // wrapper strips at least one character, so the loops terminate.
    while let Some(inner) = first_capture(&OPTIONAL_WRAPPERS, working) {
        optional = true;
        working = inner;
    }

    if let Some(inner) = first_capture(&COLLECTION_WRAPPERS, working) {
        is_collection = true;
        working = inner;
        // Element nullability belongs to the element, not the field.
        while let Some(element) = first_capture(&OPTIONAL_WRAPPERS, working) {
            working = element;
        }
    }

    let working = strip_reference(working).trim();
    let generics = if let Some((key, value)) = split_go_map(working) {
        vec![decompose(key), decompose(value)]
    } else {
        split_generic(working)
            .map(|args| {
                split_top_level(args)
                    .into_iter()
                    .map(|arg| TypeRef::argument(base_name(arg), arg))
                    .collect()
            })
            .unwrap_or_default()
    };

    TypeRef {
        name: base_name(working).to_string(),
        generics,
        optional,
        is_collection,
        raw: raw.to_string(),
    }
}

fn strip_reference(text: &str) -> &str {
    match REFERENCE_SIGIL.first().and_then(|re| re.find(text)) {
        Some(m) if m.end() < text.len() => &text[m.end()..],
        _ => text,
    }
}

/// First pattern whose `inner` capture is a well-formed type expression.
fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns.iter().find_map(|pattern| {
        let inner = pattern.captures(text)?.name("inner")?.as_str().trim();
        (!inner.is_empty() && is_balanced(inner) && split_top_level(inner).len() == 1)
            .then_some(inner)
    })
}

/// Identifier with any generic or bracket suffix removed.
fn base_name(text: &str) -> &str {
    let text = text.trim();
    match text.find(|c: char| c == '<' || c == '[') {
        Some(0) | None => text,
        Some(idx) => text[..idx].trim_end(),
    }
}

/// The argument text of `Identifier<Args>` or `Identifier[Args]`, when the
/// opening bracket's match is the final character.
fn split_generic(text: &str) -> Option<&str> {
    let open = text.find(|c: char| c == '<' || c == '[')?;
    if open == 0 {
        return None;
    }
    let close = matching_close(text, open)?;
    if close != text.len() - 1 {
        return None;
    }
    Some(&text[open + 1..close])
}

/// Key and value of a Go `map[K]V`.
fn split_go_map(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with("map[") {
        return None;
    }
    let close = matching_close(text, 3)?;
    let key = text[4..close].trim();
    let value = text[close + 1..].trim();
    (!key.is_empty() && !value.is_empty()).then_some((key, value))
}

fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (idx, ch) in text.char_indices().skip_while(|(i, _)| *i < open) {
        match ch {
            '<' | '[' | '(' | '{' => depth += 1,
            '>' | ']' | ')' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested inside any bracket pair.
pub(crate) fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        match ch {
            '<' | '[' | '(' | '{' => depth += 1,
            '>' | ']' | ')' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(text[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn is_balanced(text: &str) -> bool {
    let mut stack = Vec::new();
    for ch in text.chars() {
        match ch {
            '<' | '[' | '(' | '{' => stack.push(ch),
            '>' | ']' | ')' | '}' => {
                let expected = match ch {
                    '>' => '<',
                    ']' => '[',
                    ')' => '(',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}
