use pc_core::{GraphDocument, RESERVED_IDENTIFIERS};
use rustc_hash::{FxHashMap, FxHashSet};

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Rewrite a raw id into the identifier alphabet without collision handling.
///
/// Characters outside `[A-Za-z0-9_-]` become `_`, hyphens survive only
/// between word characters, and reserved keywords gain `prefix`.
#[must_use]
pub fn sanitize_identifier(raw: &str, prefix: &str) -> String {
    let mapped: Vec<char> = raw
        .trim()
        .chars()
        .map(|ch| if is_word_char(ch) || ch == '-' { ch } else { '_' })
        .collect();
    let mut sanitized = String::with_capacity(mapped.len());
    for (index, &ch) in mapped.iter().enumerate() {
        if ch == '-' {
            let before = index > 0 && is_word_char(mapped[index - 1]);
            let after = mapped.get(index + 1).is_some_and(|next| is_word_char(*next));
            sanitized.push(if before && after { '-' } else { '_' });
        } else {
            sanitized.push(ch);
        }
    }
    if RESERVED_IDENTIFIERS.contains(&sanitized.as_str()) {
        format!("{prefix}{sanitized}")
    } else {
        sanitized
    }
}

/// Per-document mapping from raw ids to emitted identifiers.
///
/// Distinct raw ids always map to distinct identifiers; when two sanitize to
/// the same text the later one gets a `_2`, `_3`, ... suffix.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    prefix: String,
    assigned: FxHashMap<String, String>,
    taken: FxHashSet<String>,
}

impl IdentifierMap {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Assign identifiers for every node id in document order, then for link
    /// endpoints that reference no node.
    #[must_use]
    pub fn for_document(document: &GraphDocument, prefix: impl Into<String>) -> Self {
        let mut map = Self::new(prefix);
        for node in &document.nodes {
            map.assign(&node.id);
        }
        for link in &document.links {
            map.assign(&link.source_id);
            map.assign(&link.target_id);
        }
        map
    }

    /// Identifier for `raw`, assigning one if it has not been seen yet.
    pub fn assign(&mut self, raw: &str) -> &str {
        let key = raw.trim().to_string();
        if !self.assigned.contains_key(&key) {
            let base = sanitize_identifier(&key, &self.prefix);
            let mut candidate = base.clone();
            let mut suffix = 2;
            while self.taken.contains(&candidate) {
                candidate = format!("{base}_{suffix}");
                suffix += 1;
            }
            self.taken.insert(candidate.clone());
            self.assigned.insert(key.clone(), candidate);
        }
        self.assigned.get(&key).map_or("", String::as_str)
    }

    #[must_use]
    pub fn get(&self, raw: &str) -> Option<&str> {
        self.assigned.get(raw.trim()).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pc_core::{GraphDocument, GraphLink, GraphNode, LinkStyle, NodeShape, Orientation};

    use super::{IdentifierMap, sanitize_identifier};

    #[test]
    fn reserved_words_are_prefixed_case_sensitively() {
        assert_eq!(sanitize_identifier("end", "id_"), "id_end");
        assert_eq!(sanitize_identifier("classDef", "id_"), "id_classDef");
        assert_eq!(sanitize_identifier("End", "id_"), "End");
        assert_eq!(sanitize_identifier("ending", "id_"), "ending");
    }

    #[test]
    fn unsafe_characters_become_underscores() {
        assert_eq!(sanitize_identifier("user id", "id_"), "user_id");
        assert_eq!(sanitize_identifier("a.b/c", "id_"), "a_b_c");
        assert_eq!(sanitize_identifier("n-body", "id_"), "n-body");
        assert_eq!(sanitize_identifier("a--b", "id_"), "a__b");
        assert_eq!(sanitize_identifier("-edge-", "id_"), "_edge_");
        assert_eq!(sanitize_identifier("größe", "id_"), "gr__e");
    }

    #[test]
    fn colliding_ids_get_numeric_suffixes() {
        let mut map = IdentifierMap::new("id_");
        assert_eq!(map.assign("a b"), "a_b");
        assert_eq!(map.assign("a_b"), "a_b_2");
        assert_eq!(map.assign("a.b"), "a_b_3");
        assert_eq!(map.assign("a b"), "a_b");
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn document_map_covers_nodes_and_dangling_endpoints() {
        let document = GraphDocument::new(Orientation::TD)
            .with_node(GraphNode::new("end", "End", NodeShape::Square))
            .with_link(GraphLink::new("end", "ghost node", LinkStyle::Arrow));
        let map = IdentifierMap::for_document(&document, "id_");
        assert_eq!(map.get("end"), Some("id_end"));
        assert_eq!(map.get("ghost node"), Some("ghost_node"));
        assert_eq!(map.get("missing"), None);
    }
}
