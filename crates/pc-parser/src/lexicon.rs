//! Closed word classes and a base-form verb lexicon with simple English
//! inflection handling.

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "these", "those", "my", "your", "his", "her", "its", "our", "their",
    "some", "any", "each", "every", "all", "no", "another", "both", "either", "neither", "many",
    "few", "several", "much", "more", "most",
];

const PREPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "to", "for", "with", "by", "from", "about", "into", "onto", "over",
    "under", "between", "through", "during", "before", "after", "above", "below", "across",
    "against", "along", "among", "around", "behind", "beside", "beyond", "inside", "outside",
    "toward", "towards", "upon", "via", "within", "without", "per", "except", "near", "since",
    "until",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "if", "then", "because", "while", "although",
    "though", "unless", "than", "whether", "once",
];

const AUXILIARIES: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "being", "am", "has", "have", "had", "having", "do",
    "does", "did", "will", "would", "can", "could", "should", "shall", "may", "might", "must",
    "don't", "doesn't", "didn't", "can't", "won't", "isn't", "aren't", "wasn't", "weren't",
    "shouldn't", "couldn't", "wouldn't", "cannot",
];

const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "mine", "yours",
    "ours", "theirs", "myself", "itself", "themselves", "someone", "something", "everyone",
    "everything", "nothing", "anyone", "anything", "nobody", "everybody", "somebody", "what",
    "where", "when", "why", "how",
];

const RELATIVES: &[&str] = &["that", "which", "who", "whom", "whose"];

const INTERJECTIONS: &[&str] = &[
    "hello", "hi", "hey", "goodbye", "bye", "thanks", "please", "yes", "ok", "okay", "wow", "oh",
    "ah", "oops", "hooray", "alas",
];

const PARTICLES: &[&str] = &["up", "out", "down", "off", "away", "back"];

const NEGATIONS: &[&str] = &["not", "never", "also", "always", "often", "just"];

const LY_NOUNS: &[&str] = &[
    "family", "assembly", "supply", "reply", "apply", "anomaly", "ally", "rally", "italy", "belly",
    "jelly", "fly", "butterfly", "july", "only", "monopoly", "holy",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "al", "ous", "ive", "ful", "less", "able", "ible", "ic", "ish",
];

/// Base forms recognised as verbs, together with the inflections that
/// [`verb_form`] derives from them.
const VERBS: &[&str] = &[
    "accept", "access", "add", "allow", "analyze", "answer", "apply", "approve", "arrive", "ask",
    "assign", "attach", "authenticate", "become", "begin", "bring", "build", "buy", "calculate",
    "call", "cancel", "change", "check", "choose", "clean", "clear", "click", "close", "collect",
    "come", "compile", "complete", "compute", "configure", "confirm", "connect", "contain",
    "convert", "copy", "create", "delete", "deliver", "deploy", "describe", "design", "detect",
    "develop", "display", "download", "drive", "drop", "eat", "edit", "enable", "encrypt", "enter",
    "fail", "fetch", "fill", "filter", "find", "finish", "fix", "follow", "generate", "get",
    "give", "go", "grow", "handle", "help", "hold", "ignore", "implement", "import", "include",
    "install", "invoke", "join", "keep", "know", "launch", "lead", "learn", "leave", "like",
    "list", "load", "log", "login", "look", "lose", "love", "make", "manage", "measure", "meet",
    "merge", "move", "need", "notify", "open", "order", "own", "parse", "pay", "place", "play",
    "post", "prepare", "press", "print", "process", "produce", "provide", "publish", "pull",
    "purchase", "push", "put", "query", "read", "receive", "record", "reduce", "register",
    "reject", "release", "remove", "render", "reply", "report", "request", "require", "reset",
    "resolve", "respond", "restart", "retrieve", "return", "review", "run", "save", "say", "scan",
    "search", "see", "select", "sell", "send", "serve", "set", "ship", "show", "sign", "solve",
    "sort", "speak", "speed", "start", "stop", "store", "submit", "subscribe", "support", "take",
    "talk", "teach", "tell", "test", "think", "track", "transform", "trigger", "update", "upload",
    "use", "validate", "verify", "view", "visit", "wait", "want", "watch", "welcome", "work",
    "write",
];

const IRREGULAR_PAST: &[(&str, &str)] = &[
    ("ate", "eat"),
    ("became", "become"),
    ("began", "begin"),
    ("bought", "buy"),
    ("brought", "bring"),
    ("built", "build"),
    ("came", "come"),
    ("chose", "choose"),
    ("drove", "drive"),
    ("found", "find"),
    ("gave", "give"),
    ("got", "get"),
    ("grew", "grow"),
    ("held", "hold"),
    ("kept", "keep"),
    ("knew", "know"),
    ("led", "lead"),
    ("left", "leave"),
    ("lost", "lose"),
    ("made", "make"),
    ("met", "meet"),
    ("paid", "pay"),
    ("ran", "run"),
    ("said", "say"),
    ("saw", "see"),
    ("sent", "send"),
    ("sold", "sell"),
    ("spoke", "speak"),
    ("taught", "teach"),
    ("thought", "think"),
    ("told", "tell"),
    ("took", "take"),
    ("went", "go"),
    ("wrote", "write"),
];

/// Closed-class membership, checked before anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClosedClass {
    Determiner,
    Preposition,
    Conjunction,
    Auxiliary,
    Pronoun,
    Relative,
    Interjection,
    Particle,
    Adverb,
}

pub(crate) fn closed_class(lower: &str) -> Option<ClosedClass> {
    // "that" is handled as a relative pronoun, never as a determiner.
    let class = if RELATIVES.contains(&lower) {
        ClosedClass::Relative
    } else if DETERMINERS.contains(&lower) {
        ClosedClass::Determiner
    } else if AUXILIARIES.contains(&lower) {
        ClosedClass::Auxiliary
    } else if PRONOUNS.contains(&lower) {
        ClosedClass::Pronoun
    } else if PARTICLES.contains(&lower) {
        ClosedClass::Particle
    } else if PREPOSITIONS.contains(&lower) {
        ClosedClass::Preposition
    } else if CONJUNCTIONS.contains(&lower) {
        ClosedClass::Conjunction
    } else if INTERJECTIONS.contains(&lower) {
        ClosedClass::Interjection
    } else if NEGATIONS.contains(&lower) {
        ClosedClass::Adverb
    } else {
        return None;
    };
    Some(class)
}

pub(crate) fn is_ly_adverb(lower: &str) -> bool {
    lower.len() > 4
        && lower.ends_with("ly")
        && !LY_NOUNS.contains(&lower)
        && verb_form(lower).is_none()
}

pub(crate) fn has_adjective_suffix(lower: &str) -> bool {
    lower.len() > 4
        && ADJECTIVE_SUFFIXES
            .iter()
            .any(|suffix| lower.ends_with(suffix))
}

pub(crate) fn is_number(word: &str) -> bool {
    word.chars().next().is_some_and(|ch| ch.is_ascii_digit())
        && word
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | ',' | '_'))
}

/// Inflection of a recognised verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VerbForm {
    Base,
    ThirdPerson,
    Past,
    Progressive,
}

fn known(stem: &str) -> bool {
    !stem.is_empty() && VERBS.contains(&stem)
}

fn undouble(stem: &str) -> Option<&str> {
    let bytes = stem.as_bytes();
    let len = bytes.len();
    if len >= 3 && bytes[len - 1] == bytes[len - 2] {
        Some(&stem[..len - 1])
    } else {
        None
    }
}

/// Identify `lower` as a form of a lexicon verb.
pub(crate) fn verb_form(lower: &str) -> Option<VerbForm> {
    if !lower.is_ascii() {
        return None;
    }
    if known(lower) {
        return Some(VerbForm::Base);
    }
    if IRREGULAR_PAST
        .iter()
        .any(|(form, base)| *form == lower && known(base))
    {
        return Some(VerbForm::Past);
    }
    if let Some(stem) = lower.strip_suffix("ies")
        && known(&format!("{stem}y"))
    {
        return Some(VerbForm::ThirdPerson);
    }
    if let Some(stem) = lower.strip_suffix("es")
        && known(stem)
    {
        return Some(VerbForm::ThirdPerson);
    }
    if let Some(stem) = lower.strip_suffix('s')
        && known(stem)
    {
        return Some(VerbForm::ThirdPerson);
    }
    if let Some(stem) = lower.strip_suffix("ied")
        && known(&format!("{stem}y"))
    {
        return Some(VerbForm::Past);
    }
    if let Some(stem) = lower.strip_suffix("ed") {
        if known(stem) || undouble(stem).is_some_and(known) {
            return Some(VerbForm::Past);
        }
        if lower.strip_suffix('d').is_some_and(known) {
            return Some(VerbForm::Past);
        }
    }
    if let Some(stem) = lower.strip_suffix("ing")
        && (known(stem) || known(&format!("{stem}e")) || undouble(stem).is_some_and(known))
    {
        return Some(VerbForm::Progressive);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{ClosedClass, VerbForm, closed_class, has_adjective_suffix, is_number, verb_form};

    #[test]
    fn regular_inflections_resolve_to_lexicon_entries() {
        assert_eq!(verb_form("send"), Some(VerbForm::Base));
        assert_eq!(verb_form("sends"), Some(VerbForm::ThirdPerson));
        assert_eq!(verb_form("pushes"), Some(VerbForm::ThirdPerson));
        assert_eq!(verb_form("notifies"), Some(VerbForm::ThirdPerson));
        assert_eq!(verb_form("clicked"), Some(VerbForm::Past));
        assert_eq!(verb_form("stored"), Some(VerbForm::Past));
        assert_eq!(verb_form("stopped"), Some(VerbForm::Past));
        assert_eq!(verb_form("notified"), Some(VerbForm::Past));
        assert_eq!(verb_form("storing"), Some(VerbForm::Progressive));
        assert_eq!(verb_form("running"), Some(VerbForm::Progressive));
        assert_eq!(verb_form("developed"), Some(VerbForm::Past));
    }

    #[test]
    fn irregular_pasts_and_unknown_words() {
        assert_eq!(verb_form("sent"), Some(VerbForm::Past));
        assert_eq!(verb_form("built"), Some(VerbForm::Past));
        assert_eq!(verb_form("client"), None);
        assert_eq!(verb_form("users"), None);
        assert_eq!(verb_form("forces"), None);
        assert_eq!(verb_form("long-ranged"), None);
    }

    #[test]
    fn that_is_relative_not_determiner() {
        assert_eq!(closed_class("that"), Some(ClosedClass::Relative));
        assert_eq!(closed_class("the"), Some(ClosedClass::Determiner));
        assert_eq!(closed_class("does"), Some(ClosedClass::Auxiliary));
        assert_eq!(closed_class("how"), Some(ClosedClass::Pronoun));
        assert_eq!(closed_class("hello"), Some(ClosedClass::Interjection));
        assert_eq!(closed_class("server"), None);
    }

    #[test]
    fn adjective_suffixes_and_numbers() {
        assert!(has_adjective_suffix("numerical"));
        assert!(has_adjective_suffix("reliable"));
        assert!(!has_adjective_suffix("method"));
        assert!(is_number("3"));
        assert!(is_number("2.5"));
        assert!(!is_number("v2"));
    }
}
