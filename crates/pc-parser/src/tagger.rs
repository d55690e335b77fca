//! Phrase tagging: the seam between the sentence parser and whatever
//! identifies noun and verb phrases.
//!
//! [`LexiconTagger`] is a deterministic tagger built from closed word classes,
//! a verb lexicon and a handful of positional rules. It is intentionally
//! small; callers with a better tagger plug it in through [`PhraseTagger`].

use pc_core::{TaggedSentence, TaggedSpan};
use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

use crate::lexicon::{
    ClosedClass, VerbForm, closed_class, has_adjective_suffix, is_ly_adverb, is_number, verb_form,
};

/// Identifies noun phrases and verb phrases in a sentence.
///
/// Every returned span must be a verbatim substring of the input, and each
/// list must be in left-to-right order.
pub trait PhraseTagger: Send + Sync {
    fn tag(&self, sentence: &str) -> TaggedSentence;
}

impl<F> PhraseTagger for F
where
    F: Fn(&str) -> TaggedSentence + Send + Sync,
{
    fn tag(&self, sentence: &str) -> TaggedSentence {
        self(sentence)
    }
}

/// Word class after context resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WordClass {
    Determiner,
    Preposition,
    Conjunction,
    Auxiliary,
    Pronoun,
    Relative,
    Interjection,
    Particle,
    Adverb,
    Verb,
    Noun,
    Adjective,
    Number,
}

impl WordClass {
    const fn is_head(self) -> bool {
        matches!(self, Self::Noun | Self::Number)
    }

    const fn starts_noun_phrase(self) -> bool {
        matches!(
            self,
            Self::Determiner | Self::Adjective | Self::Noun | Self::Number
        )
    }

    const fn continues_noun_phrase(self) -> bool {
        matches!(self, Self::Adjective | Self::Noun | Self::Number)
    }

    const fn continues_verb_phrase(self) -> bool {
        matches!(
            self,
            Self::Auxiliary | Self::Verb | Self::Particle | Self::Adverb
        )
    }
}

/// Class information known before looking at neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexical {
    Closed(ClosedClass),
    Number,
    LyAdverb,
    Verbish(VerbForm),
    Open { adjective_like: bool },
}

impl Lexical {
    fn of(word: &str, lower: &str) -> Self {
        if let Some(class) = closed_class(lower) {
            return Self::Closed(class);
        }
        if is_number(word) {
            return Self::Number;
        }
        if let Some(form) = verb_form(lower) {
            return Self::Verbish(form);
        }
        if is_ly_adverb(lower) {
            return Self::LyAdverb;
        }
        Self::Open {
            adjective_like: lower.contains('-') || has_adjective_suffix(lower),
        }
    }

    /// Would this word read as a noun if it followed an adjective?
    const fn is_nominal(self) -> bool {
        matches!(
            self,
            Self::Number
                | Self::Open { .. }
                | Self::Verbish(VerbForm::Base | VerbForm::ThirdPerson)
        )
    }

    /// Does this word look like the finite verb of a clause?
    const fn is_finite_verb(self) -> bool {
        matches!(
            self,
            Self::Closed(ClosedClass::Auxiliary)
                | Self::Verbish(VerbForm::ThirdPerson | VerbForm::Past)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Space,
    Open,
    Close,
    Break,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    start: usize,
    end: usize,
    kind: TokenKind,
}

fn token_kind(segment: &str) -> TokenKind {
    if segment.chars().any(char::is_alphanumeric) {
        TokenKind::Word
    } else if segment.chars().all(char::is_whitespace) {
        TokenKind::Space
    } else if segment == "(" {
        TokenKind::Open
    } else if segment == ")" {
        TokenKind::Close
    } else if segment
        .chars()
        .any(|ch| matches!(ch, ',' | ';' | ':' | '.' | '!' | '?'))
    {
        TokenKind::Break
    } else {
        TokenKind::Other
    }
}

/// Split on Unicode word boundaries, joining hyphenated compounds such as
/// `n-body` into one word token.
fn tokenize(sentence: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for (start, segment) in sentence.split_word_bound_indices() {
        let token = Token {
            start,
            end: start + segment.len(),
            kind: token_kind(segment),
        };
        let len = tokens.len();
        let joins_hyphen = token.kind == TokenKind::Word
            && len >= 2
            && tokens[len - 1].kind == TokenKind::Other
            && &sentence[tokens[len - 1].start..tokens[len - 1].end] == "-"
            && tokens[len - 2].kind == TokenKind::Word;
        if joins_hyphen {
            tokens.pop();
            if let Some(previous) = tokens.last_mut() {
                previous.end = token.end;
            }
            continue;
        }
        tokens.push(token);
    }
    tokens
}

#[derive(Debug, Clone)]
struct Word {
    token: usize,
    start: usize,
    end: usize,
    lower: String,
    lexical: Lexical,
    class: WordClass,
}

/// Deterministic rule-based tagger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconTagger;

impl LexiconTagger {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn words(sentence: &str, tokens: &[Token]) -> Vec<Word> {
        let mut words: Vec<Word> = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.kind == TokenKind::Word)
            .map(|(index, token)| {
                let text = &sentence[token.start..token.end];
                let lower = text.to_lowercase().replace('\u{2019}', "'");
                let lexical = Lexical::of(text, &lower);
                Word {
                    token: index,
                    start: token.start,
                    end: token.end,
                    lower,
                    lexical,
                    class: WordClass::Noun,
                }
            })
            .collect();

        for index in 0..words.len() {
            let previous = index
                .checked_sub(1)
                .filter(|&prev| !clause_break_between(tokens, &words[prev], &words[index]))
                .map(|prev| (words[prev].class, words[prev].lower.as_str()));
            let next = words
                .get(index + 1)
                .filter(|next| !clause_break_between(tokens, &words[index], next))
                .map(|next| next.lexical);
            let class = resolve(words[index].lexical, previous, next);
            words[index].class = class;
        }
        words
    }

    fn noun_phrases(tokens: &[Token], words: &[Word]) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut index = 0;
        while index < words.len() {
            if !words[index].class.starts_noun_phrase() {
                index += 1;
                continue;
            }
            let start = index;
            let mut last = index;
            let mut head = words[index].class.is_head().then_some(index);
            while last + 1 < words.len()
                && only_spaces_between(tokens, &words[last], &words[last + 1])
                && words[last + 1].class.continues_noun_phrase()
            {
                last += 1;
                if words[last].class.is_head() {
                    head = Some(last);
                }
            }
            if let Some(head) = head {
                let mut end = words[head].end;
                if head == last
                    && let Some((close_end, inner_last)) = parenthetical(tokens, words, head)
                {
                    end = close_end;
                    last = inner_last;
                }
                spans.push((words[start].start, end));
            }
            index = last + 1;
        }
        spans
    }

    fn verb_phrases(tokens: &[Token], words: &[Word]) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut index = 0;
        while index < words.len() {
            if !matches!(words[index].class, WordClass::Auxiliary | WordClass::Verb) {
                index += 1;
                continue;
            }
            let start = index;
            let mut last = index;
            let mut core = index;
            while last + 1 < words.len()
                && only_spaces_between(tokens, &words[last], &words[last + 1])
                && words[last + 1].class.continues_verb_phrase()
            {
                last += 1;
                if words[last].class != WordClass::Adverb {
                    core = last;
                }
            }
            spans.push((words[start].start, words[core].end));
            index = last + 1;
        }
        spans
    }
}

impl PhraseTagger for LexiconTagger {
    fn tag(&self, sentence: &str) -> TaggedSentence {
        let tokens = tokenize(sentence);
        let words = Self::words(sentence, &tokens);
        for word in &words {
            trace!(word = %&sentence[word.start..word.end], class = ?word.class, "tagged word");
        }
        let nouns = Self::noun_phrases(&tokens, &words)
            .into_iter()
            .map(|(start, end)| TaggedSpan::noun(&sentence[start..end]))
            .collect();
        let verbs = Self::verb_phrases(&tokens, &words)
            .into_iter()
            .map(|(start, end)| TaggedSpan::verb(&sentence[start..end]))
            .collect();
        TaggedSentence { nouns, verbs }
    }
}

fn clause_break_between(tokens: &[Token], left: &Word, right: &Word) -> bool {
    tokens[left.token + 1..right.token]
        .iter()
        .any(|token| token.kind == TokenKind::Break)
}

fn only_spaces_between(tokens: &[Token], left: &Word, right: &Word) -> bool {
    tokens[left.token + 1..right.token]
        .iter()
        .all(|token| token.kind == TokenKind::Space)
}

/// A parenthesised group of nominal words directly after a noun phrase head,
/// as in `method (FMM)`. Returns the byte end of `)` and the last inner word.
fn parenthetical(tokens: &[Token], words: &[Word], head: usize) -> Option<(usize, usize)> {
    let mut cursor = words[head].token + 1;
    while tokens.get(cursor)?.kind == TokenKind::Space {
        cursor += 1;
    }
    if tokens[cursor].kind != TokenKind::Open {
        return None;
    }
    cursor += 1;
    let mut word_index = head + 1;
    let mut inner_last = None;
    loop {
        let token = tokens.get(cursor)?;
        match token.kind {
            TokenKind::Space => {}
            TokenKind::Word => {
                let word = words.get(word_index)?;
                if word.token != cursor || !word.class.continues_noun_phrase() {
                    return None;
                }
                inner_last = Some(word_index);
                word_index += 1;
            }
            TokenKind::Close => return inner_last.map(|last| (token.end, last)),
            _ => return None,
        }
        cursor += 1;
    }
}

fn resolve(
    lexical: Lexical,
    previous: Option<(WordClass, &str)>,
    next: Option<Lexical>,
) -> WordClass {
    let previous_class = previous.map(|(class, _)| class);
    match lexical {
        // Particles only attach to a preceding verb; elsewhere they act as
        // prepositions ("up the hill").
        Lexical::Closed(ClosedClass::Particle) => match previous_class {
            Some(WordClass::Verb | WordClass::Particle) => WordClass::Particle,
            _ => WordClass::Preposition,
        },
        Lexical::Closed(class) => match class {
            ClosedClass::Determiner => WordClass::Determiner,
            ClosedClass::Preposition => WordClass::Preposition,
            ClosedClass::Conjunction => WordClass::Conjunction,
            ClosedClass::Auxiliary => WordClass::Auxiliary,
            ClosedClass::Pronoun => WordClass::Pronoun,
            ClosedClass::Relative => WordClass::Relative,
            ClosedClass::Interjection => WordClass::Interjection,
            ClosedClass::Adverb | ClosedClass::Particle => WordClass::Adverb,
        },
        Lexical::Number => WordClass::Number,
        Lexical::LyAdverb => WordClass::Adverb,
        Lexical::Verbish(form) => verb_or_noun(form, previous, next),
        Lexical::Open { adjective_like } => {
            if !adjective_like {
                WordClass::Noun
            } else if next.is_some_and(Lexical::is_nominal) {
                WordClass::Adjective
            } else if matches!(
                previous_class,
                Some(WordClass::Determiner | WordClass::Adjective)
            ) {
                WordClass::Noun
            } else {
                WordClass::Adjective
            }
        }
    }
}

/// Decide whether a lexicon verb form is acting as a verb or a noun.
fn verb_or_noun(
    form: VerbForm,
    previous: Option<(WordClass, &str)>,
    next: Option<Lexical>,
) -> WordClass {
    let next_is_finite_verb = next.is_some_and(Lexical::is_finite_verb);
    let Some((previous_class, previous_lower)) = previous else {
        // Clause-initial base forms are imperatives unless a finite verb
        // follows, in which case the word is the subject.
        return if form == VerbForm::Base && !next_is_finite_verb {
            WordClass::Verb
        } else {
            WordClass::Noun
        };
    };
    match previous_class {
        WordClass::Determiner
        | WordClass::Adjective
        | WordClass::Verb
        | WordClass::Particle
        | WordClass::Interjection => WordClass::Noun,
        WordClass::Auxiliary | WordClass::Adverb => WordClass::Verb,
        WordClass::Preposition => {
            if previous_lower == "to" && form == VerbForm::Base {
                WordClass::Verb
            } else {
                WordClass::Noun
            }
        }
        WordClass::Noun | WordClass::Number => {
            if form == VerbForm::Base && next_is_finite_verb {
                WordClass::Noun
            } else {
                WordClass::Verb
            }
        }
        WordClass::Pronoun | WordClass::Relative | WordClass::Conjunction => WordClass::Verb,
    }
}
