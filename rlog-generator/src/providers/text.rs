//! Sentences and paragraphs built from the locale word list.

use anyhow::Result;
use rand::Rng;

use crate::core::expr::{bool_arg, count_arg};
use crate::core::value::Value;
use crate::providers::{FakeContext, Registry, arg_or, check_arity};

pub fn register(registry: &mut Registry) {
    registry.register(
        "randsentence",
        "func_randsentence [NB_WORDS=4] [VARIABLE_NB_WORDS=false]",
        randsentence,
    );
    registry.register(
        "randparagraph",
        "func_randparagraph [NB_SENTENCES=2] [VARIABLE_NB_SENTENCES=true]",
        randparagraph,
    );
}

const PARAGRAPH_SENTENCE_WORDS: usize = 6;
const MAX_COUNT: usize = 10_000;

/// Scale `count` by a random factor in `[0.6, 1.4]`, never below one.
fn vary(ctx: &mut FakeContext, count: usize) -> usize {
    let factor: f64 = ctx.rng().gen_range(0.6..=1.4);
    ((count as f64 * factor).round() as usize).max(1)
}

fn positive(label: &str, raw: &str) -> Result<usize> {
    count_arg(label, raw, 1, MAX_COUNT)
}

pub(crate) fn sentence(ctx: &mut FakeContext, nb_words: usize, variable: bool) -> String {
    let count = if variable {
        vary(ctx, nb_words)
    } else {
        nb_words
    };
    let lorem = ctx.locale().words().lorem;
    let words: Vec<&str> = (0..count).map(|_| ctx.pick(lorem)).collect();
    let mut text = capitalize(&words.join(" "));
    text.push('.');
    text
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn randsentence(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 2)?;
    let nb_words = arg_or(args, 0, 4, |raw| positive("nb_words", raw))?;
    let variable = arg_or(args, 1, false, |raw| bool_arg("variable_nb_words", raw))?;
    Ok(Value::Str(sentence(ctx, nb_words, variable)))
}

fn randparagraph(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 2)?;
    let nb_sentences = arg_or(args, 0, 2, |raw| positive("nb_sentences", raw))?;
    let variable = arg_or(args, 1, true, |raw| bool_arg("variable_nb_sentences", raw))?;
    let count = if variable {
        vary(ctx, nb_sentences)
    } else {
        nb_sentences
    };
    let sentences: Vec<String> = (0..count)
        .map(|_| sentence(ctx, PARAGRAPH_SENTENCE_WORDS, true))
        .collect();
    Ok(Value::Str(sentences.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Locale;

    fn text(value: Value) -> String {
        match value {
            Value::Str(s) => s,
            Value::Int(n) => panic!("expected string, got {n}"),
        }
    }

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn fixed_sentence_has_exact_word_count() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(9));
        let sentence = text(randsentence(&mut ctx, &args(&["5"])).expect("sentence"));
        assert!(sentence.ends_with('.'));
        assert_eq!(sentence.split(' ').count(), 5);
        assert!(sentence.chars().next().is_some_and(char::is_uppercase));
    }

    #[test]
    fn variable_sentence_stays_in_range() {
        let mut ctx = FakeContext::new(Locale::ItIt, Some(9));
        for _ in 0..100 {
            let sentence = text(randsentence(&mut ctx, &args(&["10", "true"])).expect("sentence"));
            let words = sentence.split(' ').count();
            assert!((6..=14).contains(&words), "{words} words");
        }
    }

    #[test]
    fn fixed_paragraph_has_exact_sentence_count() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(9));
        let paragraph = text(randparagraph(&mut ctx, &args(&["3", "false"])).expect("paragraph"));
        assert_eq!(paragraph.matches('.').count(), 3);
    }

    #[test]
    fn zero_words_is_rejected() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(9));
        assert!(randsentence(&mut ctx, &args(&["0"])).is_err());
        assert!(randsentence(&mut ctx, &args(&["10001"])).is_err());
    }
}
