//! End-to-end recognition scenarios
//!
//! A small lexicon tagger stands in for the French tagging model: it
//! splits on whitespace and looks each word up, defaulting to NOUN.

use reel_core::{AnnotatedToken, PosTag, Result, TitleCorpus, TitleRecord};
use reel_extractor::{match_titles, PretaggedTagger, RuleSet, Tagger, TitleRecognizer};

fn lexicon_tag(word: &str) -> (PosTag, String) {
    let lower = word.to_lowercase();
    let (pos, lemma) = match lower.as_str() {
        "le" | "la" | "les" | "ce" | "cette" | "un" | "une" | "mes" => (PosTag::Det, lower.as_str()),
        "de" | "au" | "à" => (PosTag::Adp, lower.as_str()),
        "voir" | "vu" | "allez" => (
            PosTag::Verb,
            if lower == "allez" { "aller" } else { "voir" },
        ),
        "petit" | "réjouissant" => (PosTag::Adj, lower.as_str()),
        "et" => (PosTag::Cconj, "et"),
        _ if word.chars().next().is_some_and(char::is_uppercase) => (PosTag::Propn, word),
        _ => (PosTag::Noun, lower.as_str()),
    };
    (pos, lemma.to_string())
}

fn lexicon_tagger(text: &str) -> Result<Vec<AnnotatedToken>> {
    Ok(text
        .split_whitespace()
        .map(|word| {
            let (pos, lemma) = lexicon_tag(word);
            AnnotatedToken::new(word, pos, lemma)
        })
        .collect())
}

fn corpus(texts: &[&str]) -> Vec<TitleRecord> {
    let content: String = texts
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{t}\ttt{i:07}\t7.0\n"))
        .collect();
    TitleCorpus::from_tsv_reader(content.as_bytes(), &Default::default())
        .unwrap()
        .records()
        .to_vec()
}

#[test]
fn scenario_film_title_followed_by_director() {
    let titles = corpus(&["vous ne désirez que moi", "Solange"]);
    let recognizer = TitleRecognizer::new();

    let recognition = recognizer
        .recognize(
            "film vous ne désirez que moi Claire Simon",
            &titles,
            &lexicon_tagger,
        )
        .unwrap();

    assert_eq!(
        recognition.rewritten_transcript,
        "film vous_ne_désirez_que_moi Claire Simon"
    );
    assert_eq!(recognition.matches.len(), 1);
    assert_eq!(recognition.matches[0].rule_id, "MR1");
    assert_eq!(recognition.matches[0].span(), (0, 3));
    assert_eq!(recognition.titles, vec!["vous ne désirez que moi"]);
}

#[test]
fn scenario_det_film_title_de() {
    let titles = corpus(&["les jeunes amants"]);
    let recognition = TitleRecognizer::new()
        .recognize(
            "le film les jeunes amants de carine tardieu",
            &titles,
            &lexicon_tagger,
        )
        .unwrap();

    assert_eq!(recognition.matches[0].rule_id, "MR2");
    assert_eq!(recognition.titles, vec!["les jeunes amants"]);
}

#[test]
fn scenario_no_title_present() {
    let titles = corpus(&["les jeunes amants", "Solange"]);
    let lexical = match_titles("bonjour et bienvenue dans le podcast", &titles).unwrap();
    assert!(lexical.candidates.is_empty());

    let recognition = TitleRecognizer::new()
        .recognize("bonjour et bienvenue dans le podcast", &titles, &lexicon_tagger)
        .unwrap();
    assert!(recognition.candidates.is_empty());
    assert!(recognition.matches.is_empty());
    assert!(recognition.titles.is_empty());
}

#[test]
fn scenario_reserved_title_film_never_reaches_rules() {
    let titles = corpus(&["Film"]);
    let recognition = TitleRecognizer::new()
        .recognize("le film film de Claire", &titles, &lexicon_tagger)
        .unwrap();

    assert!(recognition.candidates.is_empty());
    assert!(recognition.titles.is_empty());
}

#[test]
fn scenario_single_word_title_after_voir_det() {
    let titles = corpus(&["solange"]);
    let recognition = TitleRecognizer::new()
        .recognize("on va voir ce solange au cinéma", &titles, &lexicon_tagger)
        .unwrap();

    assert_eq!(recognition.candidates.len(), 1);
    assert!(recognition.candidates[0].joined_form.is_none());
    assert_eq!(
        recognition.rewritten_transcript,
        "on va voir ce solange au cinéma"
    );
    assert_eq!(recognition.matches[0].rule_id, "MR4");
    assert_eq!(recognition.titles, vec!["solange"]);
}

#[test]
fn scenario_adjective_between_det_and_title_is_not_confirmed() {
    // MR4 is [lemma voir, DET, title, !VERB]: the title must directly follow
    // the determiner and one more token must come after it. "petit" fills
    // the title slot here, so the candidate is proposed but not confirmed.
    let titles = corpus(&["solange"]);
    let recognition = TitleRecognizer::new()
        .recognize("voir ce petit solange", &titles, &lexicon_tagger)
        .unwrap();

    assert_eq!(recognition.candidates.len(), 1);
    assert!(recognition.titles.is_empty());
}

#[test]
fn scenario_multi_word_title_confirmed_by_voir() {
    let titles = corpus(&["petite solange"]);
    let recognition = TitleRecognizer::new()
        .recognize("allez voir cette petite solange au cinéma", &titles, &lexicon_tagger)
        .unwrap();

    assert_eq!(recognition.matches[0].rule_id, "MR4");
    assert_eq!(recognition.titles, vec!["petite solange"]);
}

#[test]
fn scenario_duplicates_collapse_across_rules() {
    let titles = corpus(&["les jeunes amants"]);
    let recognition = TitleRecognizer::new()
        .recognize(
            "le film les jeunes amants de carine tardieu et voir les jeunes amants au cinéma",
            &titles,
            &lexicon_tagger,
        )
        .unwrap();

    let rules: Vec<&str> = recognition
        .matches
        .iter()
        .map(|m| m.rule_id.as_str())
        .collect();
    assert_eq!(rules, vec!["MR2", "MR5"]);
    assert_eq!(recognition.titles, vec!["les jeunes amants"]);
}

#[test]
fn scenario_lexical_false_positive_rejected() {
    // "amants" occurs but never in a film-introducing context
    let titles = corpus(&["amants"]);
    let recognition = TitleRecognizer::new()
        .recognize("les amants se retrouvent le soir", &titles, &lexicon_tagger)
        .unwrap();

    assert_eq!(recognition.candidates.len(), 1);
    assert!(recognition.titles.is_empty());
}

#[test]
fn scenario_offline_tagging_workflow() {
    let titles = corpus(&["les jeunes amants"]);
    let lexical = match_titles("le film les jeunes amants de carine tardieu", &titles).unwrap();

    let conllu = "1\tle\tle\tDET\t_\t_\t2\tdet\t_\t_
2\tfilm\tfilm\tNOUN\t_\t_\t0\troot\t_\t_
3\tles_jeunes_amants\tles_jeunes_amants\tNOUN\t_\t_\t2\tnmod\t_\t_
4\tde\tde\tADP\t_\t_\t5\tcase\t_\t_
5\tcarine\tcarine\tPROPN\t_\t_\t3\tnmod\t_\tNER=PER
";
    let tagger = PretaggedTagger::from_conllu(conllu).unwrap();
    let tokens = tagger.tag(&lexical.rewritten_transcript).unwrap();
    let recognition = TitleRecognizer::new().recognize_tagged(lexical, &tokens);

    assert_eq!(recognition.titles, vec!["les jeunes amants"]);
}

#[test]
fn scenario_rule_independence_end_to_end() {
    let titles = corpus(&["les jeunes amants", "solange"]);
    let transcript = "le film les jeunes amants de carine et voir ce solange au cinéma";
    let full = TitleRecognizer::new()
        .recognize(transcript, &titles, &lexicon_tagger)
        .unwrap();

    let without_mr2 = TitleRecognizer::with_rules(RuleSet::film_rules().without("MR2"))
        .recognize(transcript, &titles, &lexicon_tagger)
        .unwrap();

    let others: Vec<_> = full.matches.iter().filter(|m| m.rule_id != "MR2").collect();
    let reduced: Vec<_> = without_mr2.matches.iter().collect();
    assert_eq!(reduced, others);
    assert_eq!(without_mr2.titles, vec!["solange"]);
}
