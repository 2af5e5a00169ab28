use regimen::Catalog;
use regimen::block::synthetic;
use regimen::parser::line::split_definition;
use regimen::parser::nested::NestedBlockParser;
use regimen::parser::section::{Dispatcher, Section};
use regimen::parser::tokenizer::{TokenKind, tokenize};
use regimen::parser::{ParseErrorKind, ParseOptions, Parsed, Parser};
use regimen::registry::{BlockRegistry, DuplicatePolicy, RegimeRegistry, RegistryError};
use regimen::regime::Regime;
use regimen::source::{SourceEncoding, decode};

fn parse(source: &str) -> Parsed {
    Parser::new(source.to_string(), 0).parse()
}

fn catalog(source: &str) -> Catalog {
    let parsed = parse(source);
    assert!(
        !parsed.has_errors(),
        "unexpected errors: {:?}",
        parsed.errors().map(|e| &e.message).collect::<Vec<_>>()
    );
    parsed.catalog
}

fn kinds(text: &str) -> Vec<(TokenKind, &str)> {
    tokenize(text, 0).map(|t| (t.kind, t.text)).collect()
}

#[test]
fn tokenizer_classifies_tokens() {
    assert_eq!(
        kinds("warm (run walk) 2"),
        vec![
            (TokenKind::RegimeUnit, "warm"),
            (TokenKind::OpenBracket, "("),
            (TokenKind::RegimeUnit, "run"),
            (TokenKind::RegimeUnit, "walk"),
            (TokenKind::CloseBracket, ")"),
            (TokenKind::CountUnit, "2"),
        ]
    );
}

#[test]
fn tokenizer_names_need_a_letter() {
    assert_eq!(kinds("12"), vec![(TokenKind::CountUnit, "12")]);
    assert_eq!(kinds("run2"), vec![(TokenKind::RegimeUnit, "run2")]);
    assert_eq!(kinds("2x"), vec![(TokenKind::RegimeUnit, "2x")]);
    assert_eq!(kinds("a/1"), vec![(TokenKind::RegimeUnit, "a/1")]);
    assert_eq!(kinds("бег"), vec![(TokenKind::RegimeUnit, "бег")]);
}

#[test]
fn tokenizer_skips_unknown_characters() {
    assert_eq!(
        kinds("run, walk!"),
        vec![(TokenKind::RegimeUnit, "run"), (TokenKind::RegimeUnit, "walk")]
    );
}

#[test]
fn tokenizer_spans_are_absolute_and_restartable() {
    let tokens = tokenize("(a)3", 10);
    let first: Vec<_> = tokens.clone().map(|t| t.span).collect();
    let second: Vec<_> = tokens.map(|t| t.span).collect();
    assert_eq!(first, vec![10..11, 11..12, 12..13, 13..14]);
    assert_eq!(first, second);
}

#[test]
fn split_with_description() {
    let def = split_definition("warm \"warm up\" (run) 3", 100, 0).unwrap();
    assert_eq!(def.name, "warm");
    assert_eq!(def.name_span, 100..104);
    assert_eq!(def.description, "warm up");
    assert_eq!(def.members, " (run) 3");
    assert_eq!(def.members_offset, 114);
}

#[test]
fn split_without_description() {
    let def = split_definition("  easy (run walk) 2", 0, 0).unwrap();
    assert_eq!(def.name, "easy");
    assert_eq!(def.name_span, 2..6);
    assert_eq!(def.description, "");
    assert_eq!(def.members, " (run walk) 2");
}

#[test]
fn split_rejects_unterminated_description() {
    let err = split_definition("run \"fast", 0, 0).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn split_rejects_multi_word_name() {
    let err = split_definition("long run \"desc\"", 0, 0).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn synthetic_names_bump_suffix() {
    assert_eq!(synthetic::first_child("easy"), "easy/1");
    assert_eq!(synthetic::bump("easy/9").as_deref(), Some("easy/10"));
    assert_eq!(synthetic::fresh("mix", |n| n == "mix/1" || n == "mix/2"), "mix/3");
    assert!(synthetic::is_synthetic("mix/3"));
    assert!(!synthetic::is_synthetic("mix"));
}

#[test]
fn nested_parser_plain_members_default_to_one() {
    let registry = BlockRegistry::new();
    let parsed = NestedBlockParser::new("plain", "", 0..0, 0, &registry)
        .parse(tokenize("run walk", 0))
        .unwrap();
    assert_eq!(parsed.top.count, 1);
    assert_eq!(parsed.top.members, vec!["run", "walk"]);
    assert!(parsed.nested.is_empty());
}

#[test]
fn nested_parser_collapses_single_group() {
    let registry = BlockRegistry::new();
    let parsed = NestedBlockParser::new("easy", "", 0..0, 0, &registry)
        .parse(tokenize("(run walk) 2", 0))
        .unwrap();
    assert_eq!(parsed.top.name, "easy");
    assert_eq!(parsed.top.count, 2);
    assert_eq!(parsed.top.members, vec!["run", "walk"]);
    assert!(parsed.nested.is_empty());
}

#[test]
fn nested_parser_sibling_groups_get_distinct_names() {
    let registry = BlockRegistry::new();
    let parsed = NestedBlockParser::new("mix", "", 0..0, 0, &registry)
        .parse(tokenize("(run) 1 (walk) 3", 0))
        .unwrap();
    assert_eq!(parsed.top.members, vec!["mix/1", "mix/2"]);
    assert_eq!(parsed.nested.len(), 2);
    assert_eq!(parsed.nested[0].name, "mix/1");
    assert_eq!(parsed.nested[0].members, vec!["run"]);
    assert_eq!(parsed.nested[1].name, "mix/2");
    assert_eq!(parsed.nested[1].count, 3);
}

#[test]
fn nested_parser_deep_groups() {
    let registry = BlockRegistry::new();
    let parsed = NestedBlockParser::new("a", "", 0..0, 0, &registry)
        .parse(tokenize("((x) 2 y) 3 z", 0))
        .unwrap();
    assert_eq!(parsed.top.members, vec!["a/1", "z"]);
    let names: Vec<&str> = parsed.nested.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["a/1/1", "a/1"]);
    assert_eq!(parsed.nested[0].count, 2);
    assert_eq!(parsed.nested[1].members, vec!["a/1/1", "y"]);
    assert_eq!(parsed.nested[1].count, 3);
}

#[test]
fn nested_parser_avoids_registered_names() {
    let mut registry = BlockRegistry::new();
    registry
        .insert(
            regimen::block::Block::new("mix/1", "", 1, vec![], 0..0),
            DuplicatePolicy::Reject,
        )
        .unwrap();
    let parsed = NestedBlockParser::new("mix", "", 0..0, 0, &registry)
        .parse(tokenize("(run) (walk)", 0))
        .unwrap();
    assert_eq!(parsed.top.members, vec!["mix/2", "mix/3"]);
}

#[test]
fn nested_parser_syntax_errors() {
    let registry = BlockRegistry::new();
    for members in ["(run walk 2", ") run", "run 2", "(run))", "(a) 99999999999999999999999"] {
        let err = NestedBlockParser::new("bad", "", 0..0, 0, &registry)
            .parse(tokenize(members, 0))
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax, "members: {}", members);
    }
}

#[test]
fn unclosed_group_points_at_its_bracket() {
    let registry = BlockRegistry::new();
    let err = NestedBlockParser::new("bad", "", 0..0, 0, &registry)
        .parse(tokenize("x (run (walk)", 0))
        .unwrap_err();
    assert_eq!(err.span, 2..3);
}

#[test]
fn registries_keep_definition_order() {
    let mut regimes = RegimeRegistry::new();
    for name in ["walk", "run", "swim"] {
        regimes
            .insert(Regime::new(name, "", 0..0), DuplicatePolicy::Reject)
            .unwrap();
    }
    let names: Vec<&str> = regimes.names().collect();
    assert_eq!(names, vec!["walk", "run", "swim"]);
    assert!(matches!(
        regimes.get("fly"),
        Err(RegistryError::UndefinedReference(name)) if name == "fly"
    ));
}

#[test]
fn registry_duplicate_policy() {
    let mut regimes = RegimeRegistry::new();
    regimes
        .insert(Regime::new("run", "old", 0..0), DuplicatePolicy::Reject)
        .unwrap();
    assert_eq!(
        regimes.insert(Regime::new("run", "new", 0..0), DuplicatePolicy::Reject),
        Err(RegistryError::DuplicateName("run".to_string()))
    );
    let replaced = regimes
        .insert(Regime::new("run", "new", 0..0), DuplicatePolicy::Replace)
        .unwrap();
    assert_eq!(replaced.map(|r| r.description), Some("old".to_string()));
    assert_eq!(regimes.get("run").unwrap().description, "new");
    assert_eq!(regimes.len(), 1);
}

#[test]
fn resolve_leaf_uses_given_regimes() {
    let mut regimes = RegimeRegistry::new();
    regimes
        .insert(Regime::new("run", "", 0..0), DuplicatePolicy::Reject)
        .unwrap();
    let blocks = BlockRegistry::new();
    assert!(blocks.resolve_leaf("run", &regimes).is_some());
    assert!(blocks.resolve_leaf("walk", &regimes).is_none());
}

#[test]
fn section_headers() {
    assert_eq!(Section::from_header("#regims"), Some(Section::Regimes));
    assert_eq!(Section::from_header("  #blocks  "), Some(Section::Blocks));
    assert_eq!(Section::from_header("#HIST"), Some(Section::History));
    assert_eq!(Section::from_header("#hist"), None);
    assert_eq!(Section::from_header("run"), None);
}

#[test]
fn dispatcher_routes_sections() {
    let cat = catalog(
        "#regims\nrun \"Running\"\nwalk \"Walking\"\n\n#blocks\neasy (run walk) 2\n#HIST\neasy\neasy\n",
    );
    assert_eq!(cat.regimes.len(), 2);
    assert_eq!(cat.regimes.get("run").unwrap().description, "Running");
    assert_eq!(cat.blocks.get("easy").unwrap().count, 2);
    let history = cat.history.unwrap();
    assert_eq!(history.names().collect::<Vec<_>>(), vec!["easy", "easy"]);
}

#[test]
fn dispatcher_tracks_current_section() {
    let mut dispatcher = Dispatcher::new(0, ParseOptions::default());
    assert_eq!(dispatcher.section(), Section::None);
    dispatcher.feed("#blocks", 0);
    assert_eq!(dispatcher.section(), Section::Blocks);
    dispatcher.feed("   ", 8);
    assert_eq!(dispatcher.section(), Section::Blocks);
    dispatcher.feed("x (y) 2", 12);
    assert!(dispatcher.catalog().blocks.contains("x"));

    let parsed = dispatcher.finish();
    assert!(parsed.catalog.history.is_none());
    assert_eq!(parsed.catalog.blocks.get("x").unwrap().span, 12..19);
}

#[test]
fn into_result_reports_only_errors() {
    let ok = parse("#regims\nrun\n").into_result();
    assert!(ok.is_ok());
    let err = parse("oops\n#blocks\nx )\n").into_result().unwrap_err();
    assert_eq!(err.len(), 1);
    assert_eq!(err[0].kind, ParseErrorKind::Syntax);
}

#[test]
fn synthetic_names_are_unique_across_lines() {
    let cat = catalog("#regims\nrun\n#blocks\na (run) (run)\nb (run) (run)\n");
    let names: Vec<&str> = cat.blocks.names().collect();
    assert_eq!(names, vec!["a/1", "a/2", "a", "b/1", "b/2", "b"]);
}

#[test]
fn bad_line_is_reported_and_skipped() {
    let parsed = parse("#regims\nrun\n#blocks\nbad (run\ngood run\n");
    assert!(parsed.has_errors());
    assert_eq!(parsed.errors().count(), 1);
    let error = parsed.errors().next().unwrap();
    assert_eq!(error.kind, ParseErrorKind::Syntax);
    assert!(!parsed.catalog.blocks.contains("bad"));
    assert!(!parsed.catalog.blocks.contains("bad/1"));
    assert!(parsed.catalog.blocks.contains("good"));
}

#[test]
fn duplicate_block_rejected_by_default() {
    let parsed = parse("#regims\nrun\n#blocks\nx run\nx (run) 2\n");
    let errors: Vec<_> = parsed.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ParseErrorKind::DuplicateName);
    assert_eq!(parsed.catalog.blocks.get("x").unwrap().count, 1);
    assert!(!parsed.catalog.blocks.contains("x/1"));
}

#[test]
fn duplicate_block_replaced_when_allowed() {
    let parsed = Parser::new("#regims\nrun\n#blocks\nx run\nx (run) 2\n".to_string(), 0)
        .with_options(ParseOptions {
            duplicates: DuplicatePolicy::Replace,
        })
        .parse();
    assert!(!parsed.has_errors());
    assert_eq!(parsed.warnings().count(), 1);
    assert_eq!(parsed.catalog.blocks.get("x").unwrap().count, 2);
}

#[test]
fn last_history_section_wins() {
    let parsed = parse("#regims\nrun\n#blocks\na run\nb run\n#HIST\na\n#HIST\nb b\n");
    let history = parsed.catalog.history.as_ref().unwrap();
    assert_eq!(history.names().collect::<Vec<_>>(), vec!["b", "b"]);
    assert!(parsed.warnings().any(|w| w.message.contains("replaces")));
}

#[test]
fn lines_before_any_section_are_ignored_with_warning() {
    let parsed = parse("stray line\n#regims\nrun\n");
    assert!(!parsed.has_errors());
    assert_eq!(parsed.warnings().count(), 1);
    assert_eq!(parsed.catalog.regimes.len(), 1);
}

#[test]
fn crlf_line_endings() {
    let cat = catalog("#regims\r\nrun \"Running\"\r\n#blocks\r\nx (run) 2\r\n#HIST\r\nx\r\n");
    assert_eq!(cat.regimes.get("run").unwrap().description, "Running");
    assert_eq!(cat.history.unwrap().names().collect::<Vec<_>>(), vec!["x"]);
}

#[test]
fn decode_legacy_encodings() {
    // "бег" in each encoding.
    assert_eq!(decode(&[0xE1, 0xE5, 0xE3], SourceEncoding::Cp1251).unwrap(), "бег");
    assert_eq!(decode(&[0xA1, 0xA5, 0xA3], SourceEncoding::Cp866).unwrap(), "бег");
    assert_eq!(
        decode(&[0xEF, 0xBB, 0xBF, b'r', b'u', b'n'], SourceEncoding::Utf8).unwrap(),
        "run"
    );
    assert!(decode(&[0xFF, 0xFE, 0xFD], SourceEncoding::Utf8).is_err());
    assert_eq!(SourceEncoding::from_label("CP1251"), Some(SourceEncoding::Cp1251));
    assert_eq!(SourceEncoding::from_label("latin1"), None);
}

#[test]
fn tokenizer_counts_are_ascii_digits() {
    assert_eq!(
        kinds("(run) ٣"),
        vec![
            (TokenKind::OpenBracket, "("),
            (TokenKind::RegimeUnit, "run"),
            (TokenKind::CloseBracket, ")"),
        ]
    );
}

#[test]
fn history_line_with_label_and_description() {
    let cat = catalog("#regims\nrun\n#blocks\neasy run\n#HIST\nweek1 \"first week\" easy easy\neasy\n");
    let history = cat.history.unwrap();
    assert_eq!(history.names().collect::<Vec<_>>(), vec!["easy", "easy", "easy"]);
    // The history line starts at byte 35; `week1 "first week" ` is 19 bytes.
    assert_eq!(history.entries[0].span, 54..58);
}

#[test]
fn history_line_with_unterminated_description() {
    let parsed = parse("#regims\nrun\n#blocks\neasy run\n#HIST\nweek1 \"first easy\neasy\n");
    let errors: Vec<_> = parsed.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ParseErrorKind::Syntax);
    let history = parsed.catalog.history.unwrap();
    assert_eq!(history.names().collect::<Vec<_>>(), vec!["easy"]);
}

#[test]
fn failed_redefinition_does_not_warn() {
    let parsed = Parser::new("#regims\nrun\n#blocks\nx run\nx (run\n".to_string(), 0)
        .with_options(ParseOptions {
            duplicates: DuplicatePolicy::Replace,
        })
        .parse();
    assert_eq!(parsed.errors().count(), 1);
    assert_eq!(parsed.warnings().count(), 0);
    assert_eq!(parsed.catalog.blocks.get("x").unwrap().members, vec!["run"]);
}

#[test]
fn encoding_labels_are_all_accepted() {
    for label in SourceEncoding::LABELS {
        let encoding = SourceEncoding::from_label(label).unwrap();
        assert_eq!(encoding.label(), *label);
    }
}
