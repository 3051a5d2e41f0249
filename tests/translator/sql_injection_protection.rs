// Quoting of object names and comment text in generated statements

use crate::helpers::fake::parse_comment_statement;
use pgcomment::ObjectType;
use pgcomment::render::{build_set_statement, escape_string, quote_ident, render_set_statement};
use rstest::rstest;

#[rstest]
#[case::plain("my_database", "my database comment")]
#[case::single_quotes("o'brien", "it's 'quoted'")]
#[case::double_quotes("we\"ird", "say \"hi\"")]
#[case::statement_break("x\"; DROP ROLE admin; --", "'; DROP ROLE admin; --")]
#[case::backslashes(r"path\to", r"C:\temp\new")]
#[case::unicode("café", "commentaire: été ☀")]
#[case::newlines("t", "line one\nline two")]
fn test_statement_preserves_name_and_comment(#[case] name: &str, #[case] comment: &str) {
    for object_type in ObjectType::ALL {
        let rendered = render_set_statement(object_type, name, comment);
        let (parsed_type, parsed_name, parsed_comment) =
            parse_comment_statement(&rendered.sql).expect("statement should parse");

        assert_eq!(parsed_type, object_type);
        assert_eq!(parsed_name, name);
        assert_eq!(parsed_comment, comment);
    }
}

#[test]
fn test_injection_stays_inside_literal() {
    let rendered = build_set_statement("table", "table1", "x'; DROP TABLE table1; --").unwrap();
    assert_eq!(
        rendered.sql,
        "COMMENT ON TABLE \"table1\" IS 'x''; DROP TABLE table1; --'"
    );
}

#[test]
fn test_injection_stays_inside_identifier() {
    assert_eq!(
        quote_ident("table1\" IS 'x'; DROP TABLE t; --"),
        "\"table1\"\" IS 'x'; DROP TABLE t; --\""
    );
}

#[test]
fn test_backslash_quote_cannot_escape_literal() {
    // With standard_conforming_strings off, '\'' would end early; the E form is unambiguous
    assert_eq!(escape_string(r"\'; DROP"), r"E'\\''; DROP'");
}
