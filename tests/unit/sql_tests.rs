/*!
 * Tests for statement splitting and INSERT parsing through the public API
 */

use seedloc::sql::{InsertParser, StatementSplitter};

#[test]
fn test_split_withSemicolonInsideLiteral_shouldKeepStatementWhole() {
    let sql = "INSERT INTO t (a) VALUES ('x; y');\nINSERT INTO t (a) VALUES ('; ');";
    let statements = StatementSplitter::split(sql);

    assert_eq!(statements.len(), 2);
    assert!(statements[1].contains("'; '"));
    assert_eq!(statements.concat(), sql);
}

#[test]
fn test_split_withCommentsAndDollarQuotes_shouldIgnoreTheirSemicolons() {
    let sql = "-- a; b\nSELECT 1; /* c; d */ SELECT $$e; f$$;";
    let statements = StatementSplitter::split(sql);

    assert_eq!(statements.len(), 2);
    assert!(statements[0].ends_with("SELECT 1;"));
    assert!(statements[1].ends_with("$$e; f$$;"));
}

#[test]
fn test_split_withUnterminatedTail_shouldReturnItAsLastPiece() {
    let statements = StatementSplitter::split("SELECT 1; SELECT 2");
    assert_eq!(statements, vec!["SELECT 1;", " SELECT 2"]);
}

#[test]
fn test_parse_withMultiRowInsert_shouldReturnRowsAndColumns() {
    let parsed = InsertParser::parse("INSERT INTO \"public\".\"items\" (\"id\", title) VALUES (1, 'a, b'), (2, NULL);")
        .unwrap();

    assert_eq!(parsed.table_name(), "public.items");
    assert_eq!(parsed.columns, Some(vec!["id".to_string(), "title".to_string()]));
    assert_eq!(parsed.rows, vec![vec!["1", "'a, b'"], vec!["2", "NULL"]]);
    assert!(parsed.terminated);
}

#[test]
fn test_parse_withNonInsert_shouldFail() {
    assert!(InsertParser::parse("DELETE FROM items;").is_err());
}

#[test]
fn test_parse_withUpsertAfterRows_shouldNotTreatConflictTargetAsRow() {
    let parsed = InsertParser::parse(
        "INSERT INTO items (id, title) VALUES (1, 'Red') ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title;",
    )
    .unwrap();

    assert_eq!(parsed.rows, vec![vec!["1", "'Red'"]]);
    assert_eq!(parsed.tail, " ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title");
}

#[test]
fn test_parse_withSpacedRowSeparators_shouldCollectEveryRow() {
    let parsed = InsertParser::parse("INSERT INTO t (a) VALUES ('x') ,\n  ('y'),('z') RETURNING (a);").unwrap();

    assert_eq!(parsed.rows, vec![vec!["'x'"], vec!["'y'"], vec!["'z'"]]);
    assert_eq!(parsed.tail, " RETURNING (a)");
}
