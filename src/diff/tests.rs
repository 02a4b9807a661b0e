use super::*;

const SIMPLE_DIFF: &str = "\
diff --git a/file.js b/file.js
index 1234567..abcdefg 100644
--- a/file.js
+++ b/file.js
@@ -1,5 +1,5 @@
-const oldCode = 'old';
+const newCode = 'new';";

// --- validation ---

#[test]
fn full_diff_is_valid() {
    assert!(is_valid_diff(SIMPLE_DIFF));
}

#[test]
fn single_pattern_line_is_enough() {
    assert!(is_valid_diff("diff --git a/f b/f"));
    assert!(is_valid_diff("index 1234567..abcdefg 100644"));
    assert!(is_valid_diff("--- a/file.js"));
    assert!(is_valid_diff("+++ b/file.js"));
    assert!(is_valid_diff("@@ -1,5 +1,5 @@"));
}

#[test]
fn pattern_counts_anywhere_in_the_text() {
    let text = "some preamble from an email\n@@ -1,5 +1,5 @@\nand a trailing signature";
    assert!(is_valid_diff(text));
}

#[test]
fn empty_and_whitespace_rejected() {
    assert!(!is_valid_diff(""));
    assert!(!is_valid_diff("   \n\t   "));
}

#[test]
fn random_text_rejected() {
    assert!(!is_valid_diff(
        "This is not a valid git diff\nIt's just some random text"
    ));
}

#[test]
fn patterns_are_line_anchored() {
    // indented or embedded markers are not matches
    assert!(!is_valid_diff("  @@ -1,5 +1,5 @@"));
    assert!(!is_valid_diff("see diff --git a/f b/f for details"));
    assert!(!is_valid_diff("x--- a/file.js"));
}

#[test]
fn malformed_pattern_lines_rejected() {
    // git header needs two path tokens
    assert!(!is_valid_diff("diff --git"));
    assert!(!is_valid_diff("diff --git onlyone"));
    // index line needs two ids around ".."
    assert!(!is_valid_diff("index nothinghere"));
    assert!(!is_valid_diff("index ..abc 100644"));
    // hunk header needs both ranges and the closing marker
    assert!(!is_valid_diff("@@ -1,5 +1,5"));
    assert!(!is_valid_diff("@@ -a,b +c,d @@"));
    // file markers need a path-like token
    assert!(!is_valid_diff("--- "));
    assert!(!is_valid_diff("+++ <<<>>>"));
}

#[test]
fn validation_is_deterministic() {
    let inputs = [SIMPLE_DIFF, "", "   ", "random text", "@@ -1,5 +1,5 @@"];
    for input in inputs {
        assert_eq!(is_valid_diff(input), is_valid_diff(input));
    }
}

// --- parsing ---

#[test]
fn parses_well_formed_single_file() {
    let parsed = parse_diff(SIMPLE_DIFF).unwrap();

    assert_eq!(parsed.files.len(), 1);
    let file = &parsed.files[0];
    assert_eq!(file.old_path, "a/file.js");
    assert_eq!(file.new_path, "b/file.js");
    assert_eq!(file.hunks.len(), 1);

    let hunk = &file.hunks[0];
    assert_eq!(hunk.old_start, 1);
    assert_eq!(hunk.old_count, 5);
    assert_eq!(hunk.new_start, 1);
    assert_eq!(hunk.new_count, 5);

    assert_eq!(
        hunk.lines,
        vec![
            LineChange {
                kind: LineKind::Removed,
                text: "const oldCode = 'old';".to_string(),
            },
            LineChange {
                kind: LineKind::Added,
                text: "const newCode = 'new';".to_string(),
            },
        ]
    );
}

#[test]
fn parse_failure_has_fixed_message() {
    let err = parse_diff("invalid content that will cause parsing error").unwrap_err();
    assert_eq!(err, ParseError::Malformed);
    assert_eq!(err.to_string(), MALFORMED_DIFF_MESSAGE);
}

#[test]
fn parses_multiple_files_in_order() {
    let text = "\
diff --git a/first.rs b/first.rs
--- a/first.rs
+++ b/first.rs
@@ -1,2 +1,2 @@
 fn main() {
-    old();
+    new();
diff --git a/second.rs b/second.rs
--- a/second.rs
+++ b/second.rs
@@ -10,1 +10,2 @@
 line
+another";
    let parsed = parse_diff(text).unwrap();

    assert_eq!(parsed.files.len(), 2);
    assert_eq!(parsed.files[0].display_path(), "first.rs");
    assert_eq!(parsed.files[1].display_path(), "second.rs");
    assert_eq!(parsed.files[1].hunks[0].new_count, 2);
    assert_eq!(parsed.additions(), 2);
    assert_eq!(parsed.deletions(), 1);
}

#[test]
fn file_markers_alone_delimit_files() {
    // no git header at all, like plain `diff -u` output
    let text = "\
--- old.txt
+++ new.txt
@@ -1,1 +1,1 @@
-before
+after";
    let parsed = parse_diff(text).unwrap();

    assert_eq!(parsed.files.len(), 1);
    assert_eq!(parsed.files[0].old_path, "old.txt");
    assert_eq!(parsed.files[0].new_path, "new.txt");
    assert_eq!(parsed.files[0].hunks.len(), 1);
}

#[test]
fn hunk_counts_default_to_one() {
    let text = "\
--- a/f
+++ b/f
@@ -3 +3 @@
-x
+y";
    let parsed = parse_diff(text).unwrap();

    let hunk = &parsed.files[0].hunks[0];
    assert_eq!((hunk.old_start, hunk.old_count), (3, 1));
    assert_eq!((hunk.new_start, hunk.new_count), (3, 1));
    assert_eq!(hunk.lines.len(), 2);
}

#[test]
fn blank_hunk_lines_are_context() {
    let text = "\
--- a/f
+++ b/f
@@ -1,3 +1,3 @@
 first

-second
+SECOND";
    let parsed = parse_diff(text).unwrap();

    let lines = &parsed.files[0].hunks[0].lines;
    assert_eq!(lines[1].kind, LineKind::Context);
    assert_eq!(lines[1].text, "");
}

#[test]
fn no_newline_marker_is_skipped() {
    let text = "\
--- a/f
+++ b/f
@@ -1,1 +1,1 @@
-old
\\ No newline at end of file
+new
\\ No newline at end of file";
    let parsed = parse_diff(text).unwrap();

    let lines = &parsed.files[0].hunks[0].lines;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].kind, LineKind::Removed);
    assert_eq!(lines[1].kind, LineKind::Added);
}

#[test]
fn new_file_uses_dev_null_marker() {
    let text = "\
diff --git a/added.txt b/added.txt
new file mode 100644
index 0000000..e69de29
--- /dev/null
+++ b/added.txt
@@ -0,0 +1,2 @@
+hello
+world";
    let parsed = parse_diff(text).unwrap();

    let file = &parsed.files[0];
    assert_eq!(file.old_path, "/dev/null");
    assert_eq!(file.new_path, "b/added.txt");
    assert_eq!(file.display_path(), "added.txt");
    assert_eq!(file.additions(), 2);
    assert_eq!(file.deletions(), 0);
}

#[test]
fn deleted_file_displays_old_path() {
    let text = "\
diff --git a/gone.txt b/gone.txt
deleted file mode 100644
--- a/gone.txt
+++ /dev/null
@@ -1,1 +0,0 @@
-goodbye";
    let parsed = parse_diff(text).unwrap();

    assert_eq!(parsed.files[0].display_path(), "gone.txt");
    assert_eq!(parsed.files[0].deletions(), 1);
}

#[test]
fn file_without_hunks_parses() {
    // binary files have headers but no hunk section
    let text = "\
diff --git a/logo.png b/logo.png
index 1111111..2222222 100644
Binary files a/logo.png and b/logo.png differ";
    let parsed = parse_diff(text).unwrap();

    assert_eq!(parsed.files.len(), 1);
    assert!(parsed.files[0].hunks.is_empty());
    assert_eq!(parsed.files[0].display_path(), "logo.png");
}

#[test]
fn headerless_hunk_parses() {
    let parsed = parse_diff("@@ -1,5 +1,5 @@").unwrap();

    assert_eq!(parsed.files.len(), 1);
    assert_eq!(parsed.files[0].old_path, "");
    assert_eq!(parsed.files[0].hunks.len(), 1);
    assert!(parsed.files[0].hunks[0].lines.is_empty());
}

#[test]
fn header_arithmetic_bounds_the_hunk_body() {
    // the second file's `---` marker follows a hunk whose counts are
    // exactly satisfied; it must open a new file, not be read as a
    // removed line
    let text = "\
--- a/one
+++ b/one
@@ -1,1 +1,1 @@
-alpha
+beta
--- a/two
+++ b/two
@@ -1,1 +1,1 @@
-gamma
+delta";
    let parsed = parse_diff(text).unwrap();

    assert_eq!(parsed.files.len(), 2);
    assert_eq!(parsed.files[0].hunks[0].lines.len(), 2);
    assert_eq!(parsed.files[1].old_path, "a/two");
    assert_eq!(parsed.files[1].hunks[0].lines[0].text, "gamma");
}

#[test]
fn removed_lines_starting_with_dashes_stay_in_the_hunk() {
    // a removed line whose content begins with "-- " must not be
    // mistaken for a file marker while the hunk still owes lines
    let text = "\
--- a/doc.md
+++ b/doc.md
@@ -1,2 +1,1 @@
--- a heading underline
 kept";
    let parsed = parse_diff(text).unwrap();

    assert_eq!(parsed.files.len(), 1);
    let lines = &parsed.files[0].hunks[0].lines;
    assert_eq!(lines[0].kind, LineKind::Removed);
    assert_eq!(lines[0].text, "-- a heading underline");
}

#[test]
fn crlf_input_is_tolerated() {
    let text = SIMPLE_DIFF.replace('\n', "\r\n");
    assert!(is_valid_diff(&text));

    let parsed = parse_diff(&text).unwrap();
    assert_eq!(parsed.files[0].hunks[0].lines[0].text, "const oldCode = 'old';");
}

#[test]
fn no_panic_on_arbitrary_input() {
    let inputs = [
        "\u{0}\u{1}\u{2}binary-ish\u{fffd}",
        "---",
        "+++",
        "@@",
        "@@ -99999999999,1 +1,1 @@",
        "diff --git ",
        "index ..",
        "\\",
        "@@ -1,3 +1,3 @@\ndiff --git a/x b/x",
        "+no hunk context for this line",
    ];
    for input in inputs {
        // both operations must classify, never fault
        let _ = is_valid_diff(input);
        let _ = parse_diff(input);
    }
}

#[test]
fn parse_is_stateless_across_calls() {
    let first = parse_diff(SIMPLE_DIFF).unwrap();
    let _ = parse_diff("not a diff");
    let second = parse_diff(SIMPLE_DIFF).unwrap();
    assert_eq!(first, second);
}
