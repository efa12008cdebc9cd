use std::ffi::OsString;
use std::path::{Path, PathBuf};

use weft::{Event, Stream};
use weft_core::docblock::find_doc_blocks;
use weft_core::fence::longest_run;
use weft_core::lexer::{LineIndex, scan_comments};
use weft_core::{
    ConfigFile, ErrorKind, EventGroups, Fence, Hook, ImageSink, WeaveOptions, WeftConfig,
    WeftError, rewrite, weave,
};
use weft_script::{ScriptConfig, ScriptError};

const DEMO: &str = "demo.rs";
const PNG: &str = "data:image/png;base64,iVBORw==";

fn event(stream: Stream, line: u32, text: &str) -> Event {
    let mut event = Event::text(stream, text);
    event.file = DEMO.to_string();
    event.line = line;
    event
}

fn image(line: u32, data_ref: &str, alt: &str, title: Option<&str>) -> Event {
    let mut event = Event::image(data_ref.to_string(), alt, title.map(str::to_string));
    event.file = DEMO.to_string();
    event.line = line;
    event
}

fn plain() -> WeaveOptions {
    WeaveOptions {
        quote: false,
        ..WeaveOptions::default()
    }
}

fn woven(source: &str, events: Vec<Event>, options: &WeaveOptions) -> String {
    try_weave(source, events, options).unwrap()
}

fn try_weave(
    source: &str,
    events: Vec<Event>,
    options: &WeaveOptions,
) -> Result<String, WeftError> {
    let blocks = find_doc_blocks(source, &LineIndex::new(source));
    let groups = EventGroups::collect(events, Path::new(DEMO))?;
    let mut out = Vec::new();
    weave(&mut out, source, Path::new(DEMO), &blocks, &groups, options)?;
    Ok(String::from_utf8(out).unwrap())
}

// ============================================================================
// Lexer Tests
// ============================================================================

fn comment_texts(source: &str) -> Vec<&str> {
    scan_comments(source)
        .iter()
        .map(|c| c.text(source))
        .collect()
}

#[test]
fn test_scan_line_and_block_comments() {
    let source = "let x = 1; // one\n/* two */ let y = 2;\n";
    assert_eq!(comment_texts(source), vec!["// one", "/* two */"]);
}

#[test]
fn test_scan_nested_block_comment() {
    let source = "/* a /* b */ c */ fn main() {}";
    assert_eq!(comment_texts(source), vec!["/* a /* b */ c */"]);
}

#[test]
fn test_scan_skips_strings() {
    let source = "let s = \"/* not */ // not\"; let t = \"\\\"/*\"; /* yes */";
    assert_eq!(comment_texts(source), vec!["/* yes */"]);
}

#[test]
fn test_scan_skips_raw_strings() {
    let source = "let s = r#\"a \"/* not */\" b\"#; let b = br\"//\"; /* yes */";
    assert_eq!(comment_texts(source), vec!["/* yes */"]);
}

#[test]
fn test_scan_char_literals_and_lifetimes() {
    let source = "fn f<'a>(x: &'a str) -> char { let q = '\"'; let e = '\\''; '/' } /* yes */";
    assert_eq!(comment_texts(source), vec!["/* yes */"]);
}

#[test]
fn test_scan_raw_identifier_is_not_a_raw_string() {
    let source = "let r#type = 1; /* yes */";
    assert_eq!(comment_texts(source), vec!["/* yes */"]);
}

#[test]
fn test_scan_unterminated_block_runs_to_end() {
    let source = "fn main() {}\n/* open";
    let comments = scan_comments(source);
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].end, source.len());
}

#[test]
fn test_line_index_counts_chars() {
    let source = "héllo\nwörld\n";
    let index = LineIndex::new(source);
    let offset = source.find('r').unwrap();
    assert_eq!(index.position(source, offset), (2, 2));
    assert_eq!(index.offset(source, 2, 2), Some(offset));
    assert_eq!(index.offset(source, 9, 0), None);
    assert_eq!(index.line(source, 1), "héllo");
}

// ============================================================================
// Documentation Block Tests
// ============================================================================

#[test]
fn test_doc_block_position_and_prose() {
    let source = "fn a() {}\n\n\t/*{md}\nhello\n\tworld*/\nfn b() {}\n";
    let blocks = find_doc_blocks(source, &LineIndex::new(source));

    assert_eq!(blocks.len(), 1);
    let block = &blocks[0];
    assert_eq!(block.start_line, 3);
    assert_eq!(block.end_line, 5);
    assert_eq!(block.column, 1);
    assert_eq!(block.indent, "\t");
    assert_eq!(block.prose(), "hello\nworld");
}

#[test]
fn test_doc_block_closing_line_is_dropped() {
    let source = "    /*{md}\n    # Title\n\n    Some *prose*.\n    */\n";
    let blocks = find_doc_blocks(source, &LineIndex::new(source));
    assert_eq!(blocks[0].prose(), "# Title\n\nSome *prose*.\n");
}

#[test]
fn test_single_line_marker_is_ordinary_comment() {
    let source = "/*{md} not prose */\nfn main() {}\n";
    assert!(find_doc_blocks(source, &LineIndex::new(source)).is_empty());
}

// ============================================================================
// Rewriter Tests
// ============================================================================

#[test]
fn test_rewrite_simple_import() {
    let rewritten = rewrite("use weft::fmt;\nfn main() {}\n").unwrap();
    assert_eq!(rewritten.source, "use weft::capture::fmt;\nfn main() {}\n");
    assert_eq!(
        rewritten.hooks,
        vec![Hook {
            line: 1,
            column: 10,
            module: "fmt".to_string(),
        }]
    );
}

#[test]
fn test_rewrite_import_forms() {
    let cases = [
        ("use weft::{fmt, show};", "use weft::{capture::fmt, capture::show};"),
        (
            "use weft::fmt::{println, eprintln};",
            "use weft::capture::fmt::{println, eprintln};",
        ),
        ("use ::weft::show as s;", "use ::weft::capture::show as s;"),
        ("use {std::io, weft::fmt};", "use {std::io, weft::capture::fmt};"),
        ("pub use weft::show::png;", "pub use weft::capture::show::png;"),
    ];
    for (input, expected) in cases {
        let rewritten = rewrite(&format!("{}\nfn main() {{}}\n", input)).unwrap();
        assert_eq!(rewritten.source.lines().next(), Some(expected), "{}", input);
    }
}

#[test]
fn test_rewrite_leaves_other_imports_alone() {
    let source = concat!(
        "use std::fmt;\n",
        "use weft::Event;\n",
        "use other::weft::fmt as f;\n",
        "fn main() {\n",
        "    use weft::fmt;\n",
        "}\n",
    );
    let rewritten = rewrite(source).unwrap();
    assert_eq!(rewritten.source, source);
    assert!(!rewritten.is_hooked());
}

#[test]
fn test_rewrite_preserves_line_numbers() {
    let source = concat!(
        "use weft::{\n",
        "    fmt,\n",
        "    show,\n",
        "};\n",
        "\n",
        "fn main() {\n",
        "    fmt::println!(\"hi\");\n",
        "}\n",
    );
    let rewritten = rewrite(source).unwrap();
    assert_eq!(rewritten.source.lines().count(), source.lines().count());
    assert_eq!(
        rewritten.hooks.iter().map(|h| h.line).collect::<Vec<_>>(),
        vec![2, 3]
    );
    assert!(rewritten.source.contains("    capture::fmt,\n    capture::show,\n"));
    assert!(rewritten.source.contains("    fmt::println!(\"hi\");\n"));
}

#[test]
fn test_rewrite_is_idempotent() {
    let once = rewrite("use weft::{fmt, show};\nfn main() {}\n").unwrap();
    let twice = rewrite(&once.source).unwrap();
    assert_eq!(twice.source, once.source);
    assert!(twice.hooks.is_empty());
}

#[test]
fn test_rewrite_columns_are_chars() {
    let rewritten = rewrite("use weft::{/* é */ fmt};\nfn main() {}\n").unwrap();
    assert!(rewritten.source.starts_with("use weft::{/* é */ capture::fmt};"));
    assert_eq!(rewritten.hooks[0].column, 19);
}

#[test]
fn test_rewrite_keeps_bom() {
    let rewritten = rewrite("\u{feff}use weft::fmt;\nfn main() {}\n").unwrap();
    assert!(rewritten.source.starts_with("\u{feff}use weft::capture::fmt;"));
}

#[test]
fn test_rewrite_indexes_doc_blocks() {
    let source = "/*{md}\n# Demo\n*/\nfn main() {}\n";
    let rewritten = rewrite(source).unwrap();
    assert_eq!(rewritten.doc_blocks.len(), 1);
    assert_eq!(rewritten.doc_blocks[0].end_line, 3);
}

#[test]
fn test_rewrite_parse_error() {
    let err = rewrite("fn main() { let = ; }\n").unwrap_err();
    assert!(matches!(err, WeftError::Parse { line: 1, .. }));
    assert_eq!(err.kind(), ErrorKind::Parse);
}

// ============================================================================
// Aggregator Tests
// ============================================================================

#[test]
fn test_collect_groups_by_line_in_order() {
    let groups = EventGroups::collect(
        vec![
            event(Stream::Stdout, 3, "a"),
            event(Stream::Stdout, 1, "b\n"),
            event(Stream::Stderr, 3, "c\n"),
        ],
        Path::new(DEMO),
    )
    .unwrap();

    assert_eq!(groups.lines().collect::<Vec<_>>(), vec![1, 3]);
    let texts: Vec<_> = groups.get(3).iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["a\n", "c\n"]);
    assert!(groups.get(2).is_empty());
}

#[test]
fn test_collect_keeps_image_alt_text() {
    let groups = EventGroups::collect(vec![image(1, PNG, "plot", None)], Path::new(DEMO)).unwrap();
    assert_eq!(groups.get(1)[0].text, "plot");
}

#[test]
fn test_collect_rejects_foreign_file() {
    let mut foreign = event(Stream::Stdout, 1, "x");
    foreign.file = "/home/u/.cargo/registry/dep/src/lib.rs".to_string();

    let err = EventGroups::collect(vec![event(Stream::Stdout, 1, "ok"), foreign], Path::new(DEMO))
        .unwrap_err();
    assert!(matches!(err, WeftError::ForeignFile { line: 1, .. }));
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[cfg(unix)]
#[test]
fn test_collect_accepts_reattributed_non_utf8_source() {
    use std::os::unix::ffi::OsStrExt;

    let source = Path::new(std::ffi::OsStr::from_bytes(b"d\xffmo.rs"));
    let mut raw = event(Stream::Stdout, 1, "x");
    raw.file = weft_script::MAIN_RS.to_string();
    let events = weft_script::reattribute(vec![raw], Path::new("/tmp/weft-x/src/main.rs"), source);

    let groups = EventGroups::collect(events, source).unwrap();
    assert_eq!(groups.get(1).len(), 1);
}

#[test]
fn test_collect_rejects_unlocated_event() {
    let unlocated = Event::text(Stream::Stdout, "x");
    assert!(EventGroups::collect(vec![unlocated], Path::new(DEMO)).is_err());
}

// ============================================================================
// Fence Tests
// ============================================================================

#[test]
fn test_fence_minimum() {
    assert_eq!(Fence::for_texts(["fn main() {}"]).as_str(), "```");
    assert_eq!(Fence::for_texts(std::iter::empty()).width(), 3);
}

#[test]
fn test_fence_outgrows_longest_run() {
    for run in 1..8 {
        let text = format!("a {} b", "`".repeat(run));
        let fence = Fence::for_texts([text.as_str()]);
        assert!(fence.width() > run);
        assert_eq!(fence.width(), (run + 1).max(3));
    }
}

#[test]
fn test_fence_counts_event_text() {
    let source = "fn main() {}\n";
    let events = vec![event(Stream::Stdout, 1, "``````\n")];
    let out = woven(source, events, &plain());
    assert!(out.starts_with("```````\nfn main() {}\n```````\n"));
}

#[test]
fn test_longest_run() {
    assert_eq!(longest_run(""), 0);
    assert_eq!(longest_run("a`b``c```"), 3);
}

// ============================================================================
// Weaver Tests
// ============================================================================

#[test]
fn test_weave_without_events_is_one_fence() {
    let source = "fn main() {\n    let x = 1;\n}\n";
    assert_eq!(woven(source, vec![], &plain()), format!("```\n{}```\n", source));
}

#[test]
fn test_weave_terminates_last_line() {
    assert_eq!(
        woven("fn main() {}", vec![], &plain()),
        "```\nfn main() {}\n```\n"
    );
}

#[test]
fn test_weave_empty_source() {
    assert_eq!(woven("", vec![], &plain()), "");
}

#[test]
fn test_weave_output_follows_its_line() {
    let source = "fn main() { fmt::println!(\"hello\"); }\nfn other() {}\n";
    let out = woven(source, vec![event(Stream::Stdout, 1, "hello")], &plain());
    assert_eq!(
        out,
        concat!(
            "```\n",
            "fn main() { fmt::println!(\"hello\"); }\n",
            "```\n",
            "```stdout\n",
            "hello\n",
            "```\n",
            "```\n",
            "fn other() {}\n",
            "```\n",
        )
    );
}

#[test]
fn test_weave_quotes_output() {
    let source = "a\nb\n";
    let out = woven(
        source,
        vec![event(Stream::Stderr, 1, "one\n\ntwo")],
        &WeaveOptions::default(),
    );
    assert_eq!(
        out,
        "```\na\n```\n> ```stderr\n> one\n> \n> two\n> ```\n```\nb\n```\n"
    );
}

#[test]
fn test_weave_each_output_event_gets_a_fence() {
    let out = woven(
        "a\n",
        vec![
            event(Stream::Stdout, 1, "x\n"),
            event(Stream::Stderr, 1, "y\n"),
        ],
        &plain(),
    );
    assert_eq!(out, "```\na\n```\n```stdout\nx\n```\n```stderr\ny\n```\n");
}

#[test]
fn test_weave_renders_last_line_events() {
    let out = woven("a\nb\n", vec![event(Stream::Stdout, 2, "end\n")], &plain());
    assert!(out.ends_with("```\na\nb\n```\n```stdout\nend\n```\n"));
}

#[test]
fn test_weave_unlocated_events_come_first() {
    let out = woven("a\n", vec![event(Stream::Stdout, 0, "early\n")], &plain());
    assert_eq!(out, "```stdout\nearly\n```\n```\na\n```\n");
}

#[test]
fn test_weave_source_lines_verbatim() {
    let source = "fn main() {\r\n\tlet s = \"  trailing  \";  \r\n}\r\n";
    let out = woven(source, vec![], &plain());
    assert_eq!(out, format!("```\n{}```\n", source));
}

#[test]
fn test_weave_doc_block_consumes_its_lines() {
    let source = "fn a() {}\n\n\t/*{md}\nhello\n\tworld*/\nfn b() {}\n";
    let out = woven(source, vec![], &plain());
    assert_eq!(out, "```\nfn a() {}\n\n```\nhello\nworld\n```\nfn b() {}\n```\n");
    assert!(!out.contains("{md}"));
}

#[test]
fn test_weave_doc_block_first_and_last() {
    let source = "/*{md}\n# Title\n*/\nfn main() {}\n/*{md}\nThe end.\n*/\n";
    let out = woven(source, vec![], &plain());
    assert_eq!(out, "# Title\n```\nfn main() {}\n```\nThe end.\n");
}

#[test]
fn test_weave_events_before_doc_block() {
    let source = "a\n/*{md}\nprose\n*/\nb\n";
    let out = woven(source, vec![event(Stream::Stdout, 1, "x\n")], &plain());
    assert_eq!(out, "```\na\n```\n```stdout\nx\n```\nprose\n```\nb\n```\n");
}

#[test]
fn test_weave_events_after_doc_block() {
    let source = "/*{md}\nprose\n*/ fn f() {}\nb\n";
    let out = woven(source, vec![event(Stream::Stdout, 3, "x\n")], &plain());
    assert_eq!(out, "prose\n```stdout\nx\n```\n```\nb\n```\n");
}

#[test]
fn test_weave_markdown_is_verbatim() {
    let out = woven(
        "a\nb\n",
        vec![event(Stream::Markdown, 1, "**bold**")],
        &WeaveOptions::default(),
    );
    assert_eq!(out, "```\na\n```\n**bold**\n```\nb\n```\n");
}

#[test]
fn test_weave_code_fence_language() {
    let options = WeaveOptions {
        lang: Some("rust".to_string()),
        ..plain()
    };
    let out = woven("a\nb\n", vec![event(Stream::Stdout, 1, "x\n")], &options);
    assert_eq!(out, "```rust\na\n```\n```stdout\nx\n```\n```rust\nb\n```\n");
}

// ============================================================================
// Image Tests
// ============================================================================

fn inline() -> WeaveOptions {
    WeaveOptions {
        inline_images: true,
        ..WeaveOptions::default()
    }
}

fn in_dir(dir: &Path) -> WeaveOptions {
    WeaveOptions {
        image_dir: dir.to_path_buf(),
        ..plain()
    }
}

#[test]
fn test_inline_image_with_title() {
    let out = woven("a\n", vec![image(1, PNG, "plot", Some("A \"plot\""))], &inline());
    assert_eq!(
        out,
        format!("```\na\n```\n> ![plot]({} \"A \\\"plot\\\"\")\n", PNG)
    );
}

#[test]
fn test_inline_image_without_title() {
    let options = WeaveOptions {
        quote: false,
        ..inline()
    };
    let out = woven("a\n", vec![image(1, PNG, "plot", None)], &options);
    assert_eq!(out, format!("```\na\n```\n![plot]({})\n", PNG));
}

#[test]
fn test_single_image_file_has_no_index() {
    let dir = tempfile::tempdir().unwrap();
    let out = woven("a\n", vec![image(1, PNG, "plot", None)], &in_dir(dir.path()));

    let path = dir.path().join("demo_1.png");
    assert_eq!(std::fs::read(&path).unwrap(), vec![0x89, b'P', b'N', b'G']);
    assert!(out.ends_with("demo_1.png)\n"));
}

#[test]
fn test_images_on_one_line_are_indexed() {
    let dir = tempfile::tempdir().unwrap();
    let events = vec![
        image(1, PNG, "first", None),
        event(Stream::Stdout, 1, "between\n"),
        image(1, "data:image/svg+xml,<svg/>", "second", None),
    ];
    let out = woven("a\n", events, &in_dir(dir.path()));

    assert!(dir.path().join("demo_1_0.png").is_file());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("demo_1_1.svg")).unwrap(),
        "<svg/>"
    );
    assert!(!dir.path().join("demo_1.png").exists());
    assert!(out.contains("![first]("));
    assert!(out.contains("![second]("));
}

#[test]
fn test_adjacent_images_are_separated() {
    let events = vec![image(1, PNG, "a", None), image(1, PNG, "b", None)];
    let options = WeaveOptions {
        quote: false,
        ..inline()
    };
    let out = woven("x\n", events, &options);
    assert_eq!(
        out,
        format!("```\nx\n```\n![a]({})\n\n![b]({})\n", PNG, PNG)
    );
}

#[test]
fn test_image_file_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("demo_1.png"), b"keep").unwrap();

    let err = try_weave("a\n", vec![image(1, PNG, "plot", None)], &in_dir(dir.path())).unwrap_err();
    assert!(matches!(err, WeftError::ImageExists { .. }));
    assert_eq!(err.kind(), ErrorKind::Render);
    assert_eq!(std::fs::read(dir.path().join("demo_1.png")).unwrap(), b"keep");
}

#[test]
fn test_unknown_image_encoding_is_fatal() {
    let gif = "data:image/gif;base64,R0lGOD==";
    let dir = tempfile::tempdir().unwrap();

    let err = try_weave("a\n", vec![image(1, gif, "g", None)], &inline()).unwrap_err();
    assert!(matches!(err, WeftError::UnknownImage { line: 1, .. }));

    let err = try_weave("a\n", vec![image(1, gif, "g", None)], &in_dir(dir.path())).unwrap_err();
    assert!(matches!(err, WeftError::UnknownImage { line: 1, .. }));
}

#[test]
fn test_image_event_without_data_is_fatal() {
    let mut broken = event(Stream::Image, 1, "alt");
    broken.image = None;
    let err = try_weave("a\n", vec![broken], &inline()).unwrap_err();
    assert!(matches!(err, WeftError::MissingImage { line: 1 }));
}

#[test]
fn test_sink_file_names() {
    let sink = ImageSink::new(Path::new("examples/plots.rs"), PathBuf::new());
    assert_eq!(sink.file_name(7, None, weft::ImageFormat::Jpeg), "plots_7.jpeg");
    assert_eq!(sink.file_name(7, Some(2), weft::ImageFormat::Svg), "plots_7_2.svg");
}

#[test]
fn test_sink_bad_base64() {
    let dir = tempfile::tempdir().unwrap();
    let sink = ImageSink::new(Path::new(DEMO), dir.path());
    let err = sink
        .write(&image(4, "data:image/png;base64,!!!", "x", None), None)
        .unwrap_err();
    assert!(matches!(err, WeftError::ImageData { line: 4, .. }));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_file_layers_over_defaults() {
    let file = ConfigFile::parse(
        concat!(
            "inline = true\n",
            "quote = false\n",
            "lang = \"rust\"\n",
            "runtime_path = \"vendor/weft\"\n",
            "release = true\n",
            "[dependencies]\n",
            "image = \"0.25\"\n",
        ),
        Path::new("weft.toml"),
    )
    .unwrap();

    let mut config = WeftConfig::default();
    config.apply_file(file, Path::new("/work"));

    assert!(config.weave.inline_images);
    assert!(!config.weave.quote);
    assert_eq!(config.weave.lang.as_deref(), Some("rust"));
    assert_eq!(config.script.runtime_path, PathBuf::from("/work/vendor/weft"));
    assert!(config.script.release);
    assert_eq!(config.script.edition, "2021");
    assert!(config.script.dependencies.contains_key("image"));
}

#[test]
fn test_config_file_rejects_unknown_keys() {
    let err = ConfigFile::parse("inlined = true\n", Path::new("weft.toml")).unwrap_err();
    assert!(matches!(err, WeftError::ConfigParse { .. }));
    assert_eq!(err.kind(), ErrorKind::Setup);
}

#[test]
fn test_config_env_overrides_file() {
    let mut config = WeftConfig::default();
    config.apply_file(
        ConfigFile {
            cargo: Some(PathBuf::from("from-file")),
            ..ConfigFile::default()
        },
        Path::new(""),
    );
    config.apply_env(|key| match key {
        "WEFT_CARGO" => Some(OsString::from("/usr/local/bin/cargo")),
        "WEFT_TARGET_DIR" => Some(OsString::new()),
        _ => None,
    });

    assert_eq!(config.script.cargo, PathBuf::from("/usr/local/bin/cargo"));
    assert_eq!(config.script.target_dir, ScriptConfig::default().target_dir);
}

#[test]
fn test_config_load_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "quote = false\nimage_dir = \"img\"\n").unwrap();

    let config = WeftConfig::load(Some(&path)).unwrap();
    assert!(!config.weave.quote);
    assert_eq!(config.weave.image_dir, PathBuf::from("img"));
}

#[test]
fn test_config_load_missing_explicit_file() {
    let err = WeftConfig::load(Some(Path::new("/nonexistent/weft.toml"))).unwrap_err();
    assert!(matches!(err, WeftError::ConfigRead { .. }));
}

// ============================================================================
// Error Taxonomy Tests
// ============================================================================

#[test]
fn test_script_error_kinds() {
    let launch = WeftError::from(ScriptError::Launch {
        cargo: "cargo".to_string(),
        source: std::io::Error::other("missing"),
    });
    assert_eq!(launch.kind(), ErrorKind::Execution);

    let decode = WeftError::from(ScriptError::Decode {
        offset: 0,
        source: serde_json::from_str::<u32>("x").unwrap_err(),
    });
    assert_eq!(decode.kind(), ErrorKind::Protocol);
}

// ============================================================================
// Pipeline Tests
// ============================================================================

fn pipeline_config(cargo: impl Into<PathBuf>, temp_root: &Path) -> WeftConfig {
    WeftConfig {
        weave: WeaveOptions::default(),
        script: ScriptConfig {
            cargo: cargo.into(),
            target_dir: None,
            temp_root: Some(temp_root.to_path_buf()),
            ..ScriptConfig::default()
        },
    }
}

#[tokio::test]
async fn test_render_missing_source() {
    let root = tempfile::tempdir().unwrap();
    let config = pipeline_config("cargo", root.path());
    let mut out = Vec::new();

    let err = weft_core::render(Path::new("/nonexistent/demo.rs"), &config, &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, WeftError::Source { .. }));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_render_parse_error_runs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("demo.rs");
    std::fs::write(&source, "fn main() { let = ; }\n").unwrap();
    let config = pipeline_config("/nonexistent/weft-test-cargo", dir.path());
    let mut out = Vec::new();

    let err = weft_core::render(&source, &config, &mut out).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_render_launch_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("demo.rs");
    std::fs::write(&source, "fn main() {}\n").unwrap();
    let config = pipeline_config("/nonexistent/weft-test-cargo", dir.path());
    let mut out = Vec::new();

    let err = weft_core::render(&source, &config, &mut out).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Execution);
    assert!(out.is_empty());
}

#[cfg(unix)]
fn fake_cargo(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-cargo");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[tokio::test]
async fn test_render_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let source = dir.path().join("demo.rs");
    std::fs::write(
        &source,
        "use weft::fmt;\nfn main() { fmt::println!(\"hi\"); }\n",
    )
    .unwrap();

    let body = r#"grep -q 'use weft::capture::fmt;' "$(dirname "$4")/src/main.rs" || exit 9
printf '%s\n' '{"stream":"stdout","file":"src/main.rs","line":2,"text":"hi\n"}'"#;
    let config = pipeline_config(fake_cargo(dir.path(), body), root.path());
    let mut out = Vec::new();

    weft_core::render(&source, &config, &mut out).await.unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        concat!(
            "```\n",
            "use weft::fmt;\n",
            "fn main() { fmt::println!(\"hi\"); }\n",
            "```\n",
            "> ```stdout\n",
            "> hi\n",
            "> ```\n",
        )
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_render_foreign_event_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let source = dir.path().join("demo.rs");
    std::fs::write(&source, "use weft::fmt;\nfn main() {}\n").unwrap();

    let body = r#"printf '%s\n' '{"stream":"stdout","file":"/deps/lib.rs","line":2,"text":"x"}'"#;
    let config = pipeline_config(fake_cargo(dir.path(), body), root.path());
    let mut out = Vec::new();

    let err = weft_core::render(&source, &config, &mut out).await.unwrap_err();
    assert!(matches!(err, WeftError::ForeignFile { .. }));
    assert!(out.is_empty());
}
