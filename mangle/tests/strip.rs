use compile_command_core::{print_argv, split_argv};
use compile_command_mangle::ArgStripper;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn strip(spelling: &str, argv: &str) -> String {
    let mut args: Vec<String> = argv.split_whitespace().map(String::from).collect();
    let mut stripper = ArgStripper::new();
    stripper.strip(spelling);
    stripper.process(&mut args);
    print_argv(&args)
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Spellings
// ---------------------------------------------------------------------------

#[test]
fn test_alternate_prefixes() {
    assert_eq!(strip("-pedantic", "clang -pedantic foo.cc"), "clang foo.cc");
    assert_eq!(strip("-pedantic", "clang --pedantic foo.cc"), "clang foo.cc");
    assert_eq!(strip("--pedantic", "clang -pedantic foo.cc"), "clang foo.cc");
    assert_eq!(strip("--pedantic", "clang --pedantic foo.cc"), "clang foo.cc");
}

#[test]
fn test_alternate_names() {
    assert_eq!(strip("-x", "clang -x c++ foo.cc"), "clang foo.cc");
    assert_eq!(strip("-x", "clang --language=c++ foo.cc"), "clang foo.cc");
    assert_eq!(strip("--language=", "clang -x c++ foo.cc"), "clang foo.cc");
    assert_eq!(strip("--language=", "clang --language=c++ foo.cc"), "clang foo.cc");
}

#[test]
fn test_unknown_flag() {
    assert_eq!(strip("-xyzzy", "clang -xyzzy foo.cc"), "clang foo.cc");
    assert_eq!(strip("-xyz*", "clang -xyzzy foo.cc"), "clang foo.cc");
    assert_eq!(strip("-xyzzy", "clang -Xclang -xyzzy foo.cc"), "clang foo.cc");
}

// ---------------------------------------------------------------------------
// -Xclang escapes
// ---------------------------------------------------------------------------

#[test]
fn test_xclang_escaped_flag() {
    assert_eq!(strip("-ast-dump", "clang -Xclang -ast-dump foo.cc"), "clang foo.cc");
}

#[test]
fn test_xclang_escaped_values() {
    assert_eq!(
        strip("-add-plugin", "clang -Xclang -add-plugin -Xclang z foo.cc"),
        "clang foo.cc"
    );
}

#[test]
fn test_frontend_only_flag_needs_escape() {
    assert_eq!(strip("-ast-dump", "clang -ast-dump foo.cc"), "clang -ast-dump foo.cc");
}

// ---------------------------------------------------------------------------
// Driver modes
// ---------------------------------------------------------------------------

#[test]
fn test_slash_include_only_in_cl_mode() {
    assert_eq!(
        strip("-I", "clang -I /usr/inc /Interesting/file.cc"),
        "clang /Interesting/file.cc"
    );
    assert_eq!(strip("-I", "clang-cl -I /usr/inc /Interesting/file.cc"), "clang-cl");
    assert_eq!(strip("-I", "CL.EXE -I /usr/inc /Interesting/file.cc"), "CL.EXE");
    assert_eq!(
        strip("-I", "cc -I /usr/inc /Interesting/file.cc --driver-mode=cl"),
        "cc --driver-mode=cl"
    );
}

// ---------------------------------------------------------------------------
// Argument styles
// ---------------------------------------------------------------------------

#[test]
fn test_flag() {
    assert_eq!(strip("-Qn", "clang -Qn foo.cc"), "clang foo.cc");
    assert_eq!(strip("-Qn", "clang -QnZ foo.cc"), "clang -QnZ foo.cc");
}

#[test]
fn test_joined() {
    assert_eq!(strip("-std=", "clang -std= foo.cc"), "clang foo.cc");
    assert_eq!(strip("-std=", "clang -std=c++11 foo.cc"), "clang foo.cc");
}

#[test]
fn test_separate() {
    assert_eq!(strip("-mllvm", "clang -mllvm X foo.cc"), "clang foo.cc");
    assert_eq!(strip("-mllvm", "clang -mllvmX foo.cc"), "clang -mllvmX foo.cc");
}

#[test]
fn test_remaining_args_joined() {
    assert_eq!(strip("/link", "clang-cl /link b c d foo.cc"), "clang-cl");
    assert_eq!(strip("/link", "clang-cl /linka b c d foo.cc"), "clang-cl");
}

#[test]
fn test_comma_joined() {
    assert_eq!(strip("-Wl,", "clang -Wl,x,y foo.cc"), "clang foo.cc");
    assert_eq!(strip("-Wl,", "clang -Wl, foo.cc"), "clang foo.cc");
}

#[test]
fn test_multi_arg() {
    assert_eq!(strip("-segaddr", "clang -segaddr a b foo.cc"), "clang foo.cc");
    assert_eq!(
        strip("-segaddr", "clang -segaddra b foo.cc"),
        "clang -segaddra b foo.cc"
    );
}

#[test]
fn test_joined_or_separate() {
    assert_eq!(strip("-G", "clang -GX foo.cc"), "clang foo.cc");
    assert_eq!(strip("-G", "clang -G X foo.cc"), "clang foo.cc");
}

#[test]
fn test_joined_and_separate() {
    assert_eq!(
        strip("-plugin-arg-", "clang -cc1 -plugin-arg-X Y foo.cc"),
        "clang -cc1 foo.cc"
    );
    assert_eq!(
        strip("-plugin-arg-", "clang -cc1 -plugin-arg- Y foo.cc"),
        "clang -cc1 foo.cc"
    );
}

// ---------------------------------------------------------------------------
// Edge cases
// ---------------------------------------------------------------------------

#[test]
fn test_end_of_list() {
    assert_eq!(strip("-I", "clang -Xclang"), "clang -Xclang");
    assert_eq!(strip("-I", "clang -Xclang -I"), "clang");
    assert_eq!(strip("-I", "clang -I -Xclang"), "clang");
    assert_eq!(strip("-I", "clang -I"), "clang");
}

#[test]
fn test_program_name_only_and_empty() {
    assert_eq!(strip("-I", "clang"), "clang");
    assert_eq!(strip("-I", ""), "");
}

#[test]
fn test_multiple() {
    let mut stripper = ArgStripper::new();
    stripper.strip("-o");
    stripper.strip("-c");
    let mut args = strings(&["clang", "-o", "foo.o", "foo.cc", "-c"]);
    stripper.process(&mut args);
    assert_eq!(args, strings(&["clang", "foo.cc"]));
}

#[test]
fn test_warning_is_a_flag_name() {
    let mut stripper = ArgStripper::new();
    stripper.strip("-W");
    let mut args = strings(&["clang", "-Wfoo", "-Wno-bar", "-Werror", "foo.cc"]);
    stripper.process(&mut args);
    assert_eq!(args, strings(&["clang", "foo.cc"]));
}

#[test]
fn test_specific_warning_is_literal() {
    let mut stripper = ArgStripper::new();
    stripper.strip("-Wunused");
    let mut args = strings(&["clang", "-Wunused", "-Wno-unused", "foo.cc"]);
    stripper.process(&mut args);
    assert_eq!(args, strings(&["clang", "-Wno-unused", "foo.cc"]));
}

#[test]
fn test_define() {
    let mut stripper = ArgStripper::new();
    stripper.strip("-D");
    let mut args = strings(&["clang", "-Dfoo", "-Dbar=baz", "foo.cc"]);
    stripper.process(&mut args);
    assert_eq!(args, strings(&["clang", "foo.cc"]));
}

#[test]
fn test_specific_define_is_literal() {
    let mut stripper = ArgStripper::new();
    stripper.strip("-Dbar");
    let mut args = strings(&["clang", "-Dfoo", "-Dbar=baz", "foo.cc"]);
    stripper.process(&mut args);
    assert_eq!(args, strings(&["clang", "-Dfoo", "-Dbar=baz", "foo.cc"]));

    stripper.strip("-Dfoo");
    stripper.process(&mut args);
    assert_eq!(args, strings(&["clang", "-Dbar=baz", "foo.cc"]));

    stripper.strip("-Dbar=*");
    stripper.process(&mut args);
    assert_eq!(args, strings(&["clang", "foo.cc"]));
}

#[test]
fn test_overlapping_spellings_in_either_order() {
    for order in [["-include", "-include-pch"], ["-include-pch", "-include"]] {
        let mut stripper = ArgStripper::new();
        for spelling in order {
            stripper.strip(spelling);
        }
        let mut args = strings(&["clang", "-include-pch", "foo.pch", "-include", "a.h", "foo.cc"]);
        stripper.process(&mut args);
        assert_eq!(args, strings(&["clang", "foo.cc"]), "order {order:?}");
    }
}

#[test]
fn test_separate_option_never_leaves_its_value() {
    let mut stripper = ArgStripper::new();
    stripper.strip("-MF");
    let mut args = strings(&["clang", "-MD", "-MF", "dep.d", "-c", "foo.cc", "-MFother.d"]);
    stripper.process(&mut args);
    assert_eq!(args, strings(&["clang", "-MD", "-c", "foo.cc"]));
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

#[test]
fn test_print_argv() {
    let args = ["one", "two", "thr ee", "f\"o\"ur", "fi\\ve", "$"];
    assert_eq!(print_argv(&args), r#"one two "thr ee" "f\"o\"ur" "fi\\ve" $"#);
}

#[test]
fn test_printed_argv_splits_back() {
    let args = strings(&["clang", "-DX=a b", "-I/path with/spaces", "back\\slash", "-c"]);
    assert_eq!(split_argv(&print_argv(&args)), Some(args));

    let args = strings(&["clang", "-DMSG=it's", "-c"]);
    assert_eq!(print_argv(&args), r#"clang "-DMSG=it's" -c"#);
    assert_eq!(split_argv(&print_argv(&args)), Some(args));
}
