use std::process::Command;

fn run_dynbind(args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_dynbind");
    Command::new(exe).args(args).output().expect("run dynbind")
}

fn stdout(out: &std::process::Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn resolve_prints_library_and_entries() {
    let out = run_dynbind(&[
        "resolve",
        "--binding",
        "FooWrapper",
        "--arch",
        "x64",
        "--path",
        "lib64",
        "--transform",
        "screaming_snake",
        "--entry-prefix",
        "foo_",
        "--op",
        "GetValue",
        "--op",
        "Reset",
    ]);
    assert!(out.status.success(), "stderr:\n{}", String::from_utf8_lossy(&out.stderr));

    let text = stdout(&out);
    let lib = std::path::Path::new("lib64").join(format!("Foo64{}", std::env::consts::DLL_SUFFIX));
    assert!(text.contains(&format!("{} (x64)", lib.display())), "{}", text);
    assert!(text.contains("GetValue -> foo_GET_VALUE"), "{}", text);
    assert!(text.contains("Reset -> foo_RESET"), "{}", text);
}

#[test]
fn resolve_without_inferable_name_fails() {
    let out = run_dynbind(&["resolve", "--binding", "Foo", "--op", "GetValue"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("couldn't infer a library name"));
}

#[test]
fn inspect_reports_own_architecture() {
    let exe = env!("CARGO_BIN_EXE_dynbind");
    let out = run_dynbind(&["inspect", exe]);
    assert!(out.status.success(), "stderr:\n{}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).contains("(loadable by this"), "{}", stdout(&out));
}

#[test]
fn call_surfaces_resolution_failures() {
    let out = run_dynbind(&[
        "call",
        "--binding",
        "NowhereWrapper",
        "--op",
        "GetValue",
        "--ret",
        "i32",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("call to GetValue failed"));
}
